//! Per-cell candidate digits for hinting.

use crate::board::{Board, SIZE};
use crate::{validate, PuzzleError};

/// For each cell: the ascending digits still legal there (`Some`, possibly
/// empty, for empty cells), or `None` for filled cells.
pub type CandidateMap = [[Option<Vec<u8>>; SIZE]; SIZE];

/// Compute candidate sets against the current, possibly incomplete board.
///
/// The board must be globally consistent; otherwise the computed sets would
/// be misleading and the request is refused instead.
pub fn candidates(board: &Board) -> Result<CandidateMap, PuzzleError> {
    validate::check_consistent(board)?;
    Ok(std::array::from_fn(|row| {
        std::array::from_fn(|col| {
            board.get(row, col).is_none().then(|| {
                (1..=9)
                    .filter(|&digit| validate::is_valid(board, row, col, digit))
                    .collect()
            })
        })
    }))
}
