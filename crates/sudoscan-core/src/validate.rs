//! Row/column/box uniqueness checks.

use crate::board::{Board, SIZE};
use crate::PuzzleError;

/// A filled cell whose digit collides with another cell in its row, column,
/// or 3×3 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Conflict {
    pub row: usize,
    pub col: usize,
    pub digit: u8,
}

/// `true` when `digit` occurs nowhere else in the row, column, or 3×3 box of
/// `(row, col)`.
///
/// The probed cell itself is excluded from the comparison, so the same
/// predicate answers both "may this digit be placed here" (cell empty) and
/// "is this filled cell consistent with the rest of the board" (cell holds
/// `digit`).
pub fn is_valid(board: &Board, row: usize, col: usize, digit: u8) -> bool {
    for i in 0..SIZE {
        if i != col && board.get(row, i) == Some(digit) {
            return false;
        }
        if i != row && board.get(i, col) == Some(digit) {
            return false;
        }
    }
    let box_row = row / 3 * 3;
    let box_col = col / 3 * 3;
    for r in box_row..box_row + 3 {
        for c in box_col..box_col + 3 {
            if (r, c) != (row, col) && board.get(r, c) == Some(digit) {
                return false;
            }
        }
    }
    true
}

/// First filled cell (row-major) whose digit violates uniqueness, if any.
pub fn first_conflict(board: &Board) -> Option<Conflict> {
    board.iter_cells().find_map(|(row, col, cell)| {
        let digit = cell?;
        (!is_valid(board, row, col, digit)).then_some(Conflict { row, col, digit })
    })
}

/// Gate used by the solver and candidate engine: reject boards that already
/// violate uniqueness.
pub fn check_consistent(board: &Board) -> Result<(), PuzzleError> {
    match first_conflict(board) {
        Some(conflict) => Err(PuzzleError::Inconsistent(conflict)),
        None => Ok(()),
    }
}
