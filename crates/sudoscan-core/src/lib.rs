//! sudoscan-core — constraint engine for 9×9 Sudoku.
//!
//! Provides the shared board model and the three operations every consumer
//! of a puzzle needs:
//!
//! 1. **Validation** – row/column/box uniqueness predicate and whole-board
//!    consistency checking.
//! 2. **Solving** – exhaustive depth-first backtracking search returning the
//!    lexicographically-first completion.
//! 3. **Candidates** – per-empty-cell sets of digits still legal under the
//!    current board state, for hinting.
//!
//! The crate is synchronous and free of I/O; image ingestion lives in the
//! `sudoscan` crate.

pub mod board;
pub mod candidates;
pub mod solve;
pub mod validate;

pub use board::{Board, ParseBoardError, SIZE};
pub use candidates::{candidates, CandidateMap};
pub use solve::{count_solutions, solve};
pub use validate::{check_consistent, first_conflict, is_valid, Conflict};

/// Why a solve or hint request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PuzzleError {
    /// The board already violates row/column/box uniqueness; the offending
    /// cell is reported.
    Inconsistent(Conflict),
    /// The search space was exhausted without finding a completion.
    NoSolution,
}

impl std::fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inconsistent(c) => write!(
                f,
                "invalid puzzle configuration: digit {} at row {}, column {} conflicts with another cell",
                c.digit, c.row, c.col
            ),
            Self::NoSolution => write!(f, "no solution found"),
        }
    }
}

impl std::error::Error for PuzzleError {}
