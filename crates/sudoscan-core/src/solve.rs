//! Exhaustive backtracking search.

use crate::board::Board;
use crate::{validate, PuzzleError};

/// Solve a puzzle by depth-first backtracking.
///
/// Cells are visited in row-major order; at the first empty cell digits 1
/// through 9 are tried in ascending order, so the returned grid is the
/// lexicographically-first completion and the function is deterministic.
///
/// The input is checked for row/column/box consistency up front and the
/// search runs on a private copy; the caller's board is never mutated, on
/// success or failure.
pub fn solve(board: &Board) -> Result<Board, PuzzleError> {
    validate::check_consistent(board)?;
    let mut work = *board;
    if solve_in_place(&mut work) {
        Ok(work)
    } else {
        Err(PuzzleError::NoSolution)
    }
}

/// Count completions of `board`, stopping once `limit` have been found.
///
/// Returns 0 for an inconsistent board. Useful for flagging puzzles with
/// more than one solution (`limit = 2`); it never proves uniqueness beyond
/// the requested limit.
pub fn count_solutions(board: &Board, limit: usize) -> usize {
    if limit == 0 || validate::first_conflict(board).is_some() {
        return 0;
    }
    let mut work = *board;
    let mut found = 0usize;
    count_in_place(&mut work, limit, &mut found);
    found
}

fn solve_in_place(board: &mut Board) -> bool {
    let Some((row, col)) = first_empty(board) else {
        return true;
    };
    for digit in 1..=9 {
        if validate::is_valid(board, row, col, digit) {
            board.set(row, col, digit);
            if solve_in_place(board) {
                return true;
            }
            board.clear_cell(row, col);
        }
    }
    false
}

fn count_in_place(board: &mut Board, limit: usize, found: &mut usize) {
    let Some((row, col)) = first_empty(board) else {
        *found += 1;
        return;
    };
    for digit in 1..=9 {
        if *found >= limit {
            return;
        }
        if validate::is_valid(board, row, col, digit) {
            board.set(row, col, digit);
            count_in_place(board, limit, found);
            board.clear_cell(row, col);
        }
    }
}

fn first_empty(board: &Board) -> Option<(usize, usize)> {
    board
        .iter_cells()
        .find_map(|(row, col, cell)| cell.is_none().then_some((row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SIZE;
    use rand::prelude::*;

    const PUZZLE: &str = "\
        53..7....\
        6..195...\
        .98....6.\
        8...6...3\
        4..8.3..1\
        7...2...6\
        .6....28.\
        ...419..5\
        ....8..79";

    const SOLUTION: &str = "\
        534678912\
        672195348\
        198342567\
        859761423\
        426853791\
        713924856\
        961537284\
        287419635\
        345286179";

    fn assert_fully_valid(board: &Board) {
        assert!(board.is_full());
        for (row, col, cell) in board.iter_cells() {
            assert!(validate::is_valid(board, row, col, cell.unwrap()));
        }
    }

    #[test]
    fn solves_known_puzzle_to_its_unique_solution() {
        let puzzle = Board::parse(PUZZLE).unwrap();
        let expected = Board::parse(SOLUTION).unwrap();
        assert_eq!(puzzle.filled_count(), 30);
        let solved = solve(&puzzle).unwrap();
        assert_eq!(solved, expected);
        assert_fully_valid(&solved);
    }

    #[test]
    fn solving_leaves_the_input_untouched() {
        let puzzle = Board::parse(PUZZLE).unwrap();
        let before = puzzle;
        let _ = solve(&puzzle).unwrap();
        assert_eq!(puzzle, before);
    }

    #[test]
    fn solved_board_solves_to_itself() {
        let solved = Board::parse(SOLUTION).unwrap();
        assert_eq!(solve(&solved).unwrap(), solved);
    }

    #[test]
    fn empty_board_yields_some_valid_grid() {
        let solved = solve(&Board::empty()).unwrap();
        assert_fully_valid(&solved);
        // Row 0 has no constraints, so the ascending-digit search fills it
        // with 1..9 in order.
        for col in 0..SIZE {
            assert_eq!(solved.get(0, col), Some(col as u8 + 1));
        }
    }

    #[test]
    fn duplicate_in_row_is_rejected_without_searching() {
        let mut board = Board::empty();
        board.set(0, 1, 5);
        board.set(0, 7, 5);
        let before = board;
        let err = solve(&board).unwrap_err();
        assert!(matches!(err, PuzzleError::Inconsistent(c) if c.digit == 5 && c.row == 0));
        assert_eq!(board, before);
    }

    #[test]
    fn contradiction_reachable_only_by_search_reports_no_solution() {
        // Row 0 pins 1..8 leaving only 9 for the last cell, while column 8
        // already holds a 9 further down: consistent as given, unsolvable.
        let mut board = Board::empty();
        for col in 0..8 {
            board.set(0, col, col as u8 + 1);
        }
        board.set(5, 8, 9);
        assert!(validate::check_consistent(&board).is_ok());
        assert_eq!(solve(&board), Err(PuzzleError::NoSolution));
    }

    #[test]
    fn count_solutions_respects_the_limit() {
        let puzzle = Board::parse(PUZZLE).unwrap();
        assert_eq!(count_solutions(&puzzle, 2), 1);
        assert_eq!(count_solutions(&Board::empty(), 3), 3);
        assert_eq!(count_solutions(&puzzle, 0), 0);

        let mut bad = Board::parse(PUZZLE).unwrap();
        bad.set(0, 2, 5); // clashes with the 5 at (0, 0)
        assert_eq!(count_solutions(&bad, 2), 0);
    }

    #[test]
    fn randomized_partial_boards_stay_solvable() {
        let solution = Board::parse(SOLUTION).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut partial = solution;
            for _ in 0..rng.gen_range(20..60) {
                partial.clear_cell(rng.gen_range(0..SIZE), rng.gen_range(0..SIZE));
            }
            let solved = solve(&partial).unwrap();
            assert_fully_valid(&solved);
            // Givens survive into the completion.
            for (row, col, cell) in partial.iter_cells() {
                if let Some(digit) = cell {
                    assert_eq!(solved.get(row, col), Some(digit));
                }
            }
        }
    }
}
