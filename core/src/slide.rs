use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// One cell of the sliding board: a numbered tile or the single gap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideCell {
    Tile(u16),
    Empty,
}

impl SlideCell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Board dimensions and shuffle length for a difficulty tier.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlideConfig {
    pub size: Coord2,
    pub shuffle_moves: u16,
}

// One entry per tier 1..=5; tier 3 is the 3x3 board with 8 tiles.
const SLIDE_TIERS: [SlideConfig; 5] = [
    SlideConfig { size: (2, 2), shuffle_moves: 8 },
    SlideConfig { size: (3, 2), shuffle_moves: 16 },
    SlideConfig { size: (3, 3), shuffle_moves: 32 },
    SlideConfig { size: (4, 3), shuffle_moves: 48 },
    SlideConfig { size: (4, 4), shuffle_moves: 64 },
];

impl SlideConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        SLIDE_TIERS[difficulty.table_index()]
    }
}

/// Outcome of sliding a tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    NoChange,
    Moved,
    Won,
}

impl MoveOutcome {
    /// Whether this outcome could have caused an update to the board.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Sliding-tile puzzle board.
///
/// Holds a permutation of the solved configuration with exactly one empty
/// cell. Shuffling only ever applies legal single-step moves, so every
/// shuffled board stays solvable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlideBoard {
    board: Array2<SlideCell>,
    empty: Coord2,
    solved: bool,
    moves: u32,
}

/// Cell contents of the solved configuration at `coords`.
const fn solved_cell(coords: Coord2, size: Coord2) -> SlideCell {
    if coords.0 == size.0 - 1 && coords.1 == size.1 - 1 {
        SlideCell::Empty
    } else {
        SlideCell::Tile(coords.0 as u16 * size.1 as u16 + coords.1 as u16)
    }
}

impl SlideBoard {
    /// Creates a board in the solved configuration.
    pub fn new(config: SlideConfig) -> Self {
        let (mut size_x, mut size_y) = config.size;
        size_x = size_x.max(1);
        size_y = size_y.max(1);
        if mult(size_x, size_y) < 2 {
            (size_x, size_y) = (2, 1);
        }
        let size = (size_x, size_y);

        let board =
            Array2::from_shape_fn(size.to_nd_index(), |(x, y)| {
                solved_cell((x as Coord, y as Coord), size)
            });

        Self {
            board,
            empty: (size_x - 1, size_y - 1),
            solved: true,
            moves: 0,
        }
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self::new(SlideConfig::for_difficulty(difficulty))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.board.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_tiles(&self) -> CellCount {
        let size = self.size();
        mult(size.0, size.1) - 1
    }

    pub fn cell_at(&self, coords: Coord2) -> SlideCell {
        self.board[coords.to_nd_index()]
    }

    pub fn empty_cell(&self) -> Coord2 {
        self.empty
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Player moves made so far; shuffle moves are not counted.
    pub fn move_count(&self) -> u32 {
        self.moves
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn check_not_solved(&self) -> Result<()> {
        if self.solved {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    /// Scrambles the board by applying `moves` random legal single-step
    /// moves, never a raw permutation, so the result is always reachable by
    /// play. Returns the cell each moved tile slid into; sliding those cells
    /// again in reverse order undoes the shuffle exactly.
    pub fn shuffle(&mut self, moves: u16, seed: u64) -> Vec<Coord2> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut performed = Vec::with_capacity(moves.into());

        for _ in 0..moves {
            let options: Vec<Coord2> = self.board.iter_neighbors(self.empty).collect();
            let Some(&from) = options.choose(&mut rng) else {
                break;
            };
            let into = self.empty;
            self.swap_with_empty(from);
            performed.push(into);
        }

        self.solved = self.compute_solved();
        self.moves = 0;
        performed
    }

    /// Slides the tile at `coords` into the empty cell, when the two are
    /// grid-adjacent. The win condition is re-checked after every move.
    pub fn slide(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        use MoveOutcome::*;

        let coords = self.validate_coords(coords)?;
        self.check_not_solved()?;

        if coords == self.empty || !is_adjacent(coords, self.empty) {
            return Ok(NoChange);
        }

        self.swap_with_empty(coords);
        self.moves += 1;
        self.solved = self.compute_solved();

        Ok(if self.solved { Won } else { Moved })
    }

    /// Developer cheat: swaps two arbitrary cells, bypassing move legality.
    /// The tracked empty cell follows the swap, so the win-checker stays
    /// coherent even when the gap itself is moved.
    pub fn debug_swap(&mut self, a: Coord2, b: Coord2) -> Result<MoveOutcome> {
        use MoveOutcome::*;

        let a = self.validate_coords(a)?;
        let b = self.validate_coords(b)?;
        self.check_not_solved()?;

        if a == b {
            return Ok(NoChange);
        }

        self.board.swap(a.to_nd_index(), b.to_nd_index());
        if self.empty == a {
            self.empty = b;
        } else if self.empty == b {
            self.empty = a;
        }
        self.solved = self.compute_solved();

        Ok(if self.solved { Won } else { Moved })
    }

    fn swap_with_empty(&mut self, from: Coord2) {
        debug_assert!(self.board[self.empty.to_nd_index()].is_empty());
        self.board.swap(from.to_nd_index(), self.empty.to_nd_index());
        self.empty = from;
    }

    fn compute_solved(&self) -> bool {
        let size = self.size();
        self.board.indexed_iter().all(|((x, y), &cell)| {
            cell == solved_cell((x as Coord, y as Coord), size)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2) -> SlideBoard {
        SlideBoard::new(SlideConfig {
            size,
            shuffle_moves: 0,
        })
    }

    #[test]
    fn new_board_is_solved_with_empty_in_the_corner() {
        let board = board((3, 3));
        assert!(board.is_solved());
        assert_eq!(board.empty_cell(), (2, 2));
        assert_eq!(board.total_tiles(), 8);
    }

    #[test]
    fn difficulty_three_is_the_three_by_three_board() {
        let board = SlideBoard::for_difficulty(Difficulty::new(3));
        assert_eq!(board.size(), (3, 3));
        assert_eq!(board.total_tiles(), 8);
    }

    #[test]
    fn sliding_a_non_adjacent_tile_is_a_no_op() {
        let mut board = board((3, 3));
        board.shuffle(11, 7);
        let empty = board.empty_cell();
        let far = ((empty.0 + 2) % 3, (empty.1 + 2) % 3);
        assert!(!is_adjacent(far, empty));

        let before = board.clone();
        assert_eq!(board.slide(far).unwrap(), MoveOutcome::NoChange);
        assert_eq!(board, before);
    }

    #[test]
    fn sliding_keeps_exactly_one_empty_cell() {
        let mut board = board((3, 3));
        board.shuffle(25, 3);

        for _ in 0..10 {
            let target = board
                .board
                .iter_neighbors(board.empty_cell())
                .next()
                .unwrap();
            let _ = board.slide(target);
            let empties = board
                .board
                .iter()
                .filter(|cell| cell.is_empty())
                .count();
            assert_eq!(empties, 1);
            assert_eq!(board.cell_at(board.empty_cell()), SlideCell::Empty);
            if board.is_solved() {
                break;
            }
        }
    }

    #[test]
    fn undoing_the_shuffle_in_reverse_wins() {
        let mut board = board((3, 3));
        // An odd number of single-tile swaps can never be the identity
        // permutation, so the shuffled board is guaranteed unsolved.
        let performed = board.shuffle(31, 42);
        assert_eq!(performed.len(), 31);
        assert!(!board.is_solved());

        let mut last = MoveOutcome::NoChange;
        for &cell in performed.iter().rev() {
            last = board.slide(cell).unwrap();
            if last == MoveOutcome::Won {
                break;
            }
        }

        assert_eq!(last, MoveOutcome::Won);
        assert!(board.is_solved());
    }

    #[test]
    fn one_move_away_board_is_not_solved() {
        let mut board = board((3, 3));
        let performed = board.shuffle(1, 99);
        assert_eq!(performed.len(), 1);
        assert!(!board.is_solved());
    }

    #[test]
    fn moves_after_winning_are_rejected() {
        let mut solved = board((2, 2));
        assert_eq!(solved.slide((0, 1)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn debug_swap_tracks_the_empty_cell() {
        let mut board = board((3, 3));
        board.shuffle(13, 5);
        let empty = board.empty_cell();
        let other = if empty == (0, 0) { (2, 2) } else { (0, 0) };

        board.debug_swap(empty, other).unwrap();
        assert_eq!(board.empty_cell(), other);
        assert_eq!(board.cell_at(other), SlideCell::Empty);
    }

    #[test]
    fn debug_swap_can_solve_the_board() {
        let mut board = board((2, 2));
        // One legal move away from solved, then cheat the tile back.
        board.shuffle(1, 0);
        let empty = board.empty_cell();
        let outcome = board.debug_swap(empty, (1, 1)).unwrap();
        assert_eq!(outcome, MoveOutcome::Won);
        assert!(board.is_solved());
    }

    #[test]
    fn out_of_bounds_coords_are_rejected() {
        let mut board = board((3, 3));
        board.shuffle(5, 1);
        assert_eq!(board.slide((3, 0)), Err(GameError::InvalidCoords));
    }
}
