use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Position in widget space.
pub type Point = (f32, f32);

fn distance(a: Point, b: Point) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Piece count and snap threshold for a difficulty tier.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FragmentConfig {
    pub pieces: u8,
    /// Maximum distance at which a released piece snaps onto its target.
    pub snap_distance: f32,
}

const FRAGMENT_TIERS: [FragmentConfig; 5] = [
    FragmentConfig { pieces: 3, snap_distance: 48.0 },
    FragmentConfig { pieces: 4, snap_distance: 44.0 },
    FragmentConfig { pieces: 6, snap_distance: 40.0 },
    FragmentConfig { pieces: 8, snap_distance: 36.0 },
    FragmentConfig { pieces: 12, snap_distance: 32.0 },
];

impl FragmentConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        FRAGMENT_TIERS[difficulty.table_index()]
    }
}

/// One draggable fragment with a fixed target position.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    target: Point,
    position: Point,
    placed: bool,
}

impl Piece {
    pub fn target(&self) -> Point {
        self.target
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }
}

/// Outcome of grabbing a piece.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GrabOutcome {
    /// Another piece is already being dragged.
    NoChange,
    Grabbed,
    /// The piece was placed; grabbing it un-placed it again.
    Unplaced,
}

/// Outcome of releasing the dragged piece.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ReleaseOutcome {
    /// No piece was being dragged.
    NoChange,
    /// Released too far from the target.
    Dropped,
    Placed,
    Won,
}

/// Fragment-snap board.
///
/// At most one piece is dragged at a time; a piece counts as placed only when
/// it was explicitly released within the snap distance of its target. The win
/// condition is checked after every release.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FragmentBoard {
    pieces: Vec<Piece>,
    snap_distance: f32,
    dragging: Option<usize>,
    placed_count: usize,
    won: bool,
}

impl FragmentBoard {
    /// Creates a board from explicit `(target, start)` positions per piece.
    pub fn new(layout: &[(Point, Point)], snap_distance: f32) -> Self {
        let pieces = layout
            .iter()
            .map(|&(target, start)| Piece {
                target,
                position: start,
                placed: false,
            })
            .collect();
        Self {
            pieces,
            snap_distance,
            dragging: None,
            placed_count: 0,
            won: false,
        }
    }

    /// Creates a board with targets laid out on a row and start positions
    /// scattered below it, the way the painting minigame presents shards.
    pub fn for_difficulty(difficulty: Difficulty, seed: u64) -> Self {
        let config = FragmentConfig::for_difficulty(difficulty);
        let mut rng = SmallRng::seed_from_u64(seed);

        let spread = config.snap_distance * 4.0;
        let layout: Vec<(Point, Point)> = (0..config.pieces)
            .map(|index| {
                let target = (index as f32 * spread, 0.0);
                let start = (
                    rng.random_range(0.0..spread * config.pieces as f32),
                    rng.random_range(spread..spread * 3.0),
                );
                (target, start)
            })
            .collect();

        Self::new(&layout, config.snap_distance)
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.len()
    }

    pub fn placed_count(&self) -> usize {
        self.placed_count
    }

    pub fn piece(&self, index: usize) -> Option<&Piece> {
        self.pieces.get(index)
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn snap_distance(&self) -> f32 {
        self.snap_distance
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    fn check_not_won(&self) -> Result<()> {
        if self.won {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    /// Starts dragging a piece. Grabbing a placed piece un-places it and
    /// decrements the placed counter; the global drag lock rejects a second
    /// grab while one piece is held.
    pub fn grab(&mut self, index: usize) -> Result<GrabOutcome> {
        use GrabOutcome::*;

        self.check_not_won()?;
        if index >= self.pieces.len() {
            return Err(GameError::InvalidPiece);
        }
        if self.dragging.is_some() {
            return Ok(NoChange);
        }

        self.dragging = Some(index);
        if self.pieces[index].placed {
            self.pieces[index].placed = false;
            self.placed_count -= 1;
            Ok(Unplaced)
        } else {
            Ok(Grabbed)
        }
    }

    /// Moves the dragged piece. A no-op when nothing is held.
    pub fn drag_to(&mut self, position: Point) {
        if let Some(index) = self.dragging {
            self.pieces[index].position = position;
        }
    }

    /// Releases the dragged piece at `position`. Within the snap distance of
    /// its target the piece snaps onto it and counts as placed.
    pub fn release(&mut self, position: Point) -> Result<ReleaseOutcome> {
        use ReleaseOutcome::*;

        self.check_not_won()?;
        let Some(index) = self.dragging.take() else {
            return Ok(NoChange);
        };

        let piece = &mut self.pieces[index];
        if distance(position, piece.target) <= self.snap_distance {
            piece.position = piece.target;
            piece.placed = true;
            self.placed_count += 1;
            if self.placed_count == self.pieces.len() {
                self.won = true;
                Ok(Won)
            } else {
                Ok(Placed)
            }
        } else {
            piece.position = position;
            Ok(Dropped)
        }
    }
}
