use core::fmt;
use serde::{Deserialize, Serialize};

pub use error::*;
pub use fragments::*;
pub use manager::*;
pub use minigame::*;
pub use painting::*;
pub use progress::*;
pub use sequence::*;
pub use slide::*;
pub use types::*;

mod error;
mod fragments;
mod manager;
mod minigame;
mod painting;
mod progress;
mod sequence;
mod slide;
mod types;

/// Registry key for every minigame the manager can launch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinigameType {
    /// Placeholder for paintings with no minigame attached; never startable.
    None,
    /// Test-only adapter that resolves on command.
    Mock,
    SlidingPuzzle,
    SequenceMemory,
    FragmentSnap,
}

impl MinigameType {
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl Default for MinigameType {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for MinigameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Mock => "mock",
            Self::SlidingPuzzle => "sliding_puzzle",
            Self::SequenceMemory => "sequence_memory",
            Self::FragmentSnap => "fragment_snap",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of exactly one minigame run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinigameResult {
    Win,
    Lose,
    Cancel,
}

impl MinigameResult {
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Win)
    }
}

/// Difficulty tier, always within 1..=5.
///
/// Out-of-range input clamps to the nearest bound, so table lookups keyed by
/// tier never miss. Tier 3 is the default used when a painting does not
/// configure one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(5);

    pub fn new(tier: u8) -> Self {
        Self(tier.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub const fn tier(self) -> u8 {
        self.0
    }

    /// Zero-based index into the per-variant configuration tables.
    pub(crate) const fn table_index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(3)
    }
}

impl From<u8> for Difficulty {
    fn from(tier: u8) -> Self {
        Self::new(tier)
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}
