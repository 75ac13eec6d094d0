use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Key count, round count and playback scaling for a difficulty tier.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Number of distinct keys the player can press.
    pub keys: u8,
    /// Rounds to complete before the game is won.
    pub rounds: u8,
    /// Per-round playback pitch increase, cosmetic only.
    pub pitch_step: f32,
}

const SEQUENCE_TIERS: [SequenceConfig; 5] = [
    SequenceConfig { keys: 3, rounds: 3, pitch_step: 0.02 },
    SequenceConfig { keys: 4, rounds: 4, pitch_step: 0.03 },
    SequenceConfig { keys: 4, rounds: 5, pitch_step: 0.04 },
    SequenceConfig { keys: 5, rounds: 6, pitch_step: 0.05 },
    SequenceConfig { keys: 6, rounds: 7, pitch_step: 0.06 },
];

impl SequenceConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        SEQUENCE_TIERS[difficulty.table_index()]
    }
}

/// Outcome of one key press.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PressOutcome {
    /// Correct key, sequence not finished yet.
    Matched,
    /// Wrong key; input restarts from the beginning of the same round.
    Mismatch,
    /// Whole sequence reproduced; a new longer round has started.
    RoundComplete,
    /// Final round reproduced.
    Won,
}

impl PressOutcome {
    pub const fn advances_round(self) -> bool {
        matches!(self, Self::RoundComplete | Self::Won)
    }
}

/// Sequence-memory game.
///
/// Each round appends one random key to the target sequence, then the player
/// must reproduce the entire sequence from the start. A mismatch restarts
/// input collection for the same round; it never advances.
#[derive(Clone, Debug)]
pub struct SequenceGame {
    config: SequenceConfig,
    target: Vec<u8>,
    cursor: usize,
    won: bool,
    rng: SmallRng,
}

impl SequenceGame {
    pub fn new(config: SequenceConfig, seed: u64) -> Self {
        let mut game = Self {
            config,
            target: Vec::with_capacity(config.rounds.into()),
            cursor: 0,
            won: false,
            rng: SmallRng::seed_from_u64(seed),
        };
        game.extend_target();
        game
    }

    pub fn for_difficulty(difficulty: Difficulty, seed: u64) -> Self {
        Self::new(SequenceConfig::for_difficulty(difficulty), seed)
    }

    pub fn config(&self) -> SequenceConfig {
        self.config
    }

    /// Current round, starting at 1. The round equals the target length.
    pub fn round(&self) -> u8 {
        self.target.len() as u8
    }

    /// The sequence the player must reproduce, for playback by the UI.
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Position of the next expected key within the target.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Playback pitch for the key at `position`, scaling with the round
    /// number. Cosmetic only; has no effect on matching.
    pub fn playback_pitch(&self, position: usize) -> f32 {
        1.0 + self.config.pitch_step * (self.round() as f32 - 1.0 + position as f32 * 0.1)
    }

    /// Handles one key press, comparing it prefix-wise against the target.
    pub fn press(&mut self, key: u8) -> Result<PressOutcome> {
        use PressOutcome::*;

        if self.won {
            return Err(GameError::AlreadyEnded);
        }
        if key >= self.config.keys {
            return Err(GameError::InvalidKey);
        }

        if self.target[self.cursor] != key {
            self.cursor = 0;
            return Ok(Mismatch);
        }

        self.cursor += 1;
        if self.cursor < self.target.len() {
            return Ok(Matched);
        }

        // Full sequence reproduced.
        if self.round() >= self.config.rounds {
            self.won = true;
            Ok(Won)
        } else {
            self.extend_target();
            Ok(RoundComplete)
        }
    }

    fn extend_target(&mut self) {
        let key = self.rng.random_range(0..self.config.keys);
        self.target.push(key);
        self.cursor = 0;
    }
}
