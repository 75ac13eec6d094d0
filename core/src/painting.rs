use serde::{Deserialize, Serialize};

use crate::*;

/// Logical painting lifecycle.
///
/// Possible transitions:
/// - Available -> InProgress (interact)
/// - InProgress -> Completed (Win, one-shot painting)
/// - InProgress -> Available (Lose, Cancel, or Win on a replayable painting)
/// - Completed -> Available (explicit debug/test reset only)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PaintingState {
    Available,
    InProgress,
    Completed,
}

impl PaintingState {
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Default for PaintingState {
    fn default() -> Self {
        Self::Available
    }
}

/// Camera phase while entering or leaving a painting. Purely presentational:
/// both zooming phases collapse to `InProgress` for every logical contract.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZoomPhase {
    Idle,
    ZoomingIn,
    ZoomingOut,
}

impl Default for ZoomPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Static configuration of one painting in the gallery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaintingConfig {
    pub id: String,
    pub minigame: MinigameType,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Whether a Win locks the painting to Completed permanently.
    #[serde(default = "default_one_shot")]
    pub one_shot: bool,
    #[serde(default)]
    pub params: Params,
}

const fn default_one_shot() -> bool {
    true
}

/// Outcome of an interaction attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractOutcome {
    Started,
    /// The painting was not available; nothing changed.
    Blocked { reason: String },
}

/// Outcome of applying a session result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ApplyOutcome {
    /// Win on a one-shot painting; persisted as completed.
    Completed,
    /// Back to Available and retryable.
    Available,
    /// The painting was not in progress; nothing changed.
    Ignored,
}

/// A world object that launches its configured minigame on interaction and
/// persists completion through the progress store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Painting {
    config: PaintingConfig,
    state: PaintingState,
    #[serde(default)]
    zoom: ZoomPhase,
}

impl Painting {
    pub fn new(config: PaintingConfig) -> Self {
        Self {
            config,
            state: PaintingState::Available,
            zoom: ZoomPhase::Idle,
        }
    }

    /// Creates the painting with its initial state derived from the progress
    /// store: already-completed paintings load directly as Completed.
    pub fn from_progress(config: PaintingConfig, store: &ProgressStore) -> Self {
        let mut painting = Self::new(config);
        if store.is_completed(&painting.config.id) {
            painting.state = PaintingState::Completed;
        }
        painting
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &PaintingConfig {
        &self.config
    }

    pub fn state(&self) -> PaintingState {
        self.state
    }

    /// Camera phase for the presentation layer; no logical meaning.
    pub fn zoom(&self) -> ZoomPhase {
        self.zoom
    }

    /// Called by the presentation layer when a camera interpolation ends.
    pub fn zoom_finished(&mut self) {
        self.zoom = ZoomPhase::Idle;
    }

    /// Player interaction: asks the manager to start this painting's
    /// minigame. A no-op with a reason when the painting is not available.
    pub fn interact(
        &mut self,
        manager: &mut MinigameManager,
        on_result: ResultCallback,
    ) -> Result<InteractOutcome> {
        if !self.state.is_available() {
            let reason = match self.state {
                PaintingState::Completed => "painting is already completed",
                _ => "painting is busy",
            };
            log::warn!("Interaction with {} blocked: {reason}", self.config.id);
            return Ok(InteractOutcome::Blocked {
                reason: reason.into(),
            });
        }

        manager.start(
            self.config.minigame,
            &self.config.id,
            self.config.difficulty,
            &self.config.params,
            on_result,
        )?;

        self.state = PaintingState::InProgress;
        self.zoom = ZoomPhase::ZoomingIn;
        Ok(InteractOutcome::Started)
    }

    /// Applies the session result reported for this painting.
    ///
    /// Win on a one-shot painting completes it and persists the completion;
    /// every other result returns it to Available. Cancel carries no penalty
    /// and no persistence.
    pub fn apply_result(
        &mut self,
        result: MinigameResult,
        store: &mut ProgressStore,
    ) -> ApplyOutcome {
        use ApplyOutcome::*;

        if !self.state.is_in_progress() {
            log::warn!(
                "Result {result:?} for {} ignored: painting is not in progress",
                self.config.id
            );
            return Ignored;
        }

        self.zoom = ZoomPhase::ZoomingOut;
        if result.is_win() && self.config.one_shot {
            self.state = PaintingState::Completed;
            store.mark_completed(&self.config.id);
            Completed
        } else {
            self.state = PaintingState::Available;
            Available
        }
    }

    /// Debug/test escape hatch: unlocks a completed painting.
    pub fn reset(&mut self) {
        self.state = PaintingState::Available;
        self.zoom = ZoomPhase::Idle;
    }
}
