use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid piece index")]
    InvalidPiece,
    #[error("Invalid key index")]
    InvalidKey,
    #[error("Minigame already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Minigame has not been set up yet")]
    NotReady,
    #[error("A minigame session is already active")]
    SessionActive,
    #[error("No minigame session is active")]
    NoSession,
    #[error("Minigame type None cannot be started")]
    NoMinigame,
    #[error("No minigame registered for the requested type")]
    UnknownMinigame,
    #[error("Progress file could not be written")]
    Persistence,
}

pub type Result<T> = core::result::Result<T, GameError>;
