//! Serde data models for the externally visible file formats: the save-game
//! JSON and the dialogue definition documents consumed by the timeline
//! player. No game logic lives here.

use thiserror::Error;

pub use dialogue::*;
pub use save::*;

mod dialogue;
mod save;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = core::result::Result<T, FormatError>;
