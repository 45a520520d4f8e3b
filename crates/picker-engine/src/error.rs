//! Error types for picker-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    /// A block rule could not be ingested. `index` is the position of the raw
    /// block in the caller's list.
    #[error("Invalid block rule at index {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The UI asked to pick something that is not selectable.
    #[error("Invalid pick: {0}")]
    InvalidPick(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PickerError>;
