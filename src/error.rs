use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// Failures surfaced by the game engine. None of them are fatal: the caller
/// reports them and carries on with the state it already has.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid guess: {reason}")]
    InvalidGuess { reason: String },

    #[error("Day {day_index} has already been recorded")]
    AlreadyRecorded { day_index: i64 },

    #[error("Session cannot be recorded: {0}")]
    NotRecordable(String),

    #[error("Corrupt persisted state: {0}")]
    CorruptPersistedState(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl GameError {
    pub fn invalid_guess(reason: impl Into<String>) -> Self {
        GameError::InvalidGuess {
            reason: reason.into(),
        }
    }
}
