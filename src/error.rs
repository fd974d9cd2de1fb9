use thiserror::Error;

/// Reasons a session configuration is rejected at `start_session`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("difficulty must be between 1 and 5, got {0}")]
    DifficultyOutOfRange(u8),
    #[error("time limit must be positive")]
    NonPositiveTimeLimit,
    #[error("question limit must be positive")]
    NonPositiveQuestionLimit,
    #[error("speed mode needs a time limit")]
    MissingTimeLimit,
    #[error("testing mode needs a question limit")]
    MissingQuestionLimit,
    #[error("unknown reveal policy `{0}`, expected points[:N], time[:N], limit[:N] or off")]
    InvalidRevealPolicy(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv file has no `{0}` column")]
    MissingColumn(&'static str),
    #[error("invalid session configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no active session")]
    NoSession,
}

pub type Result<T> = std::result::Result<T, Error>;
