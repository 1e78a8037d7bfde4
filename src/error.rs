use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{field} must be >= 0, got {value}")]
    NegativeUnits { field: &'static str, value: f64 },

    #[error("Unknown press mode code: {0}")]
    UnknownPressMode(u8),

    #[error("Wager {wager} is not playable in {game}")]
    WagerMismatch { wager: String, game: String },

    #[error("Invalid tier table: {0}")]
    InvalidTierTable(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("State invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
