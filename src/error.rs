use thiserror::Error;

/// Errors surfaced by the typed API.
///
/// None of these are fatal to a running wheel: the component keeps its prior
/// state and hosts are free to ignore them.
#[derive(Debug, Error)]
pub enum WheelError {
    #[error("Shift value '{raw}' is not a number")]
    InvalidShift { raw: String },

    #[error("Shift {0} is outside 0..=25")]
    ShiftOutOfRange(i64),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Wheel is not mounted")]
    NotMounted,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
