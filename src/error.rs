use thiserror::Error;

/// Errors raised by the simulation core and its adapters.
#[derive(Debug, Error)]
pub enum SimError {
    /// No worker pool could be created for the requested backend.
    #[error("compute backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("malformed body record on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("body capacity exceeded: capacity {capacity}, requested {requested}")]
    CapacityExceeded { capacity: usize, requested: usize },

    #[error("kernel output committed without a pending upload")]
    KernelNotUploaded,

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
