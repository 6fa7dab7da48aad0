use thiserror::Error;

/// Errors reported by the engine and its front-ends.
#[derive(Debug, Error)]
pub enum MazeError {
    /// Invalid dimensions or endpoints. The grid is left untouched.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// An operation was requested in a state that does not allow it.
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("unknown generator '{0}'")]
    UnknownGenerator(String),
    #[error("unknown render mode '{0}'")]
    UnknownRenderMode(String),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
