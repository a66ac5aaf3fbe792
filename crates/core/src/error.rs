use exprscope_api::HostError;
use thiserror::Error;

/// Fault categories shared by parse errors and the user-facing error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input does not match any grammar alternative
    Syntax,
    /// Well-formed input that names no suitable member, type or overload
    Semantic,
    /// Host code or an operator failed while computing a value
    Evaluation,
    /// Violated engine invariant; never recovered
    Internal,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("Semantic error at position {position}: {message}")]
    Semantic { position: usize, message: String },
    #[error("Evaluation error at position {position}: {message}")]
    Evaluation {
        position: usize,
        message: String,
        #[source]
        source: Option<HostError>,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Syntax { .. } => ErrorKind::Syntax,
            EngineError::Semantic { .. } => ErrorKind::Semantic,
            EngineError::Evaluation { .. } => ErrorKind::Evaluation,
            EngineError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            EngineError::Syntax { position, .. }
            | EngineError::Semantic { position, .. }
            | EngineError::Evaluation { position, .. } => Some(*position),
            EngineError::Internal(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
