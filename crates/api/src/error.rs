/// A fault raised by host code while reading a field, invoking a method or
/// calling a lambda.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("{class}: {message}")]
    Exception { class: String, message: String },
    #[error("java.lang.NullPointerException: {0}")]
    NullPointer(String),
    #[error("java.lang.IllegalArgumentException: {0}")]
    IllegalArgument(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl HostError {
    pub fn exception(class: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Exception {
            class: class.into(),
            message: message.into(),
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;
