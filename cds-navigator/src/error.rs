use thiserror::Error;

/// Errors raised while setting up a navigator
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, NavigatorError>;
