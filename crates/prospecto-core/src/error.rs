use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("phone prefix must contain only digits")]
    InvalidPrefix,
    #[error("option id cannot be empty")]
    EmptyOptionId,
    #[error("duplicate option id: {0}")]
    DuplicateOptionId(String),
}
