// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
