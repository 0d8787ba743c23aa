//! Error types for Drishti

use thiserror::Error;

/// Drishti error type
#[derive(Error, Debug)]
pub enum DrishtiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Actuator error: {0}")]
    Actuator(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<toml::de::Error> for DrishtiError {
    fn from(e: toml::de::Error) -> Self {
        DrishtiError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DrishtiError>;
