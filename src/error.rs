//! Error types for the overlay.
//!
//! Drawing has no failure modes; everything here comes from the edges of the
//! program: config files, the camera, the detector process and SDL.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Detector protocol error: {0}")]
    Protocol(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// SDL reports failures as plain strings.
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Window(message)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: &str) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
