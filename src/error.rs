//! Error types shared by the toggle controller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid settings, rejected before the controller starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A pen or touchscreen device could not be resolved.
    #[error("{what} not found. Available devices:\n{}", .available.join("\n"))]
    DeviceNotFound {
        what: String,
        available: Vec<String>,
    },

    /// Opening, grabbing or reading an input device was refused.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Classify an I/O error raised while talking to an input device.
    pub fn from_device_io(context: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Error::PermissionDenied(format!("{}: {}", context, err))
            }
            _ => Error::Unexpected(format!("{}: {}", context, err)),
        }
    }
}
