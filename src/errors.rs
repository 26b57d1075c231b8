// SPDX-License-Identifier: MPL-2.0

//! Error types for FotoPi

use crate::backends::camera::BackendError;
use std::fmt;
use std::path::PathBuf;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera service errors
    Camera(BackendError),
    /// Photo capture errors
    Capture(CaptureError),
    /// Configuration errors
    Config(ConfigError),
    /// Storage/filesystem errors
    Storage(StorageError),
    /// Generic error with message
    Other(String),
}

/// Filesystem errors raised while scanning or reserving capture files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The output directory could not be created
    CreateDirFailed { path: PathBuf, message: String },
    /// The output directory could not be listed
    ReadDirFailed { path: PathBuf, message: String },
    /// A placeholder for the next capture could not be created
    ReserveFailed { path: PathBuf, message: String },
}

/// Preference file errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No per-user configuration directory on this system
    NoConfigDir,
    /// Reading or writing the preference file failed
    Io(String),
    /// The preference file is not valid JSON for [`crate::Config`]
    Parse(String),
}

/// Capture flow errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// A capture is still pending; the trigger is disabled until it completes
    AlreadyCapturing,
    /// The target file name could not be reserved
    Storage(StorageError),
    /// The camera service refused the request
    Backend(BackendError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::CreateDirFailed { path, message } => {
                write!(f, "Cannot create {}: {}", path.display(), message)
            }
            StorageError::ReadDirFailed { path, message } => {
                write!(f, "Cannot list {}: {}", path.display(), message)
            }
            StorageError::ReserveFailed { path, message } => {
                write!(f, "Cannot reserve {}: {}", path.display(), message)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "No configuration directory available"),
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Invalid preferences: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::AlreadyCapturing => write!(f, "A capture is already in progress"),
            CaptureError::Storage(e) => write!(f, "{}", e),
            CaptureError::Backend(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for StorageError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CaptureError {}

// Conversions from sub-errors to AppError
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<StorageError> for CaptureError {
    fn from(err: StorageError) -> Self {
        CaptureError::Storage(err)
    }
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        CaptureError::Backend(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
