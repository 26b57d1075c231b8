// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Output encoding of a still capture
///
/// Serialized as the file extension so the preference file reads the same
/// way the format is shown in the options panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureFormat {
    #[default]
    #[serde(rename = ".jpg")]
    Jpeg,
    #[serde(rename = ".png")]
    Png,
    /// Raw sensor data (DNG)
    #[serde(rename = ".dng")]
    Dng,
}

impl CaptureFormat {
    /// All formats in options-panel order
    pub const ALL: [CaptureFormat; 3] = [CaptureFormat::Jpeg, CaptureFormat::Png, CaptureFormat::Dng];

    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Jpeg => ".jpg",
            CaptureFormat::Png => ".png",
            CaptureFormat::Dng => ".dng",
        }
    }

    /// Parse a user-supplied extension (`jpg`, `.PNG`, `jpeg`, ...)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(CaptureFormat::Jpeg),
            "png" => Some(CaptureFormat::Png),
            "dng" => Some(CaptureFormat::Dng),
            _ => None,
        }
    }

    /// Whether the capture bypasses the ISP encoder
    pub fn is_raw(&self) -> bool {
        matches!(self, CaptureFormat::Dng)
    }

    /// Format after this one, wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Auto white balance mode
///
/// The discriminant is the control index the camera stack expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AwbMode {
    #[default]
    Auto = 0,
    Incandescent = 1,
    Tungsten = 2,
    Fluorescent = 3,
    Indoor = 4,
    Daylight = 5,
    Cloudy = 6,
}

impl AwbMode {
    /// All modes in dropdown order
    pub const ALL: [AwbMode; 7] = [
        AwbMode::Auto,
        AwbMode::Incandescent,
        AwbMode::Tungsten,
        AwbMode::Fluorescent,
        AwbMode::Indoor,
        AwbMode::Daylight,
        AwbMode::Cloudy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get display name for UI
    pub fn display_name(self) -> &'static str {
        match self {
            AwbMode::Auto => "Auto",
            AwbMode::Incandescent => "Incandescent",
            AwbMode::Tungsten => "Tungsten",
            AwbMode::Fluorescent => "Fluorescent",
            AwbMode::Indoor => "Indoor",
            AwbMode::Daylight => "Daylight",
            AwbMode::Cloudy => "Cloudy",
        }
    }

    /// Name accepted by `rpicam-* --awb`
    pub fn rpicam_name(self) -> &'static str {
        match self {
            AwbMode::Auto => "auto",
            AwbMode::Incandescent => "incandescent",
            AwbMode::Tungsten => "tungsten",
            AwbMode::Fluorescent => "fluorescent",
            AwbMode::Indoor => "indoor",
            AwbMode::Daylight => "daylight",
            AwbMode::Cloudy => "cloudy",
        }
    }
}

/// A single camera control and its value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Automatic exposure/gain on or off
    AeEnable(bool),
    /// Sensor analogue gain (ISO / 100)
    AnalogueGain(f32),
    /// Exposure time in microseconds
    ExposureTime(u32),
    Saturation(f32),
    Contrast(f32),
    Sharpness(f32),
    /// Brightness offset, 0.0 is neutral
    Brightness(f32),
    AwbMode(AwbMode),
}

impl Control {
    /// Control name as the camera stack spells it
    pub fn name(&self) -> &'static str {
        match self {
            Control::AeEnable(_) => "AeEnable",
            Control::AnalogueGain(_) => "AnalogueGain",
            Control::ExposureTime(_) => "ExposureTime",
            Control::Saturation(_) => "Saturation",
            Control::Contrast(_) => "Contrast",
            Control::Sharpness(_) => "Sharpness",
            Control::Brightness(_) => "Brightness",
            Control::AwbMode(_) => "AwbMode",
        }
    }

    /// Reject values no camera stack accepts
    pub fn validate(&self) -> BackendResult<()> {
        let invalid = |reason: &str| {
            Err(BackendError::InvalidControl(format!(
                "{}: {}",
                self.name(),
                reason
            )))
        };

        match *self {
            Control::AnalogueGain(gain) if !gain.is_finite() || gain <= 0.0 => {
                invalid("gain must be a positive number")
            }
            Control::ExposureTime(0) => invalid("exposure time must be non-zero"),
            Control::Saturation(v) | Control::Contrast(v) | Control::Sharpness(v)
                if !v.is_finite() || v < 0.0 =>
            {
                invalid("value must be a non-negative number")
            }
            Control::Brightness(v) if !v.is_finite() || !(-1.0..=1.0).contains(&v) => {
                invalid("brightness must be within -1.0..=1.0")
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::AeEnable(v) => write!(f, "{}={}", self.name(), v),
            Control::AnalogueGain(v)
            | Control::Saturation(v)
            | Control::Contrast(v)
            | Control::Sharpness(v)
            | Control::Brightness(v) => write!(f, "{}={:.2}", self.name(), v),
            Control::ExposureTime(v) => write!(f, "{}={}", self.name(), v),
            Control::AwbMode(mode) => write!(f, "{}={}", self.name(), mode.index()),
        }
    }
}

/// Stream configuration applied before the camera starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConfig {
    pub preview_width: u32,
    pub preview_height: u32,
    /// Whether a live preview window is shown on the display
    pub preview_enabled: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            preview_width: crate::constants::camera::PREVIEW_WIDTH,
            preview_height: crate::constants::camera::PREVIEW_HEIGHT,
            preview_enabled: true,
        }
    }
}

/// A still capture to be written to `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub path: PathBuf,
    pub format: CaptureFormat,
}

/// Completion notification for one capture request
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// Target path of the request this outcome answers
    pub path: PathBuf,
    pub result: BackendResult<()>,
}

impl CaptureOutcome {
    pub fn success(path: PathBuf) -> Self {
        Self { path, result: Ok(()) }
    }

    pub fn failure(path: PathBuf, error: BackendError) -> Self {
        Self {
            path,
            result: Err(error),
        }
    }
}

/// Channel half the camera service reports completions on
pub type CaptureSender = tokio::sync::mpsc::UnboundedSender<CaptureOutcome>;

/// Channel half the UI loop drains completions from
pub type CaptureReceiver = tokio::sync::mpsc::UnboundedReceiver<CaptureOutcome>;

/// Create a completion channel pair
pub fn capture_channel() -> (CaptureSender, CaptureReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Result type for camera service operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Camera service errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The camera tools are not installed or no camera is attached
    NotAvailable(String),
    /// Starting the camera failed
    InitializationFailed(String),
    /// A control value was rejected
    InvalidControl(String),
    /// The capture process failed
    CaptureFailed(String),
    /// The capture did not finish in time
    Timeout(u64),
    /// I/O error
    IoError(String),
    /// Other error
    Other(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Camera not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::InvalidControl(msg) => write!(f, "Invalid control: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            BackendError::Timeout(secs) => write!(f, "Capture timed out after {}s", secs),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}
