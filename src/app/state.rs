// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::settings::{CameraSettings, ColorSlider};
use crate::backends::camera::{AwbMode, CaptureFormat, CaptureOutcome};
use crate::config::Config;
use crate::errors::CaptureError;
use crate::gallery::{GalleryPage, GalleryState};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Capture state machine
///
/// Single slot: at most one capture is outstanding. The trigger is disabled
/// while `Capturing` and re-enabled only by the completion for the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureState {
    /// Ready to capture
    #[default]
    Idle,
    /// Waiting for the camera service to report completion
    Capturing {
        /// Target file of the pending capture
        path: PathBuf,
        /// When the capture was issued
        started_at: Instant,
    },
}

impl CaptureState {
    /// Check if a capture is pending
    pub fn is_capturing(&self) -> bool {
        matches!(self, CaptureState::Capturing { .. })
    }

    /// Target path of the pending capture
    pub fn pending_path(&self) -> Option<&Path> {
        match self {
            CaptureState::Idle => None,
            CaptureState::Capturing { path, .. } => Some(path),
        }
    }

    /// Time since the pending capture was issued
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match self {
            CaptureState::Idle => None,
            CaptureState::Capturing { started_at, .. } => {
                Some(now.saturating_duration_since(*started_at))
            }
        }
    }

    /// Enter `Capturing` for `path`
    pub fn begin(&mut self, path: PathBuf, now: Instant) -> Result<(), CaptureError> {
        if self.is_capturing() {
            return Err(CaptureError::AlreadyCapturing);
        }
        *self = CaptureState::Capturing {
            path,
            started_at: now,
        };
        Ok(())
    }

    /// Leave `Capturing` if `path` is the pending capture
    ///
    /// Returns the finished path, or `None` (state untouched) when the
    /// completion belongs to some other capture.
    pub fn finish(&mut self, path: &Path) -> Option<PathBuf> {
        if self.pending_path() != Some(path) {
            return None;
        }
        match std::mem::take(self) {
            CaptureState::Capturing { path, .. } => Some(path),
            CaptureState::Idle => None,
        }
    }
}

/// Rows of the camera settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Slider(ColorSlider),
    Awb,
    Reset,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 6] = [
        SettingsRow::Slider(ColorSlider::Saturation),
        SettingsRow::Slider(ColorSlider::Contrast),
        SettingsRow::Slider(ColorSlider::Sharpness),
        SettingsRow::Slider(ColorSlider::Brightness),
        SettingsRow::Awb,
        SettingsRow::Reset,
    ];
}

/// Rows of the options panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsRow {
    ImageFolder,
    CaptureFormat,
    GridOverlay,
    Shutdown,
}

impl OptionsRow {
    pub const ALL: [OptionsRow; 4] = [
        OptionsRow::ImageFolder,
        OptionsRow::CaptureFormat,
        OptionsRow::GridOverlay,
        OptionsRow::Shutdown,
    ];
}

/// Overlay shown above the preview
///
/// Only one is open at a time; opening another replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Panel {
    #[default]
    None,
    IsoMenu {
        selected: usize,
    },
    ShutterMenu {
        selected: usize,
    },
    CustomShutter {
        input: String,
    },
    Settings {
        selected: usize,
    },
    Gallery {
        state: GalleryState,
        /// Page as listed at the last navigation event
        page: GalleryPage,
    },
    Options {
        selected: usize,
        /// Folder path being typed, when editing the image folder
        folder_input: Option<String>,
    },
}

impl Panel {
    pub fn is_open(&self) -> bool {
        !matches!(self, Panel::None)
    }

    /// Number of selectable rows, for list-style panels
    pub fn row_count(&self) -> usize {
        use crate::constants::exposure::{ISO_VALUES, SHUTTER_SPEEDS};
        match self {
            Panel::IsoMenu { .. } => ISO_VALUES.len(),
            Panel::ShutterMenu { .. } => SHUTTER_SPEEDS.len(),
            Panel::Settings { .. } => SettingsRow::ALL.len(),
            Panel::Options { .. } => OptionsRow::ALL.len(),
            _ => 0,
        }
    }

    /// Selected row of a list-style panel
    pub fn selected(&self) -> Option<usize> {
        match self {
            Panel::IsoMenu { selected }
            | Panel::ShutterMenu { selected }
            | Panel::Settings { selected }
            | Panel::Options { selected, .. } => Some(*selected),
            _ => None,
        }
    }

    fn selected_mut(&mut self) -> Option<&mut usize> {
        match self {
            Panel::IsoMenu { selected }
            | Panel::ShutterMenu { selected }
            | Panel::Settings { selected }
            | Panel::Options { selected, .. } => Some(selected),
            _ => None,
        }
    }

    /// Move the selection by `delta` rows, wrapping around
    pub fn move_selection(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        if let Some(selected) = self.selected_mut() {
            let count = count as isize;
            *selected = ((*selected as isize + delta).rem_euclid(count)) as usize;
        }
    }
}

/// Transient message at the bottom of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, duration: Duration, now: Instant) -> Self {
        Self {
            message: message.into(),
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Everything the UI shows
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub settings: CameraSettings,
    pub capture: CaptureState,
    pub panel: Panel,
    pub toast: Option<Toast>,
    /// Most recent successful capture, shown in the preview area
    pub last_capture: Option<PathBuf>,
    /// Camera started successfully
    pub camera_ready: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            settings: CameraSettings::default(),
            capture: CaptureState::Idle,
            panel: Panel::None,
            toast: None,
            last_capture: None,
            camera_ready: false,
            should_quit: false,
        }
    }

    /// Whether the capture trigger is enabled
    pub fn can_capture(&self) -> bool {
        !self.capture.is_capturing()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, duration: Duration) {
        self.toast = Some(Toast::new(message, duration, Instant::now()));
    }

    /// Drop the toast once it has expired
    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.is_expired(now)) {
            self.toast = None;
        }
    }

    /// Gallery navigation state, if the gallery is open
    pub fn gallery(&self) -> Option<(&GalleryState, &GalleryPage)> {
        match &self.panel {
            Panel::Gallery { state, page } => Some((state, page)),
            _ => None,
        }
    }
}

/// Messages handled by [`crate::app::App::update`]
///
/// Grouped by handler:
/// - **Capture**: trigger and completion
/// - **Exposure**: ISO and shutter menus, custom shutter entry
/// - **Color**: sliders, white balance, reset
/// - **System**: gallery, options, shutdown, housekeeping
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Capture =====
    /// Capture a photo with the current settings
    Capture,
    /// The camera service finished a capture
    CaptureFinished(CaptureOutcome),

    // ===== Exposure =====
    OpenIsoMenu,
    /// Set manual exposure at this ISO
    SelectIso(u32),
    OpenShutterMenu,
    /// Set a preset shutter speed by label (e.g. `1/125`)
    SelectShutter(String),
    OpenCustomShutter,
    CustomShutterInput(char),
    CustomShutterBackspace,
    /// Parse the typed seconds and apply them
    ApplyCustomShutter,
    CancelCustomShutter,

    // ===== Color =====
    OpenSettings,
    /// Slider positions; values are position / 100
    SetSaturation(i32),
    SetContrast(i32),
    SetSharpness(i32),
    SetBrightness(i32),
    SetAwbMode(AwbMode),
    /// Neutral colour settings and automatic white balance
    ResetSettings,

    // ===== Gallery =====
    OpenGallery,
    GalleryNext,
    GalleryPrevious,
    /// Show the image at this position on the current page full screen
    GalleryOpen(usize),
    /// Leave the full-screen view, or close the gallery from the grid
    GalleryBack,

    // ===== Options =====
    OpenOptions,
    /// Start typing a new image folder
    EditImageFolder,
    FolderInput(char),
    FolderBackspace,
    /// Stop typing without changing the folder
    CancelFolderEdit,
    SetImageFolder(PathBuf),
    SetCaptureFormat(CaptureFormat),
    ToggleGridOverlay,
    /// Power off the device
    ShutdownSystem,

    // ===== Navigation =====
    /// Move the selection in a list panel
    MoveSelection(isize),
    ClosePanel,
    /// Periodic housekeeping (toast expiry)
    Tick(Instant),
    Quit,
}
