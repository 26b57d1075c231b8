// SPDX-License-Identifier: MPL-2.0

//! Main application module for FotoPi
//!
//! This module contains the application state, message handling and the
//! business logic of the kiosk. Rendering lives in [`crate::terminal`].
//!
//! # Architecture
//!
//! - `state`: Application state types (AppState, CaptureState, Panel, Message)
//! - `settings`: Camera settings and their conversion to controls
//! - `update`: Message dispatch
//! - `handlers`: Message handlers grouped by domain
//!
//! # Main Types
//!
//! - `App`: Application state plus the camera it drives
//! - `Message`: All possible user interactions and system events

mod handlers;
pub mod settings;
mod state;
mod update;

use crate::backends::camera::{
    BackendResult, CameraConfig, CameraService, CaptureSender, Control,
};
use crate::config::Config;
use crate::storage;
use std::path::PathBuf;
use tracing::{info, warn};

pub use settings::{CameraSettings, ColorSlider, InvalidShutter, ShutterSpeed};
pub use state::{AppState, CaptureState, Message, OptionsRow, Panel, SettingsRow, Toast};

/// Command run by "Shutdown System"
const SHUTDOWN_COMMAND: [&str; 3] = ["sudo", "shutdown", "now"];

/// The kiosk application: state plus the camera service it drives
pub struct App<C: CameraService> {
    pub(crate) state: AppState,
    pub(crate) camera: C,
    /// Completion channel handed to every capture request
    pub(crate) capture_tx: CaptureSender,
    /// Where preference changes are saved; `None` keeps them in memory
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) shutdown_command: Vec<String>,
}

impl<C: CameraService> App<C> {
    pub fn new(config: Config, camera: C, capture_tx: CaptureSender) -> Self {
        Self {
            state: AppState::new(config),
            camera,
            capture_tx,
            config_path: None,
            shutdown_command: SHUTDOWN_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Persist preference changes to `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Replace the power-off command
    pub fn with_shutdown_command(mut self, command: Vec<String>) -> Self {
        self.shutdown_command = command;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Bring the camera up with the current settings
    ///
    /// Failure is reported in a toast and returned; the UI keeps running so
    /// the gallery and options stay usable.
    pub fn start(&mut self) -> BackendResult<()> {
        if let Err(e) = storage::ensure_directory(&self.state.config.image_folder) {
            warn!(error = %e, "Image folder unavailable");
        }

        let result = self.start_camera();
        match &result {
            Ok(()) => {
                info!("Camera started");
                self.state.camera_ready = true;
            }
            Err(e) => {
                warn!(error = %e, "Camera failed to start");
                self.state.camera_ready = false;
                self.state.show_toast(
                    format!("Camera unavailable: {}", e),
                    crate::constants::toast::LONG,
                );
            }
        }
        result
    }

    fn start_camera(&mut self) -> BackendResult<()> {
        let config = CameraConfig {
            preview_enabled: self.state.config.preview,
            ..CameraConfig::default()
        };
        self.camera.configure(&config)?;
        self.camera.set_controls(&self.state.settings.all_controls())?;
        self.camera.start()
    }

    /// Stop the camera; errors are logged
    pub fn stop(&mut self) {
        if let Err(e) = self.camera.stop() {
            warn!(error = %e, "Failed to stop camera");
        }
        self.state.camera_ready = false;
    }

    /// Send controls to the camera
    ///
    /// Failures are logged and otherwise ignored; the local setting has
    /// already changed by then.
    pub(crate) fn apply_controls(&mut self, controls: &[Control]) -> bool {
        match self.camera.set_controls(controls) {
            Ok(()) => true,
            Err(e) => {
                let names: Vec<&str> = controls.iter().map(|c| c.name()).collect();
                warn!(controls = ?names, error = %e, "Failed to set camera controls");
                false
            }
        }
    }

    /// Save preferences if a config path is set
    pub(crate) fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.state.config.save_to(path) {
            warn!(path = %path.display(), error = %e, "Failed to save preferences");
        }
    }
}
