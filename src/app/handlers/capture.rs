// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles the shutter button and capture completion.

use crate::app::App;
use crate::backends::camera::{CameraService, CaptureOutcome, CaptureRequest};
use crate::constants::toast;
use crate::errors::CaptureError;
use crate::storage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

impl<C: CameraService> App<C> {
    // =========================================================================
    // Capture Operations Handlers
    // =========================================================================

    /// Reserve the next file name and ask the camera to capture into it
    pub(crate) fn handle_capture(&mut self) {
        if let Err(e) = self.try_capture() {
            match e {
                CaptureError::AlreadyCapturing => {
                    debug!("Capture trigger ignored, capture pending");
                }
                e => {
                    error!(error = %e, "Capture not started");
                    self.state
                        .show_toast(format!("Capture failed: {}", e), toast::MEDIUM);
                }
            }
        }
    }

    fn try_capture(&mut self) -> Result<(), CaptureError> {
        if self.state.capture.is_capturing() {
            return Err(CaptureError::AlreadyCapturing);
        }

        let format = self.state.config.capture_format;
        let path = storage::reserve_capture_path(&self.state.config.image_folder, format.extension())?;
        self.state.capture.begin(path.clone(), Instant::now())?;

        info!(path = %path.display(), format = %format, "Capturing photo...");
        let request = CaptureRequest {
            path: path.clone(),
            format,
        };
        if let Err(e) = self.camera.capture_to_file(request, self.capture_tx.clone()) {
            self.state.capture.finish(&path);
            storage::release_reservation(&path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Re-enable the trigger and report the result of a capture
    pub(crate) fn handle_capture_finished(&mut self, outcome: CaptureOutcome) {
        let Some(path) = self.state.capture.finish(&outcome.path) else {
            warn!(path = %outcome.path.display(), "Ignoring completion for unknown capture");
            return;
        };

        match outcome.result {
            Ok(()) => {
                let name = file_name(&path);
                info!(path = %path.display(), "Photo saved");
                self.state
                    .show_toast(format!("Photo saved as: {}", name), toast::MEDIUM);
                self.state.last_capture = Some(path);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Capture failed");
                storage::release_reservation(&path);
                self.state
                    .show_toast(format!("Capture failed: {}", e), toast::MEDIUM);
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
