// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Handles the gallery, the options panel, shutdown and housekeeping.

use crate::app::{App, Panel};
use crate::backends::camera::{CameraService, CaptureFormat};
use crate::constants::toast;
use crate::gallery::{self, GalleryPage, GalleryState};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{error, info, warn};

impl<C: CameraService> App<C> {
    // =========================================================================
    // Gallery Handlers
    // =========================================================================

    pub(crate) fn handle_open_gallery(&mut self) {
        self.show_gallery(GalleryState::opened());
    }

    pub(crate) fn handle_gallery_next(&mut self) {
        if let Some(state) = self.take_gallery_state() {
            self.show_gallery(state.next());
        }
    }

    pub(crate) fn handle_gallery_previous(&mut self) {
        if let Some(state) = self.take_gallery_state() {
            self.show_gallery(state.previous());
        }
    }

    /// Show the image at `position` on the current page full screen
    pub(crate) fn handle_gallery_open(&mut self, position: usize) {
        let Panel::Gallery { state, page } = &mut self.state.panel else {
            return;
        };
        match page.entry(position) {
            Some(entry) => {
                info!(path = %entry.path.display(), "Viewing image");
                *state = std::mem::take(state).view(entry.clone());
            }
            None => warn!(position, page = page.page_index, "No image at this position"),
        }
    }

    /// Full screen goes back to the grid; the grid closes the gallery
    pub(crate) fn handle_gallery_back(&mut self) {
        match &mut self.state.panel {
            Panel::Gallery { state, .. } if state.is_viewing() => {
                *state = std::mem::take(state).back_to_grid();
            }
            Panel::Gallery { .. } => self.state.panel = Panel::None,
            _ => {}
        }
    }

    fn take_gallery_state(&mut self) -> Option<GalleryState> {
        match &self.state.panel {
            Panel::Gallery { state, .. } => Some(state.clone()),
            _ => None,
        }
    }

    /// Re-list the image folder and show the page of `state`
    fn show_gallery(&mut self, state: GalleryState) {
        let dir = &self.state.config.image_folder;
        let page = match gallery::load_page(dir, state.page_index) {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "Failed to list gallery");
                self.state
                    .show_toast(format!("Cannot open gallery: {}", e), toast::MEDIUM);
                GalleryPage {
                    page_index: state.page_index,
                    entries: Vec::new(),
                    total: 0,
                }
            }
        };
        self.state.panel = Panel::Gallery { state, page };
    }

    // =========================================================================
    // Options Handlers
    // =========================================================================

    pub(crate) fn handle_open_options(&mut self) {
        self.state.panel = Panel::Options {
            selected: 0,
            folder_input: None,
        };
    }

    pub(crate) fn handle_edit_image_folder(&mut self) {
        if let Panel::Options { folder_input, .. } = &mut self.state.panel {
            *folder_input = Some(self.state.config.image_folder.display().to_string());
        }
    }

    pub(crate) fn handle_folder_input(&mut self, c: char) {
        if let Panel::Options {
            folder_input: Some(input),
            ..
        } = &mut self.state.panel
        {
            if !c.is_control() {
                input.push(c);
            }
        }
    }

    pub(crate) fn handle_folder_backspace(&mut self) {
        if let Panel::Options {
            folder_input: Some(input),
            ..
        } = &mut self.state.panel
        {
            input.pop();
        }
    }

    pub(crate) fn handle_cancel_folder_edit(&mut self) {
        if let Panel::Options { folder_input, .. } = &mut self.state.panel {
            *folder_input = None;
        }
    }

    pub(crate) fn handle_set_image_folder(&mut self, folder: PathBuf) {
        if let Panel::Options { folder_input, .. } = &mut self.state.panel {
            *folder_input = None;
        }
        if folder.as_os_str().is_empty() {
            warn!("Ignoring empty image folder");
            return;
        }

        info!(folder = %folder.display(), "Image folder changed");
        self.state
            .show_toast(format!("Folder changed to: {}", folder.display()), toast::LONG);
        self.state.config.image_folder = folder;
        self.persist_config();
    }

    pub(crate) fn handle_set_capture_format(&mut self, format: CaptureFormat) {
        info!(format = %format, "Capture format changed");
        self.state.config.capture_format = format;
        self.persist_config();
        self.state
            .show_toast(format!("Format set to: {}", format), toast::MEDIUM);
    }

    pub(crate) fn handle_toggle_grid_overlay(&mut self) {
        self.state.config.grid_overlay = !self.state.config.grid_overlay;
        self.persist_config();
        let message = if self.state.config.grid_overlay {
            "Grid Overlay enabled"
        } else {
            "Grid Overlay disabled"
        };
        self.state.show_toast(message, toast::SHORT);
    }

    /// Power off the device; failure is reported, never fatal
    pub(crate) fn handle_shutdown_system(&mut self) {
        let Some((program, args)) = self.shutdown_command.split_first() else {
            warn!("No shutdown command configured");
            return;
        };

        info!(command = ?self.shutdown_command, "Shutting down system");
        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => {}
            Ok(status) => {
                error!(%status, "Shutdown command failed");
                self.state
                    .show_toast(format!("Shutdown failed: {}", status), toast::MEDIUM);
            }
            Err(e) => {
                error!(error = %e, "Failed to run shutdown command");
                self.state
                    .show_toast(format!("Shutdown failed: {}", e), toast::MEDIUM);
            }
        }
    }

    // =========================================================================
    // Navigation and Housekeeping
    // =========================================================================

    pub(crate) fn handle_close_panel(&mut self) {
        self.state.panel = Panel::None;
    }

    pub(crate) fn handle_tick(&mut self, now: Instant) {
        self.state.expire_toast(now);
    }

    pub(crate) fn handle_quit(&mut self) {
        info!("Quitting");
        self.stop();
        self.state.should_quit = true;
    }
}
