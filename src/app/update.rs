// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The `update()` function is a dispatcher routing each message to a focused
//! handler method. Handlers live in the `handlers` submodules, organized by
//! functional domain:
//!
//! - `handlers::capture`: Shutter button and capture completion
//! - `handlers::exposure`: ISO and shutter speed
//! - `handlers::color`: Colour sliders and white balance
//! - `handlers::system`: Gallery, options, shutdown, housekeeping

use crate::app::settings::ColorSlider;
use crate::app::state::Message;
use crate::app::App;
use crate::backends::camera::CameraService;
use tracing::debug;

impl<C: CameraService> App<C> {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) {
        if !matches!(message, Message::Tick(_)) {
            debug!(?message, "Update");
        }

        match message {
            // ===== Capture =====
            Message::Capture => self.handle_capture(),
            Message::CaptureFinished(outcome) => self.handle_capture_finished(outcome),

            // ===== Exposure =====
            Message::OpenIsoMenu => self.handle_open_iso_menu(),
            Message::SelectIso(iso) => self.handle_select_iso(iso),
            Message::OpenShutterMenu => self.handle_open_shutter_menu(),
            Message::SelectShutter(label) => self.handle_select_shutter(&label),
            Message::OpenCustomShutter => self.handle_open_custom_shutter(),
            Message::CustomShutterInput(c) => self.handle_custom_shutter_input(c),
            Message::CustomShutterBackspace => self.handle_custom_shutter_backspace(),
            Message::ApplyCustomShutter => self.handle_apply_custom_shutter(),
            Message::CancelCustomShutter => self.handle_cancel_custom_shutter(),

            // ===== Color =====
            Message::OpenSettings => self.handle_open_settings(),
            Message::SetSaturation(position) => {
                self.handle_set_slider(ColorSlider::Saturation, position)
            }
            Message::SetContrast(position) => self.handle_set_slider(ColorSlider::Contrast, position),
            Message::SetSharpness(position) => {
                self.handle_set_slider(ColorSlider::Sharpness, position)
            }
            Message::SetBrightness(position) => {
                self.handle_set_slider(ColorSlider::Brightness, position)
            }
            Message::SetAwbMode(mode) => self.handle_set_awb_mode(mode),
            Message::ResetSettings => self.handle_reset_settings(),

            // ===== Gallery =====
            Message::OpenGallery => self.handle_open_gallery(),
            Message::GalleryNext => self.handle_gallery_next(),
            Message::GalleryPrevious => self.handle_gallery_previous(),
            Message::GalleryOpen(position) => self.handle_gallery_open(position),
            Message::GalleryBack => self.handle_gallery_back(),

            // ===== Options =====
            Message::OpenOptions => self.handle_open_options(),
            Message::EditImageFolder => self.handle_edit_image_folder(),
            Message::FolderInput(c) => self.handle_folder_input(c),
            Message::FolderBackspace => self.handle_folder_backspace(),
            Message::CancelFolderEdit => self.handle_cancel_folder_edit(),
            Message::SetImageFolder(folder) => self.handle_set_image_folder(folder),
            Message::SetCaptureFormat(format) => self.handle_set_capture_format(format),
            Message::ToggleGridOverlay => self.handle_toggle_grid_overlay(),
            Message::ShutdownSystem => self.handle_shutdown_system(),

            // ===== Navigation =====
            Message::MoveSelection(delta) => self.state.panel.move_selection(delta),
            Message::ClosePanel => self.handle_close_panel(),
            Message::Tick(now) => self.handle_tick(now),
            Message::Quit => self.handle_quit(),
        }
    }
}
