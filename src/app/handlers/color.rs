// SPDX-License-Identifier: GPL-3.0-only

//! Color adjustment handlers
//!
//! Handles the saturation, contrast, sharpness and brightness sliders plus
//! white balance.

use crate::app::settings::ColorSlider;
use crate::app::{App, Panel};
use crate::backends::camera::{AwbMode, CameraService, Control};
use crate::constants::toast;
use tracing::{debug, info};

impl<C: CameraService> App<C> {
    // =========================================================================
    // Color Adjustment Handlers
    // =========================================================================

    pub(crate) fn handle_open_settings(&mut self) {
        self.state.panel = Panel::Settings { selected: 0 };
    }

    /// Move `slider` to `position`, clamped to its range
    pub(crate) fn handle_set_slider(&mut self, slider: ColorSlider, position: i32) {
        let value = slider.value_at(position);
        self.state.settings.set_color_value(slider, value);
        self.apply_controls(&[slider.control(value)]);
        debug!(control = slider.display_name(), value, "Color control changed");
        self.state.show_toast(
            format!("{} set to: {:.2}", slider.display_name(), value),
            toast::SHORT,
        );
    }

    pub(crate) fn handle_set_awb_mode(&mut self, mode: AwbMode) {
        self.state.settings.awb_mode = mode;
        self.apply_controls(&[Control::AwbMode(mode)]);
        info!(mode = mode.display_name(), "White balance changed");
        self.state.show_toast(
            format!("White balance set to: {}", mode.display_name()),
            toast::SHORT,
        );
    }

    /// Neutral colour and automatic white balance, re-applied to the camera
    pub(crate) fn handle_reset_settings(&mut self) {
        self.state.settings.reset_color();
        let controls = self.state.settings.color_controls();
        self.apply_controls(&controls);
        info!("Color settings reset");
        self.state.show_toast("Settings reset", toast::SHORT);
    }
}
