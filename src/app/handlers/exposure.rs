// SPDX-License-Identifier: GPL-3.0-only

//! Exposure control handlers
//!
//! Handles the ISO menu, preset shutter speeds and custom shutter entry.

use crate::app::settings::{CameraSettings, ShutterSpeed};
use crate::app::{App, Panel};
use crate::backends::camera::{CameraService, Control};
use crate::constants::exposure::{ISO_VALUES, SHUTTER_SPEEDS};
use crate::constants::toast;
use tracing::{info, warn};

impl<C: CameraService> App<C> {
    // =========================================================================
    // Exposure Control Handlers
    // =========================================================================

    pub(crate) fn handle_open_iso_menu(&mut self) {
        let selected = ISO_VALUES
            .iter()
            .position(|iso| *iso == self.state.settings.iso)
            .unwrap_or(0);
        self.state.panel = Panel::IsoMenu { selected };
    }

    /// Switch to manual exposure at `iso`
    pub(crate) fn handle_select_iso(&mut self, iso: u32) {
        self.state.panel = Panel::None;
        if iso == 0 {
            warn!(iso, "Ignoring invalid ISO");
            return;
        }

        self.state.settings.iso = iso;
        self.apply_controls(&CameraSettings::iso_controls(iso));
        info!(iso, gain = CameraSettings::gain_for_iso(iso), "ISO changed");
        self.state
            .show_toast(format!("ISO set to: {}", iso), toast::SHORT);
    }

    pub(crate) fn handle_open_shutter_menu(&mut self) {
        let selected = SHUTTER_SPEEDS
            .iter()
            .position(|(label, _)| *label == self.state.settings.shutter.label)
            .unwrap_or(0);
        self.state.panel = Panel::ShutterMenu { selected };
    }

    pub(crate) fn handle_select_shutter(&mut self, label: &str) {
        self.state.panel = Panel::None;
        match ShutterSpeed::from_label(label) {
            Some(shutter) => self.set_shutter(shutter),
            None => warn!(label, "Unknown shutter speed"),
        }
    }

    pub(crate) fn handle_open_custom_shutter(&mut self) {
        self.state.panel = Panel::CustomShutter {
            input: String::new(),
        };
    }

    /// The keypad only types digits and the decimal point
    pub(crate) fn handle_custom_shutter_input(&mut self, c: char) {
        if !ShutterSpeed::accepts_char(c) {
            return;
        }
        if let Panel::CustomShutter { input } = &mut self.state.panel {
            input.push(c);
        }
    }

    pub(crate) fn handle_custom_shutter_backspace(&mut self) {
        if let Panel::CustomShutter { input } = &mut self.state.panel {
            input.pop();
        }
    }

    /// Apply the typed seconds; invalid input leaves everything unchanged
    pub(crate) fn handle_apply_custom_shutter(&mut self) {
        let Panel::CustomShutter { input } = &self.state.panel else {
            return;
        };

        match ShutterSpeed::from_seconds(input) {
            Ok(shutter) => {
                self.state.panel = Panel::None;
                self.set_shutter(shutter);
            }
            Err(e) => {
                warn!(input = %input, "Rejected custom shutter speed");
                self.state.show_toast(e.to_string(), toast::MEDIUM);
            }
        }
    }

    pub(crate) fn handle_cancel_custom_shutter(&mut self) {
        if matches!(self.state.panel, Panel::CustomShutter { .. }) {
            self.state.panel = Panel::None;
        }
    }

    fn set_shutter(&mut self, shutter: ShutterSpeed) {
        self.apply_controls(&[Control::ExposureTime(shutter.micros)]);
        info!(label = %shutter.label, micros = shutter.micros, "Shutter speed changed");
        self.state
            .show_toast(format!("Shutter speed set to: {}", shutter), toast::SHORT);
        self.state.settings.shutter = shutter;
    }
}
