// SPDX-License-Identifier: GPL-3.0-only

//! Camera settings owned by the application
//!
//! Values are kept the way the user picked them (labels, slider positions)
//! and converted to camera controls on demand.

use crate::backends::camera::{AwbMode, Control};
use crate::constants::color::{
    BRIGHTNESS_RANGE, DEFAULT_BRIGHTNESS, DEFAULT_MULTIPLIER, MULTIPLIER_RANGE, SLIDER_SCALE,
};
use crate::constants::exposure::{
    DEFAULT_ISO, DEFAULT_SHUTTER, ISO_PER_UNIT_GAIN, MICROS_PER_SECOND, SHUTTER_SPEEDS,
};
use std::fmt;

/// Message shown when custom shutter input is rejected
pub const INVALID_SHUTTER_MESSAGE: &str = "Please type in a valid decimal number, e.g. 25 or 0.5";

/// A shutter speed: the label the user picked and its exposure time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutterSpeed {
    pub label: String,
    pub micros: u32,
}

impl ShutterSpeed {
    /// Look up a preset label such as `1/125`
    pub fn from_label(label: &str) -> Option<Self> {
        SHUTTER_SPEEDS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(l, micros)| Self {
                label: l.to_string(),
                micros: *micros,
            })
    }

    /// Characters the custom shutter keypad can type
    pub fn accepts_char(c: char) -> bool {
        c.is_ascii_digit() || c == '.'
    }

    /// Parse custom input in decimal seconds, truncating to whole microseconds
    ///
    /// The typed text (trimmed) becomes the label. Values shorter than one
    /// microsecond are rejected.
    pub fn from_seconds(input: &str) -> Result<Self, InvalidShutter> {
        let text = input.trim();
        let seconds: f64 = text.parse().map_err(|_| InvalidShutter)?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(InvalidShutter);
        }
        let micros = (seconds * MICROS_PER_SECOND).trunc();
        // The camera rejects a zero exposure time
        if micros < 1.0 || micros > u32::MAX as f64 {
            return Err(InvalidShutter);
        }
        Ok(Self {
            label: text.to_string(),
            micros: micros as u32,
        })
    }
}

impl Default for ShutterSpeed {
    fn default() -> Self {
        Self::from_label(DEFAULT_SHUTTER).unwrap_or(Self {
            label: DEFAULT_SHUTTER.to_string(),
            micros: 33_333,
        })
    }
}

impl fmt::Display for ShutterSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.label)
    }
}

/// Custom shutter input that is not a usable decimal number of seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidShutter;

impl fmt::Display for InvalidShutter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(INVALID_SHUTTER_MESSAGE)
    }
}

impl std::error::Error for InvalidShutter {}

/// Colour sliders in the camera settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlider {
    Saturation,
    Contrast,
    Sharpness,
    Brightness,
}

impl ColorSlider {
    pub const ALL: [ColorSlider; 4] = [
        ColorSlider::Saturation,
        ColorSlider::Contrast,
        ColorSlider::Sharpness,
        ColorSlider::Brightness,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ColorSlider::Saturation => "Saturation",
            ColorSlider::Contrast => "Contrast",
            ColorSlider::Sharpness => "Sharpness",
            ColorSlider::Brightness => "Brightness",
        }
    }

    pub fn range(self) -> std::ops::RangeInclusive<i32> {
        match self {
            ColorSlider::Brightness => BRIGHTNESS_RANGE,
            _ => MULTIPLIER_RANGE,
        }
    }

    /// Control value for a slider position, clamped to the slider range
    pub fn value_at(self, position: i32) -> f32 {
        let range = self.range();
        position.clamp(*range.start(), *range.end()) as f32 / SLIDER_SCALE
    }

    /// Slider position for a control value
    pub fn position_of(self, value: f32) -> i32 {
        (value * SLIDER_SCALE).round() as i32
    }

    pub fn control(self, value: f32) -> Control {
        match self {
            ColorSlider::Saturation => Control::Saturation(value),
            ColorSlider::Contrast => Control::Contrast(value),
            ColorSlider::Sharpness => Control::Sharpness(value),
            ColorSlider::Brightness => Control::Brightness(value),
        }
    }
}

/// Current camera settings
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub iso: u32,
    pub shutter: ShutterSpeed,
    pub saturation: f32,
    pub contrast: f32,
    pub sharpness: f32,
    pub brightness: f32,
    pub awb_mode: AwbMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            iso: DEFAULT_ISO,
            shutter: ShutterSpeed::default(),
            saturation: DEFAULT_MULTIPLIER,
            contrast: DEFAULT_MULTIPLIER,
            sharpness: DEFAULT_MULTIPLIER,
            brightness: DEFAULT_BRIGHTNESS,
            awb_mode: AwbMode::Auto,
        }
    }
}

impl CameraSettings {
    /// Analogue gain for an ISO value
    pub fn gain_for_iso(iso: u32) -> f32 {
        iso as f32 / ISO_PER_UNIT_GAIN
    }

    /// Controls that select manual exposure at `iso`
    pub fn iso_controls(iso: u32) -> [Control; 2] {
        [Control::AeEnable(false), Control::AnalogueGain(Self::gain_for_iso(iso))]
    }

    pub fn color_value(&self, slider: ColorSlider) -> f32 {
        match slider {
            ColorSlider::Saturation => self.saturation,
            ColorSlider::Contrast => self.contrast,
            ColorSlider::Sharpness => self.sharpness,
            ColorSlider::Brightness => self.brightness,
        }
    }

    pub fn set_color_value(&mut self, slider: ColorSlider, value: f32) {
        match slider {
            ColorSlider::Saturation => self.saturation = value,
            ColorSlider::Contrast => self.contrast = value,
            ColorSlider::Sharpness => self.sharpness = value,
            ColorSlider::Brightness => self.brightness = value,
        }
    }

    /// Put the colour sliders and AWB back to neutral; exposure is kept
    pub fn reset_color(&mut self) {
        let defaults = Self::default();
        self.saturation = defaults.saturation;
        self.contrast = defaults.contrast;
        self.sharpness = defaults.sharpness;
        self.brightness = defaults.brightness;
        self.awb_mode = defaults.awb_mode;
    }

    /// Colour controls as currently set
    pub fn color_controls(&self) -> Vec<Control> {
        let mut controls: Vec<Control> = ColorSlider::ALL
            .iter()
            .map(|slider| slider.control(self.color_value(*slider)))
            .collect();
        controls.push(Control::AwbMode(self.awb_mode));
        controls
    }

    /// Every control needed to bring a fresh camera to these settings
    pub fn all_controls(&self) -> Vec<Control> {
        let mut controls = Self::iso_controls(self.iso).to_vec();
        controls.push(Control::ExposureTime(self.shutter.micros));
        controls.extend(self.color_controls());
        controls
    }
}
