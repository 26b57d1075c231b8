// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Extensions the filename sequencer treats as captures (compared lowercase)
pub const CAPTURE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".dng"];

/// Extensions shown in the gallery; raw `.dng` files are not displayable
pub const GALLERY_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Separator between the sequence number and the timestamp parts
pub const NAME_SEPARATOR: char = '-';

/// Minimum width of the zero-padded sequence number
pub const SEQUENCE_WIDTH: usize = 3;

/// `chrono` format of the timestamp embedded in capture names
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y-%H-%M";

/// Gallery layout
pub mod gallery {
    /// Images per gallery page
    pub const PAGE_SIZE: usize = 9;
    /// Grid columns; rows follow from the page size
    pub const COLUMNS: usize = 3;
}

/// Exposure presets offered by the ISO and shutter menus
pub mod exposure {
    /// ISO values in menu order
    pub const ISO_VALUES: [u32; 9] = [100, 200, 320, 400, 640, 800, 1600, 3200, 6400];

    /// Shutter labels and their exposure time in microseconds, in menu order
    pub const SHUTTER_SPEEDS: [(&str, u32); 11] = [
        ("1", 1_000_000),
        ("1/2", 500_000),
        ("1/4", 250_000),
        ("1/8", 125_000),
        ("1/15", 66_666),
        ("1/30", 33_333),
        ("1/60", 16_666),
        ("1/125", 8_000),
        ("1/250", 4_000),
        ("1/500", 2_000),
        ("1/1000", 1_000),
    ];

    /// ISO applied at startup (the camera stack would default to 400)
    pub const DEFAULT_ISO: u32 = 1600;
    /// Shutter applied at startup
    pub const DEFAULT_SHUTTER: &str = "1/30";

    /// Microseconds per second of exposure
    pub const MICROS_PER_SECOND: f64 = 1_000_000.0;
    /// ISO that corresponds to an analogue gain of 1.0
    pub const ISO_PER_UNIT_GAIN: f32 = 100.0;
}

/// Colour slider ranges; slider positions are hundredths of the control value
pub mod color {
    use std::ops::RangeInclusive;

    /// Saturation, contrast and sharpness slider range
    pub const MULTIPLIER_RANGE: RangeInclusive<i32> = 0..=200;
    /// Brightness slider range
    pub const BRIGHTNESS_RANGE: RangeInclusive<i32> = -100..=100;
    /// Divisor between slider position and control value
    pub const SLIDER_SCALE: f32 = 100.0;

    pub const DEFAULT_MULTIPLIER: f32 = 1.0;
    pub const DEFAULT_BRIGHTNESS: f32 = 0.0;
}

/// Camera stream geometry
pub mod camera {
    /// Preview stream resolution
    pub const PREVIEW_WIDTH: u32 = 1440;
    pub const PREVIEW_HEIGHT: u32 = 1080;

    /// Time allowed for a still capture on top of its exposure time
    pub const CAPTURE_TIMEOUT_SLACK_SECS: u64 = 30;
}

/// Toast display durations
pub mod toast {
    use super::Duration;

    /// Setting changes and validation messages
    pub const SHORT: Duration = Duration::from_millis(2000);
    /// "Photo saved as" and output format changes
    pub const MEDIUM: Duration = Duration::from_millis(3000);
    /// Image folder changes
    pub const LONG: Duration = Duration::from_millis(4000);
}

/// Terminal UI timing
pub mod ui {
    use super::Duration;

    /// Input poll interval; also bounds toast expiry latency
    pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Slider positions moved per arrow key press
    pub const SLIDER_STEP: i32 = 10;

    /// Grid overlay lines drawn in each direction
    pub const GRID_LINES: u16 = 3;

    /// Horizontal lines are spaced at this fraction of the height
    pub const GRID_ROW_DIVISOR: u16 = 4;

    /// Vertical lines are spaced at this fraction of the width
    pub const GRID_COLUMN_DIVISOR: u16 = 5;

    /// Decoded images kept for the preview and gallery
    pub const IMAGE_CACHE_SIZE: usize = 32;

    /// Longest side of a decoded preview image, in pixels
    pub const IMAGE_MAX_SIDE: u32 = 640;
}

/// Default `RUST_LOG` filters
pub mod logging {
    /// The kiosk logs to a file, so it can afford more detail
    pub const KIOSK_LEVEL: &str = "info";
    /// Command-line use keeps stderr quiet unless something is wrong
    pub const CLI_LEVEL: &str = "warn";
}

/// Application identity used for config, data and log locations
pub const APP_NAME: &str = "fotopi";

/// Version string baked in by `build.rs`
pub const VERSION: &str = env!("GIT_VERSION");
