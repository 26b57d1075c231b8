// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use fotopi::constants::{exposure, gallery, logging, toast};

#[test]
fn test_iso_menu_values() {
    assert_eq!(
        exposure::ISO_VALUES,
        [100, 200, 320, 400, 640, 800, 1600, 3200, 6400]
    );
    assert!(exposure::ISO_VALUES.contains(&exposure::DEFAULT_ISO));
}

#[test]
fn test_shutter_table_values() {
    let lookup = |label: &str| {
        exposure::SHUTTER_SPEEDS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, micros)| *micros)
    };

    assert_eq!(lookup("1/15"), Some(66_666));
    assert_eq!(lookup("1/30"), Some(33_333));
    assert_eq!(lookup("1/60"), Some(16_666));
    assert_eq!(lookup("1/125"), Some(8_000));
    assert_eq!(lookup("1/1000"), Some(1_000));
    assert_eq!(lookup("1"), Some(1_000_000));
}

#[test]
fn test_gallery_grid_fills_page() {
    assert_eq!(gallery::PAGE_SIZE, 9);
    assert_eq!(gallery::PAGE_SIZE % gallery::COLUMNS, 0);
}

#[test]
fn test_toast_durations_ordered() {
    assert!(toast::SHORT < toast::MEDIUM);
    assert!(toast::MEDIUM < toast::LONG);
}

#[test]
fn test_default_log_levels() {
    assert_eq!(logging::KIOSK_LEVEL, "info");
    assert_eq!(logging::CLI_LEVEL, "warn");
    assert!(tracing_subscriber::EnvFilter::try_new(logging::CLI_LEVEL).is_ok());
}
