// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Taking photos
//! - Listing gallery pages
//! - Inspecting and changing preferences

use fotopi::app::{CameraSettings, ShutterSpeed};
use fotopi::backends::camera::{
    CameraConfig, CameraService, CaptureFormat, CaptureRequest, Control, RpicamBackend,
    capture_channel,
};
use fotopi::config::{self, Config};
use fotopi::errors::{AppError, AppResult};
use fotopi::{gallery, storage};
use std::path::{Path, PathBuf};

/// Parse `jpg`, `.png`, `DNG`, ... for clap
pub fn parse_format(value: &str) -> Result<CaptureFormat, String> {
    CaptureFormat::from_extension(value)
        .ok_or_else(|| format!("unknown format '{}' (expected jpg, png or dng)", value))
}

/// Take a photo with the configured naming scheme
pub fn take_photo(
    output_dir: Option<PathBuf>,
    format: Option<CaptureFormat>,
    iso: Option<u32>,
    shutter: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let dir = output_dir.unwrap_or(config.image_folder);
    let format = format.unwrap_or(config.capture_format);

    // Without flags the camera's automatic exposure is used
    let mut controls: Vec<Control> = Vec::new();
    if let Some(iso) = iso {
        controls.extend(CameraSettings::iso_controls(iso));
    }
    if let Some(shutter) = shutter {
        let speed = match ShutterSpeed::from_label(&shutter) {
            Some(speed) => speed,
            None => ShutterSpeed::from_seconds(&shutter)?,
        };
        println!("Shutter speed: {}", speed);
        controls.push(Control::ExposureTime(speed.micros));
    }

    let path = capture_once(&dir, format, &controls)?;
    println!("Photo saved: {}", path.display());
    Ok(())
}

/// Start the camera, capture one still into `dir` and stop again
fn capture_once(dir: &Path, format: CaptureFormat, controls: &[Control]) -> AppResult<PathBuf> {
    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| AppError::Other(e.to_string()))?;
    let mut camera = RpicamBackend::new(runtime.handle().clone());
    camera.configure(&CameraConfig {
        preview_enabled: false,
        ..CameraConfig::default()
    })?;
    camera.set_controls(controls)?;
    camera.start()?;

    let path = storage::reserve_capture_path(dir, format.extension())?;
    let (sender, mut receiver) = capture_channel();
    let request = CaptureRequest {
        path: path.clone(),
        format,
    };

    println!("Capturing...");
    if let Err(e) = camera.capture_to_file(request, sender) {
        storage::release_reservation(&path);
        return Err(e.into());
    }

    let outcome = runtime.block_on(receiver.recv());
    camera.stop()?;

    let outcome = outcome.ok_or("Camera service stopped without reporting a result")?;
    if let Err(e) = outcome.result {
        storage::release_reservation(&path);
        return Err(e.into());
    }
    Ok(path)
}

/// Print one gallery page; `page` starts at 1
pub fn print_gallery(page: usize, dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = dir.unwrap_or_else(|| Config::load().image_folder);
    let page = gallery::load_page(&dir, page.saturating_sub(1))?;

    println!(
        "Gallery {} - page {}/{} ({} images)",
        dir.display(),
        page.page_index + 1,
        page.page_count().max(1),
        page.total
    );
    println!();

    if page.is_empty() {
        println!("No images on this page.");
        return Ok(());
    }

    for (position, entry) in page.entries.iter().enumerate() {
        let (row, column) = gallery::grid_position(position);
        println!(
            "  [{}] {}  ({}, row {} col {})",
            position + 1,
            entry.label,
            entry.file_name,
            row + 1,
            column + 1
        );
    }
    if page.has_more() {
        println!();
        println!("More images on page {}.", page.page_index + 2);
    }

    Ok(())
}

/// Print the file name the next capture would receive
pub fn print_next_name(
    dir: Option<PathBuf>,
    format: Option<CaptureFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let dir = dir.unwrap_or(config.image_folder);
    let format = format.unwrap_or(config.capture_format);

    let path = storage::next_capture_path(&dir, format.extension())?;
    println!("{}", path.display());
    Ok(())
}

/// Print the preferences and where they live
pub fn show_config() -> Result<(), Box<dyn std::error::Error>> {
    let path = config::config_path()?;
    let config = Config::load_from(&path);

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Change the image folder
pub fn set_folder(folder: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    update_config(|config| config.image_folder = folder)?;
    Ok(())
}

/// Change the capture format
pub fn set_format(format: CaptureFormat) -> Result<(), Box<dyn std::error::Error>> {
    update_config(|config| config.capture_format = format)?;
    Ok(())
}

fn update_config(change: impl FnOnce(&mut Config)) -> Result<(), Box<dyn std::error::Error>> {
    let path = config::config_path()?;
    let mut config = Config::load_from(&path);
    change(&mut config);
    config.save_to(&path)?;

    println!("Image folder: {}", config.image_folder.display());
    println!("Capture format: {}", config.capture_format);
    Ok(())
}
