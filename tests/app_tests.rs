// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the application update loop

use fotopi::app::settings::INVALID_SHUTTER_MESSAGE;
use fotopi::backends::camera::{
    AwbMode, BackendError, BackendResult, CameraConfig, CameraService, CaptureFormat,
    CaptureOutcome, CaptureReceiver, CaptureRequest, CaptureSender, Control, capture_channel,
};
use fotopi::{App, CaptureState, Config, Message, Panel};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Camera double that records what the app asks of it
#[derive(Default)]
struct FakeCamera {
    controls: Vec<Control>,
    captures: Vec<CaptureRequest>,
    started: bool,
    fail_start: bool,
    fail_capture: bool,
    /// Report success on the channel as soon as a capture is issued
    complete_immediately: bool,
}

impl CameraService for FakeCamera {
    fn configure(&mut self, _config: &CameraConfig) -> BackendResult<()> {
        Ok(())
    }

    fn set_controls(&mut self, controls: &[Control]) -> BackendResult<()> {
        for control in controls {
            control.validate()?;
        }
        self.controls.extend_from_slice(controls);
        Ok(())
    }

    fn start(&mut self) -> BackendResult<()> {
        if self.fail_start {
            return Err(BackendError::NotAvailable("no camera".to_string()));
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        self.started = false;
        Ok(())
    }

    fn capture_to_file(&mut self, request: CaptureRequest, done: CaptureSender) -> BackendResult<()> {
        if self.fail_capture {
            return Err(BackendError::CaptureFailed("sensor busy".to_string()));
        }
        if self.complete_immediately {
            let _ = done.send(CaptureOutcome::success(request.path.clone()));
        }
        self.captures.push(request);
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

struct Harness {
    app: App<FakeCamera>,
    completions: CaptureReceiver,
    dir: TempDir,
}

fn harness_with(camera: FakeCamera) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        image_folder: dir.path().join("images"),
        ..Config::default()
    };
    let (sender, completions) = capture_channel();
    Harness {
        app: App::new(config, camera, sender),
        completions,
        dir,
    }
}

fn harness() -> Harness {
    harness_with(FakeCamera::default())
}

fn toast(app: &App<FakeCamera>) -> Option<&str> {
    app.state().toast.as_ref().map(|t| t.message.as_str())
}

fn image_folder(app: &App<FakeCamera>) -> PathBuf {
    app.state().config.image_folder.clone()
}

#[test]
fn test_start_applies_settings() {
    let mut h = harness();
    h.app.start().unwrap();

    assert!(h.app.camera().started);
    assert!(h.app.state().camera_ready);
    assert!(h.app.camera().controls.contains(&Control::AeEnable(false)));
    assert!(h.app.camera().controls.contains(&Control::AnalogueGain(16.0)));
    assert!(h.app.camera().controls.contains(&Control::ExposureTime(33_333)));
    assert!(image_folder(&h.app).is_dir());
}

#[test]
fn test_start_failure_keeps_ui_running() {
    let mut h = harness_with(FakeCamera {
        fail_start: true,
        ..FakeCamera::default()
    });

    assert!(h.app.start().is_err());
    assert!(!h.app.state().camera_ready);
    assert!(toast(&h.app).unwrap().starts_with("Camera unavailable"));
}

#[test]
fn test_capture_issues_one_request() {
    let mut h = harness();
    h.app.update(Message::Capture);

    let captures = &h.app.camera().captures;
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].format, CaptureFormat::Jpeg);

    let name = captures[0].path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("001-"), "unexpected name {name}");
    assert!(name.ends_with(".jpg"));
    assert!(captures[0].path.exists(), "Name should be reserved on disk");
    assert!(!h.app.state().can_capture());
}

#[test]
fn test_second_capture_while_pending_is_ignored() {
    let mut h = harness();
    h.app.update(Message::Capture);
    h.app.update(Message::Capture);
    h.app.update(Message::Capture);

    assert_eq!(h.app.camera().captures.len(), 1);
    assert!(h.app.state().capture.is_capturing());
}

#[test]
fn test_completion_reenables_capture() {
    let mut h = harness_with(FakeCamera {
        complete_immediately: true,
        ..FakeCamera::default()
    });
    h.app.update(Message::Capture);

    let outcome = h.completions.try_recv().unwrap();
    let path = outcome.path.clone();
    h.app.update(Message::CaptureFinished(outcome));

    assert_eq!(h.app.state().capture, CaptureState::Idle);
    assert_eq!(h.app.state().last_capture.as_deref(), Some(path.as_path()));

    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(toast(&h.app), Some(format!("Photo saved as: {}", name).as_str()));

    // The next capture gets the next number
    h.app.update(Message::Capture);
    assert_eq!(h.app.camera().captures.len(), 2);
    let second = h.app.camera().captures[1].path.file_name().unwrap().to_str().unwrap();
    assert!(second.starts_with("002-"), "unexpected name {second}");
}

#[test]
fn test_failed_capture_releases_name() {
    let mut h = harness();
    h.app.update(Message::Capture);
    let path = h.app.camera().captures[0].path.clone();

    h.app.update(Message::CaptureFinished(CaptureOutcome::failure(
        path.clone(),
        BackendError::Timeout(30),
    )));

    assert!(h.app.state().can_capture());
    assert!(!path.exists(), "Empty placeholder should be removed");
    assert!(toast(&h.app).unwrap().starts_with("Capture failed"));
    assert!(h.app.state().last_capture.is_none());
}

#[test]
fn test_completion_for_other_path_is_ignored() {
    let mut h = harness();
    h.app.update(Message::Capture);

    h.app.update(Message::CaptureFinished(CaptureOutcome::success(PathBuf::from(
        "/elsewhere/001.jpg",
    ))));

    assert!(h.app.state().capture.is_capturing());
    assert!(toast(&h.app).is_none());
}

#[test]
fn test_rejected_capture_returns_to_idle() {
    let mut h = harness_with(FakeCamera {
        fail_capture: true,
        ..FakeCamera::default()
    });
    h.app.update(Message::Capture);

    assert!(h.app.state().can_capture());
    assert!(toast(&h.app).unwrap().starts_with("Capture failed"));
    let leftovers = std::fs::read_dir(image_folder(&h.app)).unwrap().count();
    assert_eq!(leftovers, 0, "Placeholder should be removed");
}

#[test]
fn test_capture_uses_configured_format() {
    let mut h = harness();
    h.app.update(Message::SetCaptureFormat(CaptureFormat::Png));
    h.app.update(Message::Capture);

    let request = &h.app.camera().captures[0];
    assert_eq!(request.format, CaptureFormat::Png);
    assert_eq!(request.path.extension().unwrap(), "png");
}

#[test]
fn test_format_change_toast_lasts_medium() {
    let mut h = harness();
    let changed_at = Instant::now();
    h.app.update(Message::SetCaptureFormat(CaptureFormat::Png));
    assert_eq!(toast(&h.app), Some("Format set to: .png"));

    h.app.update(Message::Tick(changed_at + Duration::from_millis(2500)));
    assert!(toast(&h.app).is_some(), "Format toast should outlive the short duration");

    h.app.update(Message::Tick(changed_at + Duration::from_secs(5)));
    assert!(toast(&h.app).is_none());
}

#[test]
fn test_select_iso_sets_manual_gain() {
    let mut h = harness();
    h.app.update(Message::OpenIsoMenu);
    assert!(matches!(h.app.state().panel, Panel::IsoMenu { selected: 6 }));

    h.app.update(Message::SelectIso(800));

    assert_eq!(h.app.state().settings.iso, 800);
    assert_eq!(
        h.app.camera().controls,
        vec![Control::AeEnable(false), Control::AnalogueGain(8.0)]
    );
    assert_eq!(toast(&h.app), Some("ISO set to: 800"));
    assert_eq!(h.app.state().panel, Panel::None);
}

#[test]
fn test_select_preset_shutter() {
    let mut h = harness();
    h.app.update(Message::SelectShutter("1/125".to_string()));

    assert_eq!(h.app.state().settings.shutter.micros, 8_000);
    assert_eq!(h.app.camera().controls, vec![Control::ExposureTime(8_000)]);
    assert_eq!(toast(&h.app), Some("Shutter speed set to: 1/125s"));
}

#[test]
fn test_custom_shutter_half_second() {
    let mut h = harness();
    h.app.update(Message::OpenCustomShutter);
    for c in "0.5".chars() {
        h.app.update(Message::CustomShutterInput(c));
    }
    h.app.update(Message::ApplyCustomShutter);

    assert_eq!(h.app.state().settings.shutter.micros, 500_000);
    assert_eq!(h.app.camera().controls, vec![Control::ExposureTime(500_000)]);
    assert_eq!(h.app.state().panel, Panel::None);
}

#[test]
fn test_custom_shutter_rejects_malformed_number() {
    let mut h = harness();
    let before = h.app.state().settings.clone();

    h.app.update(Message::OpenCustomShutter);
    for c in "1..5".chars() {
        h.app.update(Message::CustomShutterInput(c));
    }
    h.app.update(Message::ApplyCustomShutter);

    assert_eq!(h.app.state().settings, before);
    assert!(h.app.camera().controls.is_empty());
    assert_eq!(toast(&h.app), Some(INVALID_SHUTTER_MESSAGE));
    assert_eq!(
        h.app.state().panel,
        Panel::CustomShutter {
            input: "1..5".to_string()
        }
    );
}

#[test]
fn test_custom_shutter_keypad_ignores_other_characters() {
    let mut h = harness();
    h.app.update(Message::OpenCustomShutter);
    for c in ['x', 'e', '-', '1', ' ', '.', '5'] {
        h.app.update(Message::CustomShutterInput(c));
    }
    assert_eq!(
        h.app.state().panel,
        Panel::CustomShutter {
            input: "1.5".to_string()
        }
    );
}

#[test]
fn test_custom_shutter_rejects_zero_exposure() {
    let mut h = harness();
    let before = h.app.state().settings.clone();

    h.app.update(Message::OpenCustomShutter);
    h.app.update(Message::CustomShutterInput('0'));
    h.app.update(Message::ApplyCustomShutter);

    assert_eq!(h.app.state().settings, before);
    assert!(h.app.camera().controls.is_empty());
    assert_eq!(toast(&h.app), Some(INVALID_SHUTTER_MESSAGE));
    assert!(matches!(h.app.state().panel, Panel::CustomShutter { .. }));
}

#[test]
fn test_custom_shutter_backspace_and_cancel() {
    let mut h = harness();
    h.app.update(Message::OpenCustomShutter);
    h.app.update(Message::CustomShutterInput('2'));
    h.app.update(Message::CustomShutterInput('5'));
    h.app.update(Message::CustomShutterBackspace);
    assert_eq!(
        h.app.state().panel,
        Panel::CustomShutter {
            input: "2".to_string()
        }
    );

    h.app.update(Message::CancelCustomShutter);
    assert_eq!(h.app.state().panel, Panel::None);
    assert_eq!(h.app.state().settings.shutter.label, "1/30");
}

#[test]
fn test_sliders_are_clamped() {
    let mut h = harness();
    h.app.update(Message::SetSaturation(250));
    h.app.update(Message::SetContrast(150));
    h.app.update(Message::SetSharpness(-5));
    h.app.update(Message::SetBrightness(-150));

    let settings = &h.app.state().settings;
    assert_eq!(settings.saturation, 2.0);
    assert_eq!(settings.contrast, 1.5);
    assert_eq!(settings.sharpness, 0.0);
    assert_eq!(settings.brightness, -1.0);
    assert_eq!(
        h.app.camera().controls,
        vec![
            Control::Saturation(2.0),
            Control::Contrast(1.5),
            Control::Sharpness(0.0),
            Control::Brightness(-1.0),
        ]
    );
}

#[test]
fn test_reset_restores_neutral_color() {
    let mut h = harness();
    h.app.update(Message::SetSaturation(180));
    h.app.update(Message::SetBrightness(40));
    h.app.update(Message::SetAwbMode(AwbMode::Daylight));
    h.app.update(Message::SelectIso(400));

    h.app.update(Message::ResetSettings);

    let settings = &h.app.state().settings;
    assert_eq!(settings.saturation, 1.0);
    assert_eq!(settings.contrast, 1.0);
    assert_eq!(settings.sharpness, 1.0);
    assert_eq!(settings.brightness, 0.0);
    assert_eq!(settings.awb_mode, AwbMode::Auto);
    assert_eq!(settings.iso, 400, "Reset leaves exposure alone");

    let controls = &h.app.camera().controls;
    assert!(controls.ends_with(&[
        Control::Saturation(1.0),
        Control::Contrast(1.0),
        Control::Sharpness(1.0),
        Control::Brightness(0.0),
        Control::AwbMode(AwbMode::Auto),
    ]));
}

fn fill_gallery(dir: &Path, count: usize) {
    std::fs::create_dir_all(dir).unwrap();
    for i in 1..=count {
        std::fs::write(dir.join(format!("{:03}-01-01-2025-10-30.jpg", i)), b"x").unwrap();
    }
}

fn gallery_page(app: &App<FakeCamera>) -> (usize, usize, bool) {
    let (state, page) = app.state().gallery().expect("gallery open");
    (state.page_index, page.entries.len(), state.is_viewing())
}

#[test]
fn test_gallery_navigation() {
    let mut h = harness();
    fill_gallery(&image_folder(&h.app), 23);

    h.app.update(Message::OpenGallery);
    assert_eq!(gallery_page(&h.app), (0, 9, false));

    h.app.update(Message::GalleryPrevious);
    assert_eq!(gallery_page(&h.app), (0, 9, false));

    h.app.update(Message::GalleryNext);
    h.app.update(Message::GalleryNext);
    assert_eq!(gallery_page(&h.app), (2, 5, false));

    h.app.update(Message::GalleryNext);
    assert_eq!(gallery_page(&h.app), (3, 0, false));
}

#[test]
fn test_gallery_view_and_back() {
    let mut h = harness();
    fill_gallery(&image_folder(&h.app), 3);

    h.app.update(Message::OpenGallery);
    h.app.update(Message::GalleryOpen(7));
    assert_eq!(gallery_page(&h.app), (0, 3, false), "No image at position 8");

    h.app.update(Message::GalleryOpen(0));
    let (state, _) = h.app.state().gallery().unwrap();
    let viewing = state.viewing.as_ref().unwrap();
    assert_eq!(viewing.file_name, "003-01-01-2025-10-30.jpg");
    assert_eq!(viewing.label, "003 | 10:30 | 01.01.2025");

    h.app.update(Message::GalleryBack);
    assert_eq!(gallery_page(&h.app), (0, 3, false));

    h.app.update(Message::GalleryBack);
    assert_eq!(h.app.state().panel, Panel::None);
}

#[test]
fn test_gallery_sees_new_files() {
    let mut h = harness();
    let folder = image_folder(&h.app);
    fill_gallery(&folder, 2);

    h.app.update(Message::OpenGallery);
    assert_eq!(gallery_page(&h.app), (0, 2, false));

    std::fs::write(folder.join("003-01-01-2025-10-31.png"), b"x").unwrap();
    h.app.update(Message::GalleryNext);
    h.app.update(Message::GalleryPrevious);
    assert_eq!(gallery_page(&h.app), (0, 3, false));
}

#[test]
fn test_opening_a_panel_replaces_the_previous() {
    let mut h = harness();
    h.app.update(Message::OpenIsoMenu);
    h.app.update(Message::OpenSettings);
    assert_eq!(h.app.state().panel, Panel::Settings { selected: 0 });

    h.app.update(Message::MoveSelection(-1));
    assert_eq!(h.app.state().panel, Panel::Settings { selected: 5 });

    h.app.update(Message::ClosePanel);
    assert!(!h.app.state().panel.is_open());
}

#[test]
fn test_options_persist_immediately() {
    let h = harness();
    let config_path = h.dir.path().join("config.json");
    let mut app = h.app.with_config_path(config_path.clone());

    app.update(Message::SetCaptureFormat(CaptureFormat::Dng));
    assert_eq!(Config::load_from(&config_path).capture_format, CaptureFormat::Dng);

    app.update(Message::ToggleGridOverlay);
    assert!(Config::load_from(&config_path).grid_overlay);
    assert_eq!(app.state().toast.as_ref().unwrap().message, "Grid Overlay enabled");

    let usb = h.dir.path().join("usb");
    app.update(Message::OpenOptions);
    app.update(Message::EditImageFolder);
    app.update(Message::SetImageFolder(usb.clone()));
    assert_eq!(Config::load_from(&config_path).image_folder, usb);
    assert_eq!(
        app.state().panel,
        Panel::Options {
            selected: 0,
            folder_input: None
        }
    );
    assert!(app.state().toast.as_ref().unwrap().message.starts_with("Folder changed to: "));
}

#[test]
fn test_folder_editing() {
    let mut h = harness();
    h.app.update(Message::OpenOptions);
    h.app.update(Message::EditImageFolder);

    let Panel::Options {
        folder_input: Some(input),
        ..
    } = &h.app.state().panel
    else {
        panic!("folder input should be open");
    };
    assert_eq!(Path::new(input), image_folder(&h.app));

    h.app.update(Message::FolderInput('x'));
    h.app.update(Message::FolderBackspace);
    h.app.update(Message::CancelFolderEdit);
    assert_eq!(
        h.app.state().panel,
        Panel::Options {
            selected: 0,
            folder_input: None
        }
    );
}

#[test]
fn test_shutdown_failure_is_reported() {
    let h = harness();
    let mut app = h
        .app
        .with_shutdown_command(vec!["/nonexistent/fotopi-shutdown".to_string()]);
    app.update(Message::ShutdownSystem);
    assert!(app.state().toast.as_ref().unwrap().message.starts_with("Shutdown failed"));

    let mut app = app.with_shutdown_command(Vec::new());
    app.update(Message::ShutdownSystem);
}

#[test]
fn test_tick_expires_toast() {
    let mut h = harness();
    h.app.update(Message::SelectIso(200));
    assert!(toast(&h.app).is_some());

    h.app.update(Message::Tick(Instant::now()));
    assert!(toast(&h.app).is_some(), "Toast should outlive a frame");

    h.app.update(Message::Tick(Instant::now() + Duration::from_secs(5)));
    assert!(toast(&h.app).is_none());
}

#[test]
fn test_quit_stops_camera() {
    let mut h = harness();
    h.app.start().unwrap();
    h.app.update(Message::Quit);

    assert!(h.app.state().should_quit);
    assert!(!h.app.camera().started);
}
