// SPDX-License-Identifier: GPL-3.0-only

//! rpicam camera service
//!
//! Drives the Raspberry Pi camera through the `rpicam-apps` tools:
//! - `rpicam-hello` runs the on-screen live preview
//! - `rpicam-still` performs each still capture
//!
//! The sensor is exclusive, so the preview is paused while a capture runs and
//! restarted afterwards. Control changes restart the preview so it reflects
//! them.

use super::types::*;
use super::CameraService;
use crate::config;
use crate::constants::camera::CAPTURE_TIMEOUT_SLACK_SECS;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const STILL_BINARY: &str = "rpicam-still";
const PREVIEW_BINARY: &str = "rpicam-hello";
/// Scratch directory for raw captures, under the data directory
const RAW_SCRATCH_DIR: &str = "raw";

/// Controls currently in effect, rendered as rpicam command-line flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSet {
    pub ae_enable: Option<bool>,
    pub analogue_gain: Option<f32>,
    pub exposure_time: Option<u32>,
    pub saturation: Option<f32>,
    pub contrast: Option<f32>,
    pub sharpness: Option<f32>,
    pub brightness: Option<f32>,
    pub awb_mode: Option<AwbMode>,
}

impl ControlSet {
    pub fn apply(&mut self, control: Control) {
        match control {
            Control::AeEnable(v) => self.ae_enable = Some(v),
            Control::AnalogueGain(v) => self.analogue_gain = Some(v),
            Control::ExposureTime(v) => self.exposure_time = Some(v),
            Control::Saturation(v) => self.saturation = Some(v),
            Control::Contrast(v) => self.contrast = Some(v),
            Control::Sharpness(v) => self.sharpness = Some(v),
            Control::Brightness(v) => self.brightness = Some(v),
            Control::AwbMode(v) => self.awb_mode = Some(v),
        }
    }

    /// Command-line flags shared by `rpicam-still` and `rpicam-hello`
    ///
    /// rpicam fixes exposure and gain when both are given, which is how
    /// `AeEnable=false` is expressed; with AE enabled they are left out.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let manual_exposure = self.ae_enable != Some(true);

        if manual_exposure {
            if let Some(us) = self.exposure_time {
                args.extend(["--shutter".to_string(), us.to_string()]);
            }
            if let Some(gain) = self.analogue_gain {
                args.extend(["--gain".to_string(), format!("{gain:.2}")]);
            }
        }
        if let Some(v) = self.saturation {
            args.extend(["--saturation".to_string(), format!("{v:.2}")]);
        }
        if let Some(v) = self.contrast {
            args.extend(["--contrast".to_string(), format!("{v:.2}")]);
        }
        if let Some(v) = self.sharpness {
            args.extend(["--sharpness".to_string(), format!("{v:.2}")]);
        }
        if let Some(v) = self.brightness {
            args.extend(["--brightness".to_string(), format!("{v:.2}")]);
        }
        if let Some(mode) = self.awb_mode {
            args.extend(["--awb".to_string(), mode.rpicam_name().to_string()]);
        }
        args
    }

    /// Capture timeout: the exposure itself plus fixed slack
    pub fn capture_timeout(&self) -> Duration {
        let exposure_secs = self.exposure_time.unwrap_or(0) as u64 / 1_000_000;
        Duration::from_secs(exposure_secs + CAPTURE_TIMEOUT_SLACK_SECS)
    }
}

/// Live preview process shared with in-flight capture tasks
#[derive(Debug, Default)]
struct PreviewState {
    child: Option<Child>,
    binary: PathBuf,
    args: Vec<String>,
    enabled: bool,
    /// Held while a capture owns the sensor
    paused: bool,
}

impl PreviewState {
    fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            debug!("Preview stopped");
        }
    }

    /// Stop any running preview and start a fresh one if allowed
    fn restart(&mut self) {
        self.kill();
        if !self.enabled || self.paused {
            return;
        }

        match Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!(pid = child.id(), "Preview started");
                self.child = Some(child);
            }
            Err(e) => {
                // Capture still works without a preview window
                warn!(error = %e, binary = %self.binary.display(), "Failed to start preview");
            }
        }
    }
}

/// Camera service backed by `rpicam-apps`
pub struct RpicamBackend {
    /// Runtime that runs capture processes
    runtime: tokio::runtime::Handle,
    config: CameraConfig,
    controls: ControlSet,
    still_binary: PathBuf,
    /// Where raw captures put their JPEG before the DNG is moved into place
    scratch_dir: PathBuf,
    preview: Arc<Mutex<PreviewState>>,
    started: bool,
}

impl RpicamBackend {
    /// Create a backend that spawns captures on `runtime`
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self {
            runtime,
            config: CameraConfig::default(),
            controls: ControlSet::default(),
            still_binary: PathBuf::from(STILL_BINARY),
            scratch_dir: config::data_dir().join(RAW_SCRATCH_DIR),
            preview: Arc::new(Mutex::new(PreviewState {
                binary: PathBuf::from(PREVIEW_BINARY),
                ..PreviewState::default()
            })),
            started: false,
        }
    }

    /// Use a different capture executable (alternate install prefix, tests)
    pub fn with_still_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.still_binary = binary.into();
        self
    }

    /// Keep raw capture scratch files in `dir`
    ///
    /// Must not be the image folder, or the gallery would list the
    /// temporary JPEGs.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Controls currently in effect
    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    /// Check whether `rpicam-still` can be executed
    pub fn is_available(&self) -> bool {
        match Command::new(&self.still_binary).arg("--version").output() {
            Ok(output) => {
                debug!(
                    version = %String::from_utf8_lossy(&output.stdout).trim(),
                    "rpicam-still found"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, binary = %self.still_binary.display(), "rpicam-still not found");
                false
            }
        }
    }

    fn preview_args(&self) -> Vec<String> {
        let mut args = vec![
            "-t".to_string(),
            "0".to_string(),
            "--viewfinder-width".to_string(),
            self.config.preview_width.to_string(),
            "--viewfinder-height".to_string(),
            self.config.preview_height.to_string(),
        ];
        args.extend(self.controls.to_args());
        args
    }

    /// Push the current configuration to the preview and restart it
    fn refresh_preview(&self) {
        let args = self.preview_args();
        match self.preview.lock() {
            Ok(mut preview) => {
                preview.args = args;
                preview.enabled = self.started && self.config.preview_enabled;
                preview.restart();
            }
            Err(_) => error!("Preview state poisoned"),
        }
    }

    /// Arguments for one `rpicam-still` run writing to `output`
    pub fn still_args(&self, output: &Path, format: CaptureFormat) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            output.display().to_string(),
            "--immediate".to_string(),
            "--nopreview".to_string(),
        ];
        match format {
            CaptureFormat::Jpeg => args.extend(["--encoding".to_string(), "jpg".to_string()]),
            CaptureFormat::Png => args.extend(["--encoding".to_string(), "png".to_string()]),
            // The DNG is written next to a JPEG with the same stem
            CaptureFormat::Dng => args.extend([
                "--encoding".to_string(),
                "jpg".to_string(),
                "--raw".to_string(),
            ]),
        }
        args.extend(self.controls.to_args());
        args
    }
}

/// Temporary JPEG path in `scratch_dir` for a raw capture into `target`
///
/// rpicam writes the DNG next to it with the same stem.
pub fn raw_companion_path(scratch_dir: &Path, target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string());
    scratch_dir.join(format!("{stem}.jpg"))
}

/// Run one capture and move its output into place
///
/// Raw scratch files are removed whatever the outcome.
async fn run_still(
    binary: PathBuf,
    args: Vec<String>,
    request: CaptureRequest,
    companion: Option<PathBuf>,
    timeout: Duration,
) -> BackendResult<()> {
    let mut result = run_still_process(&binary, &args, timeout).await;

    if let Some(companion) = &companion {
        let produced = companion.with_extension("dng");
        if result.is_ok() {
            result = move_raw_output(&produced, &request.path).await;
        }
        for scratch in [companion, &produced] {
            match tokio::fs::remove_file(scratch).await {
                Ok(()) => debug!(path = %scratch.display(), "Removed scratch file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %scratch.display(), error = %e, "Failed to remove scratch file"),
            }
        }
    }

    result
}

/// Move the DNG written by rpicam to the capture target
async fn move_raw_output(produced: &Path, target: &Path) -> BackendResult<()> {
    if let Err(e) = tokio::fs::rename(produced, target).await {
        // Cross-device moves need a copy
        debug!(error = %e, "Rename failed, copying raw capture");
        tokio::fs::copy(produced, target).await.map_err(|e| {
            BackendError::CaptureFailed(format!(
                "raw image {} not usable: {}",
                produced.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Run `rpicam-still` once
async fn run_still_process(binary: &Path, args: &[String], timeout: Duration) -> BackendResult<()> {
    let mut command = tokio::process::Command::new(binary);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(BackendError::CaptureFailed(format!(
                "cannot run {}: {}",
                binary.display(),
                e
            )));
        }
        Err(_) => return Err(BackendError::Timeout(timeout.as_secs())),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr.lines().last().unwrap_or("").trim().to_string();
        return Err(BackendError::CaptureFailed(format!(
            "{} exited with {}: {}",
            binary.display(),
            output.status,
            reason
        )));
    }

    Ok(())
}

impl CameraService for RpicamBackend {
    fn configure(&mut self, config: &CameraConfig) -> BackendResult<()> {
        if config.preview_width == 0 || config.preview_height == 0 {
            return Err(BackendError::InitializationFailed(format!(
                "invalid preview size {}x{}",
                config.preview_width, config.preview_height
            )));
        }
        self.config = *config;
        info!(
            width = config.preview_width,
            height = config.preview_height,
            preview = config.preview_enabled,
            "Camera configured"
        );
        if self.started {
            self.refresh_preview();
        }
        Ok(())
    }

    fn set_controls(&mut self, controls: &[Control]) -> BackendResult<()> {
        for control in controls {
            control.validate()?;
        }
        for control in controls {
            self.controls.apply(*control);
            debug!(control = %control, "Control set");
        }
        if self.started {
            self.refresh_preview();
        }
        Ok(())
    }

    fn start(&mut self) -> BackendResult<()> {
        if !self.is_available() {
            return Err(BackendError::NotAvailable(format!(
                "{} is not installed",
                self.still_binary.display()
            )));
        }
        self.started = true;
        self.refresh_preview();
        info!("Camera started");
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        self.started = false;
        match self.preview.lock() {
            Ok(mut preview) => {
                preview.enabled = false;
                preview.kill();
            }
            Err(_) => return Err(BackendError::Other("preview state poisoned".to_string())),
        }
        info!("Camera stopped");
        Ok(())
    }

    fn capture_to_file(
        &mut self,
        request: CaptureRequest,
        done: CaptureSender,
    ) -> BackendResult<()> {
        if !self.started {
            return Err(BackendError::NotAvailable("camera not started".to_string()));
        }

        let companion = if request.format.is_raw() {
            std::fs::create_dir_all(&self.scratch_dir)?;
            Some(raw_companion_path(&self.scratch_dir, &request.path))
        } else {
            None
        };
        let output_path = companion.as_deref().unwrap_or(request.path.as_path());
        let args = self.still_args(output_path, request.format);
        let timeout = self.controls.capture_timeout();
        let binary = self.still_binary.clone();
        let preview = Arc::clone(&self.preview);

        // The preview holds the sensor; release it for the capture
        if let Ok(mut state) = preview.lock() {
            state.paused = true;
            state.kill();
        }

        info!(path = %request.path.display(), format = %request.format, "Capturing still");

        self.runtime.spawn(async move {
            let path = request.path.clone();
            let result = run_still(binary, args, request, companion, timeout).await;

            match &result {
                Ok(()) => info!(path = %path.display(), "Capture finished"),
                Err(e) => error!(path = %path.display(), error = %e, "Capture failed"),
            }

            // Restarting waits on and spawns processes
            let resume = tokio::task::spawn_blocking(move || {
                if let Ok(mut state) = preview.lock() {
                    state.paused = false;
                    state.restart();
                }
            });
            if let Err(e) = resume.await {
                error!(error = %e, "Preview resume task failed");
            }

            if done.send(CaptureOutcome { path, result }).is_err() {
                debug!("Capture receiver dropped before completion");
            }
        });

        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for RpicamBackend {
    fn drop(&mut self) {
        if let Ok(mut preview) = self.preview.lock() {
            preview.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_exposure_args() {
        let mut controls = ControlSet::default();
        controls.apply(Control::AeEnable(false));
        controls.apply(Control::AnalogueGain(16.0));
        controls.apply(Control::ExposureTime(33_333));
        controls.apply(Control::AwbMode(AwbMode::Daylight));

        let args = controls.to_args();
        assert_eq!(
            args,
            vec!["--shutter", "33333", "--gain", "16.00", "--awb", "daylight"]
        );
    }

    #[test]
    fn test_auto_exposure_omits_shutter_and_gain() {
        let mut controls = ControlSet::default();
        controls.apply(Control::ExposureTime(1_000));
        controls.apply(Control::AnalogueGain(2.0));
        controls.apply(Control::AeEnable(true));
        assert!(controls.to_args().is_empty());
    }

    #[test]
    fn test_capture_timeout_includes_exposure() {
        let mut controls = ControlSet::default();
        assert_eq!(controls.capture_timeout(), Duration::from_secs(CAPTURE_TIMEOUT_SLACK_SECS));
        controls.apply(Control::ExposureTime(25_000_000));
        assert_eq!(
            controls.capture_timeout(),
            Duration::from_secs(25 + CAPTURE_TIMEOUT_SLACK_SECS)
        );
    }

    #[test]
    fn test_raw_companion_path_in_scratch_dir() {
        let target = Path::new("/images/004-02-01-2025-11-00.dng");
        let companion = raw_companion_path(Path::new("/data/raw"), target);
        assert_eq!(companion, PathBuf::from("/data/raw/004-02-01-2025-11-00.jpg"));
        assert_eq!(
            companion.with_extension("dng"),
            PathBuf::from("/data/raw/004-02-01-2025-11-00.dng")
        );
    }

    #[tokio::test]
    async fn test_still_args_per_format() {
        let backend = RpicamBackend::new(tokio::runtime::Handle::current());
        let png = backend.still_args(Path::new("/tmp/a.png"), CaptureFormat::Png);
        assert_eq!(png, vec!["-o", "/tmp/a.png", "--immediate", "--nopreview", "--encoding", "png"]);

        let dng = backend.still_args(Path::new("/tmp/raw/a.jpg"), CaptureFormat::Dng);
        assert!(dng.contains(&"--raw".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_control_leaves_set_unchanged() {
        let mut backend = RpicamBackend::new(tokio::runtime::Handle::current());
        backend.set_controls(&[Control::Contrast(1.5)]).unwrap();
        let err = backend
            .set_controls(&[Control::Saturation(1.2), Control::ExposureTime(0)])
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidControl(_)));
        assert_eq!(backend.controls().contrast, Some(1.5));
        assert_eq!(backend.controls().saturation, None);
    }

    #[tokio::test]
    async fn test_capture_requires_start() {
        let mut backend = RpicamBackend::new(tokio::runtime::Handle::current());
        let (tx, _rx) = capture_channel();
        let request = CaptureRequest {
            path: PathBuf::from("/tmp/never.jpg"),
            format: CaptureFormat::Jpeg,
        };
        assert!(backend.capture_to_file(request, tx).is_err());
    }

    #[tokio::test]
    async fn test_start_fails_without_binary() {
        let mut backend = RpicamBackend::new(tokio::runtime::Handle::current())
            .with_still_binary("/nonexistent/rpicam-still");
        assert!(matches!(backend.start(), Err(BackendError::NotAvailable(_))));
        assert!(!backend.is_started());
    }
}
