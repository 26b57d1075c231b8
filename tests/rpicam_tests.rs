// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the rpicam backend, driven by a fake `rpicam-still`

#![cfg(unix)]

use fotopi::backends::camera::{
    BackendError, CameraConfig, CameraService, CaptureFormat, CaptureOutcome, CaptureRequest,
    RpicamBackend, capture_channel,
};
use fotopi::storage;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes the `-o` image; `--version` and other runs without `-o` succeed silently
const WRITES_IMAGE: &str = r#"
[ -z "$out" ] && exit 0
printf 'jpeg' > "$out"
[ "$raw" = 1 ] && printf 'dng' > "${out%.*}.dng"
exit 0
"#;

/// Like rpicam with a broken raw pipeline: only the JPEG appears
const SKIPS_DNG: &str = r#"
[ -z "$out" ] && exit 0
printf 'jpeg' > "$out"
exit 0
"#;

/// Writes a partial JPEG, then fails
const FAILS: &str = r#"
[ -z "$out" ] && exit 0
printf 'partial' > "$out"
echo "ERROR: camera frontend timeout" >&2
exit 1
"#;

struct Rig {
    backend: RpicamBackend,
    images: PathBuf,
    scratch: PathBuf,
    _dir: TempDir,
}

fn fake_still(dir: &Path, body: &str) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
out=""
raw=0
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift ;;
        --raw) raw=1 ;;
    esac
    shift
done
{body}"#
    );
    let path = dir.join("rpicam-still");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn rig(body: &str) -> Rig {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    let scratch = dir.path().join("scratch");
    std::fs::create_dir_all(&images).unwrap();

    let mut backend = RpicamBackend::new(tokio::runtime::Handle::current())
        .with_still_binary(fake_still(dir.path(), body))
        .with_scratch_dir(&scratch);
    backend
        .configure(&CameraConfig {
            preview_enabled: false,
            ..CameraConfig::default()
        })
        .unwrap();
    backend.start().unwrap();

    Rig {
        backend,
        images,
        scratch,
        _dir: dir,
    }
}

async fn capture(rig: &mut Rig, format: CaptureFormat) -> CaptureOutcome {
    let path = storage::reserve_capture_path(&rig.images, format.extension()).unwrap();
    let (tx, mut rx) = capture_channel();
    rig.backend
        .capture_to_file(CaptureRequest { path, format }, tx)
        .unwrap();
    rx.recv().await.unwrap()
}

fn scratch_files(rig: &Rig) -> Vec<PathBuf> {
    match std::fs::read_dir(&rig.scratch) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_jpeg_capture_writes_target() {
    let mut rig = rig(WRITES_IMAGE);
    let outcome = capture(&mut rig, CaptureFormat::Jpeg).await;

    assert_eq!(outcome.result, Ok(()));
    assert_eq!(std::fs::read(&outcome.path).unwrap(), b"jpeg");
    assert!(scratch_files(&rig).is_empty());
}

#[tokio::test]
async fn test_raw_capture_moves_dng_and_clears_scratch() {
    let mut rig = rig(WRITES_IMAGE);
    let outcome = capture(&mut rig, CaptureFormat::Dng).await;

    assert_eq!(outcome.result, Ok(()));
    assert_eq!(std::fs::read(&outcome.path).unwrap(), b"dng");
    assert!(scratch_files(&rig).is_empty());
    assert!(storage::list_gallery_images(&rig.images).unwrap().is_empty());
}

#[tokio::test]
async fn test_raw_capture_without_dng_leaves_no_stray_jpeg() {
    let mut rig = rig(SKIPS_DNG);
    let outcome = capture(&mut rig, CaptureFormat::Dng).await;

    assert!(matches!(outcome.result, Err(BackendError::CaptureFailed(_))));
    assert!(scratch_files(&rig).is_empty());
    assert!(storage::list_gallery_images(&rig.images).unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_raw_capture_clears_scratch() {
    let mut rig = rig(FAILS);
    let outcome = capture(&mut rig, CaptureFormat::Dng).await;

    match outcome.result {
        Err(BackendError::CaptureFailed(message)) => {
            assert!(message.contains("camera frontend timeout"), "{message}");
        }
        other => panic!("expected a capture failure, got {other:?}"),
    }
    assert!(scratch_files(&rig).is_empty());
    assert!(storage::list_gallery_images(&rig.images).unwrap().is_empty());
}
