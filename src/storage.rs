// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured photos
//!
//! The output directory is the only database: capture numbering and the
//! gallery are both re-derived from a live directory listing on every call,
//! so files added or removed behind our back are always picked up.
//!
//! Capture files are named `{seq}-{DD-MM-YYYY-HH-MM}{ext}` where `seq` is a
//! zero-padded sequence number of at least three digits.

use crate::constants::{
    CAPTURE_EXTENSIONS, GALLERY_EXTENSIONS, NAME_SEPARATOR, SEQUENCE_WIDTH, TIMESTAMP_FORMAT,
};
use crate::errors::StorageError;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Upper bound on reservation retries when other writers keep winning
const MAX_RESERVE_ATTEMPTS: usize = 16;

/// A capture file name broken into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    pub sequence_number: u64,
    /// Capture time, truncated to minutes
    pub timestamp: NaiveDateTime,
    /// Lowercase extension including the dot
    pub extension: String,
}

impl CaptureRecord {
    /// Parse a file name following the capture naming scheme
    ///
    /// Returns `None` for anything else; such files are simply not captures.
    pub fn parse(file_name: &str) -> Option<Self> {
        let extension = capture_extension(file_name)?;
        let base = &file_name[..file_name.len() - extension.len()];
        let (prefix, stamp) = base.split_once(NAME_SEPARATOR)?;
        let sequence_number = parse_sequence(prefix)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

        Some(Self {
            sequence_number,
            timestamp,
            extension: extension.to_string(),
        })
    }

    /// File name this record was parsed from (modulo extension case)
    pub fn file_name(&self) -> String {
        format_capture_name(self.sequence_number, &self.timestamp, &self.extension)
    }
}

/// Return the matching extension from `extensions` (lowercase), if any
fn matching_extension(file_name: &str, extensions: &[&'static str]) -> Option<&'static str> {
    let lower = file_name.to_ascii_lowercase();
    extensions.iter().copied().find(|ext| lower.ends_with(ext))
}

/// Extension of a capture file, compared case-insensitively
pub fn capture_extension(file_name: &str) -> Option<&'static str> {
    matching_extension(file_name, &CAPTURE_EXTENSIONS)
}

/// Whether the gallery shows this file
pub fn is_gallery_image(file_name: &str) -> bool {
    matching_extension(file_name, &GALLERY_EXTENSIONS).is_some()
}

/// Parse a sequence prefix made only of ASCII digits
///
/// `str::parse` alone would accept a leading `+`.
fn parse_sequence(prefix: &str) -> Option<u64> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Sequence number candidate of a directory entry, if it has one
pub fn sequence_candidate(file_name: &str) -> Option<u64> {
    capture_extension(file_name)?;
    let first = file_name.split(NAME_SEPARATOR).next()?;
    parse_sequence(first)
}

/// Build `{seq}-{timestamp}{ext}`
pub fn format_capture_name<T: FormatTimestamp>(sequence: u64, time: &T, extension: &str) -> String {
    format!(
        "{:0width$}{}{}{}",
        sequence,
        NAME_SEPARATOR,
        time.format_timestamp(),
        extension,
        width = SEQUENCE_WIDTH
    )
}

/// Timestamp rendering shared by naive and zoned times
pub trait FormatTimestamp {
    fn format_timestamp(&self) -> String;
}

impl FormatTimestamp for NaiveDateTime {
    fn format_timestamp(&self) -> String {
        self.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl<Tz: TimeZone> FormatTimestamp for DateTime<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn format_timestamp(&self) -> String {
        self.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Create `dir` if it does not exist yet
pub fn ensure_directory(dir: &Path) -> Result<(), StorageError> {
    std::fs::create_dir_all(dir).map_err(|e| StorageError::CreateDirFailed {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })
}

/// File names of the directory's entries
///
/// Names that are not valid UTF-8 cannot follow the naming scheme and are
/// skipped.
fn list_file_names(dir: &Path) -> Result<Vec<String>, StorageError> {
    let entries = std::fs::read_dir(dir).map_err(|e| StorageError::ReadDirFailed {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect())
}

/// Highest sequence number in use in `dir`, if any
pub fn highest_sequence(dir: &Path) -> Result<Option<u64>, StorageError> {
    let max = list_file_names(dir)?
        .iter()
        .filter_map(|name| sequence_candidate(name))
        .max();
    Ok(max)
}

/// Sequence number the next capture in `dir` receives
pub fn next_sequence(dir: &Path) -> Result<u64, StorageError> {
    Ok(highest_sequence(dir)?.map_or(1, |max| max.saturating_add(1)))
}

/// Path of the next capture in `dir`, stamped with `now`
///
/// Creates the directory if needed but not the file, so two calls before the
/// first capture lands return the same path. Use [`reserve_capture_path_at`]
/// when that matters.
pub fn next_capture_path_at<T: FormatTimestamp>(
    dir: &Path,
    extension: &str,
    now: &T,
) -> Result<PathBuf, StorageError> {
    ensure_directory(dir)?;
    let sequence = next_sequence(dir)?;
    let path = dir.join(format_capture_name(sequence, now, extension));
    debug!(path = %path.display(), sequence, "Next capture path");
    Ok(path)
}

/// Path of the next capture in `dir`, stamped with the local time
pub fn next_capture_path(dir: &Path, extension: &str) -> Result<PathBuf, StorageError> {
    next_capture_path_at(dir, extension, &Local::now())
}

/// Select the next capture path and claim it with an empty placeholder
///
/// The placeholder is created with `create_new`, so concurrent writers never
/// receive the same name. Losing the race re-scans and tries again.
pub fn reserve_capture_path_at<T: FormatTimestamp>(
    dir: &Path,
    extension: &str,
    now: &T,
) -> Result<PathBuf, StorageError> {
    let mut last_collision = None;

    for _ in 0..MAX_RESERVE_ATTEMPTS {
        let path = next_capture_path_at(dir, extension, now)?;
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                info!(path = %path.display(), "Reserved capture path");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(path = %path.display(), "Capture path taken, rescanning");
                last_collision = Some(path);
            }
            Err(e) => {
                return Err(StorageError::ReserveFailed {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }

    Err(StorageError::ReserveFailed {
        path: last_collision.unwrap_or_else(|| dir.to_path_buf()),
        message: "too many concurrent captures".to_string(),
    })
}

/// [`reserve_capture_path_at`] stamped with the local time
pub fn reserve_capture_path(dir: &Path, extension: &str) -> Result<PathBuf, StorageError> {
    reserve_capture_path_at(dir, extension, &Local::now())
}

/// Remove a reservation placeholder that never received data
///
/// Files with content are left alone; a failed capture may still have
/// written something worth keeping.
pub fn release_reservation(path: &Path) {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Failed to remove placeholder");
            } else {
                debug!(path = %path.display(), "Removed placeholder");
            }
        }
        _ => {}
    }
}

/// Gallery images in `dir`, newest first
///
/// Sorting is by file name, descending; zero-padded sequence prefixes make
/// that newest-first. Creates the directory if it does not exist.
pub fn list_gallery_images(dir: &Path) -> Result<Vec<String>, StorageError> {
    ensure_directory(dir)?;
    let mut names: Vec<String> = list_file_names(dir)?
        .into_iter()
        .filter(|name| is_gallery_image(name))
        .collect();
    names.sort_unstable_by(|a, b| b.cmp(a));
    Ok(names)
}
