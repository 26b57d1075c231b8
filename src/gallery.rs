// SPDX-License-Identifier: GPL-3.0-only

//! Gallery pagination
//!
//! Pages are recomputed from the live directory listing on every
//! navigation event. Nothing is cached.

use crate::constants::NAME_SEPARATOR;
use crate::constants::gallery::{COLUMNS, PAGE_SIZE};
use crate::errors::StorageError;
use crate::storage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Gallery navigation state
///
/// A plain value: navigation returns the new state instead of mutating
/// shared fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryState {
    pub page_index: usize,
    /// Image shown full screen, if any
    pub viewing: Option<GalleryEntry>,
}

impl GalleryState {
    /// State when the gallery is opened: first page, grid view
    pub fn opened() -> Self {
        Self::default()
    }

    /// Next page; not bounded by the number of images
    pub fn next(self) -> Self {
        Self {
            page_index: self.page_index.saturating_add(1),
            viewing: None,
        }
    }

    /// Previous page, never below the first
    pub fn previous(self) -> Self {
        Self {
            page_index: self.page_index.saturating_sub(1),
            viewing: None,
        }
    }

    /// Show `entry` full screen
    pub fn view(self, entry: GalleryEntry) -> Self {
        Self {
            viewing: Some(entry),
            ..self
        }
    }

    /// Leave the full-screen view, keeping the page
    pub fn back_to_grid(self) -> Self {
        Self {
            viewing: None,
            ..self
        }
    }

    pub fn is_viewing(&self) -> bool {
        self.viewing.is_some()
    }
}

/// One image on a gallery page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// Caption shown under the thumbnail and above the full-screen image
    pub label: String,
}

impl GalleryEntry {
    fn new(dir: &Path, file_name: String) -> Self {
        Self {
            path: dir.join(&file_name),
            label: display_label(&file_name),
            file_name,
        }
    }
}

/// A window of at most [`PAGE_SIZE`] images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPage {
    pub page_index: usize,
    pub entries: Vec<GalleryEntry>,
    /// Images in the whole listing
    pub total: usize,
}

impl GalleryPage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether images follow this page
    pub fn has_more(&self) -> bool {
        (self.page_index.saturating_add(1)).saturating_mul(PAGE_SIZE) < self.total
    }

    /// Number of pages that hold at least one image
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE)
    }

    /// Entry by its 0-based position on the page
    pub fn entry(&self, position: usize) -> Option<&GalleryEntry> {
        self.entries.get(position)
    }
}

/// Slice `names` (already sorted) into the page at `page_index`
///
/// Out-of-range pages are empty rather than an error.
pub fn paginate<T: Clone>(names: &[T], page_index: usize, page_size: usize) -> Vec<T> {
    let start = page_index.saturating_mul(page_size);
    if start >= names.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(names.len());
    names[start..end].to_vec()
}

/// Load one gallery page from `dir`
pub fn load_page(dir: &Path, page_index: usize) -> Result<GalleryPage, StorageError> {
    let names = storage::list_gallery_images(dir)?;
    let entries = paginate(&names, page_index, PAGE_SIZE)
        .into_iter()
        .map(|name| GalleryEntry::new(dir, name))
        .collect::<Vec<_>>();

    debug!(
        dir = %dir.display(),
        page = page_index,
        shown = entries.len(),
        total = names.len(),
        "Gallery page loaded"
    );

    Ok(GalleryPage {
        page_index,
        entries,
        total: names.len(),
    })
}

/// Grid cell `(row, column)` of the entry at `position`
pub fn grid_position(position: usize) -> (usize, usize) {
    (position / COLUMNS, position % COLUMNS)
}

/// Caption for a capture file
///
/// `005-02-01-2025-14-07.jpg` becomes `005 | 14:07 | 02.01.2025`. Names with
/// fewer than six dash-separated parts are shown as their base name.
pub fn display_label(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    let parts: Vec<&str> = base.split(NAME_SEPARATOR).collect();
    if parts.len() >= 6 {
        format!(
            "{} | {}:{} | {}.{}.{}",
            parts[0], parts[4], parts[5], parts[1], parts[2], parts[3]
        )
    } else {
        base
    }
}
