// SPDX-License-Identifier: MPL-2.0

//! FotoPi - a kiosk camera front-end for the Raspberry Pi camera module
//!
//! This library provides the core functionality of the FotoPi kiosk:
//! capture numbering, gallery pagination, camera settings and the camera
//! service that drives `rpicam-apps`.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application state and message handling
//! - [`backends`]: Camera service abstraction and the rpicam backend
//! - [`config`]: User preferences
//! - [`storage`]: Capture file naming and directory listing
//! - [`gallery`]: Gallery pagination
//! - [`terminal`]: Terminal kiosk front-end
//!
//! # Example
//!
//! ```ignore
//! // Kiosk mode:
//! // fotopi
//! // One-off capture:
//! // fotopi photo --format png
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gallery;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{App, AppState, CaptureState, Message, Panel};
pub use config::Config;
pub use errors::{AppError, AppResult};
