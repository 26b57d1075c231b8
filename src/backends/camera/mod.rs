// SPDX-License-Identifier: MPL-2.0

//! Camera service abstraction
//!
//! The application never touches sensor buffers. Everything it needs from the
//! camera goes through the [`CameraService`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   UI Layer (App)    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraService Trait │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │ rpicam │  ← rpicam-still / rpicam-hello child processes
//!       └────────┘
//! ```

pub mod rpicam;
pub mod types;

pub use rpicam::RpicamBackend;
pub use types::*;

/// Camera service trait
///
/// Implementations own sensor configuration, exposure timing and encoding.
/// Captures are asynchronous: [`CameraService::capture_to_file`] returns once
/// the capture is issued, and the outcome arrives later on the supplied
/// channel.
pub trait CameraService {
    /// Apply stream configuration (preview geometry, preview on/off)
    ///
    /// Takes effect on the next [`CameraService::start`].
    fn configure(&mut self, config: &CameraConfig) -> BackendResult<()>;

    /// Merge controls into the active set
    ///
    /// Invalid values are rejected without changing the active set.
    fn set_controls(&mut self, controls: &[Control]) -> BackendResult<()>;

    /// Start the camera (and preview, if configured)
    fn start(&mut self) -> BackendResult<()>;

    /// Stop the camera and release the sensor
    fn stop(&mut self) -> BackendResult<()>;

    /// Capture a still image to `request.path`
    ///
    /// # Returns
    /// * `Ok(())` - The capture was issued; exactly one [`CaptureOutcome`]
    ///   for `request.path` will be sent on `done`
    /// * `Err(BackendError)` - The capture was not issued; nothing is sent
    fn capture_to_file(&mut self, request: CaptureRequest, done: CaptureSender)
    -> BackendResult<()>;

    /// Check if the camera has been started
    fn is_started(&self) -> bool;
}
