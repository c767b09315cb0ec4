mod media;
mod mock;

pub use media::{
    FacingMode, FrameSource, MediaDeviceInfo, MediaDevices, MediaStream, MediaTrack,
    StreamConstraints, TrackSettings,
};
pub use mock::{MockMediaDevices, MockMediaDevicesBuilder};

use crate::error::CameraError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful camera acquisition.
#[derive(Debug, Clone)]
pub struct AcquiredCamera {
    /// Handle the engine session binds to.
    pub frame_source: FrameSource,
    /// Concrete identifier of the device the platform actually granted.
    pub device_id: String,
}

/// Owns the capture stream handle for the lifetime of a session.
///
/// This is the only component permitted to stop the stream's tracks.
/// `release` is idempotent and also runs on drop, so the camera ends up
/// released on every exit path.
pub struct CameraLifecycle {
    devices: Arc<dyn MediaDevices>,
    stream: Mutex<Option<MediaStream>>,
}

impl CameraLifecycle {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            stream: Mutex::new(None),
        }
    }

    /// Acquire a capture stream for the preferred camera direction.
    ///
    /// Resolves the identifier of the device the platform actually granted,
    /// which may differ from the requested facing mode. When the granted
    /// track does not report a readable facing mode, falls back to
    /// enumerating devices and taking the first — a best-effort default,
    /// not a guarantee.
    pub async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<AcquiredCamera, CameraError> {
        if !self.devices.is_supported() {
            return Err(CameraError::NotSupported);
        }

        info!(
            facing = ?constraints.facing,
            width = constraints.width,
            height = constraints.height,
            "Acquiring camera"
        );

        let stream = self.devices.open(constraints).await?;

        let granted = stream
            .tracks()
            .first()
            .map(|track| track.settings())
            .ok_or(CameraError::NoDevice)?;

        let device_id = if granted.facing.is_some() && !granted.device_id.is_empty() {
            granted.device_id.clone()
        } else {
            self.resolve_device_id_fallback(&granted).await?
        };

        let frame_source = FrameSource {
            stream_id: stream.id(),
            width: granted.width,
            height: granted.height,
        };

        info!(
            device_id = %device_id,
            width = granted.width,
            height = granted.height,
            "Camera acquired"
        );

        *self.stream.lock() = Some(stream);

        Ok(AcquiredCamera {
            frame_source,
            device_id,
        })
    }

    /// Pick a device id when the granted track's facing mode is unreadable.
    async fn resolve_device_id_fallback(
        &self,
        granted: &TrackSettings,
    ) -> Result<String, CameraError> {
        if !granted.device_id.is_empty() {
            return Ok(granted.device_id.clone());
        }

        warn!("Granted track reports no device id; enumerating capture devices");
        let devices = self.devices.enumerate().await?;
        let first = devices.first().ok_or(CameraError::NoDevice)?;
        debug!(device_id = %first.device_id, label = %first.label, "Using first enumerated device");
        Ok(first.device_id.clone())
    }

    /// Release the capture stream, stopping all tracks.
    ///
    /// Idempotent: calling it again after the stream is gone is a no-op.
    pub fn release(&self) {
        if let Some(stream) = self.stream.lock().take() {
            info!(stream_id = %stream.id(), "Releasing camera");
            stream.stop_all();
        } else {
            debug!("Camera already released");
        }
    }

    /// Whether a stream is currently held.
    pub fn is_acquired(&self) -> bool {
        self.stream.lock().is_some()
    }
}

impl Drop for CameraLifecycle {
    fn drop(&mut self) {
        self.release();
    }
}
