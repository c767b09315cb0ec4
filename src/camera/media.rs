use crate::error::CameraError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Requested camera direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing ("selfie") camera.
    User,
    /// Rear-facing camera.
    Environment,
}

/// Constraints passed to the media device API when opening a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
}

/// Settings reported by a granted video track.
///
/// `facing` is `None` when the platform does not expose the granted
/// device's facing mode.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSettings {
    pub device_id: String,
    pub facing: Option<FacingMode>,
    pub width: u32,
    pub height: u32,
}

/// A single track of a granted media stream.
pub trait MediaTrack: Send + Sync {
    fn settings(&self) -> TrackSettings;

    /// Stop the track. Implementations must tolerate repeated calls.
    fn stop(&self);
}

/// A granted capture stream, owning its tracks.
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Box<dyn MediaTrack>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[Box<dyn MediaTrack>] {
        &self.tracks
    }

    /// Stop every track in the stream.
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// A device visible to track enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub label: String,
    pub facing: Option<FacingMode>,
}

/// Opaque capture primitive: the platform's media device API.
///
/// The orchestration layer never touches hardware directly; everything goes
/// through this seam so tests and the simulator can stand in for it.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Whether media capture is available at all on this platform.
    fn is_supported(&self) -> bool;

    /// Open a capture stream matching the constraints.
    async fn open(&self, constraints: &StreamConstraints) -> Result<MediaStream, CameraError>;

    /// Enumerate the video input devices currently visible.
    async fn enumerate(&self) -> Result<Vec<MediaDeviceInfo>, CameraError>;
}

/// Handle identifying the live frame source bound to an engine session.
///
/// Cheap to clone; carries the stream identity and its concrete geometry,
/// not the frames themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSource {
    pub stream_id: Uuid,
    pub width: u32,
    pub height: u32,
}
