mod mock;

pub use mock::{SimulatedEngineFactory, SimulatedEngineScript};

use crate::camera::FrameSource;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::vitals::SubjectInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Lifecycle states reported by the analysis engine.
///
/// Mirrored locally, never invented: the orchestrator only ever stores the
/// value the engine last emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Init,
    Active,
    Measuring,
    Stopping,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::Active => "active",
            SessionState::Measuring => "measuring",
            SessionState::Stopping => "stopping",
            SessionState::Terminated => "terminated",
        };
        write!(f, "{}", name)
    }
}

/// Per-frame classification of whether the current frame is usable for
/// measurement and, if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceValidity {
    Valid,
    InvalidRoi,
    TiltedHead,
    UnevenLight,
    InvalidDeviceOrientation,
}

impl FaceValidity {
    /// A face is considered present unless the region of interest or the
    /// device orientation rules it out entirely.
    pub fn face_detected(&self) -> bool {
        !matches!(
            self,
            FaceValidity::InvalidRoi | FaceValidity::InvalidDeviceOrientation
        )
    }

    pub fn is_valid(&self) -> bool {
        *self == FaceValidity::Valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceOrientation {
    Portrait,
    Landscape,
}

/// Parameters for creating an engine session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Stable identifier of the granted capture device.
    pub camera_device_id: String,
    /// Target measurement duration.
    pub measurement_duration: Duration,
    /// Optional pre-validated subject profile; absence degrades optional
    /// derived metrics without failing the session.
    pub subject_info: Option<SubjectInfo>,
    pub orientation: DeviceOrientation,
    /// Whether the engine should enforce strict face-position guidance.
    pub strict_guidance: bool,
}

/// Handle to a live engine session.
///
/// The orchestrator is the only owner and the only caller of these
/// methods. All results, state changes, and errors arrive asynchronously
/// on the event channel supplied at creation.
#[async_trait]
pub trait EngineSession: Send + Sync {
    async fn start(&self) -> Result<(), EngineError>;
    async fn stop(&self) -> Result<(), EngineError>;
    async fn terminate(&self) -> Result<(), EngineError>;
}

/// Creates engine sessions bound to a frame source.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create_session(
        &self,
        frames: FrameSource,
        options: SessionOptions,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Box<dyn EngineSession>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_detected_follows_roi_and_orientation() {
        assert!(FaceValidity::Valid.face_detected());
        assert!(FaceValidity::TiltedHead.face_detected());
        assert!(FaceValidity::UnevenLight.face_detected());
        assert!(!FaceValidity::InvalidRoi.face_detected());
        assert!(!FaceValidity::InvalidDeviceOrientation.face_detected());
    }

    #[test]
    fn only_valid_frames_are_valid() {
        assert!(FaceValidity::Valid.is_valid());
        assert!(!FaceValidity::TiltedHead.is_valid());
    }
}
