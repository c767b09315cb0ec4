pub mod camera;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod guidance;
pub mod keyboard_input;
pub mod progress;
pub mod session;
pub mod vitals;

pub use camera::{
    AcquiredCamera, CameraLifecycle, FacingMode, FrameSource, MediaDeviceInfo, MediaDevices,
    MediaStream, MediaTrack, MockMediaDevices, StreamConstraints, TrackSettings,
};
pub use classifier::{classify, ErrorAlert, ErrorDomain};
pub use config::VitascanConfig;
pub use engine::{
    DeviceOrientation, EngineFactory, EngineSession, FaceValidity, SessionOptions, SessionState,
    SimulatedEngineFactory, SimulatedEngineScript,
};
pub use error::{CameraError, EngineError, Result, VitascanError};
pub use events::EngineEvent;
pub use guidance::{FaceGuidanceEvaluator, GuidanceFlags, GuidanceUpdate, Instruction};
pub use keyboard_input::KeyboardCancelHandler;
pub use progress::ProgressTracker;
pub use session::{
    OrchestrationState, SessionOrchestrator, SessionOutcome, AUTO_START_DELAY,
    COMPLETION_ACK_DELAY, FACE_LOSS_GRACE, RESTART_DELAY,
};
pub use vitals::{
    BloodPressure, FinalResults, Sex, SmokingStatus, SubjectInfo, VitalSign,
};
