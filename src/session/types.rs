use crate::classifier::ErrorAlert;
use crate::engine::SessionState;
use crate::guidance::Instruction;
use crate::vitals::FinalResults;
use serde::Serialize;

/// One-shot timers the orchestrator schedules against its own event loop.
///
/// A timer firing is just another event: the machine re-checks state at
/// fire time, never at schedule time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTimer {
    /// Delayed engine `start()` after the session becomes active.
    AutoStart,
    /// Delayed engine `start()` after a recovered measurement error.
    Restart,
    /// Grace window for prolonged face loss during measurement.
    FaceLoss,
    /// Completion acknowledgment delay before signaling navigation.
    CompletionAck,
}

/// Composed, read-only UI state published by the orchestrator.
///
/// Consumers (the rendering layer) observe it through a watch channel;
/// nothing outside the orchestrator ever writes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestrationState {
    pub session_state: SessionState,
    pub is_measuring: bool,
    pub is_processing_frames: bool,
    pub face_detected: bool,
    pub face_valid: bool,
    pub progress_percent: f64,
    pub instruction: Instruction,
    pub last_error: Option<ErrorAlert>,
    pub completed: bool,
    /// True until the engine reports ready (or terminates/fails).
    pub loading: bool,
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self {
            session_state: SessionState::Init,
            is_measuring: false,
            is_processing_frames: false,
            face_detected: false,
            face_valid: false,
            progress_percent: 0.0,
            instruction: Instruction::CenterFace,
            last_error: None,
            completed: false,
            loading: true,
        }
    }
}

/// How a measurement session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The engine delivered final results and the acknowledgment delay
    /// elapsed.
    Completed(FinalResults),
    /// A fatal, non-retryable error ended the session.
    Failed(ErrorAlert),
    /// The user cancelled.
    Cancelled,
}
