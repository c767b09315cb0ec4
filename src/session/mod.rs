mod machine;
mod orchestrator;
mod types;


pub use machine::{Effect, MachineEvent, SessionMachine};
pub use orchestrator::SessionOrchestrator;
pub use types::{OrchestrationState, SessionOutcome, SessionTimer};

use std::time::Duration;

/// Delay before the automatic engine `start()` after the session becomes
/// active.
pub const AUTO_START_DELAY: Duration = Duration::from_secs(1);

/// Delay before retrying `start()` once face validity returns after a
/// recoverable measurement error.
pub const RESTART_DELAY: Duration = Duration::from_secs(1);

/// How long the face may stay undetected during measurement before the
/// orchestrator stops the engine. Fixed pending product input.
pub const FACE_LOSS_GRACE: Duration = Duration::from_secs(3);

/// How long the completion acknowledgment stays on screen before
/// navigation is signaled.
pub const COMPLETION_ACK_DELAY: Duration = Duration::from_secs(1);
