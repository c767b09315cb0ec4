use super::types::{OrchestrationState, SessionTimer};
use crate::classifier::{classify, ErrorDomain};
use crate::engine::{FaceValidity, SessionState};
use crate::events::EngineEvent;
use crate::guidance::{FaceGuidanceEvaluator, GuidanceFlags};
use crate::progress::ProgressTracker;
use std::time::{Duration, Instant};

/// Input to the transition function.
#[derive(Debug, Clone)]
pub enum MachineEvent {
    Engine(EngineEvent),
    Timer(SessionTimer),
}

/// Side effects requested by a transition, executed by the driver.
///
/// The machine itself never touches the engine handle, the camera, or the
/// clock beyond the injected `now`, which keeps every transition testable
/// without a live engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartEngine,
    StopEngine,
    ReleaseCamera,
    Schedule(SessionTimer),
    CancelTimer(SessionTimer),
    SignalCompletion,
}

/// Pure session state machine.
///
/// Owns the published [`OrchestrationState`] plus the orchestrator-local
/// coordination flags that earlier revisions kept in ambient globals.
pub struct SessionMachine {
    state: OrchestrationState,
    progress: ProgressTracker,
    guidance: FaceGuidanceEvaluator,
    has_measurement_error: bool,
    auto_start_scheduled: bool,
    face_loss_armed: bool,
    completion_signaled: bool,
}

impl SessionMachine {
    pub fn new(measurement_duration: Duration) -> Self {
        Self {
            state: OrchestrationState::default(),
            progress: ProgressTracker::new(measurement_duration),
            guidance: FaceGuidanceEvaluator::new(),
            has_measurement_error: false,
            auto_start_scheduled: false,
            face_loss_armed: false,
            completion_signaled: false,
        }
    }

    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    pub fn has_measurement_error(&self) -> bool {
        self.has_measurement_error
    }

    /// Apply one event at time `now`, returning the effects to execute.
    pub fn handle(&mut self, event: MachineEvent, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            MachineEvent::Engine(EngineEvent::StateChanged(next)) => {
                self.on_state_changed(next, now, &mut effects);
            }
            MachineEvent::Engine(EngineEvent::ImageData(validity)) => {
                self.on_image_data(validity, now, &mut effects);
            }
            MachineEvent::Engine(EngineEvent::VitalSign(_)) => {
                self.on_vital_sign(now);
            }
            MachineEvent::Engine(EngineEvent::FinalResults(_)) => {
                self.on_final_results(&mut effects);
            }
            MachineEvent::Engine(EngineEvent::Error { code, domain, .. }) => {
                self.on_error(code, domain, &mut effects);
            }
            MachineEvent::Engine(EngineEvent::Warning { .. }) => {
                // Warnings are logged by the driver and never alter state.
            }
            MachineEvent::Timer(timer) => {
                self.on_timer(timer, &mut effects);
            }
        }

        self.refresh_percent(now);
        effects
    }

    fn on_state_changed(&mut self, next: SessionState, now: Instant, effects: &mut Vec<Effect>) {
        let prev = self.state.session_state;
        self.state.session_state = next;

        match next {
            SessionState::Active => {
                // Duplicate ACTIVE callbacks are not a new entry; the
                // auto-start guard must survive them.
                if prev == SessionState::Active {
                    return;
                }

                self.state.loading = false;
                self.stop_measurement_tracking(effects);

                self.auto_start_scheduled = false;
                if !self.has_measurement_error && !self.fatal_error() && !self.state.completed {
                    self.auto_start_scheduled = true;
                    effects.push(Effect::Schedule(SessionTimer::AutoStart));
                }
            }
            SessionState::Measuring => {
                self.state.is_measuring = true;
                self.state.completed = false;
                self.has_measurement_error = false;
                self.progress.start(now);
            }
            SessionState::Stopping => {
                self.stop_measurement_tracking(effects);
            }
            SessionState::Terminated => {
                self.state.loading = false;
                self.stop_measurement_tracking(effects);
                effects.push(Effect::CancelTimer(SessionTimer::AutoStart));
                effects.push(Effect::CancelTimer(SessionTimer::Restart));
                self.auto_start_scheduled = false;
            }
            SessionState::Init => {}
        }
    }

    fn on_image_data(&mut self, validity: FaceValidity, now: Instant, effects: &mut Vec<Effect>) {
        let flags = GuidanceFlags {
            is_measuring: self.state.is_measuring,
            is_processing_frames: self.state.is_processing_frames,
        };

        if let Some(update) = self.guidance.evaluate(validity, flags) {
            self.state.face_detected = update.face_detected;
            self.state.face_valid = update.face_valid;
            self.state.instruction = update.instruction;
        }

        // Progress must stop advancing the moment frames stop being
        // usable; no grace period here.
        if validity.is_valid() {
            self.progress.resume(now);
        } else if self.state.is_processing_frames || self.state.is_measuring {
            self.progress.pause(now);
        }

        // Prolonged face loss during measurement is a user-level
        // interruption handled by a grace timer, not an engine error.
        if self.state.is_measuring {
            if !validity.face_detected() {
                if !self.face_loss_armed {
                    self.face_loss_armed = true;
                    effects.push(Effect::Schedule(SessionTimer::FaceLoss));
                }
            } else if self.face_loss_armed {
                self.face_loss_armed = false;
                effects.push(Effect::CancelTimer(SessionTimer::FaceLoss));
            }
        }

        // A valid face after a recovered measurement error re-arms a
        // single delayed start.
        if self.has_measurement_error
            && validity.is_valid()
            && self.state.session_state == SessionState::Active
            && !self.state.is_measuring
            && !self.fatal_error()
        {
            self.has_measurement_error = false;
            effects.push(Effect::Schedule(SessionTimer::Restart));
        }
    }

    fn on_vital_sign(&mut self, now: Instant) {
        // The vitals tick is the authoritative processing signal. It can
        // beat the MEASURING state change, so the start time is set
        // defensively from here as well.
        self.state.is_processing_frames = true;
        self.progress.start_if_unset(now);
    }

    fn on_final_results(&mut self, effects: &mut Vec<Effect>) {
        self.state.is_measuring = false;
        self.state.is_processing_frames = false;
        self.state.completed = true;
        self.progress.reset();
        self.disarm_face_loss(effects);

        if !self.completion_signaled {
            effects.push(Effect::Schedule(SessionTimer::CompletionAck));
        }
    }

    fn on_error(&mut self, code: i32, domain: ErrorDomain, effects: &mut Vec<Effect>) {
        let alert = classify(code, domain);

        if alert.domain == ErrorDomain::Measurement {
            // Absorbed: never surfaced as a blocking alert. Stop the
            // measurement and let the face-validity rule schedule a retry.
            if self.state.is_measuring || self.state.is_processing_frames {
                effects.push(Effect::StopEngine);
            }
            self.state.is_measuring = false;
            self.state.is_processing_frames = false;
            self.progress.reset();
            self.has_measurement_error = true;
            self.disarm_face_loss(effects);
            return;
        }

        if alert.fatal {
            self.state.last_error = Some(alert);
            self.state.loading = false;
            self.state.is_measuring = false;
            self.state.is_processing_frames = false;
            self.progress.reset();
            self.auto_start_scheduled = false;
            self.face_loss_armed = false;
            effects.push(Effect::StopEngine);
            effects.push(Effect::ReleaseCamera);
            effects.push(Effect::CancelTimer(SessionTimer::AutoStart));
            effects.push(Effect::CancelTimer(SessionTimer::Restart));
            effects.push(Effect::CancelTimer(SessionTimer::FaceLoss));
            return;
        }

        // Non-fatal, non-measurement: surface with retryable guidance and
        // keep the session going.
        self.state.last_error = Some(alert);
    }

    fn on_timer(&mut self, timer: SessionTimer, effects: &mut Vec<Effect>) {
        match timer {
            SessionTimer::AutoStart => {
                self.auto_start_scheduled = false;
                if self.state.session_state == SessionState::Active
                    && !self.has_measurement_error
                    && !self.fatal_error()
                    && !self.state.is_measuring
                    && !self.state.completed
                {
                    effects.push(Effect::StartEngine);
                }
            }
            SessionTimer::Restart => {
                if self.state.session_state == SessionState::Active
                    && !self.fatal_error()
                    && !self.state.is_measuring
                    && !self.state.completed
                {
                    effects.push(Effect::StartEngine);
                }
            }
            SessionTimer::FaceLoss => {
                self.face_loss_armed = false;
                if self.state.is_measuring && !self.state.face_detected {
                    effects.push(Effect::StopEngine);
                    self.state.is_measuring = false;
                    self.state.is_processing_frames = false;
                    self.progress.reset();
                }
            }
            SessionTimer::CompletionAck => {
                if self.state.completed && !self.completion_signaled {
                    self.completion_signaled = true;
                    effects.push(Effect::SignalCompletion);
                }
            }
        }
    }

    /// Shared cleanup for every path where measurement stops.
    fn stop_measurement_tracking(&mut self, effects: &mut Vec<Effect>) {
        self.state.is_measuring = false;
        self.state.is_processing_frames = false;
        if !self.state.completed {
            self.progress.reset();
        }
        self.disarm_face_loss(effects);
    }

    fn disarm_face_loss(&mut self, effects: &mut Vec<Effect>) {
        if self.face_loss_armed {
            self.face_loss_armed = false;
            effects.push(Effect::CancelTimer(SessionTimer::FaceLoss));
        }
    }

    fn refresh_percent(&mut self, now: Instant) {
        self.state.progress_percent = if self.state.completed {
            100.0
        } else {
            self.progress.percent(now)
        };
    }

    fn fatal_error(&self) -> bool {
        self.state.last_error.map_or(false, |alert| alert.fatal)
    }
}
