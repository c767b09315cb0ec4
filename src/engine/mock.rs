use super::{EngineFactory, EngineSession, FaceValidity, SessionOptions, SessionState};
use crate::camera::FrameSource;
use crate::classifier::ErrorDomain;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::vitals::{BloodPressure, FinalResults, VitalSign};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Timing script for the simulated engine.
#[derive(Debug, Clone)]
pub struct SimulatedEngineScript {
    /// Delay before the session reports ready.
    pub ready_delay: Duration,
    /// Cadence of per-frame validity callbacks.
    pub frame_interval: Duration,
    /// Cadence of partial-result ticks.
    pub tick_interval: Duration,
}

impl Default for SimulatedEngineScript {
    fn default() -> Self {
        Self {
            ready_delay: Duration::from_millis(300),
            frame_interval: Duration::from_millis(100),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl SimulatedEngineScript {
    fn results(&self) -> FinalResults {
        let mut results = FinalResults::empty();
        results.pulse_rate = Some(72.4);
        results.respiration_rate = Some(14.1);
        results.stress_level = Some(3.2);
        results.blood_pressure = Some(BloodPressure {
            systolic: 118,
            diastolic: 76,
        });
        results.sdnn = Some(48.0);
        results.prq = Some(4.9);
        results.wellness_index = Some(8.2);
        results.hemoglobin = Some(13.8);
        results.hemoglobin_a1c = Some(5.4);
        results
    }
}

/// Deterministic engine stand-in for the CLI demo and integration tests.
///
/// Emits the full callback choreography of a real engine — ready state,
/// measuring transition, valid frames at frame rate, vitals ticks filling
/// in progressively, final results, and the stop sequence — on the event
/// channel supplied at session creation.
pub struct SimulatedEngineFactory {
    script: SimulatedEngineScript,
}

impl SimulatedEngineFactory {
    pub fn new() -> Self {
        Self {
            script: SimulatedEngineScript::default(),
        }
    }

    pub fn with_script(script: SimulatedEngineScript) -> Self {
        Self { script }
    }
}

impl Default for SimulatedEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineFactory for SimulatedEngineFactory {
    async fn create_session(
        &self,
        frames: FrameSource,
        options: SessionOptions,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        info!(
            stream_id = %frames.stream_id,
            device_id = %options.camera_device_id,
            "Simulated engine session created"
        );

        let ready_events = events.clone();
        let ready_delay = self.script.ready_delay;
        tokio::spawn(async move {
            tokio::time::sleep(ready_delay).await;
            let _ = ready_events.send(EngineEvent::StateChanged(SessionState::Active));
        });

        Ok(Box::new(SimulatedEngineSession {
            events,
            duration: options.measurement_duration,
            script: self.script.clone(),
            measure_task: Mutex::new(None),
        }))
    }
}

struct SimulatedEngineSession {
    events: mpsc::UnboundedSender<EngineEvent>,
    duration: Duration,
    script: SimulatedEngineScript,
    measure_task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl EngineSession for SimulatedEngineSession {
    async fn start(&self) -> Result<(), EngineError> {
        let mut slot = self.measure_task.lock().await;

        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            // A real engine reports illegal calls asynchronously.
            let _ = self.events.send(EngineEvent::Error {
                code: 6001,
                domain: ErrorDomain::Session,
                message: "start called while a measurement is running".to_string(),
            });
            return Ok(());
        }

        debug!("Simulated measurement starting");
        let events = self.events.clone();
        let duration = self.duration;
        let script = self.script.clone();

        *slot = Some(tokio::spawn(async move {
            let _ = events.send(EngineEvent::StateChanged(SessionState::Measuring));

            let started = tokio::time::Instant::now();
            let mut frame_timer = tokio::time::interval(script.frame_interval);
            let mut tick_timer = tokio::time::interval(script.tick_interval);
            frame_timer.tick().await;
            tick_timer.tick().await;

            let mut vitals = VitalSign::default();
            let mut ticks = 0u32;

            while started.elapsed() < duration {
                tokio::select! {
                    _ = frame_timer.tick() => {
                        let _ = events.send(EngineEvent::ImageData(FaceValidity::Valid));
                    }
                    _ = tick_timer.tick() => {
                        ticks += 1;
                        vitals.pulse_rate = Some(72.0);
                        if ticks >= 3 {
                            vitals.respiration_rate = Some(14.0);
                        }
                        if ticks >= 5 {
                            vitals.stress_level = Some(3.0);
                        }
                        let _ = events.send(EngineEvent::VitalSign(vitals.clone()));
                    }
                }
            }

            let _ = events.send(EngineEvent::FinalResults(script.results()));
            let _ = events.send(EngineEvent::StateChanged(SessionState::Stopping));
            let _ = events.send(EngineEvent::StateChanged(SessionState::Active));
        }));

        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        if let Some(task) = self.measure_task.lock().await.take() {
            task.abort();
            debug!("Simulated measurement stopped");
            let _ = self.events.send(EngineEvent::StateChanged(SessionState::Stopping));
            let _ = self.events.send(EngineEvent::StateChanged(SessionState::Active));
        }
        Ok(())
    }

    async fn terminate(&self) -> Result<(), EngineError> {
        if let Some(task) = self.measure_task.lock().await.take() {
            task.abort();
        }
        debug!("Simulated engine session terminated");
        let _ = self.events.send(EngineEvent::StateChanged(SessionState::Terminated));
        Ok(())
    }
}
