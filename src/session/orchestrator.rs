use super::machine::{Effect, MachineEvent, SessionMachine};
use super::types::{OrchestrationState, SessionOutcome, SessionTimer};
use super::{AUTO_START_DELAY, COMPLETION_ACK_DELAY, FACE_LOSS_GRACE, RESTART_DELAY};
use crate::camera::{AcquiredCamera, CameraLifecycle, MediaDevices};
use crate::classifier::{classify, ErrorDomain};
use crate::config::VitascanConfig;
use crate::engine::{EngineFactory, EngineSession};
use crate::error::{EngineError, Result, VitascanError};
use crate::events::EngineEvent;
use crate::vitals::FinalResults;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Top-level measurement session coordinator.
///
/// Exclusively owns the engine session handle; every `start`/`stop`/
/// `terminate` call in the crate goes through this driver. Engine callbacks
/// and timer firings are serialized onto one event loop, so no two handlers
/// ever run concurrently, while cross-source arrival order stays
/// unconstrained — the machine is written to tolerate either ordering.
pub struct SessionOrchestrator {
    camera: CameraLifecycle,
    acquired: AcquiredCamera,
    engine: Box<dyn EngineSession>,
    machine: SessionMachine,
    engine_events: Option<mpsc::UnboundedReceiver<EngineEvent>>,
    timer_tx: mpsc::UnboundedSender<SessionTimer>,
    timer_rx: Option<mpsc::UnboundedReceiver<SessionTimer>>,
    timers: HashMap<SessionTimer, JoinHandle<()>>,
    state_tx: watch::Sender<OrchestrationState>,
    cancellation_token: CancellationToken,
    ready_timeout: Duration,
    final_results: Option<FinalResults>,
    completion_signaled: bool,
}

impl SessionOrchestrator {
    /// Acquire the camera and create the engine session.
    ///
    /// Camera acquisition failures are fatal with no retry loop. If session
    /// creation fails after the camera was granted, the camera is released
    /// before the error propagates; a license-activation failure keeps its
    /// specific actionable message.
    pub async fn new(
        config: &VitascanConfig,
        devices: Arc<dyn MediaDevices>,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self> {
        let camera = CameraLifecycle::new(devices);
        let acquired = camera.acquire(&config.camera.constraints()).await?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let options = config.session_options(acquired.device_id.clone());

        info!(
            device_id = %acquired.device_id,
            duration = ?options.measurement_duration,
            "Creating engine session"
        );

        let engine = match factory
            .create_session(acquired.frame_source.clone(), options, events_tx)
            .await
        {
            Ok(engine) => engine,
            Err(e) => {
                camera.release();
                return Err(VitascanError::Engine(e));
            }
        };

        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(OrchestrationState::default());

        Ok(Self {
            camera,
            acquired,
            engine,
            machine: SessionMachine::new(config.session.measurement_duration()),
            engine_events: Some(events_rx),
            timer_tx,
            timer_rx: Some(timer_rx),
            timers: HashMap::new(),
            state_tx,
            cancellation_token: CancellationToken::new(),
            ready_timeout: config.system.engine_ready_timeout(),
            final_results: None,
            completion_signaled: false,
        })
    }

    /// Identifier of the capture device the session is bound to.
    pub fn device_id(&self) -> &str {
        &self.acquired.device_id
    }

    /// Observe the published orchestration state.
    pub fn subscribe(&self) -> watch::Receiver<OrchestrationState> {
        self.state_tx.subscribe()
    }

    /// Token that cancels the session; `cancel()` on it is the user-exit
    /// entry point and may be invoked from any task.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Drive the session to a terminal outcome.
    ///
    /// Waits (bounded) for the engine to become ready, then processes
    /// engine callbacks and timer firings until the measurement completes,
    /// fails fatally, or is cancelled. All exits run the same atomic
    /// teardown: pending timers stopped, engine terminated best-effort,
    /// camera released, no further state published.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let cancellation = self.cancellation_token.clone();
        let mut engine_events = self
            .engine_events
            .take()
            .ok_or_else(|| VitascanError::system("session event stream already consumed"))?;
        let mut timer_rx = self
            .timer_rx
            .take()
            .ok_or_else(|| VitascanError::system("session timer stream already consumed"))?;

        let ready_deadline = tokio::time::sleep(self.ready_timeout);
        tokio::pin!(ready_deadline);

        loop {
            let loading = self.machine.state().loading;

            tokio::select! {
                _ = cancellation.cancelled() => {
                    info!("Session cancelled by user");
                    self.teardown().await;
                    return Ok(SessionOutcome::Cancelled);
                }
                _ = &mut ready_deadline, if loading => {
                    error!(timeout = ?self.ready_timeout, "Engine never became ready");
                    self.teardown().await;
                    return Err(EngineError::NotReady {
                        timeout: self.ready_timeout,
                    }
                    .into());
                }
                maybe_event = engine_events.recv() => {
                    match maybe_event {
                        Some(event) => self.dispatch(MachineEvent::Engine(event)).await,
                        None => {
                            warn!("Engine event channel closed unexpectedly");
                            self.teardown().await;
                            return Err(VitascanError::system("engine event channel closed"));
                        }
                    }
                }
                Some(timer) = timer_rx.recv() => {
                    self.dispatch(MachineEvent::Timer(timer)).await;
                }
            }

            if self.completion_signaled {
                self.teardown().await;
                return match self.final_results.take() {
                    Some(results) => Ok(SessionOutcome::Completed(results)),
                    None => Err(VitascanError::system(
                        "completion signaled without final results",
                    )),
                };
            }

            if let Some(alert) = self.machine.state().last_error.filter(|alert| alert.fatal) {
                self.teardown().await;
                return Ok(SessionOutcome::Failed(alert));
            }
        }
    }

    async fn dispatch(&mut self, event: MachineEvent) {
        if let MachineEvent::Engine(engine_event) = &event {
            debug!(event = engine_event.event_type(), "{}", engine_event.description());

            match engine_event {
                EngineEvent::FinalResults(results) => {
                    info!(metrics = results.metric_count(), "Final results received");
                    self.final_results = Some(results.clone());
                }
                EngineEvent::Warning { code, domain } => {
                    let alert = classify(*code, *domain);
                    warn!(code = *code, domain = %domain, cause = alert.cause, "Engine warning");
                }
                EngineEvent::Error { code, domain, message } => {
                    if *domain == ErrorDomain::Session {
                        // Illegal start/stop means the orchestration itself
                        // violated the engine contract.
                        error!(code = *code, message = %message, "Session invariant violation");
                    } else {
                        warn!(code = *code, domain = %domain, message = %message, "Engine error");
                    }
                }
                _ => {}
            }
        }

        let effects = self.machine.handle(event, Instant::now());
        self.apply_effects(effects).await;

        let _ = self.state_tx.send(self.machine.state().clone());
    }

    async fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartEngine => {
                    debug!("Starting measurement");
                    if let Err(e) = self.engine.start().await {
                        warn!("Engine start failed: {}", e);
                    }
                }
                Effect::StopEngine => {
                    debug!("Stopping measurement");
                    if let Err(e) = self.engine.stop().await {
                        warn!("Engine stop failed: {}", e);
                    }
                }
                Effect::ReleaseCamera => {
                    self.camera.release();
                }
                Effect::Schedule(timer) => {
                    self.schedule(timer);
                }
                Effect::CancelTimer(timer) => {
                    if let Some(handle) = self.timers.remove(&timer) {
                        handle.abort();
                    }
                }
                Effect::SignalCompletion => {
                    info!("Measurement complete");
                    self.completion_signaled = true;
                }
            }
        }
    }

    fn schedule(&mut self, timer: SessionTimer) {
        let delay = match timer {
            SessionTimer::AutoStart => AUTO_START_DELAY,
            SessionTimer::Restart => RESTART_DELAY,
            SessionTimer::FaceLoss => FACE_LOSS_GRACE,
            SessionTimer::CompletionAck => COMPLETION_ACK_DELAY,
        };

        debug!(?timer, ?delay, "Scheduling timer");
        let timer_tx = self.timer_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = timer_tx.send(timer);
        });

        if let Some(previous) = self.timers.insert(timer, handle) {
            previous.abort();
        }
    }

    /// Atomic teardown: no partial exits.
    async fn teardown(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }

        if let Err(e) = self.engine.terminate().await {
            warn!("Engine terminate failed during teardown: {}", e);
        }

        self.camera.release();
    }
}
