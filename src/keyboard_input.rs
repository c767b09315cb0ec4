use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Keyboard hook for the CLI: lets the user cancel a running measurement.
///
/// `q` or `Esc` cancels the session token, which triggers the
/// orchestrator's atomic teardown.
pub struct KeyboardCancelHandler {
    session_token: CancellationToken,
    shutdown_token: CancellationToken,
}

impl KeyboardCancelHandler {
    pub fn new(session_token: CancellationToken) -> Self {
        Self {
            session_token,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input.
    pub async fn start(&self) -> Result<()> {
        info!("Keyboard handler active - press 'q' or Esc to cancel the measurement");

        let session_token = self.session_token.clone();
        let shutdown_token = self.shutdown_token.clone();

        // Raw-mode polling has to live on a blocking thread.
        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            loop {
                if shutdown_token.is_cancelled() || session_token.is_cancelled() {
                    debug!("Keyboard handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        if let Ok(Event::Key(key_event)) = event::read() {
                            if key_event.kind != KeyEventKind::Press {
                                continue;
                            }

                            match key_event.code {
                                KeyCode::Char('q') | KeyCode::Esc => {
                                    info!("Cancel requested via keyboard");
                                    session_token.cancel();
                                    break;
                                }
                                _ => {
                                    debug!("Key pressed: {:?}", key_event.code);
                                }
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            }
        });

        Ok(())
    }

    /// Stop the keyboard handler.
    pub async fn stop(&self) -> Result<()> {
        self.shutdown_token.cancel();

        // Give the blocking task a moment to restore the terminal.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }
}
