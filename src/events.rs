use crate::classifier::ErrorDomain;
use crate::engine::{FaceValidity, SessionState};
use crate::vitals::{FinalResults, VitalSign};
use serde::Serialize;

/// Asynchronous callbacks emitted by the engine session.
///
/// Delivery order is guaranteed within one callback source (validity
/// callbacks follow frame capture order) but not across sources: a state
/// change may arrive before or after the first validity callback for the
/// same frame.
#[derive(Debug, Clone, Serialize)]
pub enum EngineEvent {
    /// The engine session moved to a new lifecycle state.
    StateChanged(SessionState),
    /// Per-frame face validity classification.
    ImageData(FaceValidity),
    /// Periodic partial result; the authoritative signal that frames are
    /// being actively analyzed.
    VitalSign(VitalSign),
    /// The measurement finished and produced its final report.
    FinalResults(FinalResults),
    /// The engine reported an error.
    Error {
        code: i32,
        domain: ErrorDomain,
        message: String,
    },
    /// The engine reported a non-blocking warning.
    Warning { code: i32, domain: ErrorDomain },
}

impl EngineEvent {
    /// Get the event type as a string for filtering and logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::StateChanged(_) => "state_changed",
            EngineEvent::ImageData(_) => "image_data",
            EngineEvent::VitalSign(_) => "vital_sign",
            EngineEvent::FinalResults(_) => "final_results",
            EngineEvent::Error { .. } => "error",
            EngineEvent::Warning { .. } => "warning",
        }
    }

    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            EngineEvent::StateChanged(state) => format!("Session state changed to {}", state),
            EngineEvent::ImageData(validity) => format!("Frame validity: {:?}", validity),
            EngineEvent::VitalSign(vitals) => match vitals.pulse_rate {
                Some(pulse) => format!("Vitals tick (pulse {:.0})", pulse),
                None => "Vitals tick".to_string(),
            },
            EngineEvent::FinalResults(results) => {
                format!("Final results with {} metrics", results.metric_count())
            }
            EngineEvent::Error {
                code,
                domain,
                message,
            } => format!("Engine error {} in {} domain: {}", code, domain, message),
            EngineEvent::Warning { code, domain } => {
                format!("Engine warning {} in {} domain", code, domain)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_covers_all_variants() {
        assert_eq!(
            EngineEvent::StateChanged(SessionState::Active).event_type(),
            "state_changed"
        );
        assert_eq!(
            EngineEvent::ImageData(FaceValidity::Valid).event_type(),
            "image_data"
        );
        assert_eq!(
            EngineEvent::VitalSign(VitalSign::default()).event_type(),
            "vital_sign"
        );
        assert_eq!(
            EngineEvent::Error {
                code: 3003,
                domain: ErrorDomain::Measurement,
                message: "interrupted".to_string(),
            }
            .event_type(),
            "error"
        );
    }

    #[test]
    fn error_description_includes_code_and_domain() {
        let event = EngineEvent::Error {
            code: 2007,
            domain: ErrorDomain::License,
            message: "activation failed".to_string(),
        };

        let description = event.description();
        assert!(description.contains("2007"));
        assert!(description.contains("license"));
        assert!(description.contains("activation failed"));
    }
}
