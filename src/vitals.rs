use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Biological sex, as supplied by the (already validated) user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokingStatus {
    NonSmoker,
    Smoker,
}

/// Optional subject profile forwarded to the engine.
///
/// Absence of the whole record, or of the optional fields, is legal; the
/// engine then skips the derived metrics that depend on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub sex: Sex,
    pub age: u32,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub smoking_status: Option<SmokingStatus>,
}

/// A periodic partial result emitted while the engine is analyzing frames.
///
/// Fields fill in incrementally as the measurement progresses; an empty
/// tick is still meaningful as a processing heartbeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSign {
    pub pulse_rate: Option<f64>,
    pub respiration_rate: Option<f64>,
    pub stress_level: Option<f64>,
}

/// Systolic/diastolic pair in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

/// The engine's final measurement report.
///
/// Every metric is optional: a partial vital-sign failure degrades the
/// report rather than failing the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResults {
    pub measurement_id: Uuid,
    pub measured_at: DateTime<Utc>,
    pub pulse_rate: Option<f64>,
    pub respiration_rate: Option<f64>,
    pub stress_level: Option<f64>,
    pub blood_pressure: Option<BloodPressure>,
    pub sdnn: Option<f64>,
    pub prq: Option<f64>,
    pub wellness_index: Option<f64>,
    pub hemoglobin: Option<f64>,
    pub hemoglobin_a1c: Option<f64>,
}

impl FinalResults {
    /// Create an empty report stamped with a fresh measurement id.
    pub fn empty() -> Self {
        Self {
            measurement_id: Uuid::new_v4(),
            measured_at: Utc::now(),
            pulse_rate: None,
            respiration_rate: None,
            stress_level: None,
            blood_pressure: None,
            sdnn: None,
            prq: None,
            wellness_index: None,
            hemoglobin: None,
            hemoglobin_a1c: None,
        }
    }

    /// Count of metrics actually delivered.
    pub fn metric_count(&self) -> usize {
        [
            self.pulse_rate.is_some(),
            self.respiration_rate.is_some(),
            self.stress_level.is_some(),
            self.blood_pressure.is_some(),
            self.sdnn.is_some(),
            self.prq.is_some(),
            self.wellness_index.is_some(),
            self.hemoglobin.is_some(),
            self.hemoglobin_a1c.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_has_no_metrics() {
        let results = FinalResults::empty();
        assert_eq!(results.metric_count(), 0);
    }

    #[test]
    fn metric_count_tracks_filled_fields() {
        let mut results = FinalResults::empty();
        results.pulse_rate = Some(72.0);
        results.blood_pressure = Some(BloodPressure {
            systolic: 120,
            diastolic: 80,
        });
        assert_eq!(results.metric_count(), 2);
    }

    #[test]
    fn subject_info_serializes_with_snake_case_fields() {
        let subject = SubjectInfo {
            sex: Sex::Female,
            age: 34,
            weight_kg: Some(61.5),
            height_cm: None,
            smoking_status: Some(SmokingStatus::NonSmoker),
        };

        let json = serde_json::to_string(&subject).unwrap();
        assert!(json.contains("\"sex\":\"female\""));
        assert!(json.contains("\"smoking_status\":\"non_smoker\""));
    }
}
