use crate::camera::{FacingMode, StreamConstraints};
use crate::engine::{DeviceOrientation, SessionOptions};
use crate::vitals::{Sex, SmokingStatus, SubjectInfo};
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VitascanConfig {
    pub camera: CameraConfig,
    pub session: SessionConfig,
    /// Optional pre-validated subject profile; omit the table entirely to
    /// measure anonymously.
    pub subject: Option<SubjectConfig>,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Preferred camera direction; the platform may grant another device.
    #[serde(default = "default_camera_facing")]
    pub facing: FacingMode,

    /// Requested capture resolution (width, height)
    #[serde(default = "default_camera_width")]
    pub width: u32,

    #[serde(default = "default_camera_height")]
    pub height: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Target measurement duration in seconds
    #[serde(default = "default_measurement_seconds")]
    pub measurement_seconds: u32,

    /// Whether the engine should enforce strict face-position guidance
    #[serde(default = "default_strict_guidance")]
    pub strict_guidance: bool,

    /// Device orientation the session is calibrated for
    #[serde(default = "default_orientation")]
    pub orientation: DeviceOrientation,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubjectConfig {
    pub sex: Sex,
    pub age: u32,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub smoking_status: Option<SmokingStatus>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Ceiling on waiting for the engine to become ready, in seconds
    #[serde(default = "default_engine_ready_timeout_seconds")]
    pub engine_ready_timeout_seconds: u32,
}

impl VitascanConfig {
    /// Load configuration from the default file location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("vitascan.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.facing", "environment")?
            .set_default("camera.width", default_camera_width())?
            .set_default("camera.height", default_camera_height())?
            .set_default("session.measurement_seconds", default_measurement_seconds())?
            .set_default("session.strict_guidance", default_strict_guidance())?
            .set_default("session.orientation", "portrait")?
            .set_default(
                "system.engine_ready_timeout_seconds",
                default_engine_ready_timeout_seconds(),
            )?
            .add_source(File::with_name(&path_str).required(false))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate field ranges beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Message(
                "camera resolution must be non-zero".to_string(),
            ));
        }

        if !(10..=300).contains(&self.session.measurement_seconds) {
            return Err(ConfigError::Message(
                "session.measurement_seconds must be between 10 and 300".to_string(),
            ));
        }

        if self.system.engine_ready_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "system.engine_ready_timeout_seconds must be at least 1".to_string(),
            ));
        }

        if let Some(subject) = &self.subject {
            if !(1..=120).contains(&subject.age) {
                return Err(ConfigError::Message(
                    "subject.age must be between 1 and 120".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Engine session parameters for the granted capture device.
    pub fn session_options(&self, camera_device_id: String) -> SessionOptions {
        SessionOptions {
            camera_device_id,
            measurement_duration: self.session.measurement_duration(),
            subject_info: self.subject.as_ref().map(SubjectConfig::to_subject_info),
            orientation: self.session.orientation,
            strict_guidance: self.session.strict_guidance,
        }
    }
}

impl CameraConfig {
    pub fn constraints(&self) -> StreamConstraints {
        StreamConstraints {
            facing: self.facing,
            width: self.width,
            height: self.height,
        }
    }
}

impl SessionConfig {
    pub fn measurement_duration(&self) -> Duration {
        Duration::from_secs(self.measurement_seconds as u64)
    }
}

impl SubjectConfig {
    fn to_subject_info(&self) -> SubjectInfo {
        SubjectInfo {
            sex: self.sex,
            age: self.age,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            smoking_status: self.smoking_status,
        }
    }
}

impl SystemConfig {
    pub fn engine_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_ready_timeout_seconds as u64)
    }
}

fn default_camera_facing() -> FacingMode {
    FacingMode::Environment
}

fn default_camera_width() -> u32 {
    1280
}

fn default_camera_height() -> u32 {
    720
}

fn default_measurement_seconds() -> u32 {
    50
}

fn default_strict_guidance() -> bool {
    true
}

fn default_orientation() -> DeviceOrientation {
    DeviceOrientation::Portrait
}

fn default_engine_ready_timeout_seconds() -> u32 {
    10
}

/// Default configuration in TOML form, for `--print-config`.
pub fn default_config_toml() -> &'static str {
    r#"# Vitascan Configuration File
# This is the default configuration with all available options

[camera]
# Preferred camera direction: "user" (front) or "environment" (rear)
facing = "environment"
# Requested capture resolution
width = 1280
height = 720

[session]
# Target measurement duration in seconds
measurement_seconds = 50
# Enforce strict face-position guidance in the engine
strict_guidance = true
# Device orientation: "portrait" or "landscape"
orientation = "portrait"

# Optional subject profile; omit the table to measure anonymously.
# [subject]
# sex = "female"            # "male" or "female"
# age = 34
# weight_kg = 61.5
# height_cm = 168.0
# smoking_status = "non_smoker"

[system]
# Ceiling on waiting for the engine to become ready, in seconds
engine_ready_timeout_seconds = 10
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let config = VitascanConfig::load_from_file("/nonexistent/vitascan.toml").unwrap();
        assert_eq!(config.camera.facing, FacingMode::Environment);
        assert_eq!(config.session.measurement_seconds, 50);
        assert!(config.subject.is_none());
        assert_eq!(config.system.engine_ready_timeout_seconds, 10);
        config.validate().unwrap();
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vitascan.toml");
        std::fs::write(
            &path,
            r#"
[camera]
facing = "user"
width = 640
height = 480

[session]
measurement_seconds = 120

[subject]
sex = "male"
age = 42
"#,
        )
        .unwrap();

        let config = VitascanConfig::load_from_file(&path).unwrap();
        assert_eq!(config.camera.facing, FacingMode::User);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.session.measurement_seconds, 120);
        assert!(config.session.strict_guidance); // default preserved

        let subject = config.subject.unwrap();
        assert_eq!(subject.age, 42);
        assert!(subject.weight_kg.is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_duration() {
        let mut config = VitascanConfig::load_from_file("/nonexistent/vitascan.toml").unwrap();
        config.session.measurement_seconds = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_resolution() {
        let mut config = VitascanConfig::load_from_file("/nonexistent/vitascan.toml").unwrap();
        config.camera.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_options_carry_subject_info() {
        let mut config = VitascanConfig::load_from_file("/nonexistent/vitascan.toml").unwrap();
        config.subject = Some(SubjectConfig {
            sex: Sex::Female,
            age: 29,
            weight_kg: Some(58.0),
            height_cm: None,
            smoking_status: None,
        });

        let options = config.session_options("camera-1".to_string());
        assert_eq!(options.camera_device_id, "camera-1");
        assert_eq!(options.measurement_duration, Duration::from_secs(50));
        assert_eq!(options.subject_info.unwrap().age, 29);
    }

    #[test]
    fn default_config_toml_parses_back() {
        let parsed: toml::Value = toml::from_str(default_config_toml()).unwrap();
        assert!(parsed.get("camera").is_some());
        assert!(parsed.get("session").is_some());
        assert!(parsed.get("system").is_some());
    }
}
