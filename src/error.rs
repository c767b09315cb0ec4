use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VitascanError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("System error: {message}")]
    System { message: String },
}

/// Failures while acquiring or releasing the capture device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Media capture is not supported on this device")]
    NotSupported,

    #[error("Camera permission denied by the user or platform")]
    PermissionDenied,

    #[error("Camera device unavailable: {details}")]
    DeviceUnavailable { details: String },

    #[error("No capture device matched the requested constraints")]
    NoDevice,
}

/// Failures reported by the analysis engine session handle itself.
///
/// Runtime errors arriving through the engine's error callback are not
/// represented here; those carry raw codes and go through the classifier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine session creation failed: {details}")]
    SessionCreation { details: String },

    #[error("License activation failed: {details}. Check the license key and network connectivity, then reload.")]
    LicenseActivation { details: String },

    #[error("Engine did not become ready within {timeout:?}")]
    NotReady { timeout: Duration },

    #[error("Engine {operation} call failed: {details}")]
    Operation {
        operation: &'static str,
        details: String,
    },
}

impl VitascanError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    /// Whether the session could meaningfully be retried after this error.
    ///
    /// Camera acquisition failures and license problems require the user to
    /// fix their environment first; everything else may be retried.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Camera(_) => false,
            Self::Engine(EngineError::LicenseActivation { .. }) => false,
            Self::Config(_) => false,
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, VitascanError>;
