use serde::Serialize;
use std::fmt;

/// Domain of an engine-reported error or warning code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDomain {
    Device,
    Camera,
    License,
    Measurement,
    VitalSigns,
    Session,
    Initialization,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorDomain::Device => "device",
            ErrorDomain::Camera => "camera",
            ErrorDomain::License => "license",
            ErrorDomain::Measurement => "measurement",
            ErrorDomain::VitalSigns => "vital_signs",
            ErrorDomain::Session => "session",
            ErrorDomain::Initialization => "initialization",
        };
        write!(f, "{}", name)
    }
}

/// Classified engine error, ready for the UI layer.
///
/// Immutable; constructed exclusively by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorAlert {
    pub code: i32,
    pub domain: ErrorDomain,
    pub cause: &'static str,
    pub user_message: &'static str,
    pub retryable: bool,
    pub fatal: bool,
}

impl ErrorAlert {
    const fn new(
        code: i32,
        domain: ErrorDomain,
        cause: &'static str,
        user_message: &'static str,
        retryable: bool,
        fatal: bool,
    ) -> Self {
        Self {
            code,
            domain,
            cause,
            user_message,
            retryable,
            fatal,
        }
    }
}

/// Map a raw engine error code to a classified alert.
///
/// Pure lookup: the same input always yields the same alert, and unknown
/// codes fall back to a per-domain generic bucket instead of panicking.
pub fn classify(code: i32, domain: ErrorDomain) -> ErrorAlert {
    match code {
        // 1xxx — device environment
        1001 => ErrorAlert::new(
            code,
            ErrorDomain::Device,
            "unsupported operating system",
            "This device's operating system is not supported.",
            false,
            true,
        ),
        1002 => ErrorAlert::new(
            code,
            ErrorDomain::Device,
            "unsupported browser",
            "This browser is not supported. Try the latest Chrome or Safari.",
            false,
            true,
        ),
        1003 => ErrorAlert::new(
            code,
            ErrorDomain::Device,
            "device clock skew",
            "The device clock appears to be wrong. Fix the date and time, then retry.",
            false,
            true,
        ),

        // 2xxx — licensing and authentication
        2001 => ErrorAlert::new(
            code,
            ErrorDomain::License,
            "invalid license key",
            "The measurement service license is invalid. Contact support.",
            false,
            true,
        ),
        2003 => ErrorAlert::new(
            code,
            ErrorDomain::License,
            "license expired",
            "The measurement service license has expired. Contact support.",
            false,
            true,
        ),
        2004 => ErrorAlert::new(
            code,
            ErrorDomain::License,
            "measurement quota exceeded",
            "The measurement quota for this license has been used up.",
            false,
            true,
        ),
        2007 => ErrorAlert::new(
            code,
            ErrorDomain::License,
            "license activation failed",
            "Could not activate the measurement service. Check connectivity and reload.",
            false,
            true,
        ),
        2008 => ErrorAlert::new(
            code,
            ErrorDomain::License,
            "authentication network failure",
            "Could not reach the license server. Check connectivity and reload.",
            false,
            true,
        ),

        // 3xxx — measurement quality (recoverable; absorbed by the orchestrator)
        3001 => ErrorAlert::new(
            code,
            ErrorDomain::Measurement,
            "face lost during measurement",
            "We lost sight of your face. Center it in the frame to continue.",
            true,
            false,
        ),
        3002 => ErrorAlert::new(
            code,
            ErrorDomain::Measurement,
            "frame order anomaly",
            "The video feed stuttered. Hold the device steady and try again.",
            true,
            false,
        ),
        3003 => ErrorAlert::new(
            code,
            ErrorDomain::Measurement,
            "measurement interrupted",
            "The measurement was interrupted. Keep your face centered and still.",
            true,
            false,
        ),
        3004 => ErrorAlert::new(
            code,
            ErrorDomain::Measurement,
            "face detection rate too low",
            "We could not see your face clearly enough. Improve lighting and retry.",
            true,
            false,
        ),

        // 4xxx — camera
        4001 => ErrorAlert::new(
            code,
            ErrorDomain::Camera,
            "no camera found",
            "No camera was found on this device.",
            false,
            true,
        ),
        4002 => ErrorAlert::new(
            code,
            ErrorDomain::Camera,
            "camera open failure",
            "The camera could not be opened. Close other apps using it and retry.",
            false,
            true,
        ),
        4003 => ErrorAlert::new(
            code,
            ErrorDomain::Camera,
            "camera permission denied",
            "Camera access was denied. Allow camera access in your settings.",
            false,
            true,
        ),

        // 5xxx — individual vital signs (degrade gracefully)
        5001 => ErrorAlert::new(
            code,
            ErrorDomain::VitalSigns,
            "metric computation failed",
            "Some readings could not be computed; the rest are unaffected.",
            true,
            false,
        ),

        // 6xxx — illegal session API usage (orchestration defect)
        6001 => ErrorAlert::new(
            code,
            ErrorDomain::Session,
            "start called in illegal state",
            "An internal error occurred. Please restart the measurement.",
            true,
            false,
        ),
        6002 => ErrorAlert::new(
            code,
            ErrorDomain::Session,
            "stop called in illegal state",
            "An internal error occurred. Please restart the measurement.",
            true,
            false,
        ),

        // 7xxx — engine initialization
        7001 => ErrorAlert::new(
            code,
            ErrorDomain::Initialization,
            "invalid engine configuration",
            "The measurement service is misconfigured. Reload the page.",
            false,
            true,
        ),
        7002 => ErrorAlert::new(
            code,
            ErrorDomain::Initialization,
            "engine load failure",
            "The measurement service failed to load. Reload the page.",
            false,
            true,
        ),
        7003 => ErrorAlert::new(
            code,
            ErrorDomain::Initialization,
            "engine memory allocation failure",
            "The device ran out of memory. Close other apps and reload.",
            false,
            true,
        ),

        _ => fallback(code, domain),
    }
}

/// Generic per-domain bucket for codes the table does not know.
fn fallback(code: i32, domain: ErrorDomain) -> ErrorAlert {
    let (cause, user_message) = match domain {
        ErrorDomain::Device => (
            "unrecognized device error",
            "This device cannot run the measurement.",
        ),
        ErrorDomain::Camera => (
            "unrecognized camera error",
            "A camera problem stopped the measurement.",
        ),
        ErrorDomain::License => (
            "unrecognized license error",
            "The measurement service license could not be verified.",
        ),
        ErrorDomain::Measurement => (
            "unrecognized measurement error",
            "The measurement was interrupted. Please try again.",
        ),
        ErrorDomain::VitalSigns => (
            "unrecognized vital-sign error",
            "Some readings could not be computed; the rest are unaffected.",
        ),
        ErrorDomain::Session => (
            "unrecognized session error",
            "An internal error occurred. Please restart the measurement.",
        ),
        ErrorDomain::Initialization => (
            "unrecognized initialization error",
            "The measurement service failed to start. Reload the page.",
        ),
    };

    let fatal = matches!(
        domain,
        ErrorDomain::Device | ErrorDomain::Camera | ErrorDomain::License | ErrorDomain::Initialization
    );

    ErrorAlert {
        code,
        domain,
        cause,
        user_message,
        retryable: domain != ErrorDomain::License,
        fatal,
    }
}
