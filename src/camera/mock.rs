use super::media::{
    FacingMode, MediaDeviceInfo, MediaDevices, MediaStream, MediaTrack, StreamConstraints,
    TrackSettings,
};
use crate::error::CameraError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory media device API for the simulator and tests.
///
/// Supports failure injection (unsupported platform, permission denial,
/// busy device) and counts track stops so release idempotence is checkable.
pub struct MockMediaDevices {
    supported: bool,
    fail_open: Option<CameraError>,
    devices: Vec<MediaDeviceInfo>,
    report_facing: bool,
    report_device_id: bool,
    stop_counter: Arc<AtomicUsize>,
}

pub struct MockMediaDevicesBuilder {
    supported: bool,
    fail_open: Option<CameraError>,
    devices: Vec<MediaDeviceInfo>,
    report_facing: bool,
    report_device_id: bool,
}

impl MockMediaDevicesBuilder {
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_open: None,
            devices: vec![MediaDeviceInfo {
                device_id: "mock-camera-0".to_string(),
                label: "Simulated rear camera".to_string(),
                facing: Some(FacingMode::Environment),
            }],
            report_facing: true,
            report_device_id: true,
        }
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub fn fail_open(mut self, error: CameraError) -> Self {
        self.fail_open = Some(error);
        self
    }

    pub fn devices(mut self, devices: Vec<MediaDeviceInfo>) -> Self {
        self.devices = devices;
        self
    }

    /// Simulate a platform that hides the granted track's facing mode.
    pub fn without_facing_report(mut self) -> Self {
        self.report_facing = false;
        self
    }

    /// Simulate a platform that hides the granted track's device id.
    pub fn without_device_id_report(mut self) -> Self {
        self.report_device_id = false;
        self
    }

    pub fn build(self) -> MockMediaDevices {
        MockMediaDevices {
            supported: self.supported,
            fail_open: self.fail_open,
            devices: self.devices,
            report_facing: self.report_facing,
            report_device_id: self.report_device_id,
            stop_counter: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for MockMediaDevicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaDevices {
    pub fn builder() -> MockMediaDevicesBuilder {
        MockMediaDevicesBuilder::new()
    }

    /// Total number of `stop()` calls across all granted tracks.
    pub fn track_stop_count(&self) -> usize {
        self.stop_counter.load(Ordering::Relaxed)
    }
}

struct MockTrack {
    settings: TrackSettings,
    stop_counter: Arc<AtomicUsize>,
    stopped: Mutex<bool>,
}

impl MediaTrack for MockTrack {
    fn settings(&self) -> TrackSettings {
        self.settings.clone()
    }

    fn stop(&self) {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            *stopped = true;
            self.stop_counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl MediaDevices for MockMediaDevices {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn open(&self, constraints: &StreamConstraints) -> Result<MediaStream, CameraError> {
        if let Some(error) = &self.fail_open {
            return Err(error.clone());
        }

        let granted = self
            .devices
            .iter()
            .find(|device| device.facing == Some(constraints.facing))
            .or_else(|| self.devices.first())
            .ok_or(CameraError::NoDevice)?;

        let track = MockTrack {
            settings: TrackSettings {
                device_id: if self.report_device_id {
                    granted.device_id.clone()
                } else {
                    String::new()
                },
                facing: if self.report_facing {
                    granted.facing
                } else {
                    None
                },
                width: constraints.width,
                height: constraints.height,
            },
            stop_counter: Arc::clone(&self.stop_counter),
            stopped: Mutex::new(false),
        };

        Ok(MediaStream::new(vec![Box::new(track)]))
    }

    async fn enumerate(&self) -> Result<Vec<MediaDeviceInfo>, CameraError> {
        Ok(self.devices.clone())
    }
}
