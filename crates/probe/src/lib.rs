//! Capability detection: turns host signals into a [`CapabilitySnapshot`].
//!
//! Detection is synchronous except for the battery level, which arrives
//! through a [`BatteryQuery`] and may land after selection has happened.

mod battery;
mod gpu;

use std::time::Duration;

use selector::CapabilitySnapshot;
use tierconfig::DetectSettings;
use tracing::debug;

pub use battery::{read_battery_level, BatteryPoll, BatteryQuery, NEUTRAL_LEVEL, POWER_SUPPLY_ROOT};
pub use gpu::{vendor_name, DisabledProbe, GpuProbe, GpuReport, WgpuProbe};

pub const REDUCED_MOTION_ENV: &str = "SKYFIELD_REDUCED_MOTION";

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("GPU probing disabled")]
    Disabled,
    #[error("no GPU adapter: {0}")]
    NoAdapter(String),
    #[error("GPU probe did not answer within {0:?}")]
    Timeout(Duration),
    #[error("failed to spawn probe thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("battery query failed: {0}")]
    Battery(String),
}

/// Host signals the detector reads.
pub trait Environment {
    fn hardware_concurrency(&self) -> Option<usize>;
    /// Viewport width in logical pixels.
    fn viewport_width(&self) -> u32;
    /// Platform identifier, e.g. `linux` or `android`.
    fn platform(&self) -> &str;
    fn prefers_reduced_motion(&self) -> bool;
}

/// Values forced from the command line or tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub cores: Option<usize>,
    pub mobile: bool,
    pub reduced_motion: bool,
    pub battery: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct HostEnvironment {
    viewport_width: u32,
    reduced_motion: bool,
    cores: Option<usize>,
    platform: String,
}

impl HostEnvironment {
    pub fn new(viewport_width: u32, settings: &DetectSettings, overrides: &Overrides) -> Self {
        let platform = if overrides.mobile {
            settings
                .mobile_platforms
                .first()
                .cloned()
                .unwrap_or_else(|| "android".into())
        } else {
            std::env::consts::OS.to_string()
        };
        Self {
            viewport_width,
            reduced_motion: overrides.reduced_motion
                || settings.reduced_motion
                || env_flag(REDUCED_MOTION_ENV),
            cores: overrides
                .cores
                .or_else(|| std::thread::available_parallelism().ok().map(usize::from)),
            platform,
        }
    }
}

impl Environment for HostEnvironment {
    fn hardware_concurrency(&self) -> Option<usize> {
        self.cores
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

pub struct CapabilityDetector {
    settings: DetectSettings,
    gpu: Box<dyn GpuProbe>,
}

impl CapabilityDetector {
    pub fn new(settings: DetectSettings, gpu: Box<dyn GpuProbe>) -> Self {
        Self { settings, gpu }
    }

    /// Detector wired to wgpu, or to nothing when probing is switched off.
    pub fn from_settings(settings: &DetectSettings) -> Self {
        let gpu: Box<dyn GpuProbe> = if settings.gpu_probe {
            Box::new(WgpuProbe::new(settings.probe_timeout))
        } else {
            Box::new(DisabledProbe)
        };
        Self::new(settings.clone(), gpu)
    }

    /// Synchronous snapshot; `battery_level` is left unknown.
    pub fn detect(&self, env: &dyn Environment) -> CapabilitySnapshot {
        self.detect_with_report(env).0
    }

    pub fn detect_with_report(&self, env: &dyn Environment) -> (CapabilitySnapshot, Option<GpuReport>) {
        // Unknown core counts are treated as capable, like a missing signal.
        let is_low_end = env
            .hardware_concurrency()
            .is_some_and(|cores| cores <= self.settings.low_end_cores);
        let is_mobile = env.viewport_width() < self.settings.mobile_max_width
            || self.is_mobile_platform(env.platform());

        let report = match self.gpu.probe() {
            Ok(report) => {
                debug!(
                    name = %report.name,
                    vendor = %report.vendor,
                    backend = %report.backend,
                    compute = report.supports_compute,
                    "GPU probe finished"
                );
                Some(report)
            }
            Err(err) => {
                debug!(error = %err, "GPU probe failed; assuming no usable GPU");
                None
            }
        };
        let supports_gpu_compute = report.as_ref().is_some_and(|report| report.supports_compute);
        let has_good_gpu = report
            .as_ref()
            .is_some_and(|report| report.matches_any(&self.settings.good_gpu_tokens));

        let snapshot = CapabilitySnapshot {
            is_low_end,
            is_mobile,
            supports_gpu_compute,
            prefers_reduced_motion: env.prefers_reduced_motion(),
            has_good_gpu,
            battery_level: None,
        };
        (snapshot, report)
    }

    fn is_mobile_platform(&self, platform: &str) -> bool {
        let platform = platform.to_lowercase();
        self.settings
            .mobile_platforms
            .iter()
            .any(|token| platform.contains(&token.to_lowercase()))
    }
}
