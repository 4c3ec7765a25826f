use serde::Serialize;

/// Device capabilities captured once at startup.
///
/// Only `battery_level` may change afterwards, when the asynchronous battery
/// query answers late.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CapabilitySnapshot {
    pub is_low_end: bool,
    pub is_mobile: bool,
    pub supports_gpu_compute: bool,
    pub prefers_reduced_motion: bool,
    pub has_good_gpu: bool,
    pub battery_level: Option<f32>,
}

impl CapabilitySnapshot {
    pub fn with_battery_level(mut self, level: Option<f32>) -> Self {
        self.battery_level = level.map(|value| value.clamp(0.0, 1.0));
        self
    }

    pub fn battery_below(&self, threshold: f32) -> bool {
        self.battery_level.is_some_and(|level| level < threshold)
    }
}
