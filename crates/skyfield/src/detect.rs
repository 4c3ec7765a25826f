use probe::{BatteryPoll, BatteryQuery, CapabilityDetector, GpuReport, HostEnvironment};
use selector::CapabilitySnapshot;
use tracing::debug;

use crate::settings::Settings;

pub struct Detection {
    pub snapshot: CapabilitySnapshot,
    pub gpu: Option<GpuReport>,
    /// Battery query that had not answered within the wait budget.
    pub pending_battery: Option<BatteryQuery>,
}

/// Builds the snapshot for a viewport `viewport_width` logical pixels wide.
/// The battery reading gets `detect.battery_wait` to arrive; a slower one is
/// handed back so the caller can refine the snapshot later.
pub fn detect(settings: &Settings, viewport_width: u32) -> Detection {
    let detect = &settings.config.detect;
    let env = HostEnvironment::new(viewport_width, detect, &settings.overrides);
    let detector = CapabilityDetector::from_settings(detect);
    let (snapshot, gpu) = detector.detect_with_report(&env);

    if let Some(level) = settings.overrides.battery {
        return Detection {
            snapshot: snapshot.with_battery_level(Some(level)),
            gpu,
            pending_battery: None,
        };
    }

    let query = BatteryQuery::spawn();
    let (snapshot, pending_battery) = match query.wait(detect.battery_wait) {
        BatteryPoll::Ready(level) => (snapshot.with_battery_level(Some(level)), None),
        BatteryPoll::Pending => {
            debug!(wait = ?detect.battery_wait, "battery level not ready; selecting without it");
            (snapshot, Some(query))
        }
        BatteryPoll::Gone => (snapshot, None),
    };
    Detection {
        snapshot,
        gpu,
        pending_battery,
    }
}
