use tierconfig::ParticleTiers;

use crate::capability::CapabilitySnapshot;

/// Particle population for a backend, fixed at construction.
pub fn particle_budget(
    snapshot: &CapabilitySnapshot,
    viewport_width: u32,
    tiers: &ParticleTiers,
) -> u32 {
    let count = if snapshot.is_low_end {
        tiers.low_end
    } else if snapshot.is_mobile {
        tiers.mobile
    } else {
        tiers.desktop
    };
    if viewport_width < tiers.viewport_threshold {
        count.min(tiers.mobile)
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(is_low_end: bool, is_mobile: bool) -> CapabilitySnapshot {
        CapabilitySnapshot {
            is_low_end,
            is_mobile,
            ..CapabilitySnapshot::default()
        }
    }

    #[test]
    fn picks_tier_by_device_class() {
        let tiers = ParticleTiers::default();
        assert_eq!(particle_budget(&snapshot(true, true), 1920, &tiers), 200);
        assert_eq!(particle_budget(&snapshot(false, true), 1920, &tiers), 400);
        assert_eq!(particle_budget(&snapshot(false, false), 1920, &tiers), 800);
    }

    #[test]
    fn narrow_viewport_caps_at_mobile_count() {
        let tiers = ParticleTiers::default();
        assert_eq!(particle_budget(&snapshot(false, false), 767, &tiers), 400);
        assert_eq!(particle_budget(&snapshot(false, false), 768, &tiers), 800);
        assert_eq!(particle_budget(&snapshot(true, false), 320, &tiers), 200);
    }
}
