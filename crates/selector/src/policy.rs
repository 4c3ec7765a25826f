//! Ordered decision table mapping a capability snapshot to a tier.
//!
//! Rules are evaluated top to bottom and the first match wins. The GPU rule
//! is special: it only asks for an attempt, and once that attempt has failed
//! evaluation resumes below it.

use rand::seq::SliceRandom;
use rand::Rng;
use tierconfig::PolicySettings;

use crate::capability::CapabilitySnapshot;
use crate::tier::{GpuVariant, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Settle(Tier),
    AttemptGpu,
}

pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&CapabilitySnapshot, &PolicySettings) -> bool,
    pub outcome: Outcome,
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "reduced-motion",
        applies: prefers_reduced_motion,
        outcome: Outcome::Settle(Tier::None),
    },
    Rule {
        name: "low-battery",
        applies: low_battery,
        outcome: Outcome::Settle(Tier::Css),
    },
    Rule {
        name: "gpu-compute",
        applies: capable_gpu,
        outcome: Outcome::AttemptGpu,
    },
    Rule {
        name: "constrained-mobile",
        applies: constrained_mobile,
        outcome: Outcome::Settle(Tier::Css),
    },
    Rule {
        name: "default",
        applies: always,
        outcome: Outcome::Settle(Tier::Webgl),
    },
];

fn prefers_reduced_motion(snapshot: &CapabilitySnapshot, _: &PolicySettings) -> bool {
    snapshot.prefers_reduced_motion
}

fn low_battery(snapshot: &CapabilitySnapshot, settings: &PolicySettings) -> bool {
    snapshot.battery_below(settings.low_battery)
}

fn capable_gpu(snapshot: &CapabilitySnapshot, _: &PolicySettings) -> bool {
    snapshot.supports_gpu_compute && !snapshot.is_low_end
}

fn constrained_mobile(snapshot: &CapabilitySnapshot, _: &PolicySettings) -> bool {
    snapshot.is_mobile && (!snapshot.supports_gpu_compute || snapshot.is_low_end)
}

fn always(_: &CapabilitySnapshot, _: &PolicySettings) -> bool {
    true
}

/// First applicable rule. With `gpu_failed` set the GPU rule is skipped.
pub fn first_match(
    snapshot: &CapabilitySnapshot,
    settings: &PolicySettings,
    gpu_failed: bool,
) -> &'static Rule {
    RULES
        .iter()
        .filter(|rule| !(gpu_failed && rule.outcome == Outcome::AttemptGpu))
        .find(|rule| (rule.applies)(snapshot, settings))
        .unwrap_or(&RULES[RULES.len() - 1])
}

pub fn choose_variant<R: Rng + ?Sized>(pool: &[GpuVariant], rng: &mut R) -> GpuVariant {
    pool.choose(rng).copied().unwrap_or(GpuVariant::Starfield)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub tier: Tier,
    pub rule: &'static str,
    /// Variant that was tried on the GPU and failed, if any.
    pub failed_gpu: Option<GpuVariant>,
}

/// Runs the table. `try_gpu` starts the chosen GPU variant and reports
/// whether it came up; it is called at most once.
pub fn decide<R, F>(
    snapshot: &CapabilitySnapshot,
    settings: &PolicySettings,
    rng: &mut R,
    mut try_gpu: F,
) -> Decision
where
    R: Rng + ?Sized,
    F: FnMut(GpuVariant) -> bool,
{
    let rule = first_match(snapshot, settings, false);
    match rule.outcome {
        Outcome::Settle(tier) => Decision {
            tier,
            rule: rule.name,
            failed_gpu: None,
        },
        Outcome::AttemptGpu => {
            let variant = choose_variant(&settings.variants, rng);
            if try_gpu(variant) {
                return Decision {
                    tier: Tier::Webgpu(variant),
                    rule: rule.name,
                    failed_gpu: None,
                };
            }
            let fallback = first_match(snapshot, settings, true);
            let tier = match fallback.outcome {
                Outcome::Settle(tier) => tier,
                Outcome::AttemptGpu => Tier::Webgl,
            };
            Decision {
                tier,
                rule: fallback.name,
                failed_gpu: Some(variant),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn desktop() -> CapabilitySnapshot {
        CapabilitySnapshot {
            is_low_end: false,
            is_mobile: false,
            supports_gpu_compute: true,
            prefers_reduced_motion: false,
            has_good_gpu: true,
            battery_level: Some(1.0),
        }
    }

    fn run(snapshot: CapabilitySnapshot, gpu_ok: bool) -> (Decision, usize) {
        let settings = PolicySettings::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut attempts = 0;
        let decision = decide(&snapshot, &settings, &mut rng, |_| {
            attempts += 1;
            gpu_ok
        });
        (decision, attempts)
    }

    #[test]
    fn reduced_motion_wins_over_everything() {
        let snapshot = CapabilitySnapshot {
            prefers_reduced_motion: true,
            battery_level: Some(0.01),
            ..desktop()
        };
        let (decision, attempts) = run(snapshot, true);
        assert_eq!(decision.tier, Tier::None);
        assert_eq!(decision.rule, "reduced-motion");
        assert_eq!(attempts, 0);
    }

    #[test]
    fn low_battery_forces_lite_tier() {
        let snapshot = CapabilitySnapshot {
            battery_level: Some(0.10),
            ..desktop()
        };
        let (decision, attempts) = run(snapshot, true);
        assert_eq!(decision.tier, Tier::Css);
        assert_eq!(attempts, 0);
    }

    #[test]
    fn battery_exactly_at_threshold_is_not_low() {
        let snapshot = CapabilitySnapshot {
            battery_level: Some(0.15),
            ..desktop()
        };
        let (decision, _) = run(snapshot, true);
        assert!(matches!(decision.tier, Tier::Webgpu(_)));
    }

    #[test]
    fn capable_desktop_gets_gpu_tier() {
        let (decision, attempts) = run(desktop(), true);
        assert!(matches!(decision.tier, Tier::Webgpu(_)));
        assert_eq!(attempts, 1);
        assert_eq!(decision.failed_gpu, None);
    }

    #[test]
    fn failed_gpu_attempt_falls_through_once() {
        let (decision, attempts) = run(desktop(), false);
        assert_eq!(decision.tier, Tier::Webgl);
        assert_eq!(decision.rule, "default");
        assert_eq!(attempts, 1);
        assert!(decision.failed_gpu.is_some());
    }

    #[test]
    fn failed_gpu_on_mobile_lands_on_default_tier() {
        let snapshot = CapabilitySnapshot {
            is_mobile: true,
            ..desktop()
        };
        let (decision, _) = run(snapshot, false);
        // Capable mobile GPU that failed is neither low-end nor compute-less.
        assert_eq!(decision.tier, Tier::Webgl);
    }

    #[test]
    fn low_end_mobile_without_compute_gets_lite_tier() {
        let snapshot = CapabilitySnapshot {
            is_low_end: true,
            is_mobile: true,
            supports_gpu_compute: false,
            has_good_gpu: false,
            ..desktop()
        };
        let (decision, attempts) = run(snapshot, true);
        assert_eq!(decision.tier, Tier::Css);
        assert_eq!(decision.rule, "constrained-mobile");
        assert_eq!(attempts, 0);
    }

    #[test]
    fn low_end_desktop_skips_gpu() {
        let snapshot = CapabilitySnapshot {
            is_low_end: true,
            ..desktop()
        };
        let (decision, attempts) = run(snapshot, true);
        assert_eq!(decision.tier, Tier::Webgl);
        assert_eq!(attempts, 0);
    }

    #[test]
    fn variant_choice_is_deterministic_for_a_seed() {
        let settings = PolicySettings {
            variants: GpuVariant::ALL.to_vec(),
            ..PolicySettings::default()
        };
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            decide(&desktop(), &settings, &mut rng, |_| true).tier
        };
        for seed in 0..16 {
            assert_eq!(pick(seed), pick(seed));
        }
    }

    #[test]
    fn variant_choice_stays_within_pool() {
        let pool = [GpuVariant::Snowfield];
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..32 {
            assert_eq!(choose_variant(&pool, &mut rng), GpuVariant::Snowfield);
        }
    }

    #[test]
    fn default_pool_reaches_both_variants() {
        let pool = PolicySettings::default().variants;
        let mut rng = StdRng::seed_from_u64(5);
        let picks: Vec<_> = (0..64).map(|_| choose_variant(&pool, &mut rng)).collect();
        assert!(picks.contains(&GpuVariant::Starfield));
        assert!(picks.contains(&GpuVariant::Laserfield));
        assert!(!picks.contains(&GpuVariant::Snowfield));
    }
}
