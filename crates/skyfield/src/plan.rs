use anyhow::{Context, Result};
use probe::GpuReport;
use rand::rngs::StdRng;
use rand::SeedableRng;
use selector::{particle_budget, policy, CapabilitySnapshot, Tier};
use serde::Serialize;

use crate::cli::RunArgs;
use crate::detect::detect;
use crate::settings::Settings;

/// What `skyfield` would do on this host, without opening a window.
#[derive(Debug, Serialize)]
pub struct Plan {
    pub viewport: Viewport,
    pub snapshot: CapabilitySnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuReport>,
    pub rule: &'static str,
    /// Tier entered when every backend starts cleanly.
    pub tier: Tier,
    /// Tier entered instead when the chosen GPU variant fails to start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_fallback: Option<Tier>,
    /// Tiers walked, in order, if backends keep failing or running slow.
    pub fallback_chain: Vec<Tier>,
    pub particles: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let settings = Settings::resolve(args)?;
    let (width, height) = settings.size;
    let detection = detect(&settings, width);
    let plan = build(&settings, detection.snapshot, detection.gpu, width, height);
    let json = serde_json::to_string_pretty(&plan).context("failed to encode plan")?;
    println!("{json}");
    Ok(())
}

pub fn build(
    settings: &Settings,
    snapshot: CapabilitySnapshot,
    gpu: Option<GpuReport>,
    width: u32,
    height: u32,
) -> Plan {
    let config = &settings.config;
    let seed = config.seed;
    let rng = || match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let decision = policy::decide(&snapshot, &config.policy, &mut rng(), |_| true);
    let gpu_fallback = match decision.tier {
        Tier::Webgpu(_) => Some(policy::decide(&snapshot, &config.policy, &mut rng(), |_| false).tier),
        _ => None,
    };

    let mut fallback_chain = Vec::new();
    let mut next = decision.tier.fallback();
    while let Some(tier) = next {
        fallback_chain.push(tier);
        next = tier.fallback();
    }

    Plan {
        viewport: Viewport { width, height },
        snapshot,
        gpu,
        rule: decision.rule,
        tier: decision.tier,
        gpu_fallback,
        fallback_chain,
        particles: particle_budget(&snapshot, width, &config.particles),
    }
}

#[cfg(test)]
mod tests {
    use tierconfig::SkyfieldConfig;

    use super::*;

    fn settings(seed: u64) -> Settings {
        let args = RunArgs {
            seed: Some(seed),
            ..RunArgs::default()
        };
        Settings::from_config(SkyfieldConfig::default(), &args).unwrap()
    }

    fn desktop() -> CapabilitySnapshot {
        CapabilitySnapshot {
            supports_gpu_compute: true,
            has_good_gpu: true,
            ..CapabilitySnapshot::default()
        }
    }

    #[test]
    fn desktop_plan_names_gpu_and_its_fallback() {
        let plan = build(&settings(42), desktop(), None, 1920, 1080);
        assert!(matches!(plan.tier, Tier::Webgpu(_)));
        assert_eq!(plan.gpu_fallback, Some(Tier::Webgl));
        assert_eq!(plan.fallback_chain, vec![Tier::Webgl, Tier::Css, Tier::None]);
        assert_eq!(plan.particles, 800);
    }

    #[test]
    fn seeded_plans_agree() {
        let first = build(&settings(7), desktop(), None, 1920, 1080);
        let second = build(&settings(7), desktop(), None, 1920, 1080);
        assert_eq!(first.tier, second.tier);
    }

    #[test]
    fn reduced_motion_plan_is_static() {
        let snapshot = CapabilitySnapshot {
            prefers_reduced_motion: true,
            ..desktop()
        };
        let plan = build(&settings(1), snapshot, None, 1920, 1080);
        assert_eq!(plan.tier, Tier::None);
        assert!(plan.gpu_fallback.is_none());
        assert!(plan.fallback_chain.is_empty());

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["tier"], "none");
        assert_eq!(json["rule"], "reduced-motion");
    }
}
