use std::path::Path;

use anyhow::{Context, Result};
use probe::Overrides;
use tierconfig::SkyfieldConfig;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub const DEFAULT_SIZE: (u32, u32) = (1280, 800);

/// Configuration with command-line overrides folded in.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: SkyfieldConfig,
    pub overrides: Overrides,
    /// Logical window size.
    pub size: (u32, u32),
}

impl Settings {
    pub fn resolve(args: &RunArgs) -> Result<Self> {
        let paths = AppPaths::discover()?;
        let config = load_config(&paths, args.config.as_deref())?;
        Self::from_config(config, args)
    }

    pub fn from_config(mut config: SkyfieldConfig, args: &RunArgs) -> Result<Self> {
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }
        if let Some(theme) = args.theme {
            config.theme = theme;
        }
        if !args.variants.is_empty() {
            config.policy.variants = args.variants.clone();
        }
        if args.no_gpu_probe {
            config.detect.gpu_probe = false;
        }
        config
            .validate()
            .context("configuration rejected after applying command-line overrides")?;

        Ok(Self {
            config,
            overrides: Overrides {
                cores: args.cores,
                mobile: args.mobile,
                reduced_motion: args.reduced_motion,
                battery: args.battery,
            },
            size: args.size.unwrap_or(DEFAULT_SIZE),
        })
    }
}

/// An explicit path must exist; the discovered file is optional.
pub fn load_config(paths: &AppPaths, explicit: Option<&Path>) -> Result<SkyfieldConfig> {
    let config = match explicit {
        Some(path) => SkyfieldConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let path = paths.config_file();
            SkyfieldConfig::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}
