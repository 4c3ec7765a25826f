use std::fmt;

use serde::{Serialize, Serializer};

pub use tierconfig::GpuVariant;

/// Rendering tier, from no animation up to GPU compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    None,
    Css,
    Webgl,
    Webgpu(GpuVariant),
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Css => "css",
            Tier::Webgl => "webgl",
            Tier::Webgpu(_) => "webgpu",
        }
    }

    pub fn variant(self) -> Option<GpuVariant> {
        match self {
            Tier::Webgpu(variant) => Some(variant),
            _ => None,
        }
    }

    /// Tiers the frame-rate monitor watches.
    pub fn is_monitored(self) -> bool {
        matches!(self, Tier::Webgpu(_) | Tier::Webgl)
    }

    pub fn container(self) -> Option<Container> {
        match self {
            Tier::None => None,
            Tier::Css => Some(Container::Lite),
            Tier::Webgl => Some(Container::Canvas),
            Tier::Webgpu(_) => Some(Container::GpuCanvas),
        }
    }

    /// Next tier to try when this one could not start.
    pub fn fallback(self) -> Option<Tier> {
        match self {
            Tier::Webgpu(_) => Some(Tier::Webgl),
            Tier::Webgl => Some(Tier::Css),
            Tier::Css => Some(Tier::None),
            Tier::None => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Webgpu(variant) => write!(f, "webgpu:{variant}"),
            other => f.write_str(other.label()),
        }
    }
}

impl Serialize for Tier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Per-tier presentation surfaces the host shows or hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    GpuCanvas,
    Canvas,
    Lite,
}

impl Container {
    pub const ALL: [Container; 3] = [Container::GpuCanvas, Container::Canvas, Container::Lite];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_for_gpu_tier() {
        assert_eq!(Tier::Webgpu(GpuVariant::Laserfield).to_string(), "webgpu:laserfield");
        assert_eq!(Tier::Css.to_string(), "css");
        assert_eq!(Tier::None.label(), "none");
    }

    #[test]
    fn fallback_chain_ends_at_none() {
        let mut tier = Tier::Webgpu(GpuVariant::Starfield);
        let mut seen = vec![tier];
        while let Some(next) = tier.fallback() {
            seen.push(next);
            tier = next;
        }
        assert_eq!(
            seen,
            vec![
                Tier::Webgpu(GpuVariant::Starfield),
                Tier::Webgl,
                Tier::Css,
                Tier::None
            ]
        );
    }

    #[test]
    fn only_animated_tiers_have_containers() {
        assert_eq!(Tier::None.container(), None);
        assert_eq!(Tier::Css.container(), Some(Container::Lite));
        assert_eq!(
            Tier::Webgpu(GpuVariant::Snowfield).container(),
            Some(Container::GpuCanvas)
        );
    }
}
