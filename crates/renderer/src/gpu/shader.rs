//! WGSL assembly for the particle fields.
//!
//! Each variant ships two modules: a compute module running the shared
//! update rule and a render module drawing one quad per particle. Both are
//! stitched from a generated constants block, the shared prelude, the
//! variant's particle layout and the stage-specific source.

use std::borrow::Cow;
use std::fmt::Write as _;

use selector::GpuVariant;

use crate::physics;

const PRELUDE: &str = include_str!("shaders/prelude.wgsl");
const COMPUTE: &str = include_str!("shaders/compute.wgsl");
const RENDER_COMMON: &str = include_str!("shaders/render_common.wgsl");
const STAR_PARTICLE: &str = include_str!("shaders/star_particle.wgsl");
const GLOW_PARTICLE: &str = include_str!("shaders/glow_particle.wgsl");
const STARFIELD: &str = include_str!("shaders/starfield.wgsl");
const SNOWFIELD: &str = include_str!("shaders/snowfield.wgsl");
const LASERFIELD: &str = include_str!("shaders/laserfield.wgsl");

/// Threads per compute workgroup; must match `@workgroup_size` in
/// `compute.wgsl`.
pub const WORKGROUP_SIZE: u32 = 64;

pub const COMPUTE_ENTRY: &str = "cs_main";
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub compute: String,
    pub render: String,
}

impl ShaderSources {
    pub fn for_variant(variant: GpuVariant) -> Self {
        match variant {
            GpuVariant::Starfield => Self::compose(STAR_PARTICLE, STARFIELD),
            GpuVariant::Snowfield => Self::compose(GLOW_PARTICLE, SNOWFIELD),
            GpuVariant::Laserfield => Self::compose(GLOW_PARTICLE, LASERFIELD),
        }
    }

    fn compose(particle: &str, render: &str) -> Self {
        let header = constants_block();
        Self {
            compute: [header.as_str(), PRELUDE, particle, COMPUTE].join("\n"),
            render: [header.as_str(), PRELUDE, particle, RENDER_COMMON, render].join("\n"),
        }
    }
}

fn constants_block() -> String {
    let constants = [
        ("DT", physics::DT),
        ("POINTER_PULL", physics::POINTER_PULL),
        ("FAR_PLANE", physics::FAR_PLANE),
        ("BOUND_XY", physics::BOUND_XY),
        ("MIN_DEPTH", physics::MIN_DEPTH),
        ("SPRITE_SCALE", physics::SPRITE_SCALE),
        ("HASH_SCALE", physics::HASH_SCALE),
        ("DEPTH_KEY", physics::DEPTH_KEY),
        ("X_KEY", physics::X_KEY),
        ("Y_KEY", physics::Y_KEY),
        ("SPEED_KEY", physics::SPEED_KEY),
        ("RESPAWN_MIN_DEPTH", physics::RESPAWN_MIN_DEPTH),
        ("RESPAWN_DEPTH_SPAN", physics::RESPAWN_DEPTH_SPAN),
        ("RESPAWN_BASE_SPEED", physics::RESPAWN_BASE_SPEED),
        ("RESPAWN_SPEED_SPAN", physics::RESPAWN_SPEED_SPAN),
    ];
    let mut block = String::new();
    for (name, value) in constants {
        let _ = writeln!(block, "const {name}: f32 = {value:?};");
    }
    block
}

pub(crate) fn create_module(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_owned())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(label: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|err| panic!("{label} failed to parse:\n{}", err.emit_to_string(source)));
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(err) = validator.validate(&module) {
            panic!("{label} failed validation: {err:?}");
        }
    }

    #[test]
    fn every_variant_compiles() {
        for variant in GpuVariant::ALL {
            let sources = ShaderSources::for_variant(variant);
            validate(&format!("{variant} compute"), &sources.compute);
            validate(&format!("{variant} render"), &sources.render);
        }
    }

    #[test]
    fn entry_points_are_present() {
        for variant in GpuVariant::ALL {
            let sources = ShaderSources::for_variant(variant);
            assert!(sources.compute.contains(&format!("fn {COMPUTE_ENTRY}(")));
            assert!(sources.render.contains(&format!("fn {VERTEX_ENTRY}(")));
            assert!(sources.render.contains(&format!("fn {FRAGMENT_ENTRY}(")));
        }
    }

    #[test]
    fn workgroup_size_matches_dispatch() {
        assert!(COMPUTE.contains(&format!("@workgroup_size({WORKGROUP_SIZE})")));
    }

    #[test]
    fn constants_are_valid_wgsl_literals() {
        let block = constants_block();
        assert!(block.contains("const DT: f32 = 0.016666668;"));
        assert!(block.contains("const POINTER_PULL: f32 = 0.001;"));
        assert!(
            !block.contains("e-") && !block.contains("e+"),
            "exponent literal in {block}"
        );
    }
}
