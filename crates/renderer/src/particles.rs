//! Particle records as they sit in GPU storage buffers.
//!
//! All fields are scalar `f32`s so the WGSL side can mirror the layout
//! without `vec3` padding rules getting in the way.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Kinematics {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub life: f32,
    pub size: f32,
}

/// Starfield record: kinematics plus three floats of padding (44 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct StarParticle {
    pub kinematics: Kinematics,
    pub _pad: [f32; 3],
}

/// Snowfield and laserfield record: kinematics, tint and twinkle phase
/// (48 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct GlowParticle {
    pub kinematics: Kinematics,
    pub color: [f32; 3],
    pub twinkle: f32,
}

pub trait ParticleRecord: Pod {
    fn kinematics(&self) -> &Kinematics;
    fn kinematics_mut(&mut self) -> &mut Kinematics;
}

impl ParticleRecord for StarParticle {
    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.kinematics
    }
}

impl ParticleRecord for GlowParticle {
    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.kinematics
    }
}
