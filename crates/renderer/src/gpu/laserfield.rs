use std::f32::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use selector::GpuVariant;

use super::field::{FieldVariant, GpuFieldBackend};
use crate::particles::GlowParticle;
use crate::physics;

const PALETTE: [[f32; 3]; 4] = [
    [0.30, 0.85, 1.00],
    [1.00, 0.30, 0.75],
    [0.55, 0.40, 1.00],
    [0.35, 1.00, 0.60],
];

/// Coloured streaks stretched along their screen-space motion.
pub struct Laserfield;

impl FieldVariant for Laserfield {
    type Particle = GlowParticle;

    const VARIANT: GpuVariant = GpuVariant::Laserfield;

    fn spawn<R: Rng + ?Sized>(rng: &mut R) -> GlowParticle {
        let size = rng.gen_range(0.6..1.2);
        let color = PALETTE.choose(rng).copied().unwrap_or([1.0; 3]);
        GlowParticle {
            kinematics: physics::scatter(rng, size),
            color,
            twinkle: rng.gen_range(0.0..TAU),
        }
    }
}

pub type LaserfieldBackend = GpuFieldBackend<Laserfield>;
