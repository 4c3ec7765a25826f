use rand::Rng;
use selector::GpuVariant;

use super::field::{FieldVariant, GpuFieldBackend};
use crate::particles::StarParticle;
use crate::physics;

/// Plain white stars streaming toward the viewer.
pub struct Starfield;

impl FieldVariant for Starfield {
    type Particle = StarParticle;

    const VARIANT: GpuVariant = GpuVariant::Starfield;

    fn spawn<R: Rng + ?Sized>(rng: &mut R) -> StarParticle {
        let size = rng.gen_range(0.5..1.5);
        StarParticle {
            kinematics: physics::scatter(rng, size),
            _pad: [0.0; 3],
        }
    }
}

pub type StarfieldBackend = GpuFieldBackend<Starfield>;
