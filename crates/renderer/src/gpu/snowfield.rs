use std::f32::consts::TAU;

use rand::Rng;
use selector::GpuVariant;

use super::field::{FieldVariant, GpuFieldBackend};
use crate::particles::GlowParticle;
use crate::physics;

/// Soft pale flakes with a slow sideways sway.
pub struct Snowfield;

impl FieldVariant for Snowfield {
    type Particle = GlowParticle;

    const VARIANT: GpuVariant = GpuVariant::Snowfield;

    fn spawn<R: Rng + ?Sized>(rng: &mut R) -> GlowParticle {
        let size = rng.gen_range(1.0..2.5);
        // near-white with a faint blue cast
        let base = rng.gen_range(0.85..1.0);
        GlowParticle {
            kinematics: physics::scatter(rng, size),
            color: [base * 0.94, base * 0.97, base],
            twinkle: rng.gen_range(0.0..TAU),
        }
    }
}

pub type SnowfieldBackend = GpuFieldBackend<Snowfield>;

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn flakes_are_pale() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let flake = Snowfield::spawn(&mut rng);
            assert!(flake.color.iter().all(|c| (0.75..=1.0).contains(c)));
            assert!((0.0..TAU).contains(&flake.twinkle));
        }
    }
}
