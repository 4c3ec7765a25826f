//! CPU reference of the particle update rule run by the compute shaders.
//!
//! The constants here are also emitted into the WGSL prelude, so the two
//! implementations cannot drift apart.

use rand::Rng;

use crate::particles::Kinematics;

/// Fixed simulation step, independent of the real frame time.
pub const DT: f32 = 1.0 / 60.0;
pub const POINTER_PULL: f32 = 0.001;
pub const FAR_PLANE: f32 = 1.0;
pub const BOUND_XY: f32 = 2.0;
pub const MIN_DEPTH: f32 = 0.01;
pub const SPRITE_SCALE: f32 = 0.012;

pub const HASH_SCALE: f32 = 43758.5453;
pub const DEPTH_KEY: f32 = 12.9898;
pub const X_KEY: f32 = 78.233;
pub const Y_KEY: f32 = 37.719;
pub const SPEED_KEY: f32 = 93.9898;

pub const RESPAWN_MIN_DEPTH: f32 = 0.3;
pub const RESPAWN_DEPTH_SPAN: f32 = 0.7;
pub const RESPAWN_BASE_SPEED: f32 = 0.1;
pub const RESPAWN_SPEED_SPAN: f32 = 0.05;

/// `fract(sin(n) * HASH_SCALE)` with WGSL `fract` semantics.
pub fn hash01(n: f32) -> f32 {
    let value = n.sin() * HASH_SCALE;
    value - value.floor()
}

pub fn needs_respawn(kinematics: &Kinematics) -> bool {
    let [x, y, z] = kinematics.position;
    z > FAR_PLANE || x.abs() > BOUND_XY || y.abs() > BOUND_XY
}

/// Respawn state for a particle index. Depends on the index only, so a
/// given particle always reappears at the same spot.
pub fn respawn(kinematics: &mut Kinematics, index: u32) {
    let i = index as f32;
    let depth = RESPAWN_MIN_DEPTH + RESPAWN_DEPTH_SPAN * hash01(i * DEPTH_KEY);
    kinematics.position = [
        (hash01(i * X_KEY) * 2.0 - 1.0) * depth,
        (hash01(i * Y_KEY) * 2.0 - 1.0) * depth,
        depth,
    ];
    kinematics.velocity = [
        0.0,
        0.0,
        RESPAWN_BASE_SPEED + RESPAWN_SPEED_SPAN * hash01(i * SPEED_KEY),
    ];
    kinematics.life = 1.0;
}

/// One simulation step. `pointer` is canvas-relative in [0, 1], y down.
pub fn advance(kinematics: &mut Kinematics, index: u32, pointer: [f32; 2]) {
    for axis in 0..3 {
        kinematics.position[axis] += kinematics.velocity[axis] * DT;
    }
    let pull = [pointer[0] * 2.0 - 1.0, 1.0 - pointer[1] * 2.0];
    kinematics.velocity[0] += pull[0] * POINTER_PULL;
    kinematics.velocity[1] += pull[1] * POINTER_PULL;
    if needs_respawn(kinematics) {
        respawn(kinematics, index);
    }
}

/// Screen placement of a particle sprite in clip space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub center: [f32; 2],
    pub radius: f32,
    pub alpha: f32,
}

pub fn project(kinematics: &Kinematics) -> Sprite {
    let [x, y, z] = kinematics.position;
    let depth = z.max(MIN_DEPTH);
    Sprite {
        center: [x / depth, y / depth],
        radius: (kinematics.size + z) * SPRITE_SCALE,
        alpha: (kinematics.life * (1.0 - z)).clamp(0.0, 1.0),
    }
}

/// Random initial state inside the simulation volume.
pub fn scatter<R: Rng + ?Sized>(rng: &mut R, size: f32) -> Kinematics {
    let depth = rng.gen_range(0.05..FAR_PLANE);
    Kinematics {
        position: [
            rng.gen_range(-1.0..1.0) * depth,
            rng.gen_range(-1.0..1.0) * depth,
            depth,
        ],
        velocity: [
            0.0,
            0.0,
            RESPAWN_BASE_SPEED + RESPAWN_SPEED_SPAN * rng.gen::<f32>(),
        ],
        life: rng.gen_range(0.6..=1.0),
        size,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn in_bounds(kinematics: &Kinematics) -> bool {
        let [x, y, z] = kinematics.position;
        z <= FAR_PLANE && x.abs() <= BOUND_XY && y.abs() <= BOUND_XY
    }

    #[test]
    fn hash_stays_in_unit_interval() {
        for index in 0..2048u32 {
            let value = hash01(index as f32 * DEPTH_KEY - 500.0);
            assert!((0.0..1.0).contains(&value), "hash {value} out of range");
        }
    }

    #[test]
    fn every_step_leaves_particles_in_bounds() {
        let mut rng = StdRng::seed_from_u64(17);
        for index in 0..64u32 {
            let mut kinematics = Kinematics {
                position: [
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-0.5..2.0),
                ],
                velocity: [
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(0.0..0.5),
                ],
                life: 1.0,
                size: 1.0,
            };
            let pointer = [rng.gen::<f32>(), rng.gen::<f32>()];
            for _ in 0..600 {
                advance(&mut kinematics, index, pointer);
                assert!(in_bounds(&kinematics), "particle {index} escaped: {kinematics:?}");
            }
        }
    }

    #[test]
    fn far_particle_respawns_deterministically() {
        let start = Kinematics {
            position: [0.0, 0.0, 1.5],
            velocity: [0.0, 0.0, 0.1],
            life: 0.4,
            size: 0.8,
        };
        let mut first = start;
        let mut second = start;
        advance(&mut first, 7, [0.5, 0.5]);
        advance(&mut second, 7, [0.5, 0.5]);

        assert_eq!(first, second);
        assert!(first.position[2] <= FAR_PLANE);
        assert!((0.1..=0.15).contains(&first.velocity[2]));
        assert_eq!(first.velocity[0], 0.0);
        assert_eq!(first.velocity[1], 0.0);
        assert_eq!(first.life, 1.0);
        assert_eq!(first.size, 0.8);
    }

    #[test]
    fn respawn_depends_only_on_index() {
        let mut a = Kinematics {
            position: [5.0, 5.0, 5.0],
            ..Kinematics::default()
        };
        let mut b = Kinematics {
            position: [-1.9, 0.0, 3.0],
            velocity: [1.0, 1.0, 1.0],
            ..Kinematics::default()
        };
        respawn(&mut a, 42);
        respawn(&mut b, 42);
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);

        let depth = a.position[2];
        assert!((RESPAWN_MIN_DEPTH..=1.0).contains(&depth));
        assert!(a.position[0].abs() <= depth);
        assert!(a.position[1].abs() <= depth);
    }

    #[test]
    fn respawn_lands_inside_the_depth_box_for_every_index() {
        for index in 0..4096 {
            let mut kinematics = Kinematics {
                position: [9.0, -9.0, -2.0],
                life: 0.0,
                ..Kinematics::default()
            };
            respawn(&mut kinematics, index);
            let [x, y, z] = kinematics.position;
            assert!((RESPAWN_MIN_DEPTH..=1.0).contains(&z), "index {index}: z {z}");
            assert!(x.abs() <= z, "index {index}: x {x} outside depth {z}");
            assert!(y.abs() <= z, "index {index}: y {y} outside depth {z}");
            assert_eq!(kinematics.life, 1.0, "index {index}");
        }
    }

    #[test]
    fn centered_pointer_exerts_no_pull() {
        let mut kinematics = Kinematics {
            position: [0.1, 0.1, 0.5],
            velocity: [0.0, 0.0, 0.1],
            life: 1.0,
            size: 1.0,
        };
        advance(&mut kinematics, 0, [0.5, 0.5]);
        assert_eq!(kinematics.velocity[0], 0.0);
        assert_eq!(kinematics.velocity[1], 0.0);
    }

    #[test]
    fn pointer_pull_flips_vertical_axis() {
        let mut kinematics = Kinematics {
            position: [0.0, 0.0, 0.5],
            velocity: [0.0, 0.0, 0.1],
            life: 1.0,
            size: 1.0,
        };
        // Top-right corner of the canvas.
        advance(&mut kinematics, 0, [1.0, 0.0]);
        assert!((kinematics.velocity[0] - POINTER_PULL).abs() < 1e-9);
        assert!((kinematics.velocity[1] - POINTER_PULL).abs() < 1e-9);
    }

    #[test]
    fn projection_fades_towards_far_plane() {
        let near = project(&Kinematics {
            position: [0.2, -0.2, 0.4],
            life: 1.0,
            size: 1.0,
            ..Kinematics::default()
        });
        let far = project(&Kinematics {
            position: [0.2, -0.2, 0.95],
            life: 1.0,
            size: 1.0,
            ..Kinematics::default()
        });
        assert!((near.center[0] - 0.5).abs() < 1e-6);
        assert!((near.center[1] + 0.5).abs() < 1e-6);
        assert!(near.alpha > far.alpha);
        assert!(far.radius > near.radius);
    }

    #[test]
    fn scatter_starts_inside_volume() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..256 {
            let kinematics = scatter(&mut rng, 1.0);
            assert!(in_bounds(&kinematics));
            assert!(kinematics.position[2] > 0.0);
        }
    }
}
