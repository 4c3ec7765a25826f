//! GPU particle fields.
//!
//! Every variant runs the same two-pass frame: a compute pass advancing the
//! particle storage buffer in place, then a render pass drawing one
//! billboard quad per particle straight out of that buffer. Variants differ
//! only in record layout, seeding and their vertex/fragment shaders.

mod context;
mod field;
mod laserfield;
mod pipeline;
pub mod shader;
mod snowfield;
mod starfield;
mod uniforms;

pub use field::{seed_particles, FieldVariant, GpuFieldBackend};
pub use laserfield::{Laserfield, LaserfieldBackend};
pub use snowfield::{Snowfield, SnowfieldBackend};
pub use starfield::{Starfield, StarfieldBackend};
