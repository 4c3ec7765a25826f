//! Particle backdrop backends for skyfield.
//!
//! ```text
//!   RendererSelector ──▶ BackendRegistry ──▶ GpuFieldBackend<V>   (webgpu)
//!                                        └─▶ CanvasBackend        (webgl, css)
//! ```
//!
//! The GPU backends run the particle update rule in a `wgpu` compute pass
//! and draw billboards from the same storage buffer. The canvas backend is
//! the CPU fallback presented through `softbuffer`. [`physics`] holds the
//! CPU reference of the update rule the compute shader mirrors.

pub mod canvas;
pub mod gpu;
pub mod particles;
pub mod physics;
mod registry;
pub mod viewport;

pub use canvas::{CanvasBackend, CanvasOptions, CanvasProfile};
pub use gpu::{GpuFieldBackend, LaserfieldBackend, SnowfieldBackend, StarfieldBackend};
pub use registry::{register_backends, HostSurface};
pub use viewport::{physical_size, PointerTracker};
