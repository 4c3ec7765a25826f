//! Renderer selection core: capability snapshot in, one running backend out.
//!
//! Nothing in this crate touches a window or a GPU. Backends are reached
//! through [`Backend`] trait objects built by a [`BackendRegistry`], and the
//! host's surfaces through a [`PresentationPort`].

mod backend;
mod budget;
mod capability;
mod monitor;
pub mod policy;
mod presentation;
mod selector;
mod tier;

pub use backend::{Backend, BackendError, BackendFactory, BackendRegistry, FrameLoop, FrameStatus};
pub use budget::particle_budget;
pub use capability::CapabilitySnapshot;
pub use monitor::{downgrade_target, PerformanceMonitor};
pub use presentation::{OpacityHandle, PresentationPort};
pub use selector::RendererSelector;
pub use tier::{Container, GpuVariant, Theme, Tier};
