use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use crate::tier::{Theme, Tier};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("GPU compute is not available on this adapter")]
    ComputeUnavailable,
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("drawing surface unavailable: {0}")]
    Surface(String),
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
    #[error("no backend registered for tier {0}")]
    Unregistered(Tier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Rendered,
    /// Loop alive but nothing was drawn (hidden, throttled).
    Paused,
    /// Loop alive but the frame failed to reach the screen. Counts against
    /// the frame rate.
    Dropped,
    /// Loop cancelled, by `destroy` or by the backend itself.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoopState {
    #[default]
    Idle,
    Scheduled,
    Cancelled,
}

/// Handle on a backend's frame loop. Cancelling is final.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
}

impl FrameLoop {
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Scheduled;
        }
    }

    pub fn cancel(&mut self) {
        self.state = LoopState::Cancelled;
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == LoopState::Scheduled
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == LoopState::Cancelled
    }
}

/// Lifecycle every rendering backend follows: construct, `init` once,
/// `frame` while scheduled, `destroy` to stop. Resources are released when
/// the instance is dropped.
pub trait Backend {
    fn tier(&self) -> Tier;

    fn init(&mut self) -> Result<(), BackendError>;

    fn frame(&mut self, now: Instant) -> FrameStatus;

    /// Stops the frame loop. Safe to call before, during or after `init`.
    fn destroy(&mut self);

    fn is_running(&self) -> bool;

    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Pointer position in physical pixels relative to the surface origin.
    fn pointer_moved(&mut self, _x: f64, _y: f64) {}

    fn visibility_changed(&mut self, _visible: bool) {}

    fn theme_changed(&mut self, _theme: Theme) {}
}

pub type BackendFactory = Box<dyn Fn() -> Box<dyn Backend>>;

/// Constructors keyed by tier; backends are only built once selected.
#[derive(Default)]
pub struct BackendRegistry {
    factories: HashMap<Tier, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, tier: Tier, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + 'static,
    {
        self.factories.insert(tier, Box::new(factory));
    }

    pub fn contains(&self, tier: Tier) -> bool {
        self.factories.contains_key(&tier)
    }

    pub fn build(&self, tier: Tier) -> Result<Box<dyn Backend>, BackendError> {
        self.factories
            .get(&tier)
            .map(|factory| factory())
            .ok_or(BackendError::Unregistered(tier))
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tiers: Vec<String> = self.factories.keys().map(Tier::to_string).collect();
        tiers.sort();
        f.debug_struct("BackendRegistry")
            .field("tiers", &tiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_loop_cannot_restart() {
        let mut frame_loop = FrameLoop::default();
        assert!(!frame_loop.is_scheduled());
        frame_loop.start();
        assert!(frame_loop.is_scheduled());
        frame_loop.cancel();
        frame_loop.start();
        assert!(!frame_loop.is_scheduled());
        assert!(frame_loop.is_cancelled());
    }

    #[test]
    fn unregistered_tier_is_an_error() {
        let registry = BackendRegistry::new();
        let err = registry.build(Tier::Css).err().unwrap();
        assert!(matches!(err, BackendError::Unregistered(Tier::Css)));
    }
}
