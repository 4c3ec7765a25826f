use std::cell::Cell;
use std::rc::Rc;

use crate::tier::Container;

/// Host-side surfaces the selector toggles. Kept behind a trait so the
/// selection core never touches windowing directly.
pub trait PresentationPort {
    fn show(&mut self, container: Container);
    fn hide(&mut self, container: Container);
    /// Opacity of the whole backdrop wrapper, 0 or 1.
    fn set_opacity(&mut self, opacity: f32);
}

/// Shared backdrop opacity read by backends while drawing.
#[derive(Debug, Clone)]
pub struct OpacityHandle(Rc<Cell<f32>>);

impl OpacityHandle {
    pub fn new(initial: f32) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value.clamp(0.0, 1.0));
    }
}

impl Default for OpacityHandle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let handle = OpacityHandle::default();
        let reader = handle.clone();
        handle.set(0.0);
        assert_eq!(reader.get(), 0.0);
        handle.set(3.0);
        assert_eq!(reader.get(), 1.0);
    }
}
