use selector::{FrameLoop, FrameStatus, Theme};

use super::CanvasOptions;

/// Optional visibility and theme observers. Disabled observers ignore every
/// event, so the simulation only holds when an enabled one says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasObservers {
    observe_visibility: bool,
    observe_theme: bool,
    visible: bool,
    dark: bool,
}

impl CanvasObservers {
    pub fn new(options: &CanvasOptions) -> Self {
        Self {
            observe_visibility: options.observe_visibility,
            observe_theme: options.observe_theme,
            visible: true,
            dark: true,
        }
    }

    /// Returns whether the event was applied.
    pub fn visibility_changed(&mut self, visible: bool) -> bool {
        if self.observe_visibility {
            self.visible = visible;
        }
        self.observe_visibility
    }

    /// Returns whether the event was applied.
    pub fn theme_changed(&mut self, theme: Theme) -> bool {
        if self.observe_theme {
            self.dark = theme == Theme::Dark;
        }
        self.observe_theme
    }

    pub fn is_held(&self) -> bool {
        !self.visible || !self.dark
    }

    /// Status for a frame that must not draw, or `None` when it may.
    pub fn gate(&self, frame_loop: &FrameLoop) -> Option<FrameStatus> {
        if !frame_loop.is_scheduled() {
            Some(FrameStatus::Stopped)
        } else if self.is_held() {
            Some(FrameStatus::Paused)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasProfile;

    fn observers(observe_visibility: bool, observe_theme: bool) -> CanvasObservers {
        CanvasObservers::new(&CanvasOptions {
            profile: CanvasProfile::Streaks,
            particle_count: 100,
            speed: 4.0,
            point_size: 2,
            observe_visibility,
            observe_theme,
        })
    }

    fn running() -> FrameLoop {
        let mut frame_loop = FrameLoop::default();
        frame_loop.start();
        frame_loop
    }

    #[test]
    fn occlusion_pauses_until_visible_again() {
        let mut observers = observers(true, false);
        let frame_loop = running();
        assert_eq!(observers.gate(&frame_loop), None);

        assert!(observers.visibility_changed(false));
        assert_eq!(observers.gate(&frame_loop), Some(FrameStatus::Paused));

        observers.visibility_changed(true);
        assert_eq!(observers.gate(&frame_loop), None);
    }

    #[test]
    fn light_theme_holds_the_field() {
        let mut observers = observers(false, true);
        let frame_loop = running();
        assert!(observers.theme_changed(Theme::Light));
        assert!(observers.is_held());
        assert_eq!(observers.gate(&frame_loop), Some(FrameStatus::Paused));

        observers.theme_changed(Theme::Dark);
        assert!(!observers.is_held());
    }

    #[test]
    fn disabled_observers_ignore_events() {
        let mut observers = observers(false, false);
        let frame_loop = running();
        assert!(!observers.visibility_changed(false));
        assert!(!observers.theme_changed(Theme::Light));
        assert!(!observers.is_held());
        assert_eq!(observers.gate(&frame_loop), None);
    }

    #[test]
    fn cancelled_loop_stops_even_when_held() {
        let mut observers = observers(true, true);
        observers.visibility_changed(false);
        let mut frame_loop = running();
        frame_loop.cancel();
        assert_eq!(observers.gate(&frame_loop), Some(FrameStatus::Stopped));
        assert_eq!(observers.gate(&FrameLoop::default()), Some(FrameStatus::Stopped));
    }
}
