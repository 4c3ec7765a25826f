use std::sync::Arc;

use selector::{Container, OpacityHandle, PresentationPort};
use tracing::debug;
use winit::window::Window;

const TITLE: &str = "skyfield";

fn container_label(container: Container) -> &'static str {
    match container {
        Container::GpuCanvas => "gpu",
        Container::Canvas => "canvas",
        Container::Lite => "lite",
    }
}

/// Which containers are shown and how opaque the backdrop is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    shown: Vec<Container>,
    opacity: f32,
}

impl Presentation {
    pub fn show(&mut self, container: Container) {
        if !self.shown.contains(&container) {
            self.shown.push(container);
        }
    }

    pub fn hide(&mut self, container: Container) {
        self.shown.retain(|shown| *shown != container);
    }

    pub fn shown(&self) -> &[Container] {
        &self.shown
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn title(&self) -> String {
        if self.shown().is_empty() {
            return TITLE.to_string();
        }
        let labels: Vec<&str> = self.shown().iter().copied().map(container_label).collect();
        format!("{TITLE} [{}]", labels.join(", "))
    }
}

/// Presentation port backed by the backdrop window. Opacity is shared with
/// the backends, which fold it into every frame they draw.
pub struct WindowPresenter {
    window: Arc<Window>,
    opacity: OpacityHandle,
    state: Presentation,
}

impl WindowPresenter {
    pub fn new(window: Arc<Window>, opacity: OpacityHandle) -> Self {
        Self {
            window,
            state: Presentation {
                shown: Vec::new(),
                opacity: opacity.get(),
            },
            opacity,
        }
    }

    fn sync_title(&self) {
        self.window.set_title(&self.state.title());
    }
}

impl PresentationPort for WindowPresenter {
    fn show(&mut self, container: Container) {
        self.state.show(container);
        self.sync_title();
    }

    fn hide(&mut self, container: Container) {
        self.state.hide(container);
        self.sync_title();
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.set_opacity(opacity);
        debug!(opacity = self.state.opacity(), "backdrop opacity");
        self.opacity.set(opacity);
        self.window.request_redraw();
    }
}
