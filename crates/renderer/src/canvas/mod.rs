//! CPU 2D fallback backend.
//!
//! Simulates a [`CanvasField`] on the main thread, rasterizes it into a
//! software [`Raster`] and presents through `softbuffer`. The same backend
//! serves two tiers: streaks for `webgl`, single points for `css`.

mod field;
mod observers;
mod raster;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use selector::{Backend, BackendError, FrameLoop, FrameStatus, OpacityHandle, Theme, Tier};
use tierconfig::CanvasSettings;
use tracing::{debug, info, trace, warn};
use winit::window::Window;

pub use field::{CanvasField, Segment, Star};
pub use observers::CanvasObservers;
pub use raster::Raster;

const STAR_COLOR: [u8; 3] = [235, 240, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasProfile {
    /// Lines from previous to current projection.
    Streaks,
    /// One dot per entity, no trails.
    Points,
}

impl CanvasProfile {
    pub fn tier(self) -> Tier {
        match self {
            CanvasProfile::Streaks => Tier::Webgl,
            CanvasProfile::Points => Tier::Css,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOptions {
    pub profile: CanvasProfile,
    pub particle_count: u32,
    pub speed: f32,
    pub point_size: u32,
    pub observe_visibility: bool,
    pub observe_theme: bool,
}

impl CanvasOptions {
    pub fn from_settings(profile: CanvasProfile, particle_count: u32, settings: &CanvasSettings) -> Self {
        Self {
            profile,
            particle_count,
            speed: settings.speed,
            point_size: settings.point_size,
            observe_visibility: settings.observe_visibility,
            observe_theme: settings.observe_theme,
        }
    }
}

type SoftSurface = softbuffer::Surface<Arc<Window>, Arc<Window>>;

pub struct CanvasBackend {
    window: Arc<Window>,
    opacity: OpacityHandle,
    options: CanvasOptions,
    surface: Option<SoftSurface>,
    field: Option<CanvasField>,
    raster: Raster,
    rng: StdRng,
    frame_loop: FrameLoop,
    observers: CanvasObservers,
}

impl CanvasBackend {
    pub fn new(window: Arc<Window>, opacity: OpacityHandle, options: CanvasOptions) -> Self {
        let size = window.inner_size();
        Self {
            window,
            opacity,
            options,
            surface: None,
            field: None,
            raster: Raster::new(size.width, size.height),
            rng: StdRng::from_entropy(),
            frame_loop: FrameLoop::default(),
            observers: CanvasObservers::new(&options),
        }
    }

    /// Whether the optional observers currently hold the simulation.
    pub fn is_held(&self) -> bool {
        self.observers.is_held()
    }

    fn create_surface(&self) -> Result<SoftSurface, BackendError> {
        let context = softbuffer::Context::new(self.window.clone())
            .map_err(|err| BackendError::Surface(err.to_string()))?;
        let mut surface = softbuffer::Surface::new(&context, self.window.clone())
            .map_err(|err| BackendError::Surface(err.to_string()))?;
        let size = self.window.inner_size();
        resize_surface(&mut surface, size.width, size.height)?;
        Ok(surface)
    }

    fn draw(&mut self) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        field.step(&mut self.rng);

        self.raster.clear();
        let depth = field.depth();
        match self.options.profile {
            CanvasProfile::Streaks => {
                for segment in field.segments() {
                    let intensity = 0.25 + 0.75 * segment.closeness;
                    self.raster
                        .draw_line(segment.from, segment.to, STAR_COLOR, intensity);
                }
            }
            CanvasProfile::Points => {
                for star in field.stars() {
                    let intensity = (1.0 - star.z / depth).clamp(0.2, 1.0);
                    self.raster.draw_point(
                        field.project(star),
                        self.options.point_size,
                        STAR_COLOR,
                        intensity,
                    );
                }
            }
        }
    }

    fn present(&mut self) -> Result<(), softbuffer::SoftBufferError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let width = self.raster.width();
        let mut buffer = surface.buffer_mut()?;
        self.raster.copy_to(&mut buffer, width, self.opacity.get());
        buffer.present()
    }
}

fn resize_surface(surface: &mut SoftSurface, width: u32, height: u32) -> Result<(), BackendError> {
    let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
        return Ok(());
    };
    surface
        .resize(width, height)
        .map_err(|err| BackendError::Surface(err.to_string()))
}

impl Backend for CanvasBackend {
    fn tier(&self) -> Tier {
        self.options.profile.tier()
    }

    fn init(&mut self) -> Result<(), BackendError> {
        if self.frame_loop.is_cancelled() {
            return Err(BackendError::Surface("backend already destroyed".into()));
        }
        let surface = self.create_surface()?;
        let size = self.window.inner_size();
        self.raster.resize(size.width, size.height);
        self.field = Some(CanvasField::new(
            self.options.particle_count,
            size.width,
            size.height,
            self.options.speed,
            &mut self.rng,
        ));
        self.surface = Some(surface);
        info!(
            profile = ?self.options.profile,
            particles = self.options.particle_count,
            width = size.width,
            height = size.height,
            "canvas field ready"
        );
        self.frame_loop.start();
        Ok(())
    }

    fn frame(&mut self, _now: Instant) -> FrameStatus {
        if let Some(status) = self.observers.gate(&self.frame_loop) {
            return status;
        }
        self.draw();
        match self.present() {
            Ok(()) => {
                trace!("canvas frame");
                FrameStatus::Rendered
            }
            Err(err) => {
                warn!(error = %err, "failed to present canvas frame");
                FrameStatus::Dropped
            }
        }
    }

    fn destroy(&mut self) {
        self.frame_loop.cancel();
        self.surface = None;
    }

    fn is_running(&self) -> bool {
        self.frame_loop.is_scheduled()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.raster.resize(width, height);
        if let Some(field) = self.field.as_mut() {
            field.resize(width, height);
        }
        if let Some(surface) = self.surface.as_mut() {
            if let Err(err) = resize_surface(surface, width, height) {
                warn!(error = %err, "failed to resize canvas surface");
            }
        }
    }

    fn visibility_changed(&mut self, visible: bool) {
        if self.observers.visibility_changed(visible) {
            debug!(visible, "canvas visibility observer");
        }
    }

    fn theme_changed(&mut self, theme: Theme) {
        if self.observers.theme_changed(theme) {
            debug!(?theme, "canvas theme observer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_map_to_cpu_tiers() {
        assert_eq!(CanvasProfile::Streaks.tier(), Tier::Webgl);
        assert_eq!(CanvasProfile::Points.tier(), Tier::Css);
    }

    #[test]
    fn options_follow_settings() {
        let settings = CanvasSettings {
            speed: 6.0,
            point_size: 3,
            observe_visibility: true,
            observe_theme: false,
        };
        let options = CanvasOptions::from_settings(CanvasProfile::Points, 400, &settings);
        assert_eq!(options.particle_count, 400);
        assert_eq!(options.speed, 6.0);
        assert_eq!(options.point_size, 3);
        assert!(options.observe_visibility);
        assert!(!options.observe_theme);
    }
}
