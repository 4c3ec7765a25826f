use std::sync::Arc;

use selector::{Backend, BackendRegistry, GpuVariant, OpacityHandle, Tier};
use tierconfig::CanvasSettings;
use winit::window::Window;

use crate::canvas::{CanvasBackend, CanvasOptions, CanvasProfile};
use crate::gpu::{LaserfieldBackend, SnowfieldBackend, StarfieldBackend};

/// Everything a backend needs from the host to draw into its window.
#[derive(Clone)]
pub struct HostSurface {
    pub window: Arc<Window>,
    pub opacity: OpacityHandle,
    pub particle_count: u32,
    pub canvas: CanvasSettings,
}

/// Registers a factory for every drawable tier. `Tier::None` needs no
/// backend and is left out.
pub fn register_backends(registry: &mut BackendRegistry, host: &HostSurface) {
    for variant in GpuVariant::ALL {
        let host = host.clone();
        registry.register(Tier::Webgpu(variant), move || gpu_backend(variant, &host));
    }
    for profile in [CanvasProfile::Streaks, CanvasProfile::Points] {
        let host = host.clone();
        registry.register(profile.tier(), move || -> Box<dyn Backend> {
            let options = CanvasOptions::from_settings(profile, host.particle_count, &host.canvas);
            Box::new(CanvasBackend::new(
                host.window.clone(),
                host.opacity.clone(),
                options,
            ))
        });
    }
}

fn gpu_backend(variant: GpuVariant, host: &HostSurface) -> Box<dyn Backend> {
    let window = host.window.clone();
    let opacity = host.opacity.clone();
    match variant {
        GpuVariant::Starfield => Box::new(StarfieldBackend::new(window, opacity, host.particle_count)),
        GpuVariant::Snowfield => Box::new(SnowfieldBackend::new(window, opacity, host.particle_count)),
        GpuVariant::Laserfield => {
            Box::new(LaserfieldBackend::new(window, opacity, host.particle_count))
        }
    }
}
