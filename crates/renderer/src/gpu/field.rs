use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use bytemuck::Pod;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use selector::{Backend, BackendError, FrameLoop, FrameStatus, GpuVariant, OpacityHandle, Tier};
use tracing::{debug, info, trace, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::context::GpuContext;
use super::pipeline::FieldPipelines;
use super::shader::ShaderSources;
use super::uniforms::FieldUniforms;
use crate::particles::ParticleRecord;
use crate::viewport::PointerTracker;

/// What distinguishes one GPU particle field from another: its record
/// layout, how fresh particles are seeded, and its shaders.
pub trait FieldVariant: 'static {
    type Particle: ParticleRecord + Pod;

    const VARIANT: GpuVariant;

    fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self::Particle;
}

pub fn seed_particles<V, R>(count: u32, rng: &mut R) -> Vec<V::Particle>
where
    V: FieldVariant,
    R: Rng + ?Sized,
{
    (0..count).map(|_| V::spawn(rng)).collect()
}

struct FieldState {
    context: GpuContext,
    pipelines: FieldPipelines,
    uniforms: FieldUniforms,
    uniform_buffer: wgpu::Buffer,
    _particle_buffer: wgpu::Buffer,
}

impl FieldState {
    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("particle encoder"),
                });
        self.pipelines
            .encode(&mut encoder, &view, self.uniforms.particle_count);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// GPU compute + draw backend shared by every particle field variant.
pub struct GpuFieldBackend<V: FieldVariant> {
    state: Option<FieldState>,
    window: Arc<Window>,
    opacity: OpacityHandle,
    particle_count: u32,
    pointer: PointerTracker,
    frame_loop: FrameLoop,
    started: Option<Instant>,
    frames: u64,
    _variant: PhantomData<V>,
}

impl<V: FieldVariant> GpuFieldBackend<V> {
    pub fn new(window: Arc<Window>, opacity: OpacityHandle, particle_count: u32) -> Self {
        let size = window.inner_size();
        Self {
            state: None,
            window,
            opacity,
            particle_count: particle_count.max(1),
            pointer: PointerTracker::new(size.width, size.height),
            frame_loop: FrameLoop::default(),
            started: None,
            frames: 0,
            _variant: PhantomData,
        }
    }

    fn build_state(&self) -> Result<FieldState, BackendError> {
        let label = V::VARIANT.as_str();
        let context = GpuContext::new(self.window.clone(), label)?;
        let device = &context.device;

        let mut rng = StdRng::from_entropy();
        let particles = seed_particles::<V, _>(self.particle_count, &mut rng);
        let uniforms =
            FieldUniforms::new(self.particle_count, context.config.width, context.config.height);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle storage"),
            contents: bytemuck::cast_slice(&particles),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let sources = ShaderSources::for_variant(V::VARIANT);
        let pipelines = FieldPipelines::new(
            device,
            context.config.format,
            &uniform_buffer,
            &particle_buffer,
            &sources,
            label,
        );
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(BackendError::Pipeline(err.to_string()));
        }

        Ok(FieldState {
            context,
            pipelines,
            uniforms,
            uniform_buffer,
            _particle_buffer: particle_buffer,
        })
    }
}

impl<V: FieldVariant> Backend for GpuFieldBackend<V> {
    fn tier(&self) -> Tier {
        Tier::Webgpu(V::VARIANT)
    }

    fn init(&mut self) -> Result<(), BackendError> {
        if self.frame_loop.is_cancelled() {
            return Err(BackendError::Surface("backend already destroyed".into()));
        }
        let state = self.build_state()?;
        let size = state.context.size;
        self.pointer.set_surface_size(size.width, size.height);
        info!(
            variant = %V::VARIANT,
            particles = self.particle_count,
            width = size.width,
            height = size.height,
            "GPU particle field ready"
        );
        self.state = Some(state);
        self.frame_loop.start();
        Ok(())
    }

    fn frame(&mut self, now: Instant) -> FrameStatus {
        if !self.frame_loop.is_scheduled() {
            return FrameStatus::Stopped;
        }
        let Some(state) = self.state.as_mut() else {
            return FrameStatus::Stopped;
        };

        let started = *self.started.get_or_insert(now);
        state.uniforms.time = now.saturating_duration_since(started).as_secs_f32();
        state.uniforms.pointer = self.pointer.normalized();
        state.uniforms.opacity = self.opacity.get();

        match state.render() {
            Ok(()) => {
                self.frames += 1;
                trace!(frame = self.frames, time = state.uniforms.time, "particle frame");
                FrameStatus::Rendered
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated; reconfiguring");
                state.context.reconfigure();
                FrameStatus::Paused
            }
            Err(wgpu::SurfaceError::Timeout) => {
                trace!("surface timeout; retrying next frame");
                FrameStatus::Dropped
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                warn!(variant = %V::VARIANT, "surface out of memory; stopping particle field");
                self.frame_loop.cancel();
                FrameStatus::Stopped
            }
            Err(err) => {
                warn!(error = ?err, "failed to render particle frame");
                FrameStatus::Dropped
            }
        }
    }

    fn destroy(&mut self) {
        self.frame_loop.cancel();
        // release the window surface so the next backend can present
        self.state = None;
    }

    fn is_running(&self) -> bool {
        self.frame_loop.is_scheduled()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pointer.set_surface_size(width, height);
        if let Some(state) = self.state.as_mut() {
            state.context.resize(PhysicalSize::new(width, height));
            state
                .uniforms
                .set_resolution(state.context.config.width, state.context.config.height);
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer.handle_moved(x, y);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::gpu::{Laserfield, Snowfield, Starfield};
    use crate::physics::{advance, FAR_PLANE};

    fn check_seeded<V: FieldVariant>() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut particles = seed_particles::<V, _>(256, &mut rng);
        assert_eq!(particles.len(), 256);
        for (index, particle) in particles.iter_mut().enumerate() {
            let kinematics = particle.kinematics_mut();
            assert!(kinematics.position[2] <= FAR_PLANE);
            assert!(kinematics.size > 0.0);
            advance(kinematics, index as u32, [0.5, 0.5]);
            assert!(kinematics.position[2] <= FAR_PLANE);
        }
    }

    #[test]
    fn seeded_fields_start_inside_volume() {
        check_seeded::<Starfield>();
        check_seeded::<Snowfield>();
        check_seeded::<Laserfield>();
    }

    #[test]
    fn storage_size_is_count_times_stride() {
        let mut rng = StdRng::seed_from_u64(1);
        let stars = seed_particles::<Starfield, _>(10, &mut rng);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&stars).len(), 10 * 44);
        let lasers = seed_particles::<Laserfield, _>(10, &mut rng);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&lasers).len(), 10 * 48);
    }
}
