use bytemuck::{Pod, Zeroable};

/// Per-frame values shared by the compute and render stages.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct FieldUniforms {
    pub time: f32,
    pub particle_count: u32,
    pub resolution: [f32; 2],
    /// Canvas-relative pointer in [0, 1], y down.
    pub pointer: [f32; 2],
    pub opacity: f32,
    pub _pad: f32,
}

impl FieldUniforms {
    pub fn new(particle_count: u32, width: u32, height: u32) -> Self {
        Self {
            time: 0.0,
            particle_count,
            resolution: [width as f32, height as f32],
            pointer: [0.5, 0.5],
            opacity: 1.0,
            _pad: 0.0,
        }
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32];
    }
}
