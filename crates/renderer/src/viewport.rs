use winit::dpi::{LogicalSize, PhysicalSize};

/// Pixel dimensions of a surface for a logical size at a given scale factor.
pub fn physical_size(logical: LogicalSize<f64>, scale_factor: f64) -> PhysicalSize<u32> {
    let physical: PhysicalSize<u32> = logical.to_physical(scale_factor);
    PhysicalSize::new(physical.width.max(1), physical.height.max(1))
}

/// Latest pointer position, normalized against the surface it moved over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTracker {
    position: Option<(f64, f64)>,
    width: u32,
    height: u32,
}

impl PointerTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: None,
            width,
            height,
        }
    }

    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Records a cursor or touch position in physical pixels.
    pub fn handle_moved(&mut self, x: f64, y: f64) {
        self.position = Some((x, y));
    }

    /// Position in [0, 1] with y pointing down. Until the pointer has moved
    /// it sits in the centre, where it exerts no pull.
    pub fn normalized(&self) -> [f32; 2] {
        let Some((x, y)) = self.position else {
            return [0.5, 0.5];
        };
        let width = f64::from(self.width.max(1));
        let height = f64::from(self.height.max(1));
        [
            (x / width).clamp(0.0, 1.0) as f32,
            (y / height).clamp(0.0, 1.0) as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_pointer_is_centered() {
        assert_eq!(PointerTracker::new(800, 600).normalized(), [0.5, 0.5]);
    }

    #[test]
    fn normalizes_and_clamps() {
        let mut pointer = PointerTracker::new(800, 600);
        pointer.handle_moved(200.0, 450.0);
        assert_eq!(pointer.normalized(), [0.25, 0.75]);
        pointer.handle_moved(-10.0, 900.0);
        assert_eq!(pointer.normalized(), [0.0, 1.0]);
    }

    #[test]
    fn resize_changes_normalization() {
        let mut pointer = PointerTracker::new(800, 600);
        pointer.handle_moved(400.0, 300.0);
        pointer.set_surface_size(1600, 1200);
        assert_eq!(pointer.normalized(), [0.25, 0.25]);
    }

    #[test]
    fn physical_size_follows_scale_factor() {
        let size = physical_size(LogicalSize::new(1280.0, 720.0), 1.5);
        assert_eq!(size, PhysicalSize::new(1920, 1080));
        let size = physical_size(LogicalSize::new(0.0, 0.0), 2.0);
        assert_eq!(size, PhysicalSize::new(1, 1));
    }
}
