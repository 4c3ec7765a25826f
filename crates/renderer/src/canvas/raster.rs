use image::{Rgba, RgbaImage};

pub const BACKGROUND: Rgba<u8> = Rgba([2, 2, 8, 255]);

/// Software framebuffer the canvas backend draws into before presenting.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width.max(1), height.max(1), BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if (width.max(1), height.max(1)) != self.image.dimensions() {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.width() && y < self.height()).then(|| *self.image.get_pixel(x, y))
    }

    /// Additive plot; out-of-bounds coordinates are ignored.
    pub fn plot(&mut self, x: i64, y: i64, color: [u8; 3], intensity: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return;
        }
        let intensity = intensity.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for channel in 0..3 {
            let added = f32::from(color[channel]) * intensity;
            pixel.0[channel] = (f32::from(pixel.0[channel]) + added).min(255.0) as u8;
        }
    }

    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: [u8; 3], intensity: f32) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = from.0 + dx * t;
            let y = from.1 + dy * t;
            self.plot(x.floor() as i64, y.floor() as i64, color, intensity);
        }
    }

    /// Square dot of side `size` centered on `center`.
    pub fn draw_point(&mut self, center: (f32, f32), size: u32, color: [u8; 3], intensity: f32) {
        let size = i64::from(size.max(1));
        let left = center.0.floor() as i64 - size / 2;
        let top = center.1.floor() as i64 - size / 2;
        for y in top..top + size {
            for x in left..left + size {
                self.plot(x, y, color, intensity);
            }
        }
    }

    /// Packs into `0x00RRGGBB` words scaled by `opacity`. Copies the
    /// overlapping region when sizes disagree.
    pub fn copy_to(&self, target: &mut [u32], target_width: u32, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let target_width = target_width.max(1) as usize;
        let target_height = target.len() / target_width;
        let rows = target_height.min(self.height() as usize);
        let cols = target_width.min(self.width() as usize);
        for y in 0..rows {
            for x in 0..cols {
                let Rgba([r, g, b, _]) = *self.image.get_pixel(x as u32, y as u32);
                let scale = |channel: u8| (f32::from(channel) * opacity) as u32;
                target[y * target_width + x] = (scale(r) << 16) | (scale(g) << 8) | scale(b);
            }
        }
    }
}
