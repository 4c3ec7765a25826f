use rand::Rng;

/// Nearest depth an entity may reach before it is recycled.
const NEAR_DEPTH: f32 = 1.0;

/// One CPU-side entity in canvas-centered pixel units. `pz` is the depth
/// before the latest step so a streak can be drawn from old to new.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub pz: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f32, f32),
    pub to: (f32, f32),
    /// 0 at the far plane, approaching 1 right in front of the viewer.
    pub closeness: f32,
}

/// Fixed population of stars flying toward the viewer.
#[derive(Debug, Clone)]
pub struct CanvasField {
    stars: Vec<Star>,
    width: f32,
    height: f32,
    speed: f32,
}

impl CanvasField {
    pub fn new<R: Rng + ?Sized>(count: u32, width: u32, height: u32, speed: f32, rng: &mut R) -> Self {
        let mut field = Self {
            stars: Vec::with_capacity(count as usize),
            width: width.max(1) as f32,
            height: height.max(1) as f32,
            speed,
        };
        for _ in 0..count {
            let mut star = field.fresh(rng);
            star.z = rng.gen_range(NEAR_DEPTH..=field.depth());
            star.pz = star.z;
            field.stars.push(star);
        }
        field
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Far plane; also the focal length so a star at the far plane lands on
    /// its own canvas-centered coordinates.
    pub fn depth(&self) -> f32 {
        self.width.max(self.height)
    }

    /// Keeps the population; entities outside the new bounds recycle on
    /// their next step.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1) as f32;
        self.height = height.max(1) as f32;
        let depth = self.depth();
        for star in &mut self.stars {
            star.z = star.z.min(depth);
            star.pz = star.pz.min(depth);
        }
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let depth = self.depth();
        let (width, height) = (self.width, self.height);
        for index in 0..self.stars.len() {
            let star = &mut self.stars[index];
            star.pz = star.z;
            star.z -= self.speed;
            let outside = star.z < NEAR_DEPTH || {
                let (sx, sy) = project_with(star.x, star.y, star.z, depth, width, height);
                sx < 0.0 || sx >= width || sy < 0.0 || sy >= height
            };
            if outside {
                self.stars[index] = self.fresh(rng);
            }
        }
    }

    /// Screen position in pixels, origin top-left.
    pub fn project(&self, star: &Star) -> (f32, f32) {
        project_with(star.x, star.y, star.z, self.depth(), self.width, self.height)
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let depth = self.depth();
        self.stars.iter().map(move |star| Segment {
            from: project_with(star.x, star.y, star.pz, depth, self.width, self.height),
            to: project_with(star.x, star.y, star.z, depth, self.width, self.height),
            closeness: (1.0 - star.z / depth).clamp(0.0, 1.0),
        })
    }

    /// New stars enter at the far plane, not at `z = 0`: the projection
    /// divides by `z`, so a star at the eye would land at infinity and be
    /// culled again on the next step.
    fn fresh<R: Rng + ?Sized>(&self, rng: &mut R) -> Star {
        let depth = self.depth();
        Star {
            x: rng.gen_range(-0.5..0.5) * self.width,
            y: rng.gen_range(-0.5..0.5) * self.height,
            z: depth,
            pz: depth,
        }
    }
}

fn project_with(x: f32, y: f32, z: f32, depth: f32, width: f32, height: f32) -> (f32, f32) {
    let scale = depth / z.max(NEAR_DEPTH);
    (width * 0.5 + x * scale, height * 0.5 + y * scale)
}
