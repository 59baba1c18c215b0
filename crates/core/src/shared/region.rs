/// Axis-aligned rectangle in pixel coordinates: top-left corner plus size.
///
/// Used for detection boxes, track geometry and regions of interest alike.
/// Well-formed regions have non-negative width and height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a region from `[x1, y1]`-`[x2, y2]` corner coordinates.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_well_formed(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    /// Intersection over union. Zero when the intersection is empty or the
    /// union has no area; symmetric in its arguments.
    pub fn iou(&self, other: &Region) -> f64 {
        let ix = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let iy = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);

        let inter = ix * iy;
        if inter <= 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Moves every component toward `target` by `factor` (0 = stay, 1 = snap).
    pub fn approach(&mut self, target: &Region, factor: f64) {
        self.x += (target.x - self.x) * factor;
        self.y += (target.y - self.y) * factor;
        self.width += (target.width - self.width) * factor;
        self.height += (target.height - self.height) * factor;
    }
}
