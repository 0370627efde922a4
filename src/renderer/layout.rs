//! Viewport transform between scene units and canvas pixels.

/// Half-extent of the square scene viewport, in scene units
pub const VIEWPORT_HALF_EXTENT: f64 = 12.0;

/// Origin-centred square viewport mapped onto a square pixel canvas.
///
/// Scene coordinates are y-up; pixel rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub half_extent: f64,
    pub size_px: usize,
}

/// Inclusive-exclusive pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelBounds {
    /// Grow by `pad` pixels on every side, staying within `width` x `height`.
    pub fn padded(&self, pad: usize, width: usize, height: usize) -> Self {
        Self {
            x0: self.x0.saturating_sub(pad),
            y0: self.y0.saturating_sub(pad),
            x1: (self.x1 + pad).min(width),
            y1: (self.y1 + pad).min(height),
        }
    }
}

impl Viewport {
    pub fn new(size_px: usize) -> Self {
        Self {
            half_extent: VIEWPORT_HALF_EXTENT,
            size_px,
        }
    }

    /// Scene units per pixel
    #[inline]
    pub fn units_per_px(&self) -> f64 {
        2.0 * self.half_extent / self.size_px as f64
    }

    /// Scene coordinates of a (possibly fractional) pixel position
    #[inline]
    pub fn to_scene(&self, px: f64, py: f64) -> (f64, f64) {
        let u = self.units_per_px();
        (px * u - self.half_extent, self.half_extent - py * u)
    }

    /// Fractional pixel position of a scene point
    #[inline]
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let u = self.units_per_px();
        ((x + self.half_extent) / u, (self.half_extent - y) / u)
    }

    /// Pixels covering an origin-centred box of the given half-extents (scene units)
    pub fn bounds_around_origin(&self, half_w: f64, half_h: f64) -> PixelBounds {
        let (left, top) = self.to_pixel(-half_w, half_h);
        let (right, bottom) = self.to_pixel(half_w, -half_h);
        let clamp = |v: f64| -> usize {
            if v.is_nan() {
                0
            } else {
                v.clamp(0.0, self.size_px as f64) as usize
            }
        };
        PixelBounds {
            x0: clamp(left.floor()),
            y0: clamp(top.floor()),
            x1: clamp(right.ceil()),
            y1: clamp(bottom.ceil()),
        }
    }
}

/// Half-extents of the axis-aligned box enclosing an origin-centred ellipse
/// with semi-axes `a` (along the rotated x axis) and `b`, rotated by `theta` radians.
pub fn rotated_ellipse_extents(a: f64, b: f64, theta: f64) -> (f64, f64) {
    let (s, c) = theta.sin_cos();
    (
        (a * a * c * c + b * b * s * s).sqrt(),
        (a * a * s * s + b * b * c * c).sqrt(),
    )
}
