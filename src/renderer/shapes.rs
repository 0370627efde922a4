//! Point-sampled shapes making up the footprint scene.
//!
//! Each shape answers "does this scene point belong to me"; the canvas
//! rasterizer supersamples those answers into anti-aliased pixels.

/// Ellipse centred at the origin, semi-axis `a` along the rotated x axis.
#[derive(Debug, Clone, Copy)]
pub struct Ellipse {
    pub a: f64,
    pub b: f64,
    cos_t: f64,
    sin_t: f64,
}

impl Ellipse {
    pub fn new(a: f64, b: f64, theta: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        Self { a, b, cos_t, sin_t }
    }

    /// Coordinates in the ellipse's own (unrotated) frame
    #[inline]
    fn local(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.cos_t + y * self.sin_t,
            -x * self.sin_t + y * self.cos_t,
        )
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (u, v) = self.local(x, y);
        (u / self.a).powi(2) + (v / self.b).powi(2) <= 1.0
    }

    /// First-order signed distance to the outline (negative inside).
    pub fn signed_distance(&self, x: f64, y: f64) -> f64 {
        let (u, v) = self.local(x, y);
        let a2 = self.a * self.a;
        let b2 = self.b * self.b;
        let r = ((u * u) / a2 + (v * v) / b2).sqrt();
        if r < 1e-9 {
            return -self.a.min(self.b);
        }
        let gx = u / (a2 * r);
        let gy = v / (b2 * r);
        let grad = (gx * gx + gy * gy).sqrt();
        (r - 1.0) / grad
    }

    #[inline]
    pub fn on_outline(&self, x: f64, y: f64, width: f64) -> bool {
        width > 0.0 && self.signed_distance(x, y).abs() <= width / 2.0
    }
}

/// Straight segment through the origin spanning `[-half_length, half_length]`
/// along direction `theta`, with butt ends.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub half_length: f64,
    pub width: f64,
    cos_t: f64,
    sin_t: f64,
}

impl Segment {
    pub fn new(half_length: f64, width: f64, theta: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        Self {
            half_length,
            width,
            cos_t,
            sin_t,
        }
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.width <= 0.0 {
            return false;
        }
        let along = x * self.cos_t + y * self.sin_t;
        let across = -x * self.sin_t + y * self.cos_t;
        along.abs() <= self.half_length && across.abs() <= self.width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn ellipse_contains_respects_rotation() {
        let e = Ellipse::new(5.0, 1.0, 0.0);
        assert!(e.contains(4.9, 0.0));
        assert!(!e.contains(0.0, 1.5));

        let r = Ellipse::new(5.0, 1.0, FRAC_PI_2);
        assert!(r.contains(0.0, 4.9));
        assert!(!r.contains(4.9, 0.0));
    }

    #[test]
    fn signed_distance_on_axes_is_exact() {
        let e = Ellipse::new(4.0, 2.0, 0.0);
        assert!((e.signed_distance(5.0, 0.0) - 1.0).abs() < 1e-9);
        assert!((e.signed_distance(0.0, 1.5) + 0.5).abs() < 1e-9);
        assert!(e.signed_distance(0.0, 0.0) < 0.0);
        assert!(e.on_outline(4.0, 0.0, 0.2));
        assert!(!e.on_outline(4.0, 0.0, 0.0));
    }

    #[test]
    fn segment_has_butt_ends() {
        let s = Segment::new(3.0, 0.5, 0.0);
        assert!(s.contains(2.9, 0.2));
        assert!(!s.contains(3.1, 0.0));
        assert!(!s.contains(0.0, 0.3));
        assert!(s.contains(-2.9, -0.2));
    }

    #[test]
    fn rotated_segment_follows_angle() {
        let s = Segment::new(3.0, 0.4, FRAC_PI_2 / 2.0);
        assert!(s.contains(1.5, 1.5));
        assert!(!s.contains(1.5, -1.5));
    }
}
