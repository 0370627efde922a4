//! Footprint scene renderer
//!
//! Every call draws into its own [`Canvas`], an owned RGBA pixel buffer that
//! is cropped to the drawn content and encoded to PNG before it is dropped.
//! Nothing is shared between calls.

pub mod layout;
pub mod shapes;

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::color::RgbColor;
use crate::config::RenderConfig;
use crate::error::{ImpactError, ImpactResult};
use crate::mapping::{minor_from_major_and_eccentricity, SceneGeometry};
use layout::{rotated_ellipse_extents, PixelBounds, Viewport};
use shapes::{Ellipse, Segment};

/// Owned RGBA pixel buffer, 4 bytes per pixel in **RGBA** order.
pub struct Canvas {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Canvas {
    /// A canvas filled with an opaque background color
    pub fn new(width: usize, height: usize, background: RgbColor) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[background.r, background.g, background.b, 255]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Write an opaque pixel at (x, y). Out-of-range writes are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * 4;
        self.data[idx] = r;
        self.data[idx + 1] = g;
        self.data[idx + 2] = b;
        self.data[idx + 3] = 255;
    }

    /// Read the RGBA values at (x, y).
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> (u8, u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0, 0);
        }
        let idx = (y * self.width + x) * 4;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2], self.data[idx + 3])
    }

    /// Smallest rectangle holding every pixel that differs from `background`.
    pub fn content_bounds(&self, background: RgbColor) -> Option<PixelBounds> {
        let mut bounds: Option<PixelBounds> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let (r, g, b, _) = self.get_pixel(x, y);
                if (r, g, b) == background.as_tuple() {
                    continue;
                }
                bounds = Some(match bounds {
                    None => PixelBounds { x0: x, y0: y, x1: x + 1, y1: y + 1 },
                    Some(pb) => PixelBounds {
                        x0: pb.x0.min(x),
                        y0: pb.y0.min(y),
                        x1: pb.x1.max(x + 1),
                        y1: pb.y1.max(y + 1),
                    },
                });
            }
        }
        bounds
    }

    /// Copy out the pixels inside `bounds`.
    pub fn crop(&self, bounds: PixelBounds) -> Canvas {
        let x1 = bounds.x1.min(self.width);
        let y1 = bounds.y1.min(self.height);
        let x0 = bounds.x0.min(x1);
        let y0 = bounds.y0.min(y1);
        let width = x1 - x0;
        let height = y1 - y0;

        let mut data = Vec::with_capacity(width * height * 4);
        for y in y0..y1 {
            let start = (y * self.width + x0) * 4;
            data.extend_from_slice(&self.data[start..start + width * 4]);
        }
        Canvas {
            data,
            width,
            height,
        }
    }

    pub fn encode_png(self) -> ImpactResult<Vec<u8>> {
        let img = RgbaImage::from_raw(self.width as u32, self.height as u32, self.data)
            .ok_or_else(|| ImpactError::Render("pixel buffer does not match canvas size".into()))?;
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

/// Encoded footprint image
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// The two drawable elements of a footprint, in scene units.
pub struct Scene {
    pub ellipse: Ellipse,
    pub diameter: Segment,
    pub fill: RgbColor,
    /// Rotation of both elements, radians counter-clockwise
    pub theta: f64,
}

impl Scene {
    pub fn new(
        major_axis: f64,
        eccentricity: f64,
        fill_shade: f64,
        angle_deg: f64,
        viewport: &Viewport,
        style: &RenderConfig,
    ) -> Self {
        let minor_axis = minor_from_major_and_eccentricity(major_axis, eccentricity);
        let theta = angle_deg.to_radians();
        let units = viewport.units_per_px();
        Self {
            ellipse: Ellipse::new(major_axis / 2.0, minor_axis / 2.0, theta),
            diameter: Segment::new(major_axis / 2.0, style.diameter_width * units, theta),
            fill: RgbColor::grayscale(fill_shade),
            theta,
        }
    }

    /// Color of a single scene point: fill, then outline, then diameter on top.
    #[inline]
    fn sample(&self, x: f64, y: f64, outline_width: f64, style: &RenderConfig) -> Option<RgbColor> {
        if self.diameter.contains(x, y) {
            Some(style.diameter_color)
        } else if self.ellipse.on_outline(x, y, outline_width) {
            Some(style.outline_color)
        } else if self.ellipse.contains(x, y) {
            Some(self.fill)
        } else {
            None
        }
    }
}

/// Rasterize the scene onto a fresh, uncropped canvas.
pub fn draw_scene(scene: &Scene, viewport: &Viewport, style: &RenderConfig) -> Canvas {
    let mut canvas = Canvas::new(viewport.size_px, viewport.size_px, style.background);

    let units = viewport.units_per_px();
    let outline_width = style.outline_width * units;
    let stroke_margin = outline_width.max(scene.diameter.width) / 2.0 + units;
    let (half_w, half_h) = rotated_ellipse_extents(scene.ellipse.a, scene.ellipse.b, scene.theta);
    let bounds = viewport.bounds_around_origin(half_w + stroke_margin, half_h + stroke_margin);

    let ss = style.supersample.max(1) as usize;
    let samples = (ss * ss) as u32;
    let bg = style.background;

    for py in bounds.y0..bounds.y1 {
        for px in bounds.x0..bounds.x1 {
            let mut acc = [0u32; 3];
            for sy in 0..ss {
                for sx in 0..ss {
                    let fx = px as f64 + (sx as f64 + 0.5) / ss as f64;
                    let fy = py as f64 + (sy as f64 + 0.5) / ss as f64;
                    let (x, y) = viewport.to_scene(fx, fy);
                    let c = scene.sample(x, y, outline_width, style).unwrap_or(bg);
                    acc[0] += c.r as u32;
                    acc[1] += c.g as u32;
                    acc[2] += c.b as u32;
                }
            }
            let avg = |v: u32| ((v + samples / 2) / samples) as u8;
            canvas.put_pixel(px, py, avg(acc[0]), avg(acc[1]), avg(acc[2]));
        }
    }

    canvas
}

/// Render the footprint for the given geometry and return the cropped PNG.
pub fn render_scene(
    major_axis: f64,
    eccentricity: f64,
    fill_shade: f64,
    angle_deg: f64,
    style: &RenderConfig,
) -> ImpactResult<RenderedImage> {
    if !major_axis.is_finite() || major_axis <= 0.0 {
        return Err(ImpactError::Render(format!("major axis must be positive, got {}", major_axis)));
    }
    let angle_deg = if angle_deg.is_finite() { angle_deg } else { 0.0 };

    let viewport = Viewport::new(style.size as usize);
    let scene = Scene::new(major_axis, eccentricity, fill_shade, angle_deg, &viewport, style);
    let canvas = draw_scene(&scene, &viewport, style);

    let full = PixelBounds { x0: 0, y0: 0, x1: canvas.width, y1: canvas.height };
    let cropped = match canvas.content_bounds(style.background) {
        Some(content) => canvas.crop(content.padded(style.crop_padding as usize, canvas.width, canvas.height)),
        None => canvas.crop(full),
    };

    let (width, height) = (cropped.width as u32, cropped.height as u32);
    let png_data = cropped.encode_png()?;
    debug!("Rendered footprint {}x{} ({} bytes)", width, height, png_data.len());

    Ok(RenderedImage {
        width,
        height,
        png_data,
    })
}

/// Convenience wrapper rendering a derived [`SceneGeometry`].
pub fn render_geometry(geometry: &SceneGeometry, style: &RenderConfig) -> ImpactResult<RenderedImage> {
    render_scene(
        geometry.major_axis,
        geometry.eccentricity,
        geometry.fill_shade,
        geometry.rotation_deg,
        style,
    )
}
