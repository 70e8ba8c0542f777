//! Low-level rendering primitives.
//!
//! Provides the [`Renderer`] struct which owns the color buffer and implements
//! the drawing operations the overlay needs: video blits, lines and dots.

use image::RgbImage;

use super::framebuffer::FrameBuffer;
use crate::geometry::CoverTransform;
use crate::math::vec2::Vec2;

pub const COLOR_BLACK: u32 = 0xFF000000;

pub struct Renderer {
    color_buffer: Vec<u32>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![COLOR_BLACK; size],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![COLOR_BLACK; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let index = (y as u32 * self.width + x as u32) as usize;
            self.color_buffer[index] = color;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.color_buffer[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Draws `frame` scaled and centred by `transform`, nearest-neighbour.
    ///
    /// Every canvas pixel is sampled back into source space, so the result
    /// covers the canvas with the overflow cropped.
    pub fn blit_cover(&mut self, frame: &RgbImage, transform: &CoverTransform) {
        let (frame_w, frame_h) = frame.dimensions();
        if frame_w == 0 || frame_h == 0 {
            return;
        }

        for y in 0..self.height {
            let row = (y * self.width) as usize;
            for x in 0..self.width {
                let (sx, sy) =
                    transform.to_source_pixel(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let sx = sx.clamp(0, frame_w as i32 - 1) as u32;
                let sy = sy.clamp(0, frame_h as i32 - 1) as u32;
                let [r, g, b] = frame.get_pixel(sx, sy).0;
                self.color_buffer[row + x as usize] =
                    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
            }
        }
    }

    /// Filled disc of the given diameter centred on `center`.
    ///
    /// Discs smaller than a pixel still mark the pixel under their centre.
    pub fn fill_circle(&mut self, center: Vec2, diameter: f32, color: u32) {
        if !(center.x.is_finite() && center.y.is_finite() && diameter.is_finite()) {
            return;
        }
        let radius = diameter / 2.0;
        if radius <= 0.5 {
            self.set_pixel(center.x.floor() as i32, center.y.floor() as i32, color);
            return;
        }

        let r2 = radius * radius;
        let min_x = ((center.x - radius).floor() as i32).max(0);
        let max_x = ((center.x + radius).ceil() as i32).min(self.width as i32 - 1);
        let min_y = ((center.y - radius).floor() as i32).max(0);
        let max_y = ((center.y + radius).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            let dy = y as f32 + 0.5 - center.y;
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Line of the given stroke width between two canvas points.
    ///
    /// Strokes up to one pixel wide use plain Bresenham; wider strokes stamp
    /// a disc at every step. The segment is first clipped to the canvas grown
    /// by the stroke radius, so only visible pixels are walked.
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: u32) {
        let margin = width.max(1.0) / 2.0 + 1.0;
        let Some((from, to)) = clip_segment(from, to, self.width, self.height, margin) else {
            return;
        };
        let (x0, y0) = (from.x.floor() as i32, from.y.floor() as i32);
        let (x1, y1) = (to.x.floor() as i32, to.y.floor() as i32);

        if width <= 1.0 {
            self.draw_line_bresenham(x0, y0, x1, y1, |r, x, y| r.set_pixel(x, y, color));
        } else {
            self.draw_line_bresenham(x0, y0, x1, y1, |r, x, y| {
                r.fill_circle(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), width, color)
            });
        }
    }

    /// Outline of a screen-space triangle.
    pub fn draw_triangle_wireframe(&mut self, points: [Vec2; 3], width: f32, color: u32) {
        let [p0, p1, p2] = points;
        self.draw_line(p0, p1, width, color);
        self.draw_line(p1, p2, width, color);
        self.draw_line(p2, p0, width, color);
    }

    /// Walks the pixels between two points using Bresenham's line algorithm.
    ///
    /// Only integer arithmetic: an error term tracks the distance between the
    /// ideal line and the current pixel, and a step along the minor axis is
    /// taken whenever it crosses the threshold. `plot` is called once per pixel.
    fn draw_line_bresenham<F>(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, mut plot: F)
    where
        F: FnMut(&mut Self, i32, i32),
    {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();

        let x_incr_direction = if x0 < x1 { 1 } else { -1 };
        let y_incr_direction = if y0 < y1 { 1 } else { -1 };

        let mut err = dx - dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            plot(&mut *self, x, y);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += x_incr_direction;
            }
            if e2 < dx {
                err += dx;
                y += y_incr_direction;
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and a stricter alignment than u8; the
        // byte length is exactly len * 4.
        unsafe {
            std::slice::from_raw_parts(
                self.color_buffer.as_ptr() as *const u8,
                self.color_buffer.len() * 4,
            )
        }
    }

    /// Get a mutable FrameBuffer view into the color buffer.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(&mut self.color_buffer, self.width, self.height)
    }
}

/// Liang-Barsky clip of a segment against the canvas grown by `margin`.
///
/// Runs in `f64` so segments with far-off endpoints keep sub-pixel accuracy
/// on the part that remains. Returns `None` for non-finite input or a
/// segment entirely outside.
fn clip_segment(
    from: Vec2,
    to: Vec2,
    width: u32,
    height: u32,
    margin: f32,
) -> Option<(Vec2, Vec2)> {
    let coords = [from.x, from.y, to.x, to.y, margin];
    if coords.iter().any(|c| !c.is_finite()) {
        return None;
    }

    let margin = margin as f64;
    let (min_x, min_y) = (-margin, -margin);
    let (max_x, max_y) = (width as f64 + margin, height as f64 + margin);
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0 - min_x), (dx, max_x - x0), (-dy, y0 - min_y), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let point = |t: f64| {
        Vec2::new(
            (x0 + dx * t).clamp(min_x, max_x) as f32,
            (y0 + dy * t).clamp(min_y, max_y) as f32,
        )
    };
    Some((point(t0), point(t1)))
}
