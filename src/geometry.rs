//! Mapping between source-video pixel space and canvas space.
//!
//! The video is scaled uniformly so it covers the whole canvas (cropping the
//! overflow) and is centred. Keypoints go through the same transform so the
//! mesh lines up with the displayed video.

use image::RgbImage;

use crate::math::vec2::Vec2;

/// Uniform "cover" scale plus centring offsets for one canvas/video size pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverTransform {
    scale: f32,
    offset: Vec2,
    video_size: Vec2,
}

impl CoverTransform {
    /// Computes the transform that lets a `video_w` x `video_h` source cover a
    /// `canvas_w` x `canvas_h` canvas without distortion.
    ///
    /// A zero-sized video has no meaningful scale; the identity is returned.
    pub fn fit(canvas_w: u32, canvas_h: u32, video_w: u32, video_h: u32) -> Self {
        if video_w == 0 || video_h == 0 {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
                video_size: Vec2::new(video_w as f32, video_h as f32),
            };
        }

        let scale_x = canvas_w as f32 / video_w as f32;
        let scale_y = canvas_h as f32 / video_h as f32;
        let scale = scale_x.max(scale_y);

        let video_size = Vec2::new(video_w as f32 * scale, video_h as f32 * scale);
        let offset = Vec2::new(
            (canvas_w as f32 - video_size.x) / 2.0,
            (canvas_h as f32 - video_size.y) / 2.0,
        );

        Self {
            scale,
            offset,
            video_size,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Size of the scaled video on the canvas.
    pub fn video_size(&self) -> Vec2 {
        self.video_size
    }

    #[inline]
    pub fn to_canvas(&self, source: Vec2) -> Vec2 {
        source * self.scale + self.offset
    }

    #[inline]
    pub fn to_source(&self, canvas: Vec2) -> Vec2 {
        (canvas - self.offset) / self.scale
    }

    /// Source pixel under a canvas position, floored to integer coordinates.
    pub fn to_source_pixel(&self, canvas: Vec2) -> (i32, i32) {
        let p = self.to_source(canvas).floor();
        (p.x as i32, p.y as i32)
    }

    pub fn scaled_line_width(&self, base: f32) -> f32 {
        base * self.scale
    }

    pub fn scaled_dot_size(&self, base: f32) -> f32 {
        base * self.scale
    }
}

pub fn centroid([a, b, c]: [Vec2; 3]) -> Vec2 {
    (a + b + c) / 3.0
}

/// RGB value of the source pixel under a canvas-space triangle's centroid.
///
/// Returns `None` when the centroid maps outside the frame. Not used for
/// mesh colouring.
pub fn sample_centroid(
    frame: &RgbImage,
    transform: &CoverTransform,
    triangle: [Vec2; 3],
) -> Option<[u8; 3]> {
    let (px, py) = transform.to_source_pixel(centroid(triangle));
    if px < 0 || py < 0 || px as u32 >= frame.width() || py as u32 >= frame.height() {
        return None;
    }
    Some(frame.get_pixel(px as u32, py as u32).0)
}
