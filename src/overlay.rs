//! Per-frame mesh projection and drawing.
//!
//! The [`Overlay`] owns the canvas and turns one video frame plus the current
//! [`AppState`] into pixels: background, mesh triangles in the active
//! [`MeshStyle`], then a dot on every vertex.

use image::RgbImage;

use crate::config::MeshConfig;
use crate::geometry::CoverTransform;
use crate::landmarks::{Face, Topology};
use crate::math::vec2::Vec2;
use crate::render::{EdgeFunctionRasterizer, Rasterizer, Renderer, Triangle};
use crate::state::{AppState, MeshStyle};

pub use crate::render::COLOR_BLACK;

/// Projects every topology triangle of `face` into canvas space.
///
/// Triangles referencing keypoints the face does not have are skipped.
pub fn project_mesh(face: &Face, topology: &Topology, transform: &CoverTransform) -> Vec<[Vec2; 3]> {
    topology
        .iter()
        .filter_map(|indices| face.triangle(indices))
        .map(|[a, b, c]| {
            [
                transform.to_canvas(a.into()),
                transform.to_canvas(b.into()),
                transform.to_canvas(c.into()),
            ]
        })
        .collect()
}

/// What the last [`Overlay::render`] call put on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles_filled: usize,
    pub triangles_stroked: usize,
    pub dots: usize,
}

pub struct Overlay {
    renderer: Renderer,
    rasterizer: EdgeFunctionRasterizer,
    mesh: MeshConfig,
    mesh_color: u32,
    stats: FrameStats,
}

impl Overlay {
    pub fn new(width: u32, height: u32, mesh: MeshConfig) -> Self {
        Self {
            renderer: Renderer::new(width, height),
            rasterizer: EdgeFunctionRasterizer::new(),
            mesh_color: mesh.argb(),
            mesh,
            stats: FrameStats::default(),
        }
    }

    /// Canvas dimensions track the window; call on every resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn mesh_color(&self) -> u32 {
        self.mesh_color
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.renderer.pixel(x, y)
    }

    pub fn transform_for(&self, frame: &RgbImage) -> CoverTransform {
        CoverTransform::fit(self.width(), self.height(), frame.width(), frame.height())
    }

    /// Render the current frame
    pub fn render(&mut self, frame: &RgbImage, state: &AppState) {
        self.stats = FrameStats::default();
        let transform = self.transform_for(frame);

        if state.toggles.black_background {
            self.renderer.clear(COLOR_BLACK);
        } else {
            self.renderer.blit_cover(frame, &transform);
        }

        let Some(face) = state.primary_face() else {
            return;
        };

        let triangles = project_mesh(face, &state.topology, &transform);
        let color = self.mesh_color;

        match state.toggles.mesh_style() {
            MeshStyle::Filled => {
                let mut fb = self.renderer.as_framebuffer();
                for points in &triangles {
                    self.rasterizer.fill_triangle(&Triangle::new(*points, color), &mut fb);
                }
                self.stats.triangles_filled = triangles.len();
            }
            MeshStyle::Outlined => {
                let line_width = transform.scaled_line_width(self.mesh.line_width);
                for points in &triangles {
                    self.renderer.draw_triangle_wireframe(*points, line_width, color);
                }
                self.stats.triangles_stroked = triangles.len();
            }
            MeshStyle::Hidden => {}
        }

        // Dots go on top of everything, whatever the style.
        let dot_size = transform.scaled_dot_size(self.mesh.dot_size);
        for points in &triangles {
            for vertex in points {
                self.renderer.fill_circle(*vertex, dot_size, color);
            }
        }
        self.stats.dots = triangles.len() * 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Keypoint;
    use approx::assert_relative_eq;

    #[test]
    fn project_mesh_maps_through_transform() {
        let face = Face::new(vec![
            Keypoint::new(100.0, 100.0),
            Keypoint::new(200.0, 100.0),
            Keypoint::new(150.0, 200.0),
        ]);
        let topology = Topology::new(vec![[0, 1, 2]]);
        let t = CoverTransform::fit(1280, 960, 640, 480);

        let mesh = project_mesh(&face, &topology, &t);
        assert_eq!(mesh.len(), 1);
        assert_relative_eq!(mesh[0][0].x, 200.0);
        assert_relative_eq!(mesh[0][0].y, 200.0);
        assert_relative_eq!(mesh[0][2].x, 300.0);
        assert_relative_eq!(mesh[0][2].y, 400.0);
    }

    #[test]
    fn project_mesh_skips_invalid_triangles() {
        let face = Face::new(vec![Keypoint::default(); 3]);
        let topology = Topology::new(vec![[0, 1, 2], [1, 2, 3], [0, 0, 9]]);
        let t = CoverTransform::fit(640, 480, 640, 480);
        assert_eq!(project_mesh(&face, &topology, &t).len(), 1);
    }

    #[test]
    fn mesh_color_defaults_to_green() {
        let overlay = Overlay::new(4, 4, MeshConfig::default());
        assert_eq!(overlay.mesh_color(), 0xFF00FF00);
    }
}
