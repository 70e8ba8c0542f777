//! Triangle rasterization.
//!
//! The mesh is flat-coloured, so a single edge-function rasterizer covers
//! every fill the overlay needs. The [`Rasterizer`] trait keeps the fill
//! strategy swappable for benchmarking.

mod edgefunction;

pub use edgefunction::EdgeFunctionRasterizer;

use super::framebuffer::FrameBuffer;
use crate::math::vec2::Vec2;

/// A triangle ready for rasterization in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub points: [Vec2; 3],
    pub color: u32,
}

impl Triangle {
    pub fn new(points: [Vec2; 3], color: u32) -> Self {
        Self { points, color }
    }
}

/// Trait for triangle rasterization algorithms.
///
/// Implementors define how triangles are filled into a pixel buffer.
pub trait Rasterizer {
    /// Fill a triangle into the frame buffer in its own colour.
    ///
    /// # Arguments
    /// * `triangle` - The triangle to rasterize
    /// * `buffer` - The frame buffer to draw into
    fn fill_triangle(&self, triangle: &Triangle, buffer: &mut FrameBuffer);
}
