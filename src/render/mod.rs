//! CPU drawing primitives used by the overlay.

mod framebuffer;
mod rasterizer;
mod renderer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{EdgeFunctionRasterizer, Rasterizer, Triangle};
pub use renderer::{Renderer, COLOR_BLACK};
