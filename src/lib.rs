//! Real-time triangulated face mesh drawn over a webcam feed.
//!
//! An external landmark detector supplies keypoints and a fixed triangle
//! topology; this crate maps the topology onto the keypoints, scales it to
//! the window, and rasterizes it on the CPU. SDL2 is used only for window
//! management and display.
//!
//! # Quick Start
//!
//! ```ignore
//! use facemesh_overlay::prelude::*;
//!
//! let mut overlay = Overlay::new(1280, 720, MeshConfig::default());
//! let mut state = AppState::new(Toggles::default(), topology);
//! state.update_faces(faces);
//! overlay.render(&frame, &state);
//! ```

// Public API - exposed to library consumers
pub mod app;
pub mod camera;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod math;
pub mod overlay;
pub mod state;
pub mod window;

// Internal modules - used within the crate only
pub(crate) mod render;

// Re-export commonly needed types at crate root for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use overlay::Overlay;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use facemesh_overlay::prelude::*;
/// ```
pub mod prelude {
    // Configuration
    pub use crate::config::{Config, MeshConfig};

    // Detection
    pub use crate::detector::{Detection, DetectionWorker, Detector, SubprocessDetector};
    pub use crate::landmarks::{Face, Keypoint, Topology};

    // Drawing
    pub use crate::geometry::CoverTransform;
    pub use crate::overlay::{project_mesh, FrameStats, Overlay};
    pub use crate::state::{AppState, Command, MeshStyle, Toggles};

    // Math
    pub use crate::math::vec2::Vec2;

    // Capture, window & input
    pub use crate::camera::{CameraSource, FrameSource, StillSource};
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{EdgeFunctionRasterizer, FrameBuffer, Rasterizer, Renderer, Triangle};
}
