//! Configuration loading.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. The defaults reproduce the classic look: black background,
//! green outlined mesh, 640x480 mirrored capture.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "facemesh.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub capture: CaptureConfig,
    pub detector: DetectorConfig,
    pub mesh: MeshConfig,
    pub toggles: ToggleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Face Mesh".to_string(),
            width: 1280,
            height: 720,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index.
    pub camera_index: u32,
    /// Fixed capture resolution; frames are resized to this if the device disagrees.
    pub width: u32,
    pub height: u32,
    /// Mirror frames horizontally before display and detection.
    pub mirror: bool,
    /// Serve this still image instead of opening a camera.
    pub still_image: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            width: 640,
            height: 480,
            mirror: true,
            still_image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Landmark program to launch.
    pub command: String,
    pub args: Vec<String>,
    pub max_faces: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: "facemesh-detector".to_string(),
            args: Vec::new(),
            max_faces: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// RGB colour used for fill, stroke and dots.
    pub color: [u8; 3],
    /// Stroke width in source pixels; multiplied by the cover scale.
    pub line_width: f32,
    /// Dot diameter in source pixels; multiplied by the cover scale.
    pub dot_size: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            line_width: 0.45,
            dot_size: 2.5,
        }
    }
}

impl MeshConfig {
    /// Mesh colour packed as opaque ARGB8888.
    pub fn argb(&self) -> u32 {
        let [r, g, b] = self.color;
        0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
    }
}

/// Initial toggle values; keyboard input flips them at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    pub black_background: bool,
    pub fill_mesh: bool,
    pub hide_lines: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            black_background: true,
            fill_mesh: false,
            hide_lines: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load from an explicit path, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            log::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            log::info!("Loading config from: {}", default_path.display());
            return Self::from_file(default_path);
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid("window", "Window size must be non-zero").into());
        }
        if self.window.fps == 0 {
            return Err(ConfigError::invalid("window.fps", "Frame rate must be greater than 0").into());
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(
                ConfigError::invalid("capture", "Capture resolution must be non-zero").into(),
            );
        }
        if self.detector.command.trim().is_empty() {
            return Err(ConfigError::invalid("detector.command", "Command must not be empty").into());
        }
        if self.detector.max_faces == 0 {
            return Err(
                ConfigError::invalid("detector.max_faces", "At least one face must be tracked")
                    .into(),
            );
        }
        if !(self.mesh.line_width > 0.0) {
            return Err(ConfigError::invalid("mesh.line_width", "Line width must be positive").into());
        }
        if !(self.mesh.dot_size > 0.0) {
            return Err(ConfigError::invalid("mesh.dot_size", "Dot size must be positive").into());
        }
        Ok(())
    }
}
