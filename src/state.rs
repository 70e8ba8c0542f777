//! Application state handed to the render pass each frame.

use crate::config::ToggleConfig;
use crate::landmarks::{Face, Topology};

/// User commands coming from the keyboard and pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch between black background and live video (key: B)
    ToggleBackground,
    /// Switch between outlined and filled triangles (key: F)
    ToggleFill,
    /// Hide triangle outlines, leaving only vertex dots (key: H)
    ToggleHideLines,
    /// Toggle fullscreen and dump the detection state (pointer press)
    ToggleFullscreen,
}

impl Command {
    /// Maps a typed character to a command, case-insensitively.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'b' => Some(Command::ToggleBackground),
            'f' => Some(Command::ToggleFill),
            'h' => Some(Command::ToggleHideLines),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub black_background: bool,
    pub fill_mesh: bool,
    pub hide_lines: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        ToggleConfig::default().into()
    }
}

impl From<ToggleConfig> for Toggles {
    fn from(config: ToggleConfig) -> Self {
        Self {
            black_background: config.black_background,
            fill_mesh: config.fill_mesh,
            hide_lines: config.hide_lines,
        }
    }
}

impl Toggles {
    pub fn mesh_style(&self) -> MeshStyle {
        if self.fill_mesh {
            MeshStyle::Filled
        } else if self.hide_lines {
            MeshStyle::Hidden
        } else {
            MeshStyle::Outlined
        }
    }
}

/// How triangles are drawn. Vertex dots are drawn in every style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshStyle {
    /// Solid fill, no outline. Wins over hide-lines.
    Filled,
    /// Outline only.
    Outlined,
    /// Neither fill nor outline.
    Hidden,
}

impl MeshStyle {
    pub fn fills(&self) -> bool {
        matches!(self, MeshStyle::Filled)
    }

    pub fn strokes(&self) -> bool {
        matches!(self, MeshStyle::Outlined)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub toggles: Toggles,
    pub faces: Vec<Face>,
    pub topology: Topology,
    pub fullscreen: bool,
}

impl AppState {
    pub fn new(toggles: Toggles, topology: Topology) -> Self {
        Self {
            toggles,
            faces: Vec::new(),
            topology,
            fullscreen: false,
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::ToggleBackground => {
                self.toggles.black_background = !self.toggles.black_background
            }
            Command::ToggleFill => self.toggles.fill_mesh = !self.toggles.fill_mesh,
            Command::ToggleHideLines => self.toggles.hide_lines = !self.toggles.hide_lines,
            Command::ToggleFullscreen => self.fullscreen = !self.fullscreen,
        }
    }

    /// Replaces the detection result; faces are never merged across results.
    pub fn update_faces(&mut self, faces: Vec<Face>) {
        self.faces = faces;
    }

    /// Only the first detected face is drawn.
    pub fn primary_face(&self) -> Option<&Face> {
        self.faces.first()
    }

    /// One-line summary of the current detection, logged on pointer press.
    pub fn describe_detection(&self) -> String {
        let keypoints: Vec<usize> = self.faces.iter().map(|f| f.keypoints.len()).collect();
        format!(
            "{} face(s) detected, keypoints per face: {:?}, topology: {} triangles",
            self.faces.len(),
            keypoints,
            self.topology.len()
        )
    }
}
