//! Detector output: keypoints, faces and the triangle topology.

use serde::{Deserialize, Serialize};

use crate::math::vec2::Vec2;

/// A facial landmark in source-video pixel space.
///
/// Detectors commonly send a depth `z` and a landmark name as well; both are
/// ignored when decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

impl Keypoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Keypoint> for Vec2 {
    fn from(k: Keypoint) -> Self {
        Vec2::new(k.x, k.y)
    }
}

/// One detected subject. Replaced wholesale on every detection result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub keypoints: Vec<Keypoint>,
}

impl Face {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// Resolve a triangle's three indices, or `None` if any is out of range.
    pub fn triangle(&self, [a, b, c]: [u32; 3]) -> Option<[Keypoint; 3]> {
        let get = |i: u32| self.keypoints.get(i as usize).copied();
        Some([get(a)?, get(b)?, get(c)?])
    }
}

/// Fixed list of keypoint index triples connecting keypoints into a mesh.
///
/// Supplied once by the detector and constant for the life of the program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology(Vec<[u32; 3]>);

impl Topology {
    pub fn new(triangles: Vec<[u32; 3]>) -> Self {
        Self(triangles)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.0.iter().copied()
    }

    pub fn max_index(&self) -> Option<u32> {
        self.0.iter().flat_map(|t| t.iter().copied()).max()
    }

    /// True if every index refers to one of `keypoint_count` keypoints.
    pub fn is_valid_for(&self, keypoint_count: usize) -> bool {
        self.max_index()
            .map_or(true, |max| (max as usize) < keypoint_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_face() -> Face {
        Face::new(vec![
            Keypoint::new(0.0, 0.0),
            Keypoint::new(10.0, 0.0),
            Keypoint::new(10.0, 10.0),
            Keypoint::new(0.0, 10.0),
        ])
    }

    #[test]
    fn triangle_resolves_indices() {
        let face = square_face();
        let [a, b, c] = face.triangle([0, 2, 3]).unwrap();
        assert_eq!(a, Keypoint::new(0.0, 0.0));
        assert_eq!(b, Keypoint::new(10.0, 10.0));
        assert_eq!(c, Keypoint::new(0.0, 10.0));
    }

    #[test]
    fn triangle_with_missing_keypoint_is_none() {
        assert!(square_face().triangle([0, 1, 4]).is_none());
    }

    #[test]
    fn topology_validity() {
        let topology = Topology::new(vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(topology.max_index(), Some(3));
        assert!(topology.is_valid_for(4));
        assert!(!topology.is_valid_for(3));
        assert!(Topology::default().is_valid_for(0));
    }

    #[test]
    fn keypoint_ignores_extra_fields() {
        let json = r#"{"x": 1.5, "y": 2.5, "z": -3.0, "name": "lips"}"#;
        let k: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(k, Keypoint::new(1.5, 2.5));
    }

    #[test]
    fn topology_decodes_from_nested_arrays() {
        let topology: Topology = serde_json::from_str("[[0,1,2],[2,3,0]]").unwrap();
        assert_eq!(topology.len(), 2);
        assert_eq!(topology.iter().nth(1), Some([2, 3, 0]));
    }
}
