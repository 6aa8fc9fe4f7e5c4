/// Cube geometry, face colors and pip layouts for dice
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::{Vec3, VectorExt};

/// RGBA color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a packed `0xAARRGGBB` value
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: channel(24),
        }
    }

    /// Multiply the RGB channels by `factor`, clamped to [0, 1]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: (self.r * factor).clamp(0.0, 1.0),
            g: (self.g * factor).clamp(0.0, 1.0),
            b: (self.b * factor).clamp(0.0, 1.0),
            a: self.a,
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// 8-bit RGB triple, alpha ignored
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

/// Normalized position of a pip on a face, both coordinates in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pip {
    pub u: f32,
    pub v: f32,
}

impl Pip {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

const LOW: f32 = 0.25;
const MID: f32 = 0.5;
const HIGH: f32 = 0.75;

/// Standard pip layout for a die value. Values outside 1..=6 have no pips.
pub fn pips_for_value(value: u8) -> Vec<Pip> {
    let p = Pip::new;
    match value {
        1 => vec![p(MID, MID)],
        2 => vec![p(LOW, LOW), p(HIGH, HIGH)],
        3 => vec![p(LOW, LOW), p(MID, MID), p(HIGH, HIGH)],
        4 => vec![p(LOW, LOW), p(LOW, HIGH), p(HIGH, LOW), p(HIGH, HIGH)],
        5 => vec![
            p(LOW, LOW),
            p(LOW, HIGH),
            p(MID, MID),
            p(HIGH, LOW),
            p(HIGH, HIGH),
        ],
        6 => vec![
            p(LOW, LOW),
            p(LOW, MID),
            p(LOW, HIGH),
            p(HIGH, LOW),
            p(HIGH, MID),
            p(HIGH, HIGH),
        ],
        _ => Vec::new(),
    }
}

/// Face color used by uniform dice of a given value
pub fn color_for_value(value: u8) -> Color {
    match value {
        1 => Color::from_argb(0xFFE74C3C),
        2 => Color::from_argb(0xFF3498DB),
        3 => Color::from_argb(0xFF2ECC71),
        4 => Color::from_argb(0xFFF39C12),
        5 => Color::from_argb(0xFF9B59B6),
        6 => Color::from_argb(0xFF1ABC9C),
        _ => Color::WHITE,
    }
}

/// A quad face of a cube.
///
/// `indices` are wound so that `(v1 - v0) x (v3 - v0)` points out of the cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: [usize; 4],
    pub color: Color,
    pub pips: Vec<Pip>,
}

impl Face {
    pub fn new(indices: [usize; 4], color: Color, pips: Vec<Pip>) -> Self {
        Self {
            indices,
            color,
            pips,
        }
    }

    /// The two edges spanning the face plane: `v1 - v0` and `v3 - v0`
    pub fn edges(corners: &[Vec3; 4]) -> (Vec3, Vec3) {
        (corners[1] - corners[0], corners[3] - corners[0])
    }

    /// Outward unit normal for the given (already transformed) corners
    pub fn normal(corners: &[Vec3; 4]) -> Vec3 {
        let (edge1, edge2) = Self::edges(corners);
        edge1.cross(&edge2).normalized_or_self()
    }
}

/// Face winding shared by every preset, paired with the value shown on that face.
/// Order: -Z, +Z, -Y, +Y, -X, +X.
const FACE_LAYOUT: [([usize; 4], u8); 6] = [
    ([0, 3, 2, 1], 1),
    ([4, 5, 6, 7], 6),
    ([0, 1, 5, 4], 2),
    ([2, 3, 7, 6], 5),
    ([0, 4, 7, 3], 3),
    ([1, 2, 6, 5], 4),
];

/// Eight vertices and six faces of a cube centered at the origin
#[derive(Debug, Clone, PartialEq)]
pub struct CubeGeometry {
    pub vertices: [Vec3; 8],
    pub faces: Vec<Face>,
}

impl CubeGeometry {
    /// Build a cube, checking that every face references one of its 8 vertices
    pub fn new(vertices: [Vec3; 8], faces: Vec<Face>) -> Result<Self, GeometryError> {
        for (face_index, face) in faces.iter().enumerate() {
            if let Some(&index) = face.indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(GeometryError::VertexIndex {
                    face: face_index,
                    index,
                });
            }
            if let Some(pip) = face
                .pips
                .iter()
                .find(|p| !(0.0..=1.0).contains(&p.u) || !(0.0..=1.0).contains(&p.v))
            {
                return Err(GeometryError::PipOutOfRange { u: pip.u, v: pip.v });
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Vertices of a cube with half-extent `half`
    pub fn standard_vertices(half: f32) -> [Vec3; 8] {
        let s = half;
        [
            Vec3::new(-s, -s, -s),
            Vec3::new(s, -s, -s),
            Vec3::new(s, s, -s),
            Vec3::new(-s, s, -s),
            Vec3::new(-s, -s, s),
            Vec3::new(s, -s, s),
            Vec3::new(s, s, s),
            Vec3::new(-s, s, s),
        ]
    }

    /// Classic die: every face shows a different value.
    /// `root` paints all faces white, for use as an outer shell.
    pub fn classic_dice(root: bool) -> Self {
        let faces = FACE_LAYOUT
            .iter()
            .map(|&(indices, value)| {
                let color = if root {
                    Color::WHITE
                } else {
                    classic_color(value)
                };
                Face::new(indices, color, pips_for_value(value))
            })
            .collect();
        Self {
            vertices: Self::standard_vertices(1.0),
            faces,
        }
    }

    /// All six faces show `value`, in that value's color
    pub fn uniform_dice(value: u8) -> Result<Self, GeometryError> {
        Self::uniform(value, true)
    }

    /// Same color as `uniform_dice(value)` but without pips
    pub fn uniform_ghost(value: u8) -> Result<Self, GeometryError> {
        Self::uniform(value, false)
    }

    /// 0 selects the classic die, 1..=6 a uniform die
    pub fn for_value(value: u8) -> Result<Self, GeometryError> {
        match value {
            0 => Ok(Self::classic_dice(false)),
            v => Self::uniform_dice(v),
        }
    }

    /// Pipless shell for `value`: classic faces for 0, else `uniform_ghost`
    pub fn ghost_for_value(value: u8) -> Result<Self, GeometryError> {
        match value {
            0 => Ok(Self::classic_dice(false)),
            v => Self::uniform_ghost(v),
        }
    }

    /// Every face painted `color`, no pips
    pub fn solid(color: Color) -> Self {
        let faces = FACE_LAYOUT
            .iter()
            .map(|&(indices, _)| Face::new(indices, color, Vec::new()))
            .collect();
        Self {
            vertices: Self::standard_vertices(1.0),
            faces,
        }
    }

    fn uniform(value: u8, with_pips: bool) -> Result<Self, GeometryError> {
        if !(1..=6).contains(&value) {
            return Err(GeometryError::DiceValue(value));
        }
        let color = color_for_value(value);
        let pips = if with_pips {
            pips_for_value(value)
        } else {
            Vec::new()
        };
        let faces = FACE_LAYOUT
            .iter()
            .map(|&(indices, _)| Face::new(indices, color, pips.clone()))
            .collect();
        Ok(Self {
            vertices: Self::standard_vertices(1.0),
            faces,
        })
    }

    /// Replace face colors in order; faces beyond `colors` keep theirs
    pub fn with_colors(mut self, colors: &[Color]) -> Self {
        for (face, &color) in self.faces.iter_mut().zip(colors) {
            face.color = color;
        }
        self
    }

    /// Corner positions of a face, taken from `vertices`
    pub fn face_corners(face: &Face, vertices: &[Vec3; 8]) -> [Vec3; 4] {
        face.indices.map(|i| vertices[i])
    }
}

fn classic_color(value: u8) -> Color {
    match value {
        1 => Color::from_argb(0xFFF50057),
        2 => Color::from_argb(0xFF006EF5),
        3 => Color::from_argb(0xFF00F5F5),
        4 => Color::from_argb(0xFFF59B00),
        5 => Color::from_argb(0xFF00F5A7),
        6 => Color::from_argb(0xFF8300F5),
        _ => Color::WHITE,
    }
}

impl Default for CubeGeometry {
    fn default() -> Self {
        Self::classic_dice(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_dice_layout() {
        let cube = CubeGeometry::classic_dice(false);
        assert_eq!(cube.faces.len(), 6);
        let total_pips: usize = cube.faces.iter().map(|f| f.pips.len()).sum();
        assert_eq!(total_pips, 1 + 2 + 3 + 4 + 5 + 6);
    }

    #[test]
    fn test_normals_point_outward() {
        for cube in [
            CubeGeometry::classic_dice(false),
            CubeGeometry::uniform_dice(3).unwrap(),
        ] {
            for face in &cube.faces {
                let corners = CubeGeometry::face_corners(face, &cube.vertices);
                let center = corners.iter().sum::<Vec3>() / 4.0;
                let normal = Face::normal(&corners);
                assert!((normal.norm() - 1.0).abs() < 1e-6);
                assert!(normal.dot(&center) > 0.0, "face {:?} faces inward", face.indices);
            }
        }
    }

    #[test]
    fn test_root_dice_is_white() {
        let cube = CubeGeometry::classic_dice(true);
        assert!(cube.faces.iter().all(|f| f.color == Color::WHITE));
    }

    #[test]
    fn test_uniform_rejects_out_of_range() {
        assert_eq!(
            CubeGeometry::uniform_dice(7).unwrap_err(),
            GeometryError::DiceValue(7)
        );
        assert!(CubeGeometry::uniform_ghost(0).is_err());
        assert!(CubeGeometry::for_value(0).is_ok());
    }

    #[test]
    fn test_uniform_ghost_has_no_pips() {
        let ghost = CubeGeometry::uniform_ghost(4).unwrap();
        assert!(ghost.faces.iter().all(|f| f.pips.is_empty()));
        assert!(ghost.faces.iter().all(|f| f.color == color_for_value(4)));
    }

    #[test]
    fn test_invalid_face_index() {
        let faces = vec![Face::new([0, 1, 2, 8], Color::WHITE, Vec::new())];
        let err = CubeGeometry::new(CubeGeometry::standard_vertices(1.0), faces).unwrap_err();
        assert_eq!(err, GeometryError::VertexIndex { face: 0, index: 8 });
    }

    #[test]
    fn test_from_argb() {
        let c = Color::from_argb(0x80FF0000);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert_eq!(c.g, 0.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }
}
