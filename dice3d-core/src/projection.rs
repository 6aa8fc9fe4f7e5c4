/// Perspective projection of rotated cube vertices onto a 2D surface
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::geometry::{Face, Pip};
use crate::math::{ScreenPoint, Vec3, VectorExt};

/// Smallest allowed `focal_length + z` before the perspective factor is clamped
const MIN_DEPTH: f32 = 1e-3;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionMode {
    Orthographic,
    Perspective { focal_length: f32 },
}

impl Default for ProjectionMode {
    fn default() -> Self {
        ProjectionMode::Perspective { focal_length: 5.0 }
    }
}

/// Drawing surface size and how much of it a unit cube covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Pixels per world unit
    pub fn scale(&self) -> f32 {
        self.width.min(self.height) * self.scale_factor
    }
}

/// Maps world-space points (camera on -Z, looking toward +Z) to screen points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub center: ScreenPoint,
    pub scale: f32,
    pub mode: ProjectionMode,
}

impl Projector {
    pub fn new(viewport: &Viewport, mode: ProjectionMode) -> Self {
        Self {
            center: viewport.center(),
            scale: viewport.scale(),
            mode,
        }
    }

    /// Same surface, perspective with `focal_length`
    pub fn with_focal_length(self, focal_length: f32) -> Self {
        Self {
            mode: ProjectionMode::Perspective { focal_length },
            ..self
        }
    }

    /// Scale applied to x/y at depth `z`
    pub fn perspective_factor(&self, z: f32) -> f32 {
        match self.mode {
            ProjectionMode::Orthographic => 1.0,
            ProjectionMode::Perspective { focal_length } => {
                focal_length / (focal_length + z).max(MIN_DEPTH)
            }
        }
    }

    /// Project a point, flipping y so that +Y points up on screen
    pub fn project(&self, point: &Vec3) -> ScreenPoint {
        let factor = self.scale * self.perspective_factor(point.z);
        ScreenPoint::new(
            self.center.x + point.x * factor,
            self.center.y - point.y * factor,
        )
    }

    pub fn project_all<const N: usize>(&self, points: &[Vec3; N]) -> [ScreenPoint; N] {
        points.map(|p| self.project(&p))
    }
}

/// Pip size and placement on a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipStyle {
    /// Margin kept clear along each face border, as a fraction of the edge
    pub padding: f32,
    /// Radius in world units
    pub radius: f32,
    /// Number of points on the circle outline
    pub steps: usize,
}

impl Default for PipStyle {
    fn default() -> Self {
        Self {
            padding: 0.08,
            radius: 0.18,
            steps: 24,
        }
    }
}

/// Circle outline of a pip lying in the plane of `corners`.
///
/// The center is found by bilinear placement along the face edges
/// `v1 - v0` and `v3 - v0`.
pub fn pip_outline(corners: &[Vec3; 4], pip: &Pip, style: &PipStyle) -> Vec<Vec3> {
    let (u_vec, v_vec) = Face::edges(corners);
    let inner = 1.0 - 2.0 * style.padding;
    let u = style.padding + pip.u * inner;
    let v = style.padding + pip.v * inner;
    let center = corners[0] + u_vec * u + v_vec * v;

    let u_dir = u_vec.normalized_or_self();
    let v_dir = v_vec.normalized_or_self();
    (0..style.steps)
        .map(|i| {
            let angle = i as f32 / style.steps as f32 * TAU;
            center + u_dir * (angle.cos() * style.radius) + v_dir * (angle.sin() * style.radius)
        })
        .collect()
}
