/// Per-face lighting: diffuse term, brightness floor, pointer reflection
use serde::{Deserialize, Serialize};

use crate::geometry::Color;
use crate::math::{Vec2, Vec3, VectorExt};

/// How the raw `normal . light` term is mapped into a visible brightness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShadingModel {
    /// `max(min, clamp(n.l, 0, 1))`
    Floor { min: f32 },
    /// `base + span * clamp(n.l, 0, 1)`
    Affine { base: f32, span: f32 },
    /// Wrapped diffuse, darkened by `shadow_intensity` at most
    HalfLambert { shadow_intensity: f32 },
}

impl Default for ShadingModel {
    fn default() -> Self {
        ShadingModel::Floor { min: 0.3 }
    }
}

impl ShadingModel {
    pub fn apply(&self, n_dot_l: f32) -> f32 {
        match *self {
            ShadingModel::Floor { min } => n_dot_l.clamp(0.0, 1.0).max(min),
            ShadingModel::Affine { base, span } => base + span * n_dot_l.clamp(0.0, 1.0),
            ShadingModel::HalfLambert { shadow_intensity } => {
                let wrapped = n_dot_l.clamp(-1.0, 1.0) * 0.5 + 0.5;
                1.0 - (1.0 - wrapped) * shadow_intensity
            }
        }
    }
}

/// Viewing direction, from the camera into the scene
const CAMERA_DIR: Vec3 = Vec3::new(0.0, 0.0, -1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    light_dir: Vec3,
    pub model: ShadingModel,
    /// Enables the pointer-driven specular and fresnel terms
    pub reflection: bool,
}

impl Lighting {
    pub fn new(light_dir: Vec3, model: ShadingModel, reflection: bool) -> Self {
        Self {
            light_dir: light_dir.normalized_or_self(),
            model,
            reflection,
        }
    }

    pub fn light_dir(&self) -> Vec3 {
        self.light_dir
    }

    /// Same light, different model, no pointer reflection
    pub fn with_model(&self, model: ShadingModel) -> Self {
        Self {
            light_dir: self.light_dir,
            model,
            reflection: false,
        }
    }

    /// Brightness of a face with unit `normal`.
    ///
    /// `pointer_dir` is the normalized screen offset of the last touch from
    /// the surface center; it only matters when `reflection` is on. Before
    /// any touch is known the reflection factor is a neutral 1.0, so only
    /// the fresnel term applies.
    pub fn brightness(&self, normal: &Vec3, pointer_dir: Option<Vec2>) -> f32 {
        let base = self.model.apply(normal.dot(&self.light_dir));
        if !self.reflection {
            return base;
        }

        let fresnel = 0.2 + 0.8 * (1.0 - normal.dot(&CAMERA_DIR).max(0.0));
        let reflect = match pointer_dir {
            Some(dir) => {
                let specular = Vec3::new(dir.x, -dir.y, -0.5).normalized_or_self();
                0.5 + 0.5 * normal.dot(&specular).max(0.0)
            }
            None => 1.0,
        };
        base * reflect * fresnel
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(Vec3::new(0.5, 0.7, -1.0), ShadingModel::default(), false)
    }
}

/// Face color scaled by `brightness`, with the owning layer's alpha
pub fn shade(color: Color, brightness: f32, alpha: f32) -> Color {
    color.scaled(brightness).with_alpha(alpha)
}
