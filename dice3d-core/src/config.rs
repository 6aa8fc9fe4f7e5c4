/// Tunable simulation and rendering settings, loadable from JSON
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Color;
use crate::math::Vec3;
use crate::projection::{PipStyle, ProjectionMode};
use crate::shading::{Lighting, ShadingModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Inertia damping while idle
    pub damping: f32,
    /// Radians per dragged pixel
    pub drag_factor: f32,
    /// Idle auto-spin in radians per second (x axis, y axis)
    pub idle_speed: (f32, f32),
    /// Frame rate assumed when converting roll turns into per-frame velocity
    pub frame_rate: f32,
    /// Fraction of the smaller surface dimension covered by one world unit
    pub scale_factor: f32,
    pub projection: ProjectionMode,
    pub pip: PipStyle,
    pub pip_color: Color,
    pub light_dir: [f32; 3],
    pub shading: ShadingModel,
    pub reflection: bool,
    /// Layer receiving the press/bounce scale pulse
    pub pulse_layer: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            damping: 0.99,
            drag_factor: 0.004,
            idle_speed: (0.3, 0.5),
            frame_rate: 60.0,
            scale_factor: 0.25,
            projection: ProjectionMode::default(),
            pip: PipStyle::default(),
            pip_color: Color::WHITE,
            light_dir: [0.5, 0.7, -1.0],
            shading: ShadingModel::default(),
            reflection: false,
            pulse_layer: 2,
        }
    }
}

impl SimulationSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let setting = |field: &'static str, reason: &str| ConfigError::Setting {
            field,
            reason: reason.to_string(),
        };

        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::UnitRange {
                field: "damping",
                value: self.damping,
            });
        }
        if !self.drag_factor.is_finite() {
            return Err(setting("drag_factor", "must be finite"));
        }
        if !positive(self.frame_rate) {
            return Err(setting("frame_rate", "must be > 0"));
        }
        if !positive(self.scale_factor) {
            return Err(setting("scale_factor", "must be > 0"));
        }
        if let ProjectionMode::Perspective { focal_length } = self.projection {
            if !positive(focal_length) {
                return Err(setting("projection", "focal length must be > 0"));
            }
        }
        if !(0.0..0.5).contains(&self.pip.padding) {
            return Err(setting("pip.padding", "must be within [0, 0.5)"));
        }
        if self.pip.steps < 3 {
            return Err(setting("pip.steps", "a pip outline needs at least 3 points"));
        }
        if self.light_dir.iter().all(|c| *c == 0.0) {
            return Err(setting("light_dir", "must not be the zero vector"));
        }
        Ok(())
    }

    pub fn lighting(&self) -> Lighting {
        let [x, y, z] = self.light_dir;
        Lighting::new(Vec3::new(x, y, z), self.shading, self.reflection)
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
