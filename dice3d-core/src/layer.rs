/// Nested cube layers and per-layer rotation locks
use std::sync::Arc;

use crate::error::ConfigError;
use crate::geometry::{Color, CubeGeometry};
use crate::shading::ShadingModel;
use crate::transform::RotationState;

const CAVITY_COLOR: u32 = 0xFFE8E6E6;
/// The cavity spans the whole surface while dice fill 70% of it
const CAVITY_RATIO: f32 = 1.14 / 0.7;

/// One cube among the concentric layers that make up a die
#[derive(Debug, Clone, PartialEq)]
pub struct DiceLayer {
    pub geometry: Arc<CubeGeometry>,
    /// Size relative to the unit cube
    pub ratio: f32,
    /// How quickly this layer follows the global rotation (1 = instantly, 0 = frozen)
    pub lag_factor: f32,
    pub enabled: bool,
    /// Non-interactive layers hold their last rotation
    pub interactive: bool,
    pub invert_x: bool,
    pub invert_y: bool,
    pub show_edges: bool,
    pub show_pips: bool,
    pub alpha: f32,
    /// Replaces the simulation's shading model for this layer
    pub shading: Option<ShadingModel>,
    /// Replaces the viewport's perspective focal length for this layer
    pub focal_length: Option<f32>,
    /// Fixed rotation; only an explicit lock takes precedence
    pub pinned: Option<RotationState>,
    /// Drawn before every non-backdrop face regardless of depth
    pub backdrop: bool,
}

impl DiceLayer {
    pub fn builder(geometry: impl Into<Arc<CubeGeometry>>) -> DiceLayerBuilder {
        DiceLayerBuilder {
            layer: DiceLayer {
                geometry: geometry.into(),
                ratio: 1.0,
                lag_factor: 1.0,
                enabled: true,
                interactive: true,
                invert_x: false,
                invert_y: false,
                show_edges: false,
                show_pips: true,
                alpha: 0.95,
                shading: None,
                focal_length: None,
                pinned: None,
                backdrop: false,
            },
        }
    }

    /// Opaque classic die following the rotation instantly
    pub fn standard() -> Self {
        Self::builder(CubeGeometry::classic_dice(false)).layer
    }

    /// Nearly transparent white shell around the visible dice
    pub fn ghost_parent() -> Self {
        Self::builder(CubeGeometry::classic_dice(true))
            .show_pips(false)
            .alpha(0.05)
            .layer
    }

    /// Smaller die that trails the global rotation
    pub fn inner_with_lag(ratio: f32, lag_factor: f32) -> Result<Self, ConfigError> {
        Self::builder(CubeGeometry::classic_dice(false))
            .ratio(ratio)
            .lag_factor(lag_factor)
            .build()
    }

    /// Static shell drawn behind the dice: a pale, half-Lambert shaded cube
    /// with a flatter perspective, pinned to a slight tilt
    pub fn cavity() -> Result<Self, ConfigError> {
        Self::builder(CubeGeometry::solid(Color::from_argb(CAVITY_COLOR)))
            .ratio(CAVITY_RATIO)
            .alpha(0.55)
            .show_pips(false)
            .interactive(false)
            .shading(ShadingModel::HalfLambert {
                shadow_intensity: 0.25,
            })
            .focal_length(9.55)
            .pinned(RotationState::new(-0.01, -0.032))
            .backdrop(true)
            .build()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.ratio.is_finite() || self.ratio < 0.0 {
            return Err(ConfigError::Ratio(self.ratio));
        }
        if let Some(focal) = self.focal_length {
            if !focal.is_finite() || focal <= 0.0 {
                return Err(ConfigError::FocalLength(focal));
            }
        }
        for (field, value) in [("alpha", self.alpha), ("lag_factor", self.lag_factor)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::UnitRange { field, value });
            }
        }
        Ok(())
    }
}

impl Default for DiceLayer {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone)]
pub struct DiceLayerBuilder {
    layer: DiceLayer,
}

impl DiceLayerBuilder {
    pub fn ratio(mut self, ratio: f32) -> Self {
        self.layer.ratio = ratio;
        self
    }

    pub fn lag_factor(mut self, lag_factor: f32) -> Self {
        self.layer.lag_factor = lag_factor;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.layer.enabled = enabled;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.layer.interactive = interactive;
        self
    }

    pub fn invert(mut self, x: bool, y: bool) -> Self {
        self.layer.invert_x = x;
        self.layer.invert_y = y;
        self
    }

    pub fn show_edges(mut self, show: bool) -> Self {
        self.layer.show_edges = show;
        self
    }

    pub fn show_pips(mut self, show: bool) -> Self {
        self.layer.show_pips = show;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.layer.alpha = alpha;
        self
    }

    pub fn shading(mut self, model: ShadingModel) -> Self {
        self.layer.shading = Some(model);
        self
    }

    pub fn focal_length(mut self, focal_length: f32) -> Self {
        self.layer.focal_length = Some(focal_length);
        self
    }

    pub fn pinned(mut self, rotation: RotationState) -> Self {
        self.layer.pinned = Some(rotation);
        self
    }

    pub fn backdrop(mut self, backdrop: bool) -> Self {
        self.layer.backdrop = backdrop;
        self
    }

    pub fn build(self) -> Result<DiceLayer, ConfigError> {
        self.layer.validate()?;
        Ok(self.layer)
    }
}

/// Optional per-layer override pinning a layer to a fixed rotation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerLock {
    pub locked: bool,
    pub rot_x: f32,
    pub rot_y: f32,
}

impl LayerLock {
    pub fn unlocked() -> Self {
        Self::default()
    }

    pub fn locked(rot_x: f32, rot_y: f32) -> Self {
        Self {
            locked: true,
            rot_x,
            rot_y,
        }
    }
}

/// Ready-made layer stacks, index 0 being the outermost
pub mod presets {
    use super::*;

    /// A single classic die
    pub fn classic() -> Vec<DiceLayer> {
        vec![DiceLayer::standard()]
    }

    /// Ghost shell, full-size die, and a lagging inner die
    pub fn nested() -> Result<Vec<DiceLayer>, ConfigError> {
        Ok(vec![
            DiceLayer::ghost_parent(),
            DiceLayer::builder(CubeGeometry::classic_dice(false))
                .ratio(0.9)
                .alpha(0.5)
                .build()?,
            DiceLayer::inner_with_lag(0.3, 0.2)?,
        ])
    }

    /// Three translucent cubes with edges, the innermost trailing behind
    pub fn crystal() -> Result<Vec<DiceLayer>, ConfigError> {
        let palette = [
            Color::from_argb(0xFFE74C3C),
            Color::from_argb(0xFF3498DB),
            Color::from_argb(0xFF2ECC71),
            Color::from_argb(0xFFF39C12),
            Color::from_argb(0xFF9B59B6),
            Color::from_argb(0xFF1ABC9C),
        ];
        let cube = || CubeGeometry::classic_dice(false).with_colors(&palette);
        Ok(vec![
            DiceLayer::builder(cube())
                .alpha(0.3)
                .show_pips(false)
                .show_edges(true)
                .build()?,
            DiceLayer::builder(cube())
                .ratio(0.9)
                .alpha(0.5)
                .show_pips(false)
                .show_edges(true)
                .build()?,
            DiceLayer::builder(cube())
                .ratio(0.3)
                .lag_factor(0.2)
                .alpha(0.7)
                .show_edges(true)
                .build()?,
        ])
    }

    /// Stack for a die that will settle on `value` (0 = classic faces):
    /// ghost shell, pipless tinted shell, and the lagging die itself
    pub fn for_value(value: u8) -> Result<Vec<DiceLayer>, ConfigError> {
        Ok(vec![
            DiceLayer::ghost_parent(),
            DiceLayer::builder(CubeGeometry::ghost_for_value(value)?)
                .ratio(0.9)
                .alpha(0.3)
                .show_pips(false)
                .build()?,
            DiceLayer::builder(CubeGeometry::for_value(value)?)
                .ratio(0.75)
                .lag_factor(0.5)
                .alpha(1.0)
                .build()?,
        ])
    }

    /// `layers` with the cavity backdrop appended. Appending keeps the
    /// indices of the parent and pulse layers unchanged.
    pub fn with_cavity(mut layers: Vec<DiceLayer>) -> Result<Vec<DiceLayer>, ConfigError> {
        layers.push(DiceLayer::cavity()?);
        Ok(layers)
    }
}
