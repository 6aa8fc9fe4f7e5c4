/// Error types for dice configuration and geometry
use thiserror::Error;

/// Rejected configuration values. These are caller mistakes, not runtime conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("targetValue must be between 0 (classic dice) and 6, got {0}")]
    TargetValue(u8),
    #[error("{axis} rotation count must be finite and >= 0, got {value}")]
    RotationCount { axis: char, value: f32 },
    #[error("rolling duration must be > 0 ms")]
    ZeroDuration,
    #[error("reveal fraction must be within [0, 1], got {0}")]
    RevealFraction(f32),
    #[error("{field} must be within [0, 1], got {value}")]
    UnitRange { field: &'static str, value: f32 },
    #[error("layer ratio must be finite and >= 0, got {0}")]
    Ratio(f32),
    #[error("focal length must be finite and > 0, got {0}")]
    FocalLength(f32),
    #[error("layer index {index} out of range ({count} layers)")]
    LayerIndex { index: usize, count: usize },
    #[error("a dice needs at least one layer")]
    NoLayers,
    #[error("invalid setting `{field}`: {reason}")]
    Setting { field: &'static str, reason: String },
    #[error("failed to parse settings: {0}")]
    Parse(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Malformed cube geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("face {face} references vertex {index}, cube has 8 vertices")]
    VertexIndex { face: usize, index: usize },
    #[error("dice value must be between 1 and 6, got {0}")]
    DiceValue(u8),
    #[error("pip ({u}, {v}) lies outside the unit face")]
    PipOutOfRange { u: f32, v: f32 },
}
