/// Dice3D Core Library - Shared dice transform, shading and animation logic
///
/// This library provides the surface-independent core of the 3D dice: vector
/// math, cube geometry, projection and shading, drag inertia with nested-layer
/// lag, the roll state machine, and the layer compositor that produces a
/// depth-sorted draw list for any 2D surface.

pub mod animation;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod math;
pub mod projection;
pub mod shading;
pub mod simulation;
pub mod spring;
pub mod transform;

// Re-export commonly used types
pub use animation::{AnimationConfig, DiceEvent, DiceState, RollHandle, RollStyle};
pub use compositor::{DrawFace, DrawList, RenderedFace};
pub use config::SimulationSettings;
pub use error::{ConfigError, GeometryError};
pub use geometry::{Color, CubeGeometry, Face, Pip};
pub use layer::{presets, DiceLayer, LayerLock};
pub use math::{ScreenPoint, Vec2, Vec3, VectorExt};
pub use projection::{ProjectionMode, Projector, Viewport};
pub use shading::{Lighting, ShadingModel};
pub use simulation::DiceSimulation;
pub use transform::{RotationState, Spin};
