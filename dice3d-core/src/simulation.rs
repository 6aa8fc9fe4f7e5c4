/// Per-die simulation context, advanced once per rendered frame
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, trace};

use crate::animation::{AnimationConfig, DiceAnimator, DiceEvent, DiceState, RollHandle};
use crate::compositor::{self, ComposeInput, DrawList, Pulse, RenderOptions, RenderedFace};
use crate::config::SimulationSettings;
use crate::error::ConfigError;
use crate::layer::{DiceLayer, LayerLock};
use crate::math::{normalize_or_zero_2d, ScreenPoint};
use crate::projection::{Projector, Viewport};
use crate::shading::Lighting;
use crate::spring::ScaleAnimation;
use crate::transform::{RotationState, Spin};

/// All mutable state of one die: rotation, inertia, lag, roll animation and
/// the press/bounce pulse. Rendering surfaces feed it input, call [`tick`]
/// once per frame, then draw [`frame`].
///
/// [`tick`]: DiceSimulation::tick
/// [`frame`]: DiceSimulation::frame
pub struct DiceSimulation {
    layers: Vec<DiceLayer>,
    locks: Vec<LayerLock>,
    states: Vec<RotationState>,
    spin: Spin,
    animator: DiceAnimator,
    scale: ScaleAnimation,
    settings: SimulationSettings,
    lighting: Lighting,
    parent_interactive: bool,
    frozen_parent: RotationState,
    dragging: bool,
    pointer: Option<ScreenPoint>,
    rng: StdRng,
}

impl DiceSimulation {
    pub fn new(
        layers: Vec<DiceLayer>,
        settings: SimulationSettings,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        settings.validate()?;

        let count = layers.len();
        Ok(Self {
            locks: vec![LayerLock::unlocked(); count],
            states: vec![RotationState::zero(); count],
            layers,
            spin: Spin::default(),
            animator: DiceAnimator::new(&AnimationConfig::default(), settings.frame_rate),
            scale: ScaleAnimation::new(),
            lighting: settings.lighting(),
            settings,
            parent_interactive: true,
            frozen_parent: RotationState::zero(),
            dragging: false,
            pointer: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn layers(&self) -> &[DiceLayer] {
        &self.layers
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn state(&self) -> DiceState {
        self.animator.state()
    }

    pub fn display_value(&self) -> u8 {
        self.animator.display_value()
    }

    /// Global target rotation
    pub fn rotation(&self) -> RotationState {
        self.spin.target
    }

    /// Smoothed rotation of layer `index`
    pub fn layer_rotation(&self, index: usize) -> Option<RotationState> {
        self.states.get(index).copied()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn interaction_enabled(&self) -> bool {
        self.animator.interaction_enabled()
    }

    /// Viewport for a surface of the given size, using the configured scale factor
    pub fn viewport(&self, width: f32, height: f32) -> Viewport {
        Viewport::new(width, height, self.settings.scale_factor)
    }

    /// Begin a drag at `pointer` (surface coordinates). Ignored while rolling.
    pub fn drag_start(&mut self, pointer: Option<ScreenPoint>) -> bool {
        if !self.interaction_enabled() {
            trace!("drag ignored while {:?}", self.state());
            return false;
        }
        self.dragging = true;
        self.spin.halt();
        self.scale.press();
        if pointer.is_some() {
            self.pointer = pointer;
        }
        true
    }

    /// Apply a drag delta in pixels
    pub fn drag(&mut self, dx: f32, dy: f32, pointer: Option<ScreenPoint>) -> bool {
        if !self.interaction_enabled() {
            trace!("drag ignored while {:?}", self.state());
            return false;
        }
        self.spin.drag(dx, dy, self.settings.drag_factor);
        if pointer.is_some() {
            self.pointer = pointer;
        }
        true
    }

    pub fn drag_end(&mut self) {
        if self.dragging {
            self.dragging = false;
            self.scale.release();
        }
    }

    /// Start a roll, superseding any roll already in flight. The config is
    /// validated again, so hand-built configs are rejected here too.
    pub fn roll_to(&mut self, config: AnimationConfig) -> Result<RollHandle, ConfigError> {
        let config = AnimationConfig {
            state: DiceState::Rolling,
            ..config
        }
        .validated()?;
        self.drag_end();
        let start = self.animator.roll_to(config, &mut self.rng)?;
        self.spin.set_velocity(start.velocity_x, start.velocity_y);
        Ok(start.handle)
    }

    /// Validate and start a roll in one step
    pub fn roll(
        &mut self,
        target_value: u8,
        rotations_x: f32,
        rotations_y: f32,
        rolling_ms: u64,
    ) -> Result<RollHandle, ConfigError> {
        let config = AnimationConfig::roll_to(target_value, rotations_x, rotations_y, rolling_ms)?;
        self.roll_to(config)
    }

    /// Apply an externally driven animation config (any state)
    pub fn set_animation(
        &mut self,
        config: AnimationConfig,
    ) -> Result<Option<RollHandle>, ConfigError> {
        match config.state {
            DiceState::Rolling => self.roll_to(config).map(Some),
            _ => {
                self.animator.apply(config, &mut self.rng)?;
                Ok(None)
            }
        }
    }

    pub fn cancel_roll(&mut self, handle: RollHandle) -> bool {
        self.animator.cancel(handle)
    }

    /// Freeze or release the outermost layer. Freezing captures the live
    /// orientation immediately, so the next frame already holds it.
    pub fn set_parent_interactive(&mut self, interactive: bool) {
        if self.parent_interactive && !interactive {
            self.frozen_parent = self.spin.target;
            debug!(x = self.frozen_parent.x, y = self.frozen_parent.y, "parent frozen");
        }
        self.parent_interactive = interactive;
    }

    pub fn set_layer_lock(&mut self, index: usize, lock: LayerLock) -> Result<(), ConfigError> {
        let count = self.layers.len();
        let slot = self
            .locks
            .get_mut(index)
            .ok_or(ConfigError::LayerIndex { index, count })?;
        *slot = lock;
        debug!(index, locked = lock.locked, "layer lock changed");
        Ok(())
    }

    pub fn layer_lock(&self, index: usize) -> Option<LayerLock> {
        self.locks.get(index).copied()
    }

    /// Advance one frame and return the notifications it produced
    pub fn tick(&mut self, dt: Duration) -> Vec<DiceEvent> {
        if self.animator.state() == DiceState::Idle && !self.dragging {
            self.spin.idle_spin(dt.as_secs_f32(), self.settings.idle_speed);
        }

        let damping = self.animator.damping(self.settings.damping);
        self.spin.coast(damping);

        let target = self.spin.target;
        for ((layer, lock), state) in self.layers.iter().zip(&self.locks).zip(&mut self.states) {
            if layer.enabled && layer.interactive && !lock.locked {
                state.approach(&target, layer.lag_factor);
            }
        }

        if self.animator.advance(dt) {
            self.scale.bounce();
        }
        self.scale.advance(dt);

        self.animator.drain_events()
    }

    /// Depth-sorted faces of every enabled layer for the current frame
    pub fn draw_list(&self) -> DrawList<'_> {
        compositor::compose(&ComposeInput {
            layers: &self.layers,
            locks: &self.locks,
            states: &self.states,
            target: self.spin.target,
            frozen_parent: (!self.parent_interactive).then_some(self.frozen_parent),
            pulse: Some(Pulse {
                layer: self.settings.pulse_layer,
                scale: self.scale.value(),
            }),
        })
    }

    /// Projected, shaded faces in drawing order
    pub fn frame(&self, viewport: &Viewport) -> Vec<RenderedFace> {
        let projector = Projector::new(viewport, self.settings.projection);
        let options = RenderOptions {
            pip_style: self.settings.pip,
            pip_color: self.settings.pip_color,
            pointer_dir: self
                .pointer
                .map(|p| normalize_or_zero_2d(p - viewport.center())),
            ..RenderOptions::default()
        };
        compositor::render(&self.draw_list(), &projector, &self.lighting, &options)
    }
}
