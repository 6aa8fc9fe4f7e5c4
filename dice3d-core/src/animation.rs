/// Dice roll state machine: IDLE -> ROLLING -> (LANDING) -> IDLE
///
/// Timed phase changes are deadlines checked against simulated time, so a
/// roll is a plain value that a newer roll can supersede.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::time::Duration;
use tracing::debug;

use crate::error::ConfigError;

/// Damping used while spinning freely during a roll
pub const ROLLING_DAMPING: f32 = 0.99;
/// Damping at the end of a roll (and for the whole landing phase)
pub const LANDING_DAMPING: f32 = 0.90;
/// Display value meaning "no value"
pub const NO_VALUE: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceState {
    /// Free rotation, draggable, slow auto-spin
    Idle,
    /// Fast spin toward a hidden target, interaction disabled
    Rolling,
    /// Short deceleration after the value is revealed
    Landing,
}

/// How a roll ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RollStyle {
    /// Reveal at the end of rolling, then decelerate for `landing_ms`
    Landing { landing_ms: u64 },
    /// Reveal at `reveal_fraction` of the roll with a scale bounce,
    /// damping tightening over the roll
    Bounce { reveal_fraction: f32 },
}

impl Default for RollStyle {
    fn default() -> Self {
        RollStyle::Landing { landing_ms: 1000 }
    }
}

/// Requested animation for a die
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub state: DiceState,
    /// 0 = classic die with six different faces, 1..=6 = uniform die
    pub target_value: u8,
    pub rolling_ms: u64,
    pub rotations_x: f32,
    pub rotations_y: f32,
    pub style: RollStyle,
    /// Bumped by callers that want a fresh roll to the same value
    pub ticker: u32,
}

impl AnimationConfig {
    /// Resting die showing `target_value`
    pub fn idle(target_value: u8) -> Result<Self, ConfigError> {
        Self {
            state: DiceState::Idle,
            target_value,
            ..Self::default()
        }
        .validated()
    }

    /// Roll toward `target_value` with the given number of turns per axis
    pub fn roll_to(
        target_value: u8,
        rotations_x: f32,
        rotations_y: f32,
        rolling_ms: u64,
    ) -> Result<Self, ConfigError> {
        Self {
            state: DiceState::Rolling,
            target_value,
            rolling_ms,
            rotations_x,
            rotations_y,
            ..Self::default()
        }
        .validated()
    }

    pub fn with_style(self, style: RollStyle) -> Result<Self, ConfigError> {
        Self { style, ..self }.validated()
    }

    pub fn with_ticker(self, ticker: u32) -> Self {
        Self { ticker, ..self }
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.target_value > 6 {
            return Err(ConfigError::TargetValue(self.target_value));
        }
        for (axis, value) in [('X', self.rotations_x), ('Y', self.rotations_y)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::RotationCount { axis, value });
            }
        }
        if self.rolling_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if let RollStyle::Bounce { reveal_fraction } = self.style {
            if !(0.0..=1.0).contains(&reveal_fraction) {
                return Err(ConfigError::RevealFraction(reveal_fraction));
            }
        }
        Ok(self)
    }

    fn rolling_duration(&self) -> Duration {
        Duration::from_millis(self.rolling_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            state: DiceState::Idle,
            target_value: NO_VALUE,
            rolling_ms: 1500,
            rotations_x: 3.0,
            rotations_y: 4.0,
            style: RollStyle::default(),
            ticker: 0,
        }
    }
}

/// Per-frame angular velocities that complete the requested number of turns
/// over `duration_ms` at `frame_rate` frames per second.
pub fn rolling_velocities(
    rotations_x: f32,
    rotations_y: f32,
    duration_ms: u64,
    frame_rate: f32,
) -> (f32, f32) {
    let frames = (duration_ms as f32 / 1000.0 * frame_rate).max(1.0);
    (rotations_x * TAU / frames, rotations_y * TAU / frames)
}

/// Slowdown curve for the landing phase, `progress` in [0, 1]
pub fn landing_speed_factor(progress: f32) -> f32 {
    (1.0 - progress * progress).clamp(0.05, 1.0)
}

/// Notifications for the embedding UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceEvent {
    ValueChanged(u8),
    StateChanged(DiceState),
}

/// Identifies one roll; stale handles cannot affect a newer roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RollHandle(u64);

/// Returned by [`DiceAnimator::roll_to`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollStart {
    pub handle: RollHandle,
    /// Per-frame velocity feeding the Y angle, sign chosen at random
    pub velocity_x: f32,
    /// Per-frame velocity feeding the X angle, sign chosen at random
    pub velocity_y: f32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveRoll {
    generation: u64,
    config: AnimationConfig,
    elapsed: Duration,
    revealed: bool,
}

impl ActiveRoll {
    fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / self.config.rolling_duration().as_secs_f32()).min(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct DiceAnimator {
    state: DiceState,
    display_value: u8,
    target_value: u8,
    generation: u64,
    active: Option<ActiveRoll>,
    events: Vec<DiceEvent>,
    frame_rate: f32,
}

impl DiceAnimator {
    pub fn new(initial: &AnimationConfig, frame_rate: f32) -> Self {
        Self {
            state: DiceState::Idle,
            display_value: initial.target_value,
            target_value: initial.target_value,
            generation: 0,
            active: None,
            events: Vec::new(),
            frame_rate,
        }
    }

    pub fn state(&self) -> DiceState {
        self.state
    }

    pub fn display_value(&self) -> u8 {
        self.display_value
    }

    pub fn target_value(&self) -> u8 {
        self.target_value
    }

    pub fn interaction_enabled(&self) -> bool {
        self.state == DiceState::Idle
    }

    /// Fraction of the rolling phase elapsed; 0 when no roll is active
    pub fn progress(&self) -> f32 {
        self.active.as_ref().map_or(0.0, ActiveRoll::progress)
    }

    /// Fraction of the landing phase elapsed; 0 outside of landing
    pub fn landing_progress(&self) -> f32 {
        match (&self.active, self.state) {
            (Some(roll), DiceState::Landing) => match roll.config.style {
                RollStyle::Landing { landing_ms } if landing_ms > 0 => {
                    let into = roll.elapsed.saturating_sub(roll.config.rolling_duration());
                    (into.as_secs_f32() / Duration::from_millis(landing_ms).as_secs_f32())
                        .min(1.0)
                }
                _ => 1.0,
            },
            _ => 0.0,
        }
    }

    /// Inertia damping for the current state
    pub fn damping(&self, base: f32) -> f32 {
        match self.state {
            DiceState::Idle => base,
            DiceState::Landing => LANDING_DAMPING,
            DiceState::Rolling => match self.active.map(|r| (r.config.style, r.progress())) {
                Some((RollStyle::Bounce { .. }, progress)) => {
                    ROLLING_DAMPING + (LANDING_DAMPING - ROLLING_DAMPING) * progress
                }
                _ => ROLLING_DAMPING,
            },
        }
    }

    /// Apply an externally requested configuration. Invalid configs leave
    /// the animator untouched.
    pub fn apply<R: Rng>(
        &mut self,
        config: AnimationConfig,
        rng: &mut R,
    ) -> Result<Option<RollStart>, ConfigError> {
        let config = config.validated()?;
        match config.state {
            DiceState::Rolling => self.roll_to(config, rng).map(Some),
            DiceState::Landing => {
                self.land(config);
                Ok(None)
            }
            DiceState::Idle => {
                self.set_idle(config.target_value);
                Ok(None)
            }
        }
    }

    /// Start a roll, superseding any roll in flight
    pub fn roll_to<R: Rng>(
        &mut self,
        config: AnimationConfig,
        rng: &mut R,
    ) -> Result<RollStart, ConfigError> {
        let config = config.validated()?;
        if let Some(previous) = self.active.take() {
            debug!(generation = previous.generation, "superseding roll in flight");
        }
        self.generation += 1;
        self.target_value = config.target_value;
        self.state = DiceState::Rolling;
        self.display_value = NO_VALUE;
        self.events.push(DiceEvent::ValueChanged(NO_VALUE));
        self.active = Some(ActiveRoll {
            generation: self.generation,
            config,
            elapsed: Duration::ZERO,
            revealed: false,
        });

        let (vx, vy) = rolling_velocities(
            config.rotations_x,
            config.rotations_y,
            config.rolling_ms,
            self.frame_rate,
        );
        let dir_x = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let dir_y = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        debug!(
            generation = self.generation,
            target = config.target_value,
            rolling_ms = config.rolling_ms,
            ticker = config.ticker,
            "roll started"
        );
        Ok(RollStart {
            handle: RollHandle(self.generation),
            velocity_x: vx * dir_x,
            velocity_y: vy * dir_y,
        })
    }

    /// Enter the landing phase directly with the value already revealed
    fn land(&mut self, config: AnimationConfig) {
        self.generation += 1;
        self.target_value = config.target_value;
        if self.display_value != config.target_value {
            self.display_value = config.target_value;
            self.events.push(DiceEvent::ValueChanged(config.target_value));
        }
        self.state = DiceState::Landing;
        self.active = Some(ActiveRoll {
            generation: self.generation,
            config,
            elapsed: config.rolling_duration(),
            revealed: true,
        });
    }

    /// Settle immediately on `target_value`, dropping any roll in flight
    pub fn set_idle(&mut self, target_value: u8) {
        self.active = None;
        self.target_value = target_value;
        if self.display_value != target_value {
            self.display_value = target_value;
            self.events.push(DiceEvent::ValueChanged(target_value));
        }
        if self.state != DiceState::Idle {
            self.state = DiceState::Idle;
            self.events.push(DiceEvent::StateChanged(DiceState::Idle));
        }
    }

    /// Abort the roll identified by `handle`, revealing its target.
    /// Returns false if a newer roll has replaced it or it already finished.
    pub fn cancel(&mut self, handle: RollHandle) -> bool {
        match self.active {
            Some(roll) if roll.generation == handle.0 => {
                debug!(generation = roll.generation, "roll cancelled");
                self.set_idle(roll.config.target_value);
                true
            }
            _ => false,
        }
    }

    /// Advance simulated time. Returns true when the target value was
    /// revealed during this step in bounce style, which is when the
    /// caller should start the scale bounce.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(mut roll) = self.active.take() else {
            return false;
        };
        roll.elapsed = roll.elapsed.saturating_add(dt);
        let rolling = roll.config.rolling_duration();
        let mut bounce = false;

        let finished = match roll.config.style {
            RollStyle::Landing { landing_ms } => {
                if !roll.revealed && roll.elapsed >= rolling {
                    self.reveal(&mut roll);
                    self.state = DiceState::Landing;
                    self.events.push(DiceEvent::StateChanged(DiceState::Landing));
                    debug!(generation = roll.generation, "landing");
                }
                roll.revealed && roll.elapsed >= rolling + Duration::from_millis(landing_ms)
            }
            RollStyle::Bounce { reveal_fraction } => {
                if !roll.revealed && roll.progress() >= reveal_fraction {
                    self.reveal(&mut roll);
                    bounce = true;
                }
                roll.elapsed >= rolling
            }
        };

        if finished {
            self.state = DiceState::Idle;
            self.events.push(DiceEvent::StateChanged(DiceState::Idle));
            debug!(generation = roll.generation, value = self.display_value, "roll finished");
        } else {
            self.active = Some(roll);
        }
        bounce
    }

    fn reveal(&mut self, roll: &mut ActiveRoll) {
        roll.revealed = true;
        self.display_value = roll.config.target_value;
        self.events.push(DiceEvent::ValueChanged(roll.config.target_value));
        debug!(generation = roll.generation, value = roll.config.target_value, "value revealed");
    }

    /// Take the notifications queued since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<DiceEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn animator() -> DiceAnimator {
        DiceAnimator::new(&AnimationConfig::default(), 60.0)
    }

    fn step_until_idle(anim: &mut DiceAnimator, step: Duration) -> Duration {
        let mut total = Duration::ZERO;
        while anim.state() != DiceState::Idle {
            anim.advance(step);
            total += step;
            assert!(total < Duration::from_secs(60), "roll never finished");
        }
        total
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(
            AnimationConfig::roll_to(7, 3.0, 4.0, 1500).unwrap_err(),
            ConfigError::TargetValue(7)
        );
        assert!(matches!(
            AnimationConfig::roll_to(4, -1.0, 4.0, 1500),
            Err(ConfigError::RotationCount { axis: 'X', .. })
        ));
        assert!(matches!(
            AnimationConfig::roll_to(4, 3.0, f32::NAN, 1500),
            Err(ConfigError::RotationCount { axis: 'Y', .. })
        ));
        assert_eq!(
            AnimationConfig::roll_to(4, 3.0, 4.0, 0).unwrap_err(),
            ConfigError::ZeroDuration
        );
        assert!(AnimationConfig::idle(0).is_ok());
        assert!(AnimationConfig::roll_to(6, 0.0, 0.0, 10).is_ok());
    }

    #[test]
    fn test_rolling_velocities() {
        let (vx, vy) = rolling_velocities(3.0, 4.0, 1500, 60.0);
        // 90 frames
        assert!((vx * 90.0 - 3.0 * TAU).abs() < 1e-3);
        assert!((vy * 90.0 - 4.0 * TAU).abs() < 1e-3);
    }

    #[test]
    fn test_landing_sequence() {
        let mut anim = animator();
        let mut rng = StdRng::seed_from_u64(7);
        let config = AnimationConfig::roll_to(4, 3.0, 4.0, 1500).unwrap();
        let start = anim.roll_to(config, &mut rng).unwrap();
        assert!(start.velocity_x.abs() > 0.0);
        assert!(!anim.interaction_enabled());
        assert_eq!(anim.display_value(), NO_VALUE);

        let total = step_until_idle(&mut anim, Duration::from_millis(16));
        assert!(total >= Duration::from_millis(2500));
        assert_eq!(
            anim.drain_events(),
            vec![
                DiceEvent::ValueChanged(0),
                DiceEvent::ValueChanged(4),
                DiceEvent::StateChanged(DiceState::Landing),
                DiceEvent::StateChanged(DiceState::Idle),
            ]
        );
        assert_eq!(anim.display_value(), 4);
        assert!(anim.interaction_enabled());
    }

    #[test]
    fn test_bounce_sequence() {
        let mut anim = animator();
        let mut rng = StdRng::seed_from_u64(1);
        let config = AnimationConfig::roll_to(2, 3.0, 4.0, 1000)
            .unwrap()
            .with_style(RollStyle::Bounce {
                reveal_fraction: 0.25,
            })
            .unwrap();
        anim.roll_to(config, &mut rng).unwrap();

        let mut bounced_at = None;
        let mut elapsed = Duration::ZERO;
        while anim.state() != DiceState::Idle {
            elapsed += Duration::from_millis(10);
            if anim.advance(Duration::from_millis(10)) {
                bounced_at = Some(elapsed);
            }
        }
        assert_eq!(bounced_at, Some(Duration::from_millis(250)));
        assert_eq!(elapsed, Duration::from_millis(1000));
        assert_eq!(
            anim.drain_events(),
            vec![
                DiceEvent::ValueChanged(0),
                DiceEvent::ValueChanged(2),
                DiceEvent::StateChanged(DiceState::Idle),
            ]
        );
    }

    #[test]
    fn test_bounce_damping_tightens() {
        let mut anim = animator();
        let mut rng = StdRng::seed_from_u64(3);
        let config = AnimationConfig::roll_to(5, 1.0, 1.0, 1000)
            .unwrap()
            .with_style(RollStyle::Bounce {
                reveal_fraction: 0.5,
            })
            .unwrap();
        anim.roll_to(config, &mut rng).unwrap();
        assert!((anim.damping(0.97) - ROLLING_DAMPING).abs() < 1e-6);
        anim.advance(Duration::from_millis(500));
        assert!((anim.damping(0.97) - 0.945).abs() < 1e-5);
        anim.advance(Duration::from_millis(499));
        assert!(anim.damping(0.97) < 0.901);
        anim.advance(Duration::from_millis(1));
        assert_eq!(anim.damping(0.97), 0.97);
    }

    #[test]
    fn test_new_roll_supersedes_old() {
        let mut anim = animator();
        let mut rng = StdRng::seed_from_u64(11);
        let first = anim
            .roll_to(AnimationConfig::roll_to(3, 3.0, 4.0, 1000).unwrap(), &mut rng)
            .unwrap();
        anim.advance(Duration::from_millis(900));
        anim.roll_to(AnimationConfig::roll_to(6, 3.0, 4.0, 1000).unwrap(), &mut rng)
            .unwrap();

        // The first roll's deadline passes without revealing 3
        anim.advance(Duration::from_millis(200));
        assert_eq!(anim.display_value(), NO_VALUE);
        assert!(!anim.cancel(first.handle));

        step_until_idle(&mut anim, Duration::from_millis(50));
        let events = anim.drain_events();
        assert!(!events.contains(&DiceEvent::ValueChanged(3)));
        assert_eq!(
            events.iter().filter(|e| **e == DiceEvent::ValueChanged(6)).count(),
            1
        );
        assert_eq!(anim.display_value(), 6);
    }

    #[test]
    fn test_cancel_reveals_target() {
        let mut anim = animator();
        let mut rng = StdRng::seed_from_u64(5);
        let start = anim
            .roll_to(AnimationConfig::roll_to(1, 3.0, 4.0, 1000).unwrap(), &mut rng)
            .unwrap();
        assert!(anim.cancel(start.handle));
        assert_eq!(anim.state(), DiceState::Idle);
        assert_eq!(anim.display_value(), 1);
        assert!(!anim.advance(Duration::from_secs(5)));
        assert_eq!(
            anim.drain_events(),
            vec![
                DiceEvent::ValueChanged(0),
                DiceEvent::ValueChanged(1),
                DiceEvent::StateChanged(DiceState::Idle),
            ]
        );
    }

    #[test]
    fn test_hand_built_config_leaves_animator_untouched() {
        let mut anim = animator();
        let mut rng = StdRng::seed_from_u64(9);
        let bad = AnimationConfig {
            state: DiceState::Rolling,
            target_value: 42,
            rotations_x: -5.0,
            rolling_ms: 0,
            ..AnimationConfig::default()
        };
        assert_eq!(
            anim.roll_to(bad, &mut rng),
            Err(ConfigError::TargetValue(42))
        );
        let zero = AnimationConfig {
            target_value: 3,
            rotations_x: 1.0,
            ..bad
        };
        assert_eq!(anim.apply(zero, &mut rng), Err(ConfigError::ZeroDuration));
        let idle = AnimationConfig {
            state: DiceState::Idle,
            ..bad
        };
        assert!(anim.apply(idle, &mut rng).is_err());

        assert_eq!(anim.state(), DiceState::Idle);
        assert_eq!(anim.display_value(), 0);
        assert!(anim.drain_events().is_empty());
        assert!(!anim.advance(Duration::from_secs(5)));
    }

    #[test]
    fn test_set_idle_only_notifies_on_change() {
        let mut anim = animator();
        anim.set_idle(0);
        assert!(anim.drain_events().is_empty());
        anim.set_idle(5);
        assert_eq!(anim.drain_events(), vec![DiceEvent::ValueChanged(5)]);
    }

    #[test]
    fn test_landing_speed_factor() {
        assert_eq!(landing_speed_factor(0.0), 1.0);
        assert_eq!(landing_speed_factor(1.0), 0.05);
        assert!((landing_speed_factor(0.5) - 0.75).abs() < 1e-6);
    }
}
