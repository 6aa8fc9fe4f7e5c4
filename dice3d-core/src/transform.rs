/// Rotation state, drag-and-flick inertia and per-layer lag
use crate::math::{Vec3, VectorExt};

/// Rotation around the X and Y axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Exponential smoothing toward `target`: 1 follows instantly, 0 never moves
    pub fn approach(&mut self, target: &RotationState, lag_factor: f32) {
        if lag_factor >= 1.0 {
            *self = *target;
            return;
        }
        self.x += (target.x - self.x) * lag_factor;
        self.y += (target.y - self.y) * lag_factor;
    }

    /// Negate the axes flagged for inversion
    pub fn inverted(self, invert_x: bool, invert_y: bool) -> Self {
        Self {
            x: if invert_x { -self.x } else { self.x },
            y: if invert_y { -self.y } else { self.y },
        }
    }

    /// Apply this rotation to a point, X first then Y
    pub fn apply(&self, point: &Vec3) -> Vec3 {
        point.rotate_x(self.x).rotate_y(self.y)
    }
}

/// Global target rotation plus angular velocity, both per frame.
///
/// `velocity_x` feeds the Y angle and `velocity_y` the X angle: a horizontal
/// drag spins the cube around its vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin {
    pub target: RotationState,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

impl Spin {
    pub fn new(target: RotationState) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Apply one drag delta in screen pixels
    pub fn drag(&mut self, dx: f32, dy: f32, drag_factor: f32) {
        self.target.y -= dx * drag_factor;
        self.target.x += dy * drag_factor;
        self.velocity_x = -dx * drag_factor;
        self.velocity_y = dy * drag_factor;
    }

    /// One inertia frame: advance by the velocity, then decay it
    pub fn coast(&mut self, damping: f32) {
        self.target.x += self.velocity_y;
        self.target.y += self.velocity_x;
        self.velocity_x *= damping;
        self.velocity_y *= damping;
    }

    pub fn halt(&mut self) {
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
    }

    pub fn set_velocity(&mut self, velocity_x: f32, velocity_y: f32) {
        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
    }

    /// Slow constant auto-rotation; `speed` is in radians per second per axis
    pub fn idle_spin(&mut self, dt_secs: f32, speed: (f32, f32)) {
        self.target.x += speed.0 * dt_secs;
        self.target.y += speed.1 * dt_secs;
    }

    pub fn is_resting(&self, epsilon: f32) -> bool {
        self.velocity_x.abs() < epsilon && self.velocity_y.abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);

        state.rotate(0.1, 0.2);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_drag_updates_target_and_velocity() {
        let mut spin = Spin::default();
        spin.drag(10.0, -5.0, 0.004);
        assert!((spin.target.y - -0.04).abs() < 1e-6);
        assert!((spin.target.x - -0.02).abs() < 1e-6);
        assert!((spin.velocity_x - -0.04).abs() < 1e-6);
        assert!((spin.velocity_y - -0.02).abs() < 1e-6);
    }

    #[test]
    fn test_inertia_decays_geometrically() {
        let mut spin = Spin::default();
        spin.set_velocity(0.1, 0.2);
        spin.coast(0.9);
        assert!((spin.target.y - 0.1).abs() < 1e-6);
        assert!((spin.target.x - 0.2).abs() < 1e-6);
        assert!((spin.velocity_x - 0.09).abs() < 1e-6);

        for _ in 0..500 {
            spin.coast(0.9);
        }
        assert!(spin.is_resting(1e-9));
        // Geometric series: total = v / (1 - d)
        assert!((spin.target.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_lag_one_follows_instantly() {
        let target = RotationState::new(1.3, -0.7);
        let mut state = RotationState::zero();
        state.approach(&target, 1.0);
        assert_eq!(state, target);
    }

    #[test]
    fn test_lag_zero_is_frozen() {
        let mut state = RotationState::new(0.2, 0.4);
        for i in 0..50 {
            let target = RotationState::new(i as f32, -(i as f32));
            state.approach(&target, 0.0);
        }
        assert_eq!(state, RotationState::new(0.2, 0.4));
    }

    #[test]
    fn test_lag_converges() {
        let target = RotationState::new(2.0, 1.0);
        let mut state = RotationState::zero();
        state.approach(&target, 0.5);
        assert!((state.x - 1.0).abs() < 1e-6);
        for _ in 0..60 {
            state.approach(&target, 0.5);
        }
        assert!((state.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_idle_spin_zero_dt_is_idempotent() {
        let mut spin = Spin::new(RotationState::new(0.5, 0.25));
        for _ in 0..10 {
            spin.idle_spin(0.0, (0.3, 0.5));
        }
        assert_eq!(spin.target, RotationState::new(0.5, 0.25));
    }

    #[test]
    fn test_inversion() {
        let r = RotationState::new(1.0, 2.0).inverted(true, false);
        assert_eq!(r, RotationState::new(-1.0, 2.0));
    }
}
