/// Transient scale animation for the pulsing layer: press tween, spring release, reveal bounce
use std::time::Duration;

/// Scale the layer shrinks to while pressed
pub const PRESSED_SCALE: f32 = 0.7;
const PRESS_DURATION: Duration = Duration::from_millis(120);
/// Medium-bouncy damping ratio
const DAMPING_RATIO: f32 = 0.5;
/// Low stiffness
const STIFFNESS: f32 = 200.0;
/// Initial outward velocity of the reveal bounce (scale units per second)
const BOUNCE_KICK: f32 = 2.5;
const SETTLE_EPSILON: f32 = 1e-3;
const MAX_SUBSTEP: f32 = 0.004;
/// Any spring motion has settled well within this many seconds
const SETTLE_TIME: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Rest,
    Tween {
        from: f32,
        to: f32,
        elapsed: Duration,
        duration: Duration,
    },
    Spring {
        target: f32,
        velocity: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleAnimation {
    value: f32,
    motion: Motion,
}

impl ScaleAnimation {
    pub fn new() -> Self {
        Self {
            value: 1.0,
            motion: Motion::Rest,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.motion, Motion::Rest)
    }

    /// Shrink toward `PRESSED_SCALE` over 120 ms
    pub fn press(&mut self) {
        self.motion = Motion::Tween {
            from: self.value,
            to: PRESSED_SCALE,
            elapsed: Duration::ZERO,
            duration: PRESS_DURATION,
        };
    }

    /// Spring back to full size from wherever the scale currently is
    pub fn release(&mut self) {
        self.motion = Motion::Spring {
            target: 1.0,
            velocity: 0.0,
        };
    }

    /// Overshoot past full size, then settle
    pub fn bounce(&mut self) {
        let velocity = match self.motion {
            Motion::Spring { velocity, .. } => velocity,
            _ => 0.0,
        };
        self.motion = Motion::Spring {
            target: 1.0,
            velocity: velocity + BOUNCE_KICK,
        };
    }

    pub fn advance(&mut self, dt: Duration) {
        match &mut self.motion {
            Motion::Rest => {}
            Motion::Tween {
                from,
                to,
                elapsed,
                duration,
            } => {
                *elapsed = elapsed.saturating_add(dt);
                let t = (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0);
                self.value = *from + (*to - *from) * linear_out_slow_in(t);
                if t >= 1.0 {
                    self.value = *to;
                    self.motion = Motion::Rest;
                }
            }
            Motion::Spring { target, velocity } => {
                let secs = dt.as_secs_f32();
                if secs >= SETTLE_TIME {
                    self.value = *target;
                    self.motion = Motion::Rest;
                    return;
                }
                let omega = STIFFNESS.sqrt();
                let steps = (secs / MAX_SUBSTEP).ceil() as u32;
                let h = secs / steps.max(1) as f32;
                for _ in 0..steps {
                    let accel = -STIFFNESS * (self.value - *target)
                        - 2.0 * DAMPING_RATIO * omega * *velocity;
                    *velocity += accel * h;
                    self.value += *velocity * h;
                }
                if (self.value - *target).abs() < SETTLE_EPSILON && velocity.abs() < SETTLE_EPSILON
                {
                    self.value = *target;
                    self.motion = Motion::Rest;
                }
            }
        }
    }
}

impl Default for ScaleAnimation {
    fn default() -> Self {
        Self::new()
    }
}

/// Cubic bezier easing with control points (0, 0) and (0.2, 1)
fn linear_out_slow_in(t: f32) -> f32 {
    const X1: f32 = 0.0;
    const Y1: f32 = 0.0;
    const X2: f32 = 0.2;
    const Y2: f32 = 1.0;

    let bezier = |p1: f32, p2: f32, s: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };

    // Bisection on x(s) = t; x is monotonic for these control points
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..24 {
        let mid = (lo + hi) / 2.0;
        if bezier(X1, X2, mid) < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    bezier(Y1, Y2, (lo + hi) / 2.0)
}
