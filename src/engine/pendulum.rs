//! Simple pendulum about a rest angle, with user override while dragged.

use std::f64::consts::FRAC_PI_2;

use tracing::trace;

use super::drag::{DragSession, DragState};

/// Below this effective length the pendulum is considered collapsed and
/// physics is skipped for the frame.
const MIN_LENGTH: f64 = 1e-6;
/// Angular speed under which a released pendulum counts as settled.
const SETTLE_SPEED: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumParams {
    /// Gravity in surface units per second squared.
    pub gravity: f64,
    /// Multiplicative velocity factor applied once per step, `< 1`.
    pub damping: f64,
    /// Hard bound on `|angular_velocity|`, radians per second.
    pub max_angular_speed: f64,
    /// Angle the bob hangs at when at rest. Angles are measured from the
    /// +x axis with y pointing down, so straight down is `π/2`.
    pub rest_angle: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            damping: 0.995,
            max_angular_speed: 14.0,
            rest_angle: FRAC_PI_2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pendulum {
    pub angle: f64,
    pub angular_velocity: f64,
    pub drag: DragState,
    pub params: PendulumParams,
}

impl Pendulum {
    pub fn new(params: PendulumParams) -> Self {
        Self {
            angle: params.rest_angle,
            angular_velocity: 0.0,
            drag: DragState::Idle,
            params,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Advance free motion by `dt` at the current effective `length`.
    /// Does nothing while a drag session is open.
    pub fn integrate(&mut self, dt: f64, length: f64) {
        if self.drag.is_dragging() {
            return;
        }
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        if !(length > MIN_LENGTH) {
            trace!(length, "pendulum length degenerate, skipping step");
            return;
        }

        let theta = self.angle - self.params.rest_angle;
        let acceleration = -(self.params.gravity / length) * theta.sin();

        let max = self.params.max_angular_speed;
        self.angular_velocity += acceleration * dt;
        self.angular_velocity *= self.params.damping;
        self.angular_velocity = self.angular_velocity.clamp(-max, max);
        self.angle += self.angular_velocity * dt;

        if self.angular_velocity.abs() < SETTLE_SPEED {
            self.drag.settle();
        }
    }

    /// Take hold of the bob. Free motion stops until `release`.
    pub fn grab(&mut self, session: DragSession) {
        self.angular_velocity = 0.0;
        self.drag.begin(session);
    }

    /// Move the held bob to `angle` at wall time `time`.
    pub fn drag_to(&mut self, angle: f64, time: f64) {
        if let Some(session) = self.drag.session_mut() {
            session.track_angle(angle, time);
            self.angle = angle;
        }
    }

    /// Let go. The captured velocity times `flick_strength` becomes the new
    /// angular velocity. Returns `false` when nothing was held.
    pub fn release(&mut self, flick_strength: f64) -> bool {
        match self.drag.end() {
            Some(velocity) => {
                let max = self.params.max_angular_speed;
                let velocity = velocity * flick_strength;
                self.angular_velocity = if velocity.is_finite() {
                    velocity.clamp(-max, max)
                } else {
                    0.0
                };
                true
            }
            None => false,
        }
    }
}
