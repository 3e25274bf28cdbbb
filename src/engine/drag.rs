//! Pointer drag capture.
//!
//! A `DragSession` lives from pointer-down inside a hit region until
//! pointer-up or pointer-leave. While it is open it tracks the pointer's
//! angle (or position) and keeps a running velocity estimate that the
//! physics model picks up on release.
//!
//! `DragState` is the single source of truth for "is the user holding this
//! thing": physics integrators check it instead of a loose boolean.

use crate::types::Point;

use super::math::shortest_angle_diff;

/// Samples closer together than this (seconds) do not update the velocity
/// estimate; their motion is folded into the next usable sample.
const MIN_SAMPLE_DT: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Where the pointer went down, in the caller's local frame.
    pub start: Point,
    /// Value of whatever is being dragged when the session opened
    /// (door progress, knob angle, ...).
    pub anchor: f64,
    pub last_angle: f64,
    pub last_time: f64,
    /// Latest angular (or linear) velocity estimate, units per second.
    pub velocity: f64,
    pending_delta: f64,
}

impl DragSession {
    pub fn new(start: Point, angle: f64, time: f64) -> Self {
        Self {
            start,
            anchor: 0.0,
            last_angle: angle,
            last_time: time,
            velocity: 0.0,
            pending_delta: 0.0,
        }
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    /// Feed a new pointer angle. Returns the shortest-path delta from the
    /// previous sample so callers can apply it directly.
    pub fn track_angle(&mut self, angle: f64, time: f64) -> f64 {
        let delta = shortest_angle_diff(angle, self.last_angle);
        self.last_angle = angle;
        self.accumulate(delta, time);
        delta
    }

    /// Feed a new scalar position (e.g. the pointer's x). Returns the delta
    /// from the previous sample.
    pub fn track_linear(&mut self, value: f64, time: f64) -> f64 {
        let delta = value - self.last_angle;
        self.last_angle = value;
        self.accumulate(delta, time);
        delta
    }

    fn accumulate(&mut self, delta: f64, time: f64) {
        if !delta.is_finite() || time.is_nan() {
            return;
        }
        let dt = time - self.last_time;
        if dt < MIN_SAMPLE_DT {
            self.pending_delta += delta;
            return;
        }
        self.velocity = (self.pending_delta + delta) / dt;
        self.pending_delta = 0.0;
        self.last_time = time;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
    /// Released and moving freely on the velocity handed over at release.
    Settling,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        match self {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn begin(&mut self, session: DragSession) {
        *self = DragState::Dragging(session);
    }

    /// Close the session and hand back its final velocity. Calling this
    /// with no open session is a no-op returning `None`.
    pub fn end(&mut self) -> Option<f64> {
        match std::mem::take(self) {
            DragState::Dragging(session) => {
                *self = DragState::Settling;
                Some(session.velocity)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Settling → Idle once the released motion has died down.
    pub fn settle(&mut self) {
        if matches!(self, DragState::Settling) {
            *self = DragState::Idle;
        }
    }
}

// ---------------------------------------------------------------------------
// Hit testing in an object's local frame
// ---------------------------------------------------------------------------

/// Disc hit test against a handle drawn at `center` on a non-uniformly
/// scaled path. The handle itself is a circle of `radius` on screen.
pub fn hit_disc(point: Point, center: Point, radius: f64) -> bool {
    point.distance(center) <= radius
}

/// Undo a non-uniform scale about `pivot` and return the circular angle the
/// point corresponds to.
pub fn unscaled_angle(point: Point, pivot: Point, scale_x: f64, scale_y: f64) -> f64 {
    let dx = (point.x - pivot.x) / if scale_x == 0.0 { 1.0 } else { scale_x };
    let dy = (point.y - pivot.y) / if scale_y == 0.0 { 1.0 } else { scale_y };
    dy.atan2(dx)
}

/// Is `point` inside the axis-aligned rectangle `[min, max]` once the
/// rotation `angle` about `pivot` has been undone?
pub fn hit_rotated_rect(point: Point, pivot: Point, angle: f64, min: Point, max: Point) -> bool {
    let local = Point::new(point.x - pivot.x, point.y - pivot.y).rotated(-angle);
    local.x >= min.x && local.x <= max.x && local.y >= min.y && local.y <= max.y
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn constant_angular_velocity_is_captured() {
        let omega = 2.5;
        let mut session = DragSession::new(Point::default(), 0.0, 0.0);
        for i in 1..=30 {
            let t = i as f64 / 60.0;
            session.track_angle(omega * t, t);
        }
        assert!((session.velocity - omega).abs() < 1e-9);
    }

    #[test]
    fn velocity_survives_the_angle_seam() {
        let mut session = DragSession::new(Point::default(), PI - 0.05, 0.0);
        session.track_angle(-PI + 0.05, 0.1);
        assert!((session.velocity - 1.0).abs() < 1e-9, "{}", session.velocity);
    }

    #[test]
    fn zero_and_negative_sample_intervals_are_folded() {
        let mut session = DragSession::new(Point::default(), 0.0, 1.0);
        session.track_angle(0.1, 1.0);
        session.track_angle(0.2, 0.9);
        assert_eq!(session.velocity, 0.0);
        session.track_angle(0.3, 1.1);
        assert!((session.velocity - 3.0).abs() < 1e-9);
    }

    #[test]
    fn end_is_idempotent() {
        let mut state = DragState::default();
        assert_eq!(state.end(), None);
        let mut session = DragSession::new(Point::default(), 0.0, 0.0);
        session.track_angle(1.0, 0.5);
        state.begin(session);
        assert!(state.is_dragging());
        assert_eq!(state.end(), Some(2.0));
        assert_eq!(state, DragState::Settling);
        assert_eq!(state.end(), None);
        assert_eq!(state, DragState::Settling);
        state.settle();
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn rotated_rect_is_tested_in_local_frame() {
        let pivot = Point::new(10.0, 10.0);
        let min = Point::new(-1.0, -12.0);
        let max = Point::new(1.0, -8.0);
        // Unrotated, the handle sits above the pivot.
        assert!(hit_rotated_rect(Point::new(10.0, 0.0), pivot, 0.0, min, max));
        // Rotated a quarter turn clockwise (y down), it sits to the right.
        assert!(hit_rotated_rect(Point::new(20.0, 10.0), pivot, FRAC_PI_2, min, max));
        assert!(!hit_rotated_rect(Point::new(10.0, 0.0), pivot, FRAC_PI_2, min, max));
    }

    #[test]
    fn unscaled_angle_inverts_ellipse() {
        let pivot = Point::new(0.0, 0.0);
        let (sx, sy) = (1.0 / 1.3, 1.3);
        let angle: f64 = 0.7;
        let drawn = Point::new(angle.cos() * 10.0 * sx, angle.sin() * 10.0 * sy);
        assert!((unscaled_angle(drawn, pivot, sx, sy) - angle).abs() < 1e-12);
    }
}
