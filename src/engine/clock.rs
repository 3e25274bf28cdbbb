//! Monotonic animation clock fed by clamped frame deltas.

use tracing::trace;

/// Upper bound for a single frame step. Larger steps make the integrators
/// tunnel through their targets.
pub const DEFAULT_MAX_DT: f64 = 1.0 / 30.0;

/// Clamp a raw frame delta into `[0, max_dt]`. NaN and negative deltas
/// become zero.
pub fn sanitize_dt(dt: f64, max_dt: f64) -> f64 {
    if dt.is_nan() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt)
}

#[derive(Debug, Clone)]
pub struct AnimationClock {
    elapsed: f64,
    frames: u64,
    max_dt: f64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DT)
    }
}

impl AnimationClock {
    pub fn new(max_dt: f64) -> Self {
        let max_dt = if max_dt.is_finite() && max_dt > 0.0 {
            max_dt
        } else {
            DEFAULT_MAX_DT
        };
        Self {
            elapsed: 0.0,
            frames: 0,
            max_dt,
        }
    }

    /// Advance by one frame and return the delta actually applied.
    pub fn tick(&mut self, raw_dt: f64) -> f64 {
        let dt = sanitize_dt(raw_dt, self.max_dt);
        if dt != raw_dt {
            trace!(raw_dt, dt, "frame delta clamped");
        }
        self.elapsed += dt;
        self.frames += 1;
        dt
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }
}
