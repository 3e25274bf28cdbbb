//! Damped oscillator tuned by frequency and half-life.
//!
//! `frequency` (Hz) sets the stiffness: `k = (2π f)²`. `half_life` (seconds)
//! is the time for the oscillation envelope to decay by half, which fixes
//! the damping coefficient at `c = 2 ln 2 / half_life`.
//!
//! Integration uses implicit Euler over bounded sub-steps. Implicit Euler is
//! unconditionally stable for a damped spring, so any `dt` leaves position
//! and velocity finite; sub-stepping keeps the motion close to the exact
//! solution at ordinary frame rates.

use std::f64::consts::{LN_2, TAU};

use serde::{Deserialize, Serialize};

use super::math::wrapped_diff;

/// Longest single integration step.
const MAX_SUBSTEP: f64 = 1.0 / 240.0;
const MAX_SUBSTEPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringSettings {
    pub frequency: f64,
    pub half_life: f64,
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            half_life: 0.15,
        }
    }
}

impl SpringSettings {
    pub const fn new(frequency: f64, half_life: f64) -> Self {
        Self {
            frequency,
            half_life,
        }
    }

    fn stiffness(&self) -> f64 {
        let omega = TAU * self.frequency.max(0.0);
        omega * omega
    }

    fn damping(&self) -> f64 {
        if self.half_life > 0.0 {
            2.0 * LN_2 / self.half_life
        } else {
            0.0
        }
    }

    fn is_degenerate(&self) -> bool {
        !self.frequency.is_finite()
            || !self.half_life.is_finite()
            || (self.frequency <= 0.0 && self.half_life <= 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
    pub settings: SpringSettings,
    /// Period for angular wrap-around (e.g. `360.0` or `TAU`). When set,
    /// the spring always pulls along the shortest way round.
    pub wrap: Option<f64>,
}

impl Spring {
    /// A spring at rest on `position`.
    pub fn new(position: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
            target: position,
            settings: SpringSettings::default(),
            wrap: None,
        }
    }

    pub fn with_settings(mut self, settings: SpringSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    pub fn with_wrap(mut self, period: f64) -> Self {
        self.wrap = (period.is_finite() && period > 0.0).then_some(period);
        self
    }

    /// Signed distance from the target, folded when wrapping.
    pub fn error(&self) -> f64 {
        match self.wrap {
            Some(period) => wrapped_diff(self.position, self.target, period),
            None => self.position - self.target,
        }
    }

    pub fn step(&mut self, dt: f64) {
        if dt.is_nan() || dt <= 0.0 || self.settings.is_degenerate() {
            return;
        }
        if !self.position.is_finite() || !self.velocity.is_finite() || !self.target.is_finite() {
            return;
        }

        let substeps = ((dt / MAX_SUBSTEP).ceil() as usize).clamp(1, MAX_SUBSTEPS);
        let h = dt / substeps as f64;
        let k = self.settings.stiffness();
        let c = self.settings.damping();
        let denom = 1.0 + h * c + h * h * k;

        for _ in 0..substeps {
            let error = self.error();
            self.velocity = (self.velocity - h * k * error) / denom;
            self.position += h * self.velocity;
        }
    }

    /// Force a new state; dynamics resume from here on the next `step`.
    pub fn teleport(&mut self, position: f64, velocity: f64) {
        self.position = position;
        self.velocity = velocity;
    }

    /// Jump onto the target and stop.
    pub fn snap_to_target(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self, position_tolerance: f64, velocity_tolerance: f64) -> bool {
        self.error().abs() <= position_tolerance && self.velocity.abs() <= velocity_tolerance
    }
}
