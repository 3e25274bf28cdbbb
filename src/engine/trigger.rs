//! Pluggable "loop complete" detection for angular sketches.
//!
//! Two policies are offered: net rotation accumulated along the path, or
//! coverage of every angular sector. Which one a sketch uses is a config
//! choice.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::math::shortest_angle_diff;

pub trait ResolutionPredicate {
    /// Feed the latest angle of the tracked object.
    fn observe(&mut self, angle: f64);
    /// Forget continuity with the previous sample (e.g. after a drag).
    fn interrupt(&mut self);
    fn is_satisfied(&self) -> bool;
    /// How close to satisfied, in `[0, 1]`.
    fn progress(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionTrigger {
    /// Net signed rotation of at least `turns` full turns.
    Rotation { turns: f64 },
    /// Every one of `count` equal sectors has been visited.
    Sectors { count: usize },
}

impl Default for ResolutionTrigger {
    fn default() -> Self {
        ResolutionTrigger::Rotation { turns: 1.0 }
    }
}

impl ResolutionTrigger {
    pub fn build(self) -> Box<dyn ResolutionPredicate> {
        match self {
            ResolutionTrigger::Rotation { turns } => Box::new(RotationAccumulator::new(turns)),
            ResolutionTrigger::Sectors { count } => Box::new(SectorCoverage::new(count)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotationAccumulator {
    last: Option<f64>,
    accumulated: f64,
    required: f64,
}

impl RotationAccumulator {
    pub fn new(turns: f64) -> Self {
        Self {
            last: None,
            accumulated: 0.0,
            required: turns.abs() * TAU,
        }
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

impl ResolutionPredicate for RotationAccumulator {
    fn observe(&mut self, angle: f64) {
        if !angle.is_finite() {
            return;
        }
        if let Some(last) = self.last {
            self.accumulated += shortest_angle_diff(angle, last);
        }
        self.last = Some(angle);
    }

    fn interrupt(&mut self) {
        self.last = None;
    }

    fn is_satisfied(&self) -> bool {
        self.accumulated.abs() >= self.required
    }

    fn progress(&self) -> f64 {
        if self.required <= 0.0 {
            return 1.0;
        }
        (self.accumulated.abs() / self.required).min(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct SectorCoverage {
    visited: Vec<bool>,
}

impl SectorCoverage {
    pub fn new(count: usize) -> Self {
        Self {
            visited: vec![false; count.max(1)],
        }
    }

    fn sector_of(&self, angle: f64) -> usize {
        let n = self.visited.len();
        let index = (angle.rem_euclid(TAU) / TAU * n as f64) as usize;
        index.min(n - 1)
    }
}

impl ResolutionPredicate for SectorCoverage {
    fn observe(&mut self, angle: f64) {
        if !angle.is_finite() {
            return;
        }
        let index = self.sector_of(angle);
        self.visited[index] = true;
    }

    fn interrupt(&mut self) {}

    fn is_satisfied(&self) -> bool {
        self.visited.iter().all(|v| *v)
    }

    fn progress(&self) -> f64 {
        let seen = self.visited.iter().filter(|v| **v).count();
        seen as f64 / self.visited.len() as f64
    }
}
