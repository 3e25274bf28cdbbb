//! Clock, sequencer and completion gate bundled for a single sketch.

use super::clock::AnimationClock;
use super::gate::CompletionGate;
use super::sequencer::{Params, Phase, Sequencer, Step};

/// Result of one lifecycle tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Clamped delta actually applied this frame.
    pub dt: f64,
    pub step: Step,
}

#[derive(Debug)]
pub struct Lifecycle {
    clock: AnimationClock,
    sequencer: Sequencer,
    gate: CompletionGate,
}

impl Lifecycle {
    pub fn new(sequencer: Sequencer, gate: CompletionGate, max_dt: f64) -> Self {
        Self {
            clock: AnimationClock::new(max_dt),
            sequencer,
            gate,
        }
    }

    /// Clamp `raw_dt`, advance the sequencer, and fire the gate when the
    /// terminal phase completes.
    pub fn tick(&mut self, raw_dt: f64) -> Tick {
        let dt = self.clock.tick(raw_dt);
        let step = self.sequencer.advance(dt);
        if step.finished {
            self.gate.fire();
        }
        Tick { dt, step }
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn params(&self) -> Params {
        self.sequencer.parameters()
    }

    pub fn is_finished(&self) -> bool {
        self.gate.is_fired()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }
}
