//! Phase sequencer: the timed state machine every sketch runs on.
//!
//! A sequencer walks an ordered plan of phases. Timed phases end when their
//! duration has elapsed; triggered phases end when the owner calls
//! `trigger`. The `Idle`/`Interactive` pair forms the input block: the user
//! toggles between them by interacting (and by going quiet), and the block
//! is only left through `request_resolution`.
//!
//! Transitions out of a completed phase happen on the *next* `advance`, so
//! a phase always reports `progress() == 1` for one frame before it is
//! replaced. The last phase of the plan is the exception: it completes in
//! the same `advance` that fills it, and that step reports `finished`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::easing::Easing;
use super::math::lerp;

/// Tolerance for "elapsed has reached duration", absorbing float drift
/// from summing many small deltas.
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Idle,
    Interactive,
    Resolving,
    OutroReturn,
    OutroShrink,
    Hold,
    Fade,
    Done,
}

impl Phase {
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::Idle | Phase::Interactive)
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Intro => "intro",
            Phase::Idle => "idle",
            Phase::Interactive => "interactive",
            Phase::Resolving => "resolving",
            Phase::OutroReturn => "outro-return",
            Phase::OutroShrink => "outro-shrink",
            Phase::Hold => "hold",
            Phase::Fade => "fade",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exit {
    /// Seconds; zero or negative means "complete on entry".
    After(f64),
    /// Ends when the owner calls `Sequencer::trigger` (or, for the input
    /// block, `request_resolution`).
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub from: f64,
    pub to: f64,
}

/// Which render parameters a phase animates, and over what range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tracks {
    pub scale: Option<Track>,
    pub offset: Option<Track>,
    pub opacity: Option<Track>,
    pub blur: Option<Track>,
    pub cover: Option<Track>,
}

/// Render parameters derived from the current phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub scale: f64,
    /// Fraction of the surface height.
    pub offset: f64,
    pub opacity: f64,
    pub blur: f64,
    /// Opacity of the screen-covering curtain.
    pub cover: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            opacity: 1.0,
            blur: 0.0,
            cover: 0.0,
        }
    }
}

impl Params {
    fn apply(&mut self, tracks: &Tracks, t: f64) {
        let at = |track: Track| lerp(track.from, track.to, t);
        if let Some(track) = tracks.scale {
            self.scale = at(track);
        }
        if let Some(track) = tracks.offset {
            self.offset = at(track);
        }
        if let Some(track) = tracks.opacity {
            self.opacity = at(track);
        }
        if let Some(track) = tracks.blur {
            self.blur = at(track);
        }
        if let Some(track) = tracks.cover {
            self.cover = at(track);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSpec {
    pub phase: Phase,
    pub exit: Exit,
    pub easing: Easing,
    pub tracks: Tracks,
}

impl PhaseSpec {
    pub fn timed(phase: Phase, seconds: f64) -> Self {
        Self {
            phase,
            exit: Exit::After(seconds),
            easing: Easing::Linear,
            tracks: Tracks::default(),
        }
    }

    pub fn triggered(phase: Phase) -> Self {
        Self {
            phase,
            exit: Exit::Trigger,
            easing: Easing::Linear,
            tracks: Tracks::default(),
        }
    }

    pub fn eased(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn scale(mut self, from: f64, to: f64) -> Self {
        self.tracks.scale = Some(Track { from, to });
        self
    }

    pub fn offset(mut self, from: f64, to: f64) -> Self {
        self.tracks.offset = Some(Track { from, to });
        self
    }

    pub fn opacity(mut self, from: f64, to: f64) -> Self {
        self.tracks.opacity = Some(Track { from, to });
        self
    }

    pub fn blur(mut self, from: f64, to: f64) -> Self {
        self.tracks.blur = Some(Track { from, to });
        self
    }

    pub fn cover(mut self, from: f64, to: f64) -> Self {
        self.tracks.cover = Some(Track { from, to });
        self
    }
}

/// What happened during one `advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Step {
    pub left: Option<Phase>,
    pub entered: Option<Phase>,
    /// The terminal phase completed on this step.
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    plan: Vec<PhaseSpec>,
    index: usize,
    elapsed: f64,
    idle_after: Option<f64>,
    inactivity: f64,
    holding: bool,
    resolve_pending: bool,
    trigger_pending: bool,
    /// Parameters as left behind by every completed phase.
    settled: Params,
}

impl Sequencer {
    pub fn new(plan: Vec<PhaseSpec>) -> Self {
        let plan: Vec<PhaseSpec> = plan.into_iter().filter(|s| s.phase != Phase::Done).collect();
        Self {
            plan,
            index: 0,
            elapsed: 0.0,
            idle_after: None,
            inactivity: 0.0,
            holding: false,
            resolve_pending: false,
            trigger_pending: false,
            settled: Params::default(),
        }
    }

    /// Drop back from `Interactive` to `Idle` after this many quiet seconds.
    pub fn with_idle_after(mut self, seconds: Option<f64>) -> Self {
        self.idle_after = seconds.filter(|s| s.is_finite() && *s >= 0.0);
        self
    }

    fn current(&self) -> Option<&PhaseSpec> {
        self.plan.get(self.index)
    }

    pub fn phase(&self) -> Phase {
        self.current().map_or(Phase::Done, |s| s.phase)
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.plan.len()
    }

    /// Seconds spent in the current phase.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds since the last interaction while `Interactive`.
    pub fn inactivity(&self) -> f64 {
        self.inactivity
    }

    /// Linear progress through the current phase, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        match self.current().map(|s| s.exit) {
            None => 1.0,
            Some(Exit::After(duration)) => {
                if duration <= 0.0 {
                    1.0
                } else if self.elapsed >= duration - TIME_EPSILON {
                    1.0
                } else {
                    (self.elapsed / duration).clamp(0.0, 1.0)
                }
            }
            Some(Exit::Trigger) => {
                if self.trigger_pending {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn eased_progress(&self) -> f64 {
        let easing = self.current().map_or(Easing::Linear, |s| s.easing);
        easing.apply(self.progress())
    }

    /// Render parameters for the current frame.
    pub fn parameters(&self) -> Params {
        let mut params = self.settled;
        if let Some(spec) = self.current() {
            params.apply(&spec.tracks, self.eased_progress());
        }
        params
    }

    pub fn accepts_input(&self) -> bool {
        self.phase().accepts_input()
    }

    pub fn resolution_pending(&self) -> bool {
        self.resolve_pending
    }

    fn index_of(&self, phase: Phase) -> Option<usize> {
        self.plan.iter().position(|s| s.phase == phase)
    }

    /// Index of the first phase after the input block.
    fn block_end(&self) -> usize {
        self.plan
            .iter()
            .rposition(|s| s.phase.accepts_input())
            .map_or(0, |i| i + 1)
    }

    /// Register user interaction. `Idle` wakes up to `Interactive`; the
    /// inactivity timer restarts. Ignored outside the input block.
    pub fn interact(&mut self) -> bool {
        match self.phase() {
            Phase::Idle => {
                if let Some(index) = self.index_of(Phase::Interactive) {
                    self.go_to(index);
                }
                self.inactivity = 0.0;
                true
            }
            Phase::Interactive => {
                self.inactivity = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Mark whether the user is holding something. A held drag counts as
    /// continuous interaction, so `Interactive` never times out under it.
    pub fn set_holding(&mut self, holding: bool) {
        self.holding = holding;
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Ask to leave the input block. Latched until the block is reached, so
    /// a request made mid-intro waits for the intro to finish. Ignored once
    /// resolution has begun.
    pub fn request_resolution(&mut self) -> bool {
        if self.index >= self.block_end() {
            return false;
        }
        self.resolve_pending = true;
        true
    }

    /// Complete the current triggered phase.
    pub fn trigger(&mut self) -> bool {
        match self.current() {
            Some(spec) if spec.exit == Exit::Trigger && !spec.phase.accepts_input() => {
                self.trigger_pending = true;
                true
            }
            _ => false,
        }
    }

    fn exit_ready(&self) -> bool {
        match self.current() {
            None => false,
            Some(spec) if spec.phase.accepts_input() => false,
            Some(spec) => match spec.exit {
                Exit::After(duration) => self.elapsed >= duration - TIME_EPSILON,
                Exit::Trigger => self.trigger_pending,
            },
        }
    }

    fn is_terminal(&self) -> bool {
        !self.plan.is_empty() && self.index == self.plan.len() - 1
    }

    pub fn advance(&mut self, dt: f64) -> Step {
        let dt = if dt.is_nan() || dt < 0.0 { 0.0 } else { dt };
        let mut step = Step::default();
        if self.is_done() {
            return step;
        }

        if self.exit_ready() {
            self.transition(self.index + 1, &mut step);
            return step;
        }

        self.elapsed += dt;

        match self.phase() {
            Phase::Idle | Phase::Interactive if self.resolve_pending => {
                self.transition(self.block_end(), &mut step);
                return step;
            }
            Phase::Interactive if self.holding => self.inactivity = 0.0,
            Phase::Interactive => {
                self.inactivity += dt;
                if let (Some(limit), Some(idle)) = (self.idle_after, self.index_of(Phase::Idle)) {
                    if self.inactivity >= limit {
                        self.transition(idle, &mut step);
                        return step;
                    }
                }
            }
            _ => {}
        }

        if self.is_terminal() && self.exit_ready() {
            self.transition(self.index + 1, &mut step);
        }
        step
    }

    fn go_to(&mut self, index: usize) {
        let mut step = Step::default();
        self.transition(index, &mut step);
    }

    fn transition(&mut self, index: usize, step: &mut Step) {
        let from = self.phase();
        if let Some(spec) = self.current() {
            let end = spec.easing.apply(1.0);
            let tracks = spec.tracks;
            self.settled.apply(&tracks, end);
        }
        if index >= self.block_end() {
            self.resolve_pending = false;
        }

        self.index = index.min(self.plan.len());
        self.elapsed = 0.0;
        self.inactivity = 0.0;
        self.trigger_pending = false;

        let to = self.phase();
        debug!(from = %from, to = %to, "phase transition");
        step.left = Some(from);
        step.entered = Some(to);
        if self.is_done() {
            step.finished = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_plan() -> Vec<PhaseSpec> {
        vec![
            PhaseSpec::timed(Phase::Intro, 1.2).eased(Easing::OutCubic).scale(0.0, 1.0),
            PhaseSpec::triggered(Phase::Idle),
            PhaseSpec::triggered(Phase::Interactive),
            PhaseSpec::timed(Phase::Resolving, 0.5),
            PhaseSpec::timed(Phase::OutroReturn, 0.5),
            PhaseSpec::timed(Phase::OutroShrink, 0.5).scale(1.0, 0.0),
            PhaseSpec::timed(Phase::Hold, 0.25),
            PhaseSpec::timed(Phase::Fade, 0.5).cover(0.0, 1.0),
        ]
    }

    fn run_until(seq: &mut Sequencer, phase: Phase, dt: f64) {
        for _ in 0..10_000 {
            if seq.phase() == phase {
                return;
            }
            seq.advance(dt);
        }
        panic!("never reached {phase}");
    }

    #[test]
    fn progress_is_monotonic_and_resets_on_entry() {
        let mut seq = Sequencer::new(standard_plan());
        seq.request_resolution();
        let mut last_phase = seq.phase();
        let mut last_progress = seq.progress();
        for _ in 0..1000 {
            let step = seq.advance(0.07);
            if let Some(entered) = step.entered {
                assert_ne!(entered, last_phase);
                if entered != Phase::Done && seq.current().is_some_and(|s| s.exit != Exit::After(0.0)) {
                    assert_eq!(seq.progress(), 0.0, "entered {entered}");
                }
                last_phase = entered;
            } else {
                assert!(seq.progress() >= last_progress);
            }
            last_progress = seq.progress();
        }
        assert!(seq.is_done());
    }

    #[test]
    fn interaction_toggles_idle_and_interactive() {
        let mut seq = Sequencer::new(standard_plan()).with_idle_after(Some(1.0));
        run_until(&mut seq, Phase::Idle, 0.1);
        assert!(seq.interact());
        assert_eq!(seq.phase(), Phase::Interactive);
        for _ in 0..9 {
            seq.advance(0.1);
        }
        assert_eq!(seq.phase(), Phase::Interactive);
        assert!(seq.interact(), "renewed interaction restarts the timer");
        for _ in 0..9 {
            seq.advance(0.1);
        }
        assert_eq!(seq.phase(), Phase::Interactive);
        let step = seq.advance(0.2);
        assert_eq!(step.entered, Some(Phase::Idle));
    }

    #[test]
    fn holding_keeps_interactive_awake() {
        let mut seq = Sequencer::new(standard_plan()).with_idle_after(Some(1.0));
        run_until(&mut seq, Phase::Idle, 0.1);
        seq.interact();
        seq.set_holding(true);
        for _ in 0..50 {
            assert_eq!(seq.advance(0.1).entered, None);
        }
        assert_eq!(seq.phase(), Phase::Interactive);
        assert_eq!(seq.inactivity(), 0.0);

        seq.set_holding(false);
        for _ in 0..9 {
            seq.advance(0.1);
        }
        assert_eq!(seq.phase(), Phase::Interactive);
        assert_eq!(seq.advance(0.2).entered, Some(Phase::Idle));
    }

    #[test]
    fn resolution_requested_mid_intro_waits_for_intro() {
        let mut seq = Sequencer::new(standard_plan());
        seq.advance(0.1);
        assert!(seq.request_resolution());
        for _ in 0..5 {
            seq.advance(0.1);
            assert_eq!(seq.phase(), Phase::Intro);
        }
        run_until(&mut seq, Phase::Resolving, 0.1);
        assert!(!seq.resolution_pending());
    }

    #[test]
    fn input_is_ignored_after_resolution() {
        let mut seq = Sequencer::new(standard_plan());
        seq.request_resolution();
        run_until(&mut seq, Phase::OutroReturn, 0.1);
        assert!(!seq.accepts_input());
        assert!(!seq.interact());
        assert!(!seq.request_resolution());
        assert_eq!(seq.phase(), Phase::OutroReturn);
    }

    #[test]
    fn parameters_follow_tracks_and_settle() {
        let mut seq = Sequencer::new(standard_plan());
        assert_eq!(seq.parameters().scale, 0.0);
        for _ in 0..6 {
            seq.advance(0.1);
        }
        let mid = seq.parameters().scale;
        assert!(mid > 0.5 && mid < 1.0, "ease-out is past halfway at t=0.5: {mid}");
        run_until(&mut seq, Phase::Idle, 0.1);
        assert_eq!(seq.parameters().scale, 1.0);
        seq.request_resolution();
        run_until(&mut seq, Phase::Hold, 0.1);
        assert_eq!(seq.parameters().scale, 0.0);
        assert_eq!(seq.parameters().cover, 0.0);
    }

    #[test]
    fn triggered_phase_waits_for_trigger() {
        let mut seq = Sequencer::new(vec![
            PhaseSpec::timed(Phase::Intro, 0.0),
            PhaseSpec::triggered(Phase::Resolving),
            PhaseSpec::timed(Phase::Fade, 0.1),
        ]);
        seq.advance(0.1);
        assert_eq!(seq.phase(), Phase::Resolving);
        for _ in 0..50 {
            seq.advance(0.1);
        }
        assert_eq!(seq.phase(), Phase::Resolving);
        assert!(seq.trigger());
        assert_eq!(seq.progress(), 1.0);
        seq.advance(0.1);
        assert_eq!(seq.phase(), Phase::Fade);
    }

    #[test]
    fn zero_duration_phases_complete_without_dividing_by_zero() {
        let mut seq = Sequencer::new(vec![
            PhaseSpec::timed(Phase::Intro, 0.0).scale(0.0, 1.0),
            PhaseSpec::timed(Phase::Fade, 0.0),
        ]);
        assert_eq!(seq.progress(), 1.0);
        assert!(seq.parameters().scale.is_finite());
        seq.advance(0.0);
        assert_eq!(seq.phase(), Phase::Fade);
        let step = seq.advance(0.0);
        assert!(step.finished);
    }

    #[test]
    fn invalid_dt_does_not_move_time() {
        let mut seq = Sequencer::new(standard_plan());
        seq.advance(f64::NAN);
        seq.advance(-1.0);
        assert_eq!(seq.elapsed(), 0.0);
    }
}
