//! Sketches: small numeral vignettes built on the engine.
//!
//! Each sketch owns all of its state. The host creates one with
//! `create_sketch`, feeds it pointer events and calls `update` once per
//! frame until `is_finished`, then drops it.

pub mod cards;
pub mod door;
pub mod knobs;
pub mod pendulum;
pub mod spin;

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_pcg::Pcg64;
use thiserror::Error;
use tracing::trace;

use crate::audio::{Cue, CueSink};
use crate::config::SketchConfig;
use crate::engine::{CompletionGate, Params, Phase};
use crate::types::{Color, Paint, PointerEvent, ResolvedScene, Shape, Size};

/// Z-order of the full-screen curtain drawn by the fade phase.
pub const COVER_LAYER: i32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SketchError {
    #[error("unknown sketch `{0}` (try `list`)")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SketchKind {
    Zero,
    One,
    Two,
    Three,
    Spin,
}

impl SketchKind {
    pub const ALL: [SketchKind; 5] = [
        SketchKind::Zero,
        SketchKind::One,
        SketchKind::Two,
        SketchKind::Three,
        SketchKind::Spin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SketchKind::Zero => "zero",
            SketchKind::One => "one",
            SketchKind::Two => "two",
            SketchKind::Three => "three",
            SketchKind::Spin => "spin",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SketchKind::Zero => "swing the pendulum all the way around",
            SketchKind::One => "find the one among four shuffled cards",
            SketchKind::Two => "turn both knobs until the picture is sharp",
            SketchKind::Three => "drag the door open",
            SketchKind::Spin => "drag sideways until the numeral stands upright",
        }
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SketchKind {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SketchKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || digit_alias(*kind) == Some(wanted.as_str()))
            .ok_or_else(|| SketchError::Unknown(s.to_string()))
    }
}

fn digit_alias(kind: SketchKind) -> Option<&'static str> {
    match kind {
        SketchKind::Zero => Some("0"),
        SketchKind::One => Some("1"),
        SketchKind::Two => Some("2"),
        SketchKind::Three => Some("3"),
        SketchKind::Spin => None,
    }
}

/// Per-frame drawing and audio context handed to `Sketch::update`.
pub struct Frame<'a> {
    pub size: Size,
    scene: ResolvedScene,
    cues: &'a mut dyn CueSink,
}

impl<'a> Frame<'a> {
    pub fn new(size: Size, cues: &'a mut dyn CueSink) -> Self {
        Self {
            size,
            scene: ResolvedScene::new(size),
            cues,
        }
    }

    pub fn draw(&mut self, shape: Shape, paint: Paint) {
        self.scene.push(shape, paint);
    }

    pub fn draw_layer(&mut self, shape: Shape, paint: Paint, z_order: i32) {
        self.scene.push_layer(shape, paint, z_order);
    }

    /// Play a cue. Failures are logged and otherwise ignored.
    pub fn cue(&mut self, cue: Cue) {
        if let Err(e) = self.cues.play(cue) {
            trace!(?cue, error = %e, "cue dropped");
        }
    }

    pub fn scene(&self) -> &ResolvedScene {
        &self.scene
    }
}

pub trait Sketch {
    fn kind(&self) -> SketchKind;

    /// Advance by `dt` seconds and draw the current state into `frame`.
    fn update(&mut self, dt: f64, frame: &mut Frame<'_>);

    fn pointer(&mut self, event: PointerEvent);

    fn phase(&self) -> Phase;

    fn is_finished(&self) -> bool;

    /// Explicit teardown. Dropping the sketch is equivalent.
    fn dispose(self: Box<Self>) {}
}

pub fn create_sketch(
    kind: SketchKind,
    config: &SketchConfig,
    size: Size,
    gate: CompletionGate,
) -> Box<dyn Sketch> {
    match kind {
        SketchKind::Zero => Box::new(pendulum::PendulumSketch::new(config, size, gate)),
        SketchKind::One => Box::new(cards::CardsSketch::new(config, size, gate)),
        SketchKind::Two => Box::new(knobs::KnobsSketch::new(config, size, gate)),
        SketchKind::Three => Box::new(door::DoorSketch::new(config, size, gate)),
        SketchKind::Spin => Box::new(spin::SpinSketch::new(config, size, gate)),
    }
}

pub(crate) fn seeded_rng(config: &SketchConfig) -> Pcg64 {
    match config.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    }
}

/// Cues raised by pointer handlers, flushed on the next update.
#[derive(Debug, Default)]
pub(crate) struct Outbox(Vec<Cue>);

impl Outbox {
    pub fn push(&mut self, cue: Cue) {
        self.0.push(cue);
    }

    pub fn flush(&mut self, frame: &mut Frame<'_>) {
        for cue in self.0.drain(..) {
            frame.cue(cue);
        }
    }
}

/// Draw the black curtain for the current `cover` parameter.
pub(crate) fn draw_cover(frame: &mut Frame<'_>, params: &Params) {
    if params.cover > 0.0 {
        frame.draw_layer(
            Shape::Fill,
            Paint::solid(Color::BLACK).with_alpha(params.cover),
            COVER_LAYER,
        );
    }
}
