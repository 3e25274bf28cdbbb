//! Headless playback with a scripted pointer and a fixed frame step.
//!
//! The simulator runs the same update → rasterize path as the terminal
//! player, without a terminal. It records when each phase was entered,
//! every cue played and how often the completion gate fired.

use std::cell::Cell as Counter;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::audio::{Cue, CueSink, RecordingCues};
use crate::config::SketchConfig;
use crate::engine::{CompletionGate, Phase};
use crate::renderer::Renderer;
use crate::sketches::{create_sketch, Frame, Sketch, SketchKind};
use crate::types::{Point, PointerEvent, PointerKind, Size, TerminalContract};

/// Pointer events ordered by time.
#[derive(Debug, Clone, Default)]
pub struct Script {
    events: Vec<PointerEvent>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(mut self, time: f64, at: Point) -> Self {
        self.push(PointerKind::Down, time, at);
        self
    }

    pub fn release(mut self, time: f64, at: Point) -> Self {
        self.push(PointerKind::Up, time, at);
        self
    }

    /// Press at `path(0)`, follow `path` over `duration` seconds in `steps`
    /// moves, and release unless `hold` is set.
    pub fn drag(
        mut self,
        start: f64,
        duration: f64,
        steps: usize,
        hold: bool,
        path: impl Fn(f64) -> Point,
    ) -> Self {
        let steps = steps.max(1);
        self.push(PointerKind::Down, start, path(0.0));
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            self.push(PointerKind::Move, start + duration * t, path(t));
        }
        if !hold {
            self.push(PointerKind::Up, start + duration, path(1.0));
        }
        self
    }

    fn push(&mut self, kind: PointerKind, time: f64, at: Point) {
        let index = self.events.partition_point(|e| e.time <= time);
        self.events.insert(index, PointerEvent::new(kind, at, time));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// A gesture that plays the sketch through on a surface of `size`.
    pub fn demo(kind: SketchKind, size: Size) -> Self {
        let (w, h) = (size.width, size.height);
        let center = size.center();
        match kind {
            SketchKind::Zero => {
                // Walk the bob one and a quarter times round its ellipse.
                let length = h * 0.3;
                Script::new().drag(2.0, 2.5, 150, false, move |t| {
                    let angle = FRAC_PI_2 + t * 1.25 * TAU;
                    center.offset(angle.cos() * length / 1.3, angle.sin() * length * 1.3)
                })
            }
            SketchKind::One => {
                let spacing = w * 0.16 * 1.08;
                let card = |i: usize| {
                    Point::new(center.x + (i as f64 - 1.5) * spacing, center.y + h * 0.03)
                };
                let pairs = [(0, 1), (2, 3), (1, 2), (0, 3), (0, 2), (1, 3)];
                pairs
                    .iter()
                    .enumerate()
                    .fold(Script::new(), |script, (round, &(a, b))| {
                        let t = 9.0 + round as f64 * 5.0;
                        script
                            .press(t, card(a))
                            .release(t + 0.1, card(a))
                            .press(t + 0.3, card(b))
                            .release(t + 0.4, card(b))
                    })
            }
            SketchKind::Two => {
                // Swing the big knob's handle back and forth below the pivot.
                let distance = (0.35 + 0.045 + 0.0465) * h;
                Script::new().drag(3.5, 4.0, 200, false, move |t| {
                    let angle = FRAC_PI_2 + (t * TAU).sin() * 1.2;
                    center.offset(angle.cos() * distance, angle.sin() * distance)
                })
            }
            SketchKind::Three => Script::new().drag(5.5, 0.5, 20, false, move |t| {
                center.offset(-w * 0.16 * t, 0.0)
            }),
            SketchKind::Spin => Script::new().drag(1.5, 0.5, 20, true, move |t| {
                Point::new(w * (0.25 + 0.5 * t), center.y)
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseMark {
    pub time: f64,
    pub phase: Phase,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub kind: SketchKind,
    pub timeline: Vec<PhaseMark>,
    pub elapsed: f64,
    pub frames: u64,
    pub finished: bool,
    pub gate_fired: u32,
    pub cues: Vec<Cue>,
    /// Characters of the last rasterized frame, one string per row.
    pub snapshot: Vec<String>,
}

impl Report {
    pub fn entered(&self, phase: Phase) -> Option<f64> {
        self.timeline
            .iter()
            .find(|mark| mark.phase == phase)
            .map(|mark| mark.time)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.kind)?;
        for mark in &self.timeline {
            writeln!(f, "  {:>8.3}s  {}", mark.time, mark.phase)?;
        }
        if self.finished {
            writeln!(
                f,
                "finished after {:.3}s ({} frames)",
                self.elapsed, self.frames
            )?;
        } else {
            let phase = self.timeline.last().map_or(Phase::Intro, |m| m.phase);
            writeln!(
                f,
                "still in {} after {:.3}s ({} frames)",
                phase, self.elapsed, self.frames
            )?;
        }
        writeln!(
            f,
            "completion fired {} time(s), {} cue(s)",
            self.gate_fired,
            self.cues.len()
        )
    }
}

pub struct Simulator {
    kind: SketchKind,
    sketch: Box<dyn Sketch>,
    contract: TerminalContract,
    cues: RecordingCues,
    /// Replaces the recorder when set; the report then lists no cues.
    sink: Option<Box<dyn CueSink>>,
    script: Script,
    next_event: usize,
    dt: f64,
    time: f64,
    frames: u64,
    timeline: Vec<PhaseMark>,
    fired: Rc<Counter<u32>>,
}

impl Simulator {
    pub fn new(
        kind: SketchKind,
        config: &SketchConfig,
        contract: TerminalContract,
        dt: f64,
    ) -> Self {
        let fired = Rc::new(Counter::new(0));
        let counter = Rc::clone(&fired);
        let gate = CompletionGate::new(move || counter.set(counter.get() + 1));
        let size = contract.surface_size();
        let sketch = create_sketch(kind, config, size, gate);
        let timeline = vec![PhaseMark {
            time: 0.0,
            phase: sketch.phase(),
        }];
        Self {
            kind,
            sketch,
            contract,
            cues: RecordingCues::default(),
            sink: None,
            script: Script::demo(kind, size),
            next_event: 0,
            dt,
            time: 0.0,
            frames: 0,
            timeline,
            fired,
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self.next_event = 0;
        self
    }

    /// Send cues to `sink` instead of recording them.
    pub fn with_sink(mut self, sink: Box<dyn CueSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run frames until the sketch finishes or `seconds` of simulated time
    /// have passed.
    pub fn run(mut self, seconds: f64) -> Report {
        let frames = (seconds / self.dt).ceil().max(0.0) as u64;
        let mut snapshot = Vec::new();
        for _ in 0..frames {
            if self.sketch.is_finished() {
                break;
            }
            snapshot = self.step();
        }
        debug!(sketch = %self.kind, frames = self.frames, "simulation done");
        Report {
            kind: self.kind,
            timeline: self.timeline,
            elapsed: self.time,
            frames: self.frames,
            finished: self.sketch.is_finished(),
            gate_fired: self.fired.get(),
            cues: self.cues.played,
            snapshot,
        }
    }

    fn step(&mut self) -> Vec<String> {
        while let Some(event) = self.script.events.get(self.next_event) {
            if event.time > self.time {
                break;
            }
            self.sketch.pointer(*event);
            self.next_event += 1;
        }

        self.time += self.dt;
        self.frames += 1;
        let sink: &mut dyn CueSink = match self.sink.as_deref_mut() {
            Some(sink) => sink,
            None => &mut self.cues,
        };
        let mut frame = Frame::new(self.contract.surface_size(), sink);
        self.sketch.update(self.dt, &mut frame);
        let grid = Renderer::rasterize(frame.scene(), &self.contract);

        let phase = self.sketch.phase();
        if self.timeline.last().map(|m| m.phase) != Some(phase) {
            self.timeline.push(PhaseMark {
                time: self.time,
                phase,
            });
        }
        grid.iter()
            .map(|row| row.iter().map(|cell| cell.ch).collect())
            .collect()
    }
}
