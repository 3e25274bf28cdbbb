//! "2": bring a blurred numeral into focus with two concentric knobs.

use std::f64::consts::PI;

use rand::Rng;

use crate::audio::Cue;
use crate::config::SketchConfig;
use crate::engine::drag::hit_rotated_rect;
use crate::engine::math::{deg_to_rad, shortest_angle_diff};
use crate::engine::{
    CompletionGate, DragSession, DragState, Easing, Lifecycle, Params, Phase, PhaseSpec,
    Sequencer, Step,
};
use crate::types::{Color, Paint, Point, PointerEvent, PointerKind, Shape, Size};

use super::{draw_cover, seeded_rng, Frame, Outbox, Sketch, SketchKind};

const HALF_SPAN_DEG: f64 = 85.0;
const TARGET_MARGIN_DEG: f64 = 10.0;
const TOLERANCE_DEG: f64 = 2.0;
const TICK_EVERY_DEG: f64 = 3.0;
const MAX_BLUR: f64 = 100.0;
const MAX_ERROR: f64 = PI / 4.0;
const DRAG_POWER: f64 = 1.0;

/// Knob dimensions as fractions of the surface height.
#[derive(Debug, Clone, Copy, PartialEq)]
struct KnobStyle {
    radius: f64,
    stroke: f64,
    ticks: usize,
    handle_length: f64,
    handle_width: f64,
}

const SMALL: KnobStyle = KnobStyle {
    radius: 0.30,
    stroke: 0.09,
    ticks: 12,
    handle_length: 0.185,
    handle_width: 0.083,
};

const BIG: KnobStyle = KnobStyle {
    radius: 0.35,
    stroke: 0.09,
    ticks: 20,
    handle_length: 0.093,
    handle_width: 0.065,
};

#[derive(Debug, Clone)]
struct Knob {
    style: KnobStyle,
    angle: f64,
    min: f64,
    max: f64,
    target: f64,
    drag: DragState,
    last_tick: f64,
}

impl Knob {
    fn new(style: KnobStyle, center: f64, start_at_max: bool) -> Self {
        let half = deg_to_rad(HALF_SPAN_DEG);
        let (min, max) = (center - half, center + half);
        let angle = if start_at_max { max } else { min };
        Self {
            style,
            angle,
            min,
            max,
            target: center,
            drag: DragState::Idle,
            last_tick: angle,
        }
    }

    fn randomize_target(&mut self, rng: &mut impl Rng) {
        let margin = deg_to_rad(TARGET_MARGIN_DEG);
        self.target = rng.random_range(self.min + margin..self.max - margin);
    }

    fn error(&self) -> f64 {
        shortest_angle_diff(self.angle, self.target).abs()
    }

    fn turn(&mut self, delta: f64) {
        self.angle = (self.angle + delta * DRAG_POWER).clamp(self.min, self.max);
    }

    /// Handle rectangle in the knob's rotated frame, in surface units.
    fn handle_bounds(&self, height: f64) -> (Point, Point) {
        let base = (self.style.radius + self.style.stroke / 2.0) * height;
        let half_width = self.style.handle_width * height / 2.0;
        let length = self.style.handle_length * height;
        (
            Point::new(-half_width, -(base + length)),
            Point::new(half_width, -base),
        )
    }

    /// True once the knob has turned far enough for another detent.
    fn take_tick(&mut self) -> bool {
        if (self.angle - self.last_tick).abs() > deg_to_rad(TICK_EVERY_DEG) {
            self.last_tick = self.angle;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    center: Point,
    pivot: Point,
    height: f64,
}

impl Geometry {
    fn compute(size: Size, params: &Params) -> Self {
        let center = size.center();
        Self {
            center,
            pivot: center.offset(0.0, params.offset * size.height),
            height: size.height,
        }
    }

    fn pointer_angle(&self, point: Point) -> f64 {
        (point.y - self.pivot.y).atan2(point.x - self.pivot.x)
    }
}

pub struct KnobsSketch {
    lifecycle: Lifecycle,
    small: Knob,
    big: Knob,
    solved: bool,
    blur: f64,
    geometry: Geometry,
    outbox: Outbox,
}

impl KnobsSketch {
    pub fn new(config: &SketchConfig, size: Size, gate: CompletionGate) -> Self {
        let plan = vec![
            PhaseSpec::timed(Phase::Intro, 3.0).eased(Easing::SmoothStep).offset(-0.9, 0.0),
            PhaseSpec::triggered(Phase::Idle),
            PhaseSpec::triggered(Phase::Interactive),
            PhaseSpec::timed(Phase::Resolving, 0.8),
            PhaseSpec::timed(Phase::OutroReturn, 3.0).eased(Easing::InQuad).offset(0.0, 1.0),
            PhaseSpec::timed(Phase::Fade, 0.5).cover(0.0, 1.0),
        ];
        let sequencer = Sequencer::new(plan).with_idle_after(Some(config.idle_after));
        let lifecycle = Lifecycle::new(sequencer, gate, config.max_dt);

        let mut rng = seeded_rng(config);
        let mut small = Knob::new(SMALL, 0.0, false);
        let mut big = Knob::new(BIG, PI, true);
        small.randomize_target(&mut rng);
        big.randomize_target(&mut rng);

        let geometry = Geometry::compute(size, &lifecycle.params());
        Self {
            lifecycle,
            small,
            big,
            solved: false,
            blur: MAX_BLUR,
            geometry,
            outbox: Outbox::default(),
        }
    }

    fn on_step(&mut self, step: Step) {
        if step.entered == Some(Phase::Resolving) {
            self.outbox.push(Cue::Resolved);
        }
    }

    fn update_focus(&mut self) {
        if self.solved {
            self.blur = 0.0;
            return;
        }
        let norm_small = (self.small.error() / MAX_ERROR).min(1.0);
        let norm_big = (self.big.error() / MAX_ERROR).min(1.0);
        self.blur = (norm_small + norm_big) * 0.5 * MAX_BLUR;

        let tolerance = deg_to_rad(TOLERANCE_DEG);
        if self.lifecycle.sequencer().accepts_input()
            && self.small.error() < tolerance
            && self.big.error() < tolerance
        {
            self.solved = true;
            self.small.angle = self.small.target;
            self.big.angle = self.big.target;
            self.small.drag.end();
            self.big.drag.end();
            self.blur = 0.0;
            self.lifecycle.sequencer_mut().request_resolution();
        }
    }

    fn draw_knob(&self, frame: &mut Frame<'_>, knob: &Knob, z: i32) {
        let h = self.geometry.height;
        let pivot = self.geometry.pivot;
        let grey = Paint::solid(Color::GREY);
        let radius = knob.style.radius * h;
        let stroke = knob.style.stroke * h;

        frame.draw_layer(
            Shape::Ring {
                center: pivot,
                radius,
                width: stroke,
            },
            grey.clone(),
            z,
        );

        let outer = radius + stroke / 2.0;
        let inner = outer - stroke * 0.55;
        for i in 0..knob.style.ticks {
            let a = knob.angle + i as f64 / knob.style.ticks as f64 * 2.0 * PI;
            let along = Point::new(0.0, 1.0).rotated(a);
            frame.draw_layer(
                Shape::Line {
                    from: pivot.offset(along.x * inner, along.y * inner),
                    to: pivot.offset(along.x * outer, along.y * outer),
                    width: 0.6,
                },
                Paint::solid(Color::WHITE),
                z + 1,
            );
        }

        let (min, max) = knob.handle_bounds(h);
        let corners = [
            Point::new(min.x, min.y),
            Point::new(max.x, min.y),
            Point::new(max.x, max.y),
            Point::new(min.x, max.y),
        ];
        frame.draw_layer(
            Shape::Polygon {
                points: corners
                    .iter()
                    .map(|c| {
                        let p = c.rotated(knob.angle);
                        pivot.offset(p.x, p.y)
                    })
                    .collect(),
            },
            grey,
            z + 1,
        );
    }

    fn draw(&self, frame: &mut Frame<'_>, params: &Params) {
        let h = self.geometry.height;
        let inner_radius = (SMALL.radius - SMALL.stroke / 2.0) * h;
        frame.draw_layer(
            Shape::Disc {
                center: self.geometry.pivot,
                radius: inner_radius,
            },
            Paint::solid(Color::WHITE),
            0,
        );

        let focus = 1.0 - self.blur / MAX_BLUR;
        frame.draw_layer(
            Shape::Glyph {
                ch: '2',
                center: self.geometry.center,
                height: h * 0.4,
                angle: 0.0,
            },
            Paint::solid(Color::BLACK).with_alpha(0.15 + 0.85 * focus),
            1,
        );

        self.draw_knob(frame, &self.big, 2);
        self.draw_knob(frame, &self.small, 4);
        draw_cover(frame, params);
    }
}

impl Sketch for KnobsSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Two
    }

    fn update(&mut self, dt: f64, frame: &mut Frame<'_>) {
        let holding = self.small.drag.is_dragging() || self.big.drag.is_dragging();
        self.lifecycle.sequencer_mut().set_holding(holding);
        let tick = self.lifecycle.tick(dt);
        self.on_step(tick.step);

        self.update_focus();
        for knob in [&mut self.small, &mut self.big] {
            if knob.take_tick() {
                self.outbox.push(Cue::Tick);
            }
        }
        self.outbox.flush(frame);

        let params = self.lifecycle.params();
        self.geometry = Geometry::compute(frame.size, &params);
        self.draw(frame, &params);
    }

    fn pointer(&mut self, event: PointerEvent) {
        if !self.lifecycle.sequencer().accepts_input() || self.solved {
            if matches!(event.kind, PointerKind::Up | PointerKind::Leave) {
                self.small.drag.end();
                self.big.drag.end();
            }
            return;
        }
        let geometry = self.geometry;
        let angle = geometry.pointer_angle(event.position);
        match event.kind {
            PointerKind::Down => {
                let hit = |knob: &Knob| {
                    let (min, max) = knob.handle_bounds(geometry.height);
                    hit_rotated_rect(event.position, geometry.pivot, knob.angle, min, max)
                };
                // The big knob wins where the handles overlap.
                let knob = if hit(&self.big) {
                    &mut self.big
                } else if hit(&self.small) {
                    &mut self.small
                } else {
                    return;
                };
                knob.drag.begin(DragSession::new(event.position, angle, event.time));
                self.lifecycle.sequencer_mut().interact();
                self.outbox.push(Cue::Grab);
            }
            PointerKind::Move => {
                let mut moved = false;
                for knob in [&mut self.small, &mut self.big] {
                    if let Some(session) = knob.drag.session_mut() {
                        let delta = session.track_angle(angle, event.time);
                        knob.turn(delta);
                        moved = true;
                    }
                }
                if moved {
                    self.lifecycle.sequencer_mut().interact();
                }
            }
            PointerKind::Up | PointerKind::Leave => {
                let small = self.small.drag.end().is_some();
                let big = self.big.drag.end().is_some();
                if small || big {
                    self.outbox.push(Cue::Release);
                }
            }
        }
    }

    fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    fn is_finished(&self) -> bool {
        self.lifecycle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::audio::RecordingCues;

    const SIZE: Size = Size::new(120.0, 80.0);
    const DT: f64 = 1.0 / 60.0;

    fn sketch(seed: u64) -> KnobsSketch {
        let config = SketchConfig {
            seed: Some(seed),
            ..SketchConfig::default()
        };
        KnobsSketch::new(&config, SIZE, CompletionGate::detached())
    }

    fn run(sketch: &mut KnobsSketch, cues: &mut RecordingCues, seconds: f64) {
        for _ in 0..(seconds / DT).round() as usize {
            let mut frame = Frame::new(SIZE, cues);
            sketch.update(DT, &mut frame);
        }
    }

    /// Middle of a knob's handle when the knob sits at `angle`.
    fn handle_point(sketch: &KnobsSketch, style: KnobStyle, angle: f64) -> Point {
        let h = sketch.geometry.height;
        let distance = (style.radius + style.stroke / 2.0 + style.handle_length / 2.0) * h;
        let pointer = angle - FRAC_PI_2;
        sketch
            .geometry
            .pivot
            .offset(pointer.cos() * distance, pointer.sin() * distance)
    }

    /// Drag a knob from its current angle to `to` in small steps.
    fn turn_knob(sketch: &mut KnobsSketch, big: bool, to: f64, time: &mut f64) {
        let style = if big { BIG } else { SMALL };
        let from = if big { sketch.big.angle } else { sketch.small.angle };
        sketch.pointer(PointerEvent::new(
            PointerKind::Down,
            handle_point(sketch, style, from),
            *time,
        ));
        let steps = 40;
        for i in 1..=steps {
            *time += DT;
            let angle = from + (to - from) * i as f64 / steps as f64;
            let at = handle_point(sketch, style, angle);
            sketch.pointer(PointerEvent::new(PointerKind::Move, at, *time));
        }
        sketch.pointer(PointerEvent::new(PointerKind::Up, Point::default(), *time));
    }

    #[test]
    fn targets_stay_away_from_limits() {
        for seed in 0..50 {
            let s = sketch(seed);
            for knob in [&s.small, &s.big] {
                let margin = deg_to_rad(TARGET_MARGIN_DEG) - 1e-9;
                assert!(knob.target >= knob.min + margin && knob.target <= knob.max - margin);
            }
        }
    }

    #[test]
    fn blur_starts_high_and_falls_as_knobs_approach() {
        let mut s = sketch(11);
        let mut cues = RecordingCues::default();
        run(&mut s, &mut cues, 3.2);
        let before = s.blur;
        assert!(before > 0.0);

        let mut time = 10.0;
        let target = s.small.target;
        turn_knob(&mut s, false, target, &mut time);
        run(&mut s, &mut cues, 0.1);
        assert!(s.blur < before);
        assert!(cues.count(Cue::Tick) > 0);
    }

    #[test]
    fn knob_is_clamped_to_its_span() {
        let mut s = sketch(2);
        let mut cues = RecordingCues::default();
        run(&mut s, &mut cues, 3.2);
        let mut time = 10.0;
        let beyond = s.small.min - 0.5;
        turn_knob(&mut s, false, beyond, &mut time);
        assert!((s.small.angle - s.small.min).abs() < 1e-9);
    }

    #[test]
    fn solving_both_knobs_snaps_and_finishes() {
        let mut s = sketch(5);
        let mut cues = RecordingCues::default();
        run(&mut s, &mut cues, 3.2);
        assert!(s.lifecycle.sequencer().accepts_input());

        let mut time = 10.0;
        let (small_target, big_target) = (s.small.target, s.big.target);
        turn_knob(&mut s, false, small_target, &mut time);
        turn_knob(&mut s, true, big_target, &mut time);
        run(&mut s, &mut cues, 0.1);

        assert!(s.solved);
        assert_eq!(s.small.angle, small_target);
        assert_eq!(s.big.angle, big_target);
        assert_eq!(s.blur, 0.0);

        run(&mut s, &mut cues, 6.0);
        assert!(s.is_finished());
        assert_eq!(cues.count(Cue::Resolved), 1);
    }

    #[test]
    fn held_knob_stays_interactive() {
        let mut s = sketch(3);
        let mut cues = RecordingCues::default();
        run(&mut s, &mut cues, 3.2);

        let at = handle_point(&s, BIG, s.big.angle);
        s.pointer(PointerEvent::new(PointerKind::Down, at, 10.0));
        run(&mut s, &mut cues, 2.0);
        assert!(s.big.drag.is_dragging());
        assert_eq!(s.phase(), Phase::Interactive);

        s.pointer(PointerEvent::new(PointerKind::Up, at, 12.0));
        run(&mut s, &mut cues, 2.0);
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn input_during_intro_is_ignored() {
        let mut s = sketch(9);
        let mut cues = RecordingCues::default();
        run(&mut s, &mut cues, 1.0);
        let start = s.small.angle;
        let mut time = 1.0;
        turn_knob(&mut s, false, start + 0.5, &mut time);
        assert_eq!(s.small.angle, start);
    }
}
