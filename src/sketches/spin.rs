//! A spinning "2". Drag sideways to turn it upright, then it drops away.
//!
//! Horizontal pointer travel maps onto a wrap-around rotation spring: a
//! full surface width is one turn. Once the numeral rests upright the
//! sketch resolves and the glyph falls off the bottom edge while still
//! spinning.

use crate::audio::Cue;
use crate::config::SketchConfig;
use crate::engine::math::{deg_to_rad, delta_angle_deg, map};
use crate::engine::{
    CompletionGate, Lifecycle, Params, Phase, PhaseSpec, Sequencer, Spring, SpringSettings, Step,
};
use crate::types::{Color, Paint, PointerEvent, PointerKind, Shape, Size};

use super::{draw_cover, Frame, Outbox, Sketch, SketchKind};

const START_ANGLE: f64 = 180.0;
const UPRIGHT_TOLERANCE: f64 = 5.0;
const REST_SPEED: f64 = 10.0;
const ROTATION: SpringSettings = SpringSettings::new(0.5, 0.805);
const DROP_IN: SpringSettings = SpringSettings::new(1.5, 0.05);
const SWELL: SpringSettings = SpringSettings::new(1.5, 0.1);
const FALLING_SCALE: f64 = 1.2;
/// Angular push while falling, in degrees per second squared.
const SPIN_FORCE: f64 = 200.0;
const SPIN_DRAG: f64 = 0.1;
/// Surface heights per second squared.
const GRAVITY: f64 = 3.0;
const GLYPH_HEIGHT: f64 = 0.6;

/// Vertical offsets are stored in surface heights so a resize keeps the
/// animation where it was.
#[derive(Debug, Clone, PartialEq)]
struct Fall {
    position: f64,
    velocity: f64,
    spin: f64,
}

impl Fall {
    fn step(&mut self, angle: &mut f64, dt: f64) {
        if self.spin != 0.0 {
            self.spin += SPIN_FORCE * self.spin.signum() * dt;
        }
        self.spin *= (-dt * SPIN_DRAG).exp();
        *angle += self.spin * dt;
        self.velocity += GRAVITY * dt;
        self.position += self.velocity * dt;
    }

    fn is_off_surface(&self) -> bool {
        self.position > 1.0
    }
}

pub struct SpinSketch {
    lifecycle: Lifecycle,
    rotation: Spring,
    drop_in: Spring,
    swell: Spring,
    press_x: Option<f64>,
    pointer_x: f64,
    pressed: bool,
    fall: Option<Fall>,
    size: Size,
    outbox: Outbox,
}

impl SpinSketch {
    pub fn new(config: &SketchConfig, size: Size, gate: CompletionGate) -> Self {
        let plan = vec![
            PhaseSpec::timed(Phase::Intro, 1.0),
            PhaseSpec::triggered(Phase::Idle),
            PhaseSpec::triggered(Phase::Interactive),
            PhaseSpec::triggered(Phase::Resolving),
            PhaseSpec::timed(Phase::Fade, 0.6).cover(0.0, 1.0),
        ];
        let sequencer = Sequencer::new(plan).with_idle_after(None);
        Self {
            lifecycle: Lifecycle::new(sequencer, gate, config.max_dt),
            rotation: Spring::new(START_ANGLE)
                .with_settings(ROTATION)
                .with_wrap(360.0),
            drop_in: Spring::new(-1.0).with_settings(DROP_IN).with_target(0.0),
            swell: Spring::new(1.0).with_settings(SWELL),
            press_x: None,
            pointer_x: 0.0,
            pressed: false,
            fall: None,
            size,
            outbox: Outbox::default(),
        }
    }

    fn on_step(&mut self, step: Step) {
        if step.entered == Some(Phase::Resolving) {
            self.fall = Some(Fall {
                position: 0.0,
                velocity: 0.0,
                spin: self.rotation.velocity,
            });
            self.swell.target = FALLING_SCALE;
            self.outbox.push(Cue::Resolved);
        }
    }

    fn is_upright(&self) -> bool {
        delta_angle_deg(self.rotation.position, 0.0).abs() < UPRIGHT_TOLERANCE
            && self.rotation.velocity.abs() < REST_SPEED
    }

    fn simulate(&mut self, dt: f64) {
        self.drop_in.step(dt);
        self.swell.step(dt);

        match self.lifecycle.phase() {
            Phase::Interactive => {
                if let Some(press_x) = self.press_x {
                    let turn = map(self.pointer_x - press_x, 0.0, self.size.width, 0.0, 360.0);
                    self.rotation.target = turn + START_ANGLE;
                }
                self.rotation.step(dt);
                if self.is_upright() {
                    self.lifecycle.sequencer_mut().request_resolution();
                }
            }
            Phase::Resolving => {
                if let Some(fall) = self.fall.as_mut() {
                    fall.step(&mut self.rotation.position, dt);
                    if fall.is_off_surface() {
                        self.lifecycle.sequencer_mut().trigger();
                    }
                }
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame<'_>, params: &Params) {
        let h = self.size.height;
        let fallen = self.fall.as_ref().map_or(0.0, |f| f.position);
        let center = self
            .size
            .center()
            .offset(0.0, (self.drop_in.position + fallen) * h);
        frame.draw(
            Shape::Glyph {
                ch: '2',
                center,
                height: h * GLYPH_HEIGHT * self.swell.position,
                angle: deg_to_rad(self.rotation.position),
            },
            Paint::solid(Color::WHITE).with_alpha(params.opacity),
        );
        draw_cover(frame, params);
    }
}

impl Sketch for SpinSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Spin
    }

    fn update(&mut self, dt: f64, frame: &mut Frame<'_>) {
        let tick = self.lifecycle.tick(dt);
        self.on_step(tick.step);
        self.simulate(tick.dt);
        self.outbox.flush(frame);

        self.size = frame.size;
        let params = self.lifecycle.params();
        self.draw(frame, &params);
    }

    fn pointer(&mut self, event: PointerEvent) {
        if !self.lifecycle.sequencer().accepts_input() {
            return;
        }
        match event.kind {
            PointerKind::Down => {
                if self.press_x.is_none() {
                    self.press_x = Some(event.position.x);
                    self.lifecycle.sequencer_mut().interact();
                }
                self.pointer_x = event.position.x;
                self.pressed = true;
                self.outbox.push(Cue::Grab);
            }
            PointerKind::Move => {
                if self.press_x.is_some() {
                    self.pointer_x = event.position.x;
                }
            }
            PointerKind::Up | PointerKind::Leave => {
                if std::mem::take(&mut self.pressed) {
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
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::RecordingCues;
    use crate::types::Point;

    const SIZE: Size = Size::new(100.0, 60.0);
    const DT: f64 = 1.0 / 60.0;

    fn run(sketch: &mut SpinSketch, cues: &mut RecordingCues, seconds: f64) {
        for _ in 0..(seconds / DT).round() as usize {
            let mut frame = Frame::new(SIZE, cues);
            sketch.update(DT, &mut frame);
        }
    }

    fn at(kind: PointerKind, x: f64) -> PointerEvent {
        PointerEvent::new(kind, Point::new(x, 30.0), 0.0)
    }

    #[test]
    fn waits_upside_down_for_first_press() {
        let mut sketch = SpinSketch::new(&SketchConfig::default(), SIZE, CompletionGate::detached());
        let mut cues = RecordingCues::default();
        run(&mut sketch, &mut cues, 3.0);
        assert_eq!(sketch.phase(), Phase::Idle);
        assert_eq!(sketch.rotation.position, START_ANGLE);
        assert!(sketch.drop_in.position.abs() < 0.01);
    }

    #[test]
    fn press_during_intro_is_ignored() {
        let mut sketch = SpinSketch::new(&SketchConfig::default(), SIZE, CompletionGate::detached());
        let mut cues = RecordingCues::default();
        run(&mut sketch, &mut cues, 0.5);
        sketch.pointer(at(PointerKind::Down, 20.0));
        assert_eq!(sketch.press_x, None);
        run(&mut sketch, &mut cues, 1.0);
        assert_eq!(sketch.phase(), Phase::Idle);
        assert_eq!(cues.count(Cue::Grab), 0);
    }

    #[test]
    fn press_without_travel_stays_upside_down() {
        let mut sketch = SpinSketch::new(&SketchConfig::default(), SIZE, CompletionGate::detached());
        let mut cues = RecordingCues::default();
        run(&mut sketch, &mut cues, 1.2);
        sketch.pointer(at(PointerKind::Down, 20.0));
        run(&mut sketch, &mut cues, 5.0);
        assert_eq!(sketch.phase(), Phase::Interactive);
        assert!((sketch.rotation.position - START_ANGLE).abs() < 1e-9);
    }

    #[test]
    fn half_width_drag_turns_upright_and_falls_away() {
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let gate = CompletionGate::new(move || counter.set(counter.get() + 1));
        let mut sketch = SpinSketch::new(&SketchConfig::default(), SIZE, gate);
        let mut cues = RecordingCues::default();
        run(&mut sketch, &mut cues, 1.2);

        sketch.pointer(at(PointerKind::Down, 20.0));
        sketch.pointer(at(PointerKind::Move, 70.0));
        run(&mut sketch, &mut cues, 0.1);
        assert_eq!(sketch.phase(), Phase::Interactive);
        assert!((sketch.rotation.target - 360.0).abs() < 1e-9);

        run(&mut sketch, &mut cues, 15.0);
        assert!(sketch.is_finished());
        assert_eq!(fired.get(), 1);
        assert_eq!(cues.count(Cue::Resolved), 1);
        assert!(sketch.fall.as_ref().is_some_and(Fall::is_off_surface));
    }

    #[test]
    fn fall_keeps_spinning_in_the_same_direction() {
        let mut fall = Fall {
            position: 0.0,
            velocity: 0.0,
            spin: -1.0,
        };
        let mut angle = 0.0;
        for _ in 0..60 {
            fall.step(&mut angle, DT);
        }
        assert!(fall.spin < -100.0);
        assert!(angle < 0.0);
        assert!((fall.position - 1.5).abs() < 0.05);
    }
}
