//! "0": a pendulum swinging on an elliptical track.
//!
//! The bob leaves a trail while it swings freely. Swinging it all the way
//! round (or through every sector, depending on the configured trigger)
//! resolves the sketch: the bob springs back to rest, the zero shrinks away
//! and the screen fades out.

use std::f64::consts::TAU;

use crate::audio::Cue;
use crate::config::SketchConfig;
use crate::engine::drag::{hit_disc, unscaled_angle};
use crate::engine::math::shortest_angle_diff;
use crate::engine::trigger::ResolutionPredicate;
use crate::engine::{
    CompletionGate, DragSession, Easing, Lifecycle, Params, Pendulum, PendulumParams, Phase,
    PhaseSpec, Sequencer, Spring, SpringSettings, Step, TrailBuffer,
};
use crate::types::{Color, Paint, Point, PointerEvent, PointerKind, Shape, Size};

use super::{draw_cover, Frame, Outbox, Sketch, SketchKind};

/// Height over width of the track. 1.0 would be a circle.
const ZERO_ASPECT: f64 = 1.3;
const BOB_FACTOR: f64 = 0.025;
const LENGTH_FACTOR: f64 = 0.3;
/// Bobs smaller than this are unreadable on a character grid.
const MIN_BOB_RADIUS: f64 = 1.0;
const HIT_SLOP: f64 = 1.6;
const TRAIL_SPACING: f64 = 0.3;
const RETURN_TIMEOUT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    pivot: Point,
    length: f64,
    bob: Point,
    bob_radius: f64,
}

impl Geometry {
    fn scale_x() -> f64 {
        1.0 / ZERO_ASPECT
    }

    fn scale_y() -> f64 {
        ZERO_ASPECT
    }

    fn compute(size: Size, angle: f64, scale: f64) -> Self {
        let pivot = size.center();
        let length = size.height * LENGTH_FACTOR * scale;
        let bob_radius = (size.height * BOB_FACTOR).max(MIN_BOB_RADIUS) * scale;
        let bob = Point::new(
            pivot.x + angle.cos() * length * Self::scale_x(),
            pivot.y + angle.sin() * length * Self::scale_y(),
        );
        Self {
            pivot,
            length,
            bob,
            bob_radius,
        }
    }
}

pub struct PendulumSketch {
    lifecycle: Lifecycle,
    pendulum: Pendulum,
    trail: TrailBuffer,
    resolution: Box<dyn ResolutionPredicate>,
    homing: Spring,
    flick_strength: f64,
    geometry: Geometry,
    outbox: Outbox,
}

impl PendulumSketch {
    pub fn new(config: &SketchConfig, size: Size, gate: CompletionGate) -> Self {
        let plan = vec![
            PhaseSpec::timed(Phase::Intro, 1.2).eased(Easing::OutCubic).scale(0.0, 1.0),
            PhaseSpec::triggered(Phase::Idle),
            PhaseSpec::triggered(Phase::Interactive),
            PhaseSpec::timed(Phase::Resolving, 0.3),
            PhaseSpec::triggered(Phase::OutroReturn),
            PhaseSpec::timed(Phase::OutroShrink, 1.0).eased(Easing::InOutCubic).scale(1.0, 0.0),
            PhaseSpec::timed(Phase::Hold, 0.4),
            PhaseSpec::timed(Phase::Fade, 0.8).cover(0.0, 1.0),
        ];
        let sequencer = Sequencer::new(plan).with_idle_after(Some(config.idle_after));
        let pendulum = Pendulum::new(PendulumParams::default());
        let geometry = Geometry::compute(size, pendulum.angle, 0.0);

        Self {
            lifecycle: Lifecycle::new(sequencer, gate, config.max_dt),
            pendulum,
            trail: TrailBuffer::default(),
            resolution: config.resolution_trigger.build(),
            homing: Spring::new(0.0)
                .with_settings(SpringSettings::new(1.2, 0.12))
                .with_wrap(TAU),
            flick_strength: config.flick_strength,
            geometry,
            outbox: Outbox::default(),
        }
    }

    /// Length scale: zero from `Hold` on, whatever the tracks say.
    fn length_scale(phase: Phase, params: &Params) -> f64 {
        match phase {
            Phase::Hold | Phase::Fade | Phase::Done => 0.0,
            _ => params.scale,
        }
    }

    fn on_step(&mut self, step: Step) {
        match step.entered {
            Some(Phase::Resolving) => {
                self.pendulum.release(0.0);
                self.outbox.push(Cue::Resolved);
            }
            Some(Phase::OutroReturn) => {
                self.homing.target = self.pendulum.params.rest_angle;
                self.homing
                    .teleport(self.pendulum.angle, self.pendulum.angular_velocity);
            }
            Some(Phase::Hold) => self.trail.clear(),
            _ => {}
        }
    }

    fn simulate(&mut self, phase: Phase, dt: f64) {
        match phase {
            Phase::Idle | Phase::Interactive => {
                self.pendulum.integrate(dt, self.geometry.length);
                self.resolution.observe(self.pendulum.angle);
                if self.resolution.is_satisfied() {
                    self.lifecycle.sequencer_mut().request_resolution();
                }
            }
            Phase::OutroReturn => {
                self.homing.step(dt);
                self.pendulum.angle = self.homing.position;
                self.pendulum.angular_velocity = self.homing.velocity;
                let timed_out = self.lifecycle.sequencer().elapsed() >= RETURN_TIMEOUT;
                if self.homing.is_settled(0.01, 0.05) || timed_out {
                    self.homing.snap_to_target();
                    self.pendulum.angle = self.homing.position;
                    self.pendulum.angular_velocity = 0.0;
                    self.lifecycle.sequencer_mut().trigger();
                }
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame<'_>, params: &Params) {
        let geometry = &self.geometry;
        let white = Paint::solid(Color::WHITE);

        let trail_alpha = params.scale.clamp(0.0, 1.0);
        for points in self.trail.segments() {
            frame.draw(
                Shape::Polyline {
                    points,
                    width: geometry.bob_radius * 2.0,
                },
                white.clone().with_alpha(trail_alpha),
            );
        }

        if geometry.length > 0.0 {
            frame.draw_layer(
                Shape::Line {
                    from: geometry.pivot,
                    to: geometry.bob,
                    width: 1.0,
                },
                white.clone(),
                1,
            );
        }
        if geometry.bob_radius > 0.0 {
            frame.draw_layer(
                Shape::Disc {
                    center: geometry.bob,
                    radius: geometry.bob_radius,
                },
                white,
                2,
            );
            frame.draw_layer(
                Shape::Ring {
                    center: geometry.bob,
                    radius: geometry.bob_radius,
                    width: 1.0,
                },
                Paint::solid(Color::RED),
                3,
            );
        }
        draw_cover(frame, params);
    }
}

impl Sketch for PendulumSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Zero
    }

    fn update(&mut self, dt: f64, frame: &mut Frame<'_>) {
        let holding = self.pendulum.is_dragging();
        self.lifecycle.sequencer_mut().set_holding(holding);
        let tick = self.lifecycle.tick(dt);
        self.on_step(tick.step);
        self.outbox.flush(frame);

        let phase = self.lifecycle.phase();
        let params = self.lifecycle.params();
        let scale = Self::length_scale(phase, &params);

        self.geometry = Geometry::compute(frame.size, self.pendulum.angle, scale);
        self.simulate(phase, tick.dt);
        self.geometry = Geometry::compute(frame.size, self.pendulum.angle, scale);

        let records = matches!(
            phase,
            Phase::Idle | Phase::Interactive | Phase::Resolving | Phase::OutroReturn
        );
        if records && !self.pendulum.is_dragging() {
            let spacing = self.geometry.bob_radius * TRAIL_SPACING;
            self.trail.record(self.geometry.bob, spacing);
        }

        self.draw(frame, &params);
    }

    fn pointer(&mut self, event: PointerEvent) {
        let accepts_input = self.lifecycle.sequencer().accepts_input();
        let geometry = self.geometry;
        match event.kind {
            PointerKind::Down => {
                if !accepts_input {
                    return;
                }
                if hit_disc(event.position, geometry.bob, geometry.bob_radius * HIT_SLOP) {
                    let session = DragSession::new(event.position, self.pendulum.angle, event.time);
                    self.pendulum.grab(session);
                    self.lifecycle.sequencer_mut().interact();
                    self.outbox.push(Cue::Grab);
                }
            }
            PointerKind::Move => {
                if !self.pendulum.is_dragging() {
                    return;
                }
                let angle = unscaled_angle(
                    event.position,
                    geometry.pivot,
                    Geometry::scale_x(),
                    Geometry::scale_y(),
                );
                // Keep the angle continuous so rotation tracking sees the
                // real path rather than a jump at ±π.
                let angle = self.pendulum.angle + shortest_angle_diff(angle, self.pendulum.angle);
                self.pendulum.drag_to(angle, event.time);
                self.lifecycle.sequencer_mut().interact();
            }
            PointerKind::Up | PointerKind::Leave => {
                if self.pendulum.release(self.flick_strength) {
                    self.trail.push_break();
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
