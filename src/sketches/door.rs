//! "3": a door in a lit room. Drag it open and walk through.

use crate::audio::Cue;
use crate::config::SketchConfig;
use crate::engine::math::clamp01;
use crate::engine::{
    CompletionGate, DragSession, DragState, Easing, Lifecycle, Params, Phase, PhaseSpec,
    Sequencer, Step,
};
use crate::types::{Color, Paint, Point, PointerEvent, PointerKind, Shape, Size};

use super::{Frame, Outbox, Sketch, SketchKind, COVER_LAYER};

const OPEN_SPEED: f64 = 4.0;
const STAY_OPEN_ABOVE: f64 = 0.5;
const OPEN_CUE_AT: f64 = 0.05;
const CLOSED_BELOW: f64 = 0.01;
const ROOM_ZOOM: f64 = 10.0;
const DROP_DISTANCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    size: Size,
    room_origin: Point,
    room: Size,
    door: Size,
    door_center_y: f64,
}

impl Geometry {
    fn compute(size: Size, zoom: f64) -> Self {
        let room = Size::new(size.width * 0.2 * zoom, size.height * 0.6 * zoom);
        let room_origin = Point::new((size.width - room.width) / 2.0, (size.height - room.height) / 2.0);
        let door = Size::new(room.width / zoom, room.height / zoom);
        Self {
            size,
            room_origin,
            room,
            door,
            door_center_y: room_origin.y + door.height / 2.0,
        }
    }

    fn contains_door(&self, point: Point) -> bool {
        let left = self.room_origin.x;
        let top = self.room_origin.y;
        point.x >= left
            && point.x <= left + self.door.width
            && point.y >= top
            && point.y <= top + self.door.height
    }
}

/// Prefix of the closed polyline through `points` covering `t` of its
/// perimeter.
fn partial_outline(points: &[Point], t: f64) -> Vec<Point> {
    let t = clamp01(t);
    if points.len() < 2 || t <= 0.0 {
        return Vec::new();
    }
    let n = points.len();
    let perimeter: f64 = (0..n).map(|i| points[i].distance(points[(i + 1) % n])).sum();
    let mut remaining = perimeter * t;
    let mut out = vec![points[0]];
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let length = a.distance(b);
        if length <= remaining {
            out.push(b);
            remaining -= length;
        } else {
            if length > 0.0 {
                let r = remaining / length;
                out.push(Point::new(a.x + (b.x - a.x) * r, a.y + (b.y - a.y) * r));
            }
            break;
        }
    }
    out
}

pub struct DoorSketch {
    lifecycle: Lifecycle,
    progress: f64,
    stays_open: bool,
    drag: DragState,
    last_progress: f64,
    open_cue_played: bool,
    close_cue_pending: bool,
    geometry: Geometry,
    outbox: Outbox,
}

impl DoorSketch {
    pub fn new(config: &SketchConfig, size: Size, gate: CompletionGate) -> Self {
        let plan = vec![
            PhaseSpec::timed(Phase::Intro, 5.0),
            PhaseSpec::triggered(Phase::Idle),
            PhaseSpec::triggered(Phase::Interactive),
            PhaseSpec::timed(Phase::OutroReturn, 1.25).scale(1.0, 1.0 + ROOM_ZOOM),
            PhaseSpec::timed(Phase::OutroShrink, 1.0)
                .eased(Easing::InQuad)
                .offset(0.0, DROP_DISTANCE),
            PhaseSpec::timed(Phase::Fade, 1.0).cover(0.0, 1.0),
        ];
        let sequencer = Sequencer::new(plan).with_idle_after(Some(config.idle_after));
        Self {
            lifecycle: Lifecycle::new(sequencer, gate, config.max_dt),
            progress: 0.0,
            stays_open: false,
            drag: DragState::Idle,
            last_progress: 0.0,
            open_cue_played: false,
            close_cue_pending: false,
            geometry: Geometry::compute(size, 1.0),
            outbox: Outbox::default(),
        }
    }

    fn intro_progress(&self) -> f64 {
        match self.lifecycle.phase() {
            Phase::Intro => self.lifecycle.sequencer().progress(),
            _ => 1.0,
        }
    }

    fn on_step(&mut self, step: Step) {
        if step.entered == Some(Phase::OutroReturn) {
            self.drag.end();
            self.outbox.push(Cue::Resolved);
        }
    }

    /// Swing towards fully open or shut once the door is let go.
    fn settle_door(&mut self, dt: f64) {
        if self.drag.is_dragging() {
            return;
        }
        let target = if self.stays_open { 1.0 } else { 0.0 };
        let before = self.progress;
        if self.progress < target {
            self.progress = (self.progress + OPEN_SPEED * dt).min(target);
        } else if self.progress > target {
            self.progress = (self.progress - OPEN_SPEED * dt).max(target);
        }
        if self.close_cue_pending && before > CLOSED_BELOW && self.progress <= CLOSED_BELOW {
            self.close_cue_pending = false;
            self.outbox.push(Cue::Close);
        }
        if self.progress >= target {
            self.drag.settle();
        }
    }

    fn draw(&self, frame: &mut Frame<'_>, params: &Params) {
        let g = &self.geometry;
        let intro = self.intro_progress();

        let room_alpha = clamp01((intro - 0.2) / 0.8);
        if room_alpha > 0.0 {
            frame.draw_layer(
                Shape::Rect {
                    origin: g.room_origin,
                    size: g.room,
                },
                Paint::solid(Color::WHITE).with_alpha(room_alpha),
                0,
            );
        }

        let text_alpha = clamp01((intro - 0.5) / 0.5);
        if text_alpha > 0.0 {
            let center = g.size.center();
            frame.draw_layer(
                Shape::Glyph {
                    ch: '3',
                    center: center.offset(0.0, params.offset * g.size.height),
                    height: g.room.height * 0.4,
                    angle: 0.0,
                },
                Paint::solid(Color::BLACK).with_alpha(text_alpha),
                1,
            );
        }

        self.draw_door(frame, intro);

        if params.cover > 0.0 {
            let h = g.size.height;
            frame.draw_layer(
                Shape::Rect {
                    origin: Point::new(0.0, -h + params.cover * h),
                    size: g.size,
                },
                Paint::solid(Color::BLACK),
                COVER_LAYER,
            );
        }
    }

    fn draw_door(&self, frame: &mut Frame<'_>, intro: f64) {
        let g = &self.geometry;
        let opacity = match self.lifecycle.phase() {
            Phase::OutroReturn => 1.0 - self.lifecycle.sequencer().progress() / 0.3,
            Phase::OutroShrink | Phase::Fade | Phase::Done => 0.0,
            _ => 1.0,
        };
        if opacity <= 0.0 {
            return;
        }

        let (w, h) = (g.door.width, g.door.height);
        let squash = 1.0 - self.progress;
        let perspective = self.progress * w * 0.3;
        let place = |x: f64, y: f64| Point::new(g.room_origin.x + x * squash, g.door_center_y + y);
        let outline = vec![
            place(0.0, -h / 2.0),
            place(w + perspective, -h / 2.0 - perspective * 0.5),
            place(w + perspective, h / 2.0 + perspective * 0.5),
            place(0.0, h / 2.0),
        ];

        frame.draw_layer(
            Shape::Polygon {
                points: outline.clone(),
            },
            Paint::solid(Color::BLACK).with_alpha(opacity),
            2,
        );

        let stroke = (intro / 0.8).min(1.0);
        let white = Paint::solid(Color::WHITE).with_alpha(opacity);
        frame.draw_layer(
            Shape::Polyline {
                points: partial_outline(&outline, stroke),
                width: 1.0,
            },
            white.clone(),
            3,
        );

        let radius = (w * 0.05).max(0.6);
        let knob: Vec<Point> = (0..40)
            .map(|i| {
                let a = i as f64 / 40.0 * std::f64::consts::TAU;
                place(w * 0.8 + a.cos() * radius, a.sin() * radius)
            })
            .collect();
        frame.draw_layer(
            Shape::Polyline {
                points: partial_outline(&knob, stroke),
                width: 0.8,
            },
            white,
            3,
        );
    }
}

impl Sketch for DoorSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Three
    }

    fn update(&mut self, dt: f64, frame: &mut Frame<'_>) {
        let holding = self.drag.is_dragging();
        self.lifecycle.sequencer_mut().set_holding(holding);
        let tick = self.lifecycle.tick(dt);
        self.on_step(tick.step);

        if self.lifecycle.sequencer().accepts_input() {
            self.settle_door(tick.dt);
            if self.progress >= 1.0 {
                self.lifecycle.sequencer_mut().request_resolution();
            }
        }
        self.outbox.flush(frame);

        let params = self.lifecycle.params();
        self.geometry = Geometry::compute(frame.size, params.scale);
        self.draw(frame, &params);
    }

    fn pointer(&mut self, event: PointerEvent) {
        let accepts_input = self.lifecycle.sequencer().accepts_input();
        match event.kind {
            PointerKind::Down => {
                if !accepts_input || !self.geometry.contains_door(event.position) {
                    return;
                }
                let session = DragSession::new(event.position, event.position.x, event.time)
                    .with_anchor(self.progress);
                self.drag.begin(session);
                self.open_cue_played = false;
                self.close_cue_pending = false;
                self.last_progress = self.progress;
                self.lifecycle.sequencer_mut().interact();
            }
            PointerKind::Move => {
                let Some(session) = self.drag.session_mut() else {
                    return;
                };
                session.track_linear(event.position.x, event.time);
                let dx = event.position.x - session.start.x;
                let width = self.geometry.door.width.max(f64::EPSILON);
                self.progress = clamp01(session.anchor - dx / width);

                if !self.open_cue_played
                    && self.last_progress <= OPEN_CUE_AT
                    && self.progress > OPEN_CUE_AT
                {
                    self.open_cue_played = true;
                    self.outbox.push(Cue::Open);
                }
                self.last_progress = self.progress;
                self.lifecycle.sequencer_mut().interact();
            }
            PointerKind::Up | PointerKind::Leave => {
                if self.drag.end().is_none() {
                    return;
                }
                self.stays_open = self.progress > STAY_OPEN_ABOVE;
                if !self.stays_open && self.progress > CLOSED_BELOW {
                    self.close_cue_pending = true;
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
