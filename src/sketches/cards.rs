//! "1": find the one among four cards.
//!
//! The cards drop in, the winning "1" is shown and hidden again, then the
//! deck is shuffled. Picking a pair resolves a round; the first round never
//! wins. A lost pair falls away, fresh cards come down and the deck is
//! reshuffled with new values. Picking the "1" zooms it up and ends the
//! sketch.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64;
use tracing::debug;

use crate::audio::Cue;
use crate::config::SketchConfig;
use crate::engine::drag::hit_rotated_rect;
use crate::engine::math::approach;
use crate::engine::{
    CompletionGate, Easing, Lifecycle, Params, Phase, PhaseSpec, Schedule, Sequencer, Spring,
    SpringSettings,
};
use crate::types::{Color, Paint, Point, PointerEvent, PointerKind, Shape, Size};

use super::{draw_cover, seeded_rng, Frame, Outbox, Sketch, SketchKind};

const CARD_COUNT: usize = 4;
const WIN_VALUE: u8 = 1;
const WIN_SCALE: f64 = 1.8;
/// Per-frame smoothing towards the target position, at 60 fps.
const FOLLOW_RATE: f64 = 0.18;
const FLIP: SpringSettings = SpringSettings::new(2.0, 0.25);

const DROP_DELAY: f64 = 0.25;
const DROP_TIME: f64 = 0.7;
const REVEAL_DELAY: f64 = 0.3;
const FACE_TIME: f64 = 0.9;
const HIDE_TO_SHUFFLE: f64 = 0.4;
const PAIR_DELAY: f64 = 0.9;
const LOSE_DROP_TIME: f64 = 0.6;
const NEW_CARD_IN_TIME: f64 = 0.6;
const PAUSE_BEFORE_SHUFFLE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Beat {
    Drop(usize),
    RevealWinner,
    HideWinner,
    Shuffle { reassign: bool },
    Stack,
    Fan,
    Chaos,
    Row,
    Unlock { reassign: bool },
    ResolvePair,
    Respawn,
}

#[derive(Debug, Clone)]
struct Card {
    value: u8,
    position: Point,
    target: Point,
    extra_angle: f64,
    /// 0 shows the back, 1 the face.
    flip: Spring,
}

impl Card {
    fn flip_progress(&self) -> f64 {
        self.flip.position.clamp(0.0, 1.0)
    }

    /// Rotation on screen: the flip tilts the card slightly.
    fn tilt(&self) -> f64 {
        0.25 * (self.flip_progress() * std::f64::consts::PI).sin() + self.extra_angle
    }
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    size: Size,
    card: Size,
}

impl Layout {
    fn new(size: Size) -> Self {
        Self {
            size,
            card: Size::new(size.width * 0.16, size.height * 0.42),
        }
    }

    fn base(&self, index: usize) -> Point {
        let spacing = self.card.width * 1.08;
        let center = self.size.center();
        let start = center.x - spacing * (CARD_COUNT as f64 - 1.0) / 2.0;
        Point::new(start + index as f64 * spacing, center.y + self.size.height * 0.03)
    }

    fn above(&self, index: usize) -> Point {
        Point::new(self.base(index).x, -self.card.height)
    }

    fn below(&self, x: f64) -> Point {
        Point::new(x, self.size.height + self.card.height)
    }
}

pub struct CardsSketch {
    lifecycle: Lifecycle,
    schedule: Schedule<Beat>,
    rng: Pcg64,
    layout: Layout,
    cards: Vec<Card>,
    selected: Vec<usize>,
    attempts: u32,
    can_click: bool,
    winner: Option<usize>,
    outbox: Outbox,
}

impl CardsSketch {
    pub fn new(config: &SketchConfig, size: Size, gate: CompletionGate) -> Self {
        let plan = vec![
            PhaseSpec::triggered(Phase::Intro),
            PhaseSpec::triggered(Phase::Idle),
            PhaseSpec::triggered(Phase::Interactive),
            PhaseSpec::timed(Phase::Resolving, 1.0)
                .eased(Easing::OutCubic)
                .scale(1.0, WIN_SCALE),
            PhaseSpec::timed(Phase::Hold, 0.8),
            PhaseSpec::timed(Phase::Fade, 0.8).cover(0.0, 1.0),
        ];
        let sequencer = Sequencer::new(plan).with_idle_after(Some(config.idle_after));
        let layout = Layout::new(size);
        let cards = (0..CARD_COUNT)
            .map(|i| Card {
                value: 0,
                position: layout.above(i),
                target: layout.above(i),
                extra_angle: 0.0,
                flip: Spring::new(0.0).with_settings(FLIP),
            })
            .collect();

        let mut sketch = Self {
            lifecycle: Lifecycle::new(sequencer, gate, config.max_dt),
            schedule: Schedule::new(),
            rng: seeded_rng(config),
            layout,
            cards,
            selected: Vec::new(),
            attempts: 0,
            can_click: false,
            winner: None,
            outbox: Outbox::default(),
        };
        sketch.assign_values();
        sketch.script_intro();
        sketch
    }

    fn assign_values(&mut self) {
        let mut values: Vec<u8> = (1..=CARD_COUNT as u8).collect();
        values.shuffle(&mut self.rng);
        for (card, value) in self.cards.iter_mut().zip(values) {
            card.value = value;
            card.flip.teleport(0.0, 0.0);
            card.flip.target = 0.0;
        }
    }

    fn winning_card(&self) -> Option<usize> {
        self.cards.iter().position(|c| c.value == WIN_VALUE)
    }

    fn script_intro(&mut self) {
        for i in 0..CARD_COUNT {
            self.schedule.after(i as f64 * DROP_DELAY, Beat::Drop(i));
        }
        let dropped = (CARD_COUNT as f64 - 1.0) * DROP_DELAY + DROP_TIME;
        let reveal = dropped + REVEAL_DELAY;
        self.schedule.after(reveal, Beat::RevealWinner);
        self.schedule.after(reveal + FACE_TIME, Beat::HideWinner);
        self.schedule.after(
            reveal + FACE_TIME + HIDE_TO_SHUFFLE,
            Beat::Shuffle { reassign: false },
        );
    }

    fn play(&mut self, beat: Beat) {
        let center = self.layout.size.center();
        let card = self.layout.card;
        match beat {
            Beat::Drop(i) => {
                if let Some(c) = self.cards.get_mut(i) {
                    c.target = self.layout.base(i);
                }
            }
            Beat::RevealWinner => {
                if let Some(i) = self.winning_card() {
                    self.cards[i].flip.target = 1.0;
                    self.outbox.push(Cue::Flip);
                }
            }
            Beat::HideWinner => {
                if let Some(i) = self.winning_card() {
                    self.cards[i].flip.target = 0.0;
                }
            }
            Beat::Shuffle { reassign } => {
                for c in &mut self.cards {
                    c.flip.target = 0.0;
                }
                self.schedule.after(0.2, Beat::Stack);
                self.schedule.after(0.7, Beat::Fan);
                self.schedule.after(1.2, Beat::Chaos);
                self.schedule.after(1.8, Beat::Row);
                self.schedule.after(2.3, Beat::Unlock { reassign });
                self.outbox.push(Cue::Shuffle);
            }
            Beat::Stack => {
                for (i, c) in self.cards.iter_mut().enumerate() {
                    c.target = Point::new(center.x, center.y + card.height * (-0.077 + i as f64 * 0.038));
                    c.extra_angle = 0.0;
                }
            }
            Beat::Fan => {
                for (i, c) in self.cards.iter_mut().enumerate() {
                    let offset = i as f64 - (CARD_COUNT as f64 - 1.0) / 2.0;
                    c.target = Point::new(center.x + offset * card.width * 0.5, center.y - card.height * 0.18);
                    c.extra_angle = offset * 0.15;
                }
            }
            Beat::Chaos => {
                for (i, c) in self.cards.iter_mut().enumerate() {
                    let dx = self.rng.random_range(-0.5..0.5) * card.width * 0.16;
                    c.target = Point::new(center.x + dx, center.y + card.height * (-0.1 + i as f64 * 0.026));
                    c.extra_angle = self.rng.random_range(-0.3..0.3);
                }
            }
            Beat::Row => {
                for (i, c) in self.cards.iter_mut().enumerate() {
                    c.target = self.layout.base(i);
                    c.extra_angle = 0.0;
                }
            }
            Beat::Unlock { reassign } => {
                if reassign {
                    self.assign_values();
                }
                self.selected.clear();
                self.can_click = true;
                if self.lifecycle.phase() == Phase::Intro {
                    self.lifecycle.sequencer_mut().trigger();
                }
            }
            Beat::ResolvePair => self.resolve_pair(),
            Beat::Respawn => {
                for &i in &self.selected {
                    let c = &mut self.cards[i];
                    c.position = self.layout.above(i);
                    c.target = self.layout.base(i);
                    c.extra_angle = 0.0;
                    c.flip.teleport(0.0, 0.0);
                    c.flip.target = 0.0;
                }
                self.schedule.after(
                    NEW_CARD_IN_TIME + PAUSE_BEFORE_SHUFFLE,
                    Beat::Shuffle { reassign: true },
                );
            }
        }
    }

    /// The first round always loses: if the pair holds the winner, trade
    /// its value with a losing card outside the pair.
    fn enforce_first_round_lose(&mut self) {
        let Some(&in_pair) = self.selected.iter().find(|&&i| self.cards[i].value == WIN_VALUE) else {
            return;
        };
        let outside = (0..self.cards.len())
            .find(|i| !self.selected.contains(i) && self.cards[*i].value != WIN_VALUE);
        if let Some(other) = outside {
            let value = self.cards[in_pair].value;
            self.cards[in_pair].value = self.cards[other].value;
            self.cards[other].value = value;
            debug!(swapped = other, "first round forced to lose");
        }
    }

    fn resolve_pair(&mut self) {
        let winner = self
            .selected
            .iter()
            .copied()
            .find(|&i| self.cards[i].value == WIN_VALUE);
        match winner {
            Some(win) => {
                let center = self.layout.size.center();
                for (i, c) in self.cards.iter_mut().enumerate() {
                    if i == win {
                        c.target = center;
                    } else {
                        c.flip.target = 0.0;
                        c.target = self.layout.below(c.position.x);
                    }
                    c.extra_angle = 0.0;
                }
                self.winner = Some(win);
                self.selected.clear();
                self.lifecycle.sequencer_mut().request_resolution();
                self.outbox.push(Cue::Win);
            }
            None => {
                for &i in &self.selected {
                    let c = &mut self.cards[i];
                    c.target = self.layout.below(c.position.x);
                }
                self.schedule.after(LOSE_DROP_TIME, Beat::Respawn);
                self.outbox.push(Cue::Lose);
            }
        }
    }

    fn click(&mut self, index: usize) {
        if !self.can_click || self.selected.contains(&index) {
            return;
        }
        self.cards[index].flip.target = 1.0;
        self.selected.push(index);
        self.outbox.push(Cue::Flip);
        if self.selected.len() < 2 {
            return;
        }
        if self.attempts == 0 {
            self.enforce_first_round_lose();
        }
        self.can_click = false;
        self.attempts += 1;
        self.schedule.after(PAIR_DELAY, Beat::ResolvePair);
    }

    fn card_at(&self, point: Point) -> Option<usize> {
        let half = Point::new(self.layout.card.width / 2.0, self.layout.card.height / 2.0);
        // Later cards are drawn on top.
        (0..self.cards.len()).rev().find(|&i| {
            let c = &self.cards[i];
            hit_rotated_rect(
                point,
                c.position,
                c.tilt(),
                Point::new(-half.x, -half.y),
                half,
            )
        })
    }

    fn relayout(&mut self, size: Size) {
        if size == self.layout.size || self.layout.size.width <= 0.0 || self.layout.size.height <= 0.0 {
            self.layout = Layout::new(size);
            return;
        }
        let sx = size.width / self.layout.size.width;
        let sy = size.height / self.layout.size.height;
        for c in &mut self.cards {
            c.position = Point::new(c.position.x * sx, c.position.y * sy);
            c.target = Point::new(c.target.x * sx, c.target.y * sy);
        }
        self.layout = Layout::new(size);
    }

    fn draw_card(&self, frame: &mut Frame<'_>, index: usize, params: &Params) {
        let c = &self.cards[index];
        let t = c.flip_progress();
        let squash = (t * std::f64::consts::PI).cos().abs();
        let zoom = if self.winner == Some(index) {
            params.scale
        } else {
            1.0
        };
        let half_w = self.layout.card.width / 2.0 * squash * zoom;
        let half_h = self.layout.card.height / 2.0 * zoom;
        let tilt = c.tilt();
        let corner = |x: f64, y: f64| {
            let p = Point::new(x, y).rotated(tilt);
            Point::new(c.position.x + p.x, c.position.y + p.y)
        };
        let z = index as i32 * 2;

        frame.draw_layer(
            Shape::Polygon {
                points: vec![
                    corner(-half_w, -half_h),
                    corner(half_w, -half_h),
                    corner(half_w, half_h),
                    corner(-half_w, half_h),
                ],
            },
            Paint::solid(Color::WHITE),
            z,
        );

        if t >= 0.5 {
            if squash > 0.2 {
                let ch = char::from_digit(u32::from(c.value), 10).unwrap_or('?');
                frame.draw_layer(
                    Shape::Glyph {
                        ch,
                        center: c.position,
                        height: half_h,
                        angle: tilt,
                    },
                    Paint::solid(Color::BLACK),
                    z + 1,
                );
            }
        } else {
            let inset = 0.7;
            frame.draw_layer(
                Shape::Polygon {
                    points: vec![
                        corner(-half_w * inset, -half_h * inset),
                        corner(half_w * inset, -half_h * inset),
                        corner(half_w * inset, half_h * inset),
                        corner(-half_w * inset, half_h * inset),
                    ],
                },
                Paint::solid(Color::GREY),
                z + 1,
            );
        }
    }
}

impl Sketch for CardsSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::One
    }

    fn update(&mut self, dt: f64, frame: &mut Frame<'_>) {
        let tick = self.lifecycle.tick(dt);
        self.relayout(frame.size);
        for beat in self.schedule.advance(tick.dt) {
            self.play(beat);
        }
        self.outbox.flush(frame);

        for c in &mut self.cards {
            c.position.x = approach(c.position.x, c.target.x, FOLLOW_RATE, tick.dt, 60.0);
            c.position.y = approach(c.position.y, c.target.y, FOLLOW_RATE, tick.dt, 60.0);
            c.flip.step(tick.dt);
        }

        let params = self.lifecycle.params();
        for i in 0..self.cards.len() {
            if Some(i) != self.winner {
                self.draw_card(frame, i, &params);
            }
        }
        if let Some(win) = self.winner {
            self.draw_card(frame, win, &params);
        }
        draw_cover(frame, &params);
    }

    fn pointer(&mut self, event: PointerEvent) {
        if event.kind != PointerKind::Down || !self.lifecycle.sequencer().accepts_input() {
            return;
        }
        if let Some(index) = self.card_at(event.position) {
            self.lifecycle.sequencer_mut().interact();
            self.click(index);
        }
    }

    fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    fn is_finished(&self) -> bool {
        self.lifecycle.is_finished()
    }
}
