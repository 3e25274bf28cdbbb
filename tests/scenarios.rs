use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;

use sketchbook::engine::math::shortest_angle_diff;
use sketchbook::engine::{
    CompletionGate, DragSession, Lifecycle, Pendulum, PendulumParams, Phase, PhaseSpec, Sequencer,
    Spring, TrailBuffer, TrailEntry,
};
use sketchbook::types::Point;

fn counting_gate() -> (CompletionGate, Rc<Cell<u32>>) {
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let gate = CompletionGate::new(move || counter.set(counter.get() + 1));
    (gate, fired)
}

#[test]
fn intro_completes_after_its_duration_then_goes_idle() {
    let mut sequencer = Sequencer::new(vec![
        PhaseSpec::timed(Phase::Intro, 1.2),
        PhaseSpec::triggered(Phase::Idle),
        PhaseSpec::triggered(Phase::Interactive),
        PhaseSpec::timed(Phase::Fade, 0.5),
    ]);

    let mut last = 0.0;
    for _ in 0..12 {
        let step = sequencer.advance(0.1);
        assert_eq!(step.entered, None);
        assert!(sequencer.progress() >= last);
        last = sequencer.progress();
    }
    assert_eq!(sequencer.phase(), Phase::Intro);
    assert_eq!(sequencer.progress(), 1.0);

    let step = sequencer.advance(0.1);
    assert_eq!(step.left, Some(Phase::Intro));
    assert_eq!(step.entered, Some(Phase::Idle));
    assert_eq!(sequencer.elapsed(), 0.0);
}

#[test]
fn spring_settles_on_its_target() {
    let mut spring = Spring::new(0.0).with_target(1.0);
    for _ in 0..300 {
        spring.step(1.0 / 60.0);
        assert!(spring.position.is_finite() && spring.velocity.is_finite());
    }
    assert!((spring.position - 1.0).abs() < 0.01);
}

#[test]
fn spring_survives_huge_steps() {
    let mut spring = Spring::new(0.0).with_target(1.0);
    for _ in 0..50 {
        spring.step(10.0);
    }
    assert!(spring.position.is_finite());
    assert!((spring.position - 1.0).abs() < 0.01);
}

#[test]
fn trail_drops_close_points_and_keeps_breaks() {
    let p1 = Point::new(0.0, 0.0);
    let p2 = Point::new(0.1, 0.0);
    let p3 = Point::new(5.0, 5.0);

    let mut trail = TrailBuffer::new(TrailBuffer::DEFAULT_CAPACITY);
    assert!(trail.record(p1, 1.0));
    assert!(!trail.record(p2, 1.0));
    trail.push_break();
    assert!(trail.record(p3, 1.0));

    let entries: Vec<TrailEntry> = trail.entries().copied().collect();
    assert_eq!(
        entries,
        vec![TrailEntry::Point(p1), TrailEntry::Break, TrailEntry::Point(p3)]
    );
    assert_eq!(trail.segments(), vec![vec![p1], vec![p3]]);
}

#[test]
fn gate_fires_once_when_fade_completes() {
    let (gate, fired) = counting_gate();
    let plan = vec![PhaseSpec::timed(Phase::Fade, 1.0).cover(0.0, 1.0)];
    let mut lifecycle = Lifecycle::new(Sequencer::new(plan), gate, 0.5);

    for _ in 0..3 {
        let tick = lifecycle.tick(0.25);
        assert!(!tick.step.finished);
    }
    assert_eq!(fired.get(), 0);

    let tick = lifecycle.tick(0.25);
    assert!(tick.step.finished);
    assert_eq!(lifecycle.params().cover, 1.0);
    assert_eq!(fired.get(), 1);

    lifecycle.tick(0.25);
    lifecycle.tick(0.25);
    assert_eq!(fired.get(), 1);
    assert!(lifecycle.is_finished());
}

#[test]
fn gate_fire_is_idempotent() {
    let (mut gate, fired) = counting_gate();
    assert!(gate.fire());
    assert!(!gate.fire());
    assert!(!gate.fire());
    assert_eq!(fired.get(), 1);
}

#[test]
fn shortest_angle_is_bounded_and_antisymmetric() {
    let samples = [-7.0, -PI, -1.0, 0.0, 0.5, PI, 3.0, 10.0];
    for &a in &samples {
        for &b in &samples {
            let d = shortest_angle_diff(a, b);
            assert!(d > -PI - 1e-12 && d <= PI + 1e-12, "{a} {b} -> {d}");
            let back = shortest_angle_diff(b, a);
            if (d.abs() - PI).abs() > 1e-9 {
                assert!((d + back).abs() < 1e-9, "{a} {b}");
            }
        }
    }
}

#[test]
fn held_pendulum_ignores_integration_and_release_hands_over_velocity() {
    let mut pendulum = Pendulum::new(PendulumParams::default());
    let start = pendulum.angle;
    pendulum.grab(DragSession::new(Point::default(), start, 0.0));

    let omega = 3.0;
    let dt = 1.0 / 60.0;
    for i in 1..=30 {
        let t = i as f64 * dt;
        pendulum.drag_to(start + omega * t, t);
        let (angle, velocity) = (pendulum.angle, pendulum.angular_velocity);
        pendulum.integrate(dt, 100.0);
        assert_eq!(pendulum.angle, angle);
        assert_eq!(pendulum.angular_velocity, velocity);
    }

    assert!(pendulum.release(0.5));
    assert!((pendulum.angular_velocity - omega * 0.5).abs() < 1e-6);
    assert!(!pendulum.release(0.5));
}
