use sketchbook::audio::{BellCues, Cue};
use sketchbook::config::SketchConfig;
use sketchbook::engine::Phase;
use sketchbook::player::simulate::{Script, Simulator};
use sketchbook::sketches::SketchKind;
use sketchbook::types::TerminalContract;

const CONTRACT: TerminalContract = TerminalContract {
    width: 80,
    height: 30,
};
const DT: f64 = 1.0 / 60.0;

fn config() -> SketchConfig {
    SketchConfig {
        seed: Some(11),
        ..SketchConfig::default()
    }
}

#[test]
fn pendulum_full_turn_plays_to_the_end() {
    let report = Simulator::new(SketchKind::Zero, &config(), CONTRACT, DT).run(25.0);
    assert!(report.finished, "{report}");
    assert_eq!(report.gate_fired, 1);
    let phases: Vec<Phase> = report.timeline.iter().map(|m| m.phase).collect();
    let order = [
        Phase::Intro,
        Phase::Resolving,
        Phase::OutroReturn,
        Phase::OutroShrink,
        Phase::Hold,
        Phase::Fade,
        Phase::Done,
    ];
    let mut cursor = 0;
    for phase in phases {
        if cursor < order.len() && phase == order[cursor] {
            cursor += 1;
        }
    }
    assert_eq!(cursor, order.len(), "{report}");
}

#[test]
fn door_demo_finishes_once() {
    let report = Simulator::new(SketchKind::Three, &config(), CONTRACT, DT).run(20.0);
    assert!(report.finished, "{report}");
    assert_eq!(report.gate_fired, 1);
    assert_eq!(report.cues.iter().filter(|c| **c == Cue::Resolved).count(), 1);
}

#[test]
fn spin_demo_turns_upright_and_drops() {
    let report = Simulator::new(SketchKind::Spin, &config(), CONTRACT, DT).run(25.0);
    assert!(report.finished, "{report}");
    assert_eq!(report.gate_fired, 1);
    let idle = report.entered(Phase::Idle).unwrap_or(f64::MAX);
    let resolving = report.entered(Phase::Resolving).unwrap_or(0.0);
    assert!(idle < resolving);
}

#[test]
fn every_sketch_waits_without_input() {
    for kind in SketchKind::ALL {
        let report = Simulator::new(kind, &config(), CONTRACT, DT)
            .with_script(Script::new())
            .run(15.0);
        assert!(!report.finished, "{report}");
        assert_eq!(report.gate_fired, 0);
        assert_eq!(report.timeline[0].phase, Phase::Intro);
        assert!(report.entered(Phase::Resolving).is_none(), "{report}");
    }
}

#[test]
fn every_demo_runs_cleanly() {
    for kind in SketchKind::ALL {
        let report = Simulator::new(kind, &config(), CONTRACT, DT).run(40.0);
        assert!(report.gate_fired <= 1, "{report}");
        assert_eq!(report.finished, report.gate_fired == 1);
        assert_eq!(report.snapshot.len(), CONTRACT.height as usize);
    }
}

#[test]
fn failing_audio_leaves_the_animation_alone() {
    for kind in [SketchKind::Three, SketchKind::Zero] {
        let recorded = Simulator::new(kind, &config(), CONTRACT, DT).run(25.0);
        let muted = Simulator::new(kind, &config(), CONTRACT, DT)
            .with_sink(Box::new(BellCues::new(false)))
            .run(25.0);

        assert!(!recorded.cues.is_empty());
        assert!(muted.cues.is_empty());
        assert!(muted.finished, "{muted}");
        assert_eq!(muted.gate_fired, 1);
        assert_eq!(muted.timeline, recorded.timeline);
        assert_eq!(muted.frames, recorded.frames);
        assert_eq!(muted.snapshot, recorded.snapshot);
    }
}
