//! Engine: the animation lifecycle core.
//!
//! Everything a sketch needs to move through time lives here: a clamped
//! frame clock, easing curves, a damped oscillator, pendulum physics, drag
//! capture, the phase sequencer and a one-shot completion gate.
//!
//! The engine understands time, physics and phases. It never deals with
//! terminals, cells or input devices.

pub mod clock;
pub mod drag;
pub mod easing;
pub mod gate;
pub mod lifecycle;
pub mod math;
pub mod pendulum;
pub mod schedule;
pub mod sequencer;
pub mod spring;
pub mod trail;
pub mod trigger;

pub use clock::AnimationClock;
pub use drag::{DragSession, DragState};
pub use easing::Easing;
pub use gate::CompletionGate;
pub use lifecycle::{Lifecycle, Tick};
pub use pendulum::{Pendulum, PendulumParams};
pub use schedule::Schedule;
pub use sequencer::{Exit, Params, Phase, PhaseSpec, Sequencer, Step};
pub use spring::{Spring, SpringSettings};
pub use trail::{TrailBuffer, TrailEntry};
pub use trigger::ResolutionPredicate;
