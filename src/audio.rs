//! Fire-and-forget audio cues.
//!
//! Sketches name discrete events; a `CueSink` decides what, if anything,
//! they sound like. Failures never reach the animation: `Frame::cue`
//! swallows them.

use std::io::{self, Write};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Grab,
    Release,
    /// Knob detent.
    Tick,
    Flip,
    Shuffle,
    Open,
    Close,
    Win,
    Lose,
    Resolved,
}

impl Cue {
    /// Cues loud enough to deserve the terminal bell.
    pub fn is_prominent(self) -> bool {
        matches!(self, Cue::Open | Cue::Win | Cue::Resolved)
    }
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error("audio output is disabled")]
    Disabled,
    #[error("failed to emit cue: {0}")]
    Io(#[from] io::Error),
}

pub trait CueSink {
    fn play(&mut self, cue: Cue) -> Result<(), CueError>;
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCues;

impl CueSink for NullCues {
    fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Remembers cues in order; used by tests and the headless simulator.
#[derive(Debug, Default, Clone)]
pub struct RecordingCues {
    pub played: Vec<Cue>,
}

impl RecordingCues {
    pub fn count(&self, cue: Cue) -> usize {
        self.played.iter().filter(|c| **c == cue).count()
    }
}

impl CueSink for RecordingCues {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        self.played.push(cue);
        Ok(())
    }
}

/// Rings the terminal bell for prominent cues.
#[derive(Debug, Clone, Copy)]
pub struct BellCues {
    enabled: bool,
}

impl BellCues {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl CueSink for BellCues {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        if !self.enabled {
            return Err(CueError::Disabled);
        }
        if cue.is_prominent() {
            let mut stdout = io::stdout();
            stdout.write_all(b"\x07")?;
            stdout.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_order() {
        let mut sink = RecordingCues::default();
        sink.play(Cue::Grab).unwrap();
        sink.play(Cue::Tick).unwrap();
        sink.play(Cue::Tick).unwrap();
        assert_eq!(sink.played, vec![Cue::Grab, Cue::Tick, Cue::Tick]);
        assert_eq!(sink.count(Cue::Tick), 2);
    }

    #[test]
    fn disabled_bell_reports_an_error() {
        let mut sink = BellCues::new(false);
        assert!(matches!(sink.play(Cue::Win), Err(CueError::Disabled)));
    }
}
