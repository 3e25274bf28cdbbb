//! Sketchbook: short-lived numeral vignettes driven by a deterministic
//! animation core.
//!
//! The pipeline has three stages:
//! - `engine` owns time, phases, springs, pendulum physics and drag capture
//! - `renderer` rasterizes resolved shapes onto a character grid
//! - `player` drives frames, pointer input and cues in the terminal

pub mod audio;
pub mod config;
pub mod engine;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod sketches;
pub mod types;
