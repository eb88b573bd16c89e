//! Playback: a pure state machine plus the timer that drives it.

pub mod controller;
pub mod driver;

pub use controller::{PlaybackController, PlaybackState};
pub use driver::PlaybackDriver;
