//! Playback state machine.
//!
//! Pure and clock-free: the caller (or [`super::PlaybackDriver`]) decides when
//! to call [`PlaybackController::tick`].

use schemars::JsonSchema;
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(tag = "state", content = "position", rename_all = "snake_case")]
pub enum PlaybackState {
    /// No position selected; consumers show the whole match.
    Stopped,
    Paused(usize),
    Playing(usize),
}

impl PlaybackState {
    pub fn position(self) -> Option<usize> {
        match self {
            PlaybackState::Stopped => None,
            PlaybackState::Paused(p) | PlaybackState::Playing(p) => Some(p),
        }
    }

    /// Inclusive minute/frame cutoff to query against; `None` shows everything.
    pub fn cutoff(self) -> Option<usize> {
        self.position()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackController {
    state: PlaybackState,
    max_position: usize,
}

impl PlaybackController {
    pub fn new(max_position: usize) -> Self {
        Self { state: PlaybackState::Stopped, max_position }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> Option<usize> {
        self.state.position()
    }

    pub fn max_position(&self) -> usize {
        self.max_position
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing(_))
    }

    /// Stopped starts at 0, Paused resumes in place.
    pub fn play(&mut self) -> PlaybackState {
        let next = match self.state {
            PlaybackState::Stopped => PlaybackState::Playing(0),
            PlaybackState::Paused(p) => PlaybackState::Playing(p),
            playing @ PlaybackState::Playing(_) => playing,
        };
        self.transition(next)
    }

    pub fn pause(&mut self) -> PlaybackState {
        if let PlaybackState::Playing(p) = self.state {
            self.transition(PlaybackState::Paused(p))
        } else {
            self.state
        }
    }

    /// Advance one position; past the end the controller falls back to Stopped.
    pub fn tick(&mut self) -> PlaybackState {
        let PlaybackState::Playing(p) = self.state else {
            return self.state;
        };
        let next = match p.checked_add(1) {
            Some(n) if n <= self.max_position => PlaybackState::Playing(n),
            _ => PlaybackState::Stopped,
        };
        self.transition(next)
    }

    /// Jump to `position` clamped to `[0, max_position]` and pause there.
    pub fn seek(&mut self, position: i64) -> PlaybackState {
        let clamped = if position <= 0 {
            0
        } else {
            usize::try_from(position).unwrap_or(usize::MAX).min(self.max_position)
        };
        self.transition(PlaybackState::Paused(clamped))
    }

    pub fn reset(&mut self) -> PlaybackState {
        self.transition(PlaybackState::Stopped)
    }

    pub fn step_forward(&mut self) -> PlaybackState {
        let next = match self.state.position() {
            None => 0,
            Some(p) => p.saturating_add(1).min(self.max_position),
        };
        self.transition(PlaybackState::Paused(next))
    }

    pub fn step_back(&mut self) -> PlaybackState {
        let prev = self.state.position().map_or(0, |p| p.saturating_sub(1));
        self.transition(PlaybackState::Paused(prev))
    }

    fn transition(&mut self, next: PlaybackState) -> PlaybackState {
        if next != self.state {
            tracing::trace!(from = ?self.state, to = ?next, "playback transition");
            self.state = next;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_play_pause_resume() {
        let mut c = PlaybackController::new(10);
        assert_eq!(c.play(), PlaybackState::Playing(0));
        c.tick();
        c.tick();
        assert_eq!(c.pause(), PlaybackState::Paused(2));
        assert_eq!(c.pause(), PlaybackState::Paused(2));
        assert_eq!(c.play(), PlaybackState::Playing(2));
        assert_eq!(c.play(), PlaybackState::Playing(2));
    }

    #[test]
    fn test_tick_past_end_stops() {
        let mut c = PlaybackController::new(2);
        c.play();
        assert_eq!(c.tick(), PlaybackState::Playing(1));
        assert_eq!(c.tick(), PlaybackState::Playing(2));
        assert_eq!(c.tick(), PlaybackState::Stopped);
        assert_eq!(c.position(), None);
    }

    #[test]
    fn test_tick_is_noop_unless_playing() {
        let mut c = PlaybackController::new(5);
        assert_eq!(c.tick(), PlaybackState::Stopped);
        c.seek(3);
        assert_eq!(c.tick(), PlaybackState::Paused(3));
    }

    #[test]
    fn test_seek_clamps() {
        let mut c = PlaybackController::new(40);
        assert_eq!(c.seek(-5), PlaybackState::Paused(0));
        assert_eq!(c.seek(999), PlaybackState::Paused(40));
        c.play();
        assert_eq!(c.seek(7), PlaybackState::Paused(7));
        assert_eq!(c.reset(), PlaybackState::Stopped);
    }

    #[test]
    fn test_stepping() {
        let mut c = PlaybackController::new(3);
        assert_eq!(c.step_back(), PlaybackState::Paused(0));
        c.reset();
        assert_eq!(c.step_forward(), PlaybackState::Paused(0));
        assert_eq!(c.step_forward(), PlaybackState::Paused(1));
        c.seek(3);
        assert_eq!(c.step_forward(), PlaybackState::Paused(3));
        assert_eq!(c.step_back(), PlaybackState::Paused(2));
    }

    #[test]
    fn test_zero_length_match() {
        let mut c = PlaybackController::new(0);
        assert_eq!(c.play(), PlaybackState::Playing(0));
        assert_eq!(c.tick(), PlaybackState::Stopped);
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_value(PlaybackState::Paused(4)).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "paused", "position": 4 }));
        let json = serde_json::to_value(PlaybackState::Stopped).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "stopped" }));
    }

    proptest! {
        #[test]
        fn prop_full_run_returns_to_stopped(max in 0usize..200) {
            let mut c = PlaybackController::new(max);
            c.play();
            for _ in 0..=max {
                if let Some(p) = c.position() {
                    prop_assert!(p <= max);
                }
                c.tick();
            }
            prop_assert_eq!(c.state(), PlaybackState::Stopped);
        }

        #[test]
        fn prop_seek_always_in_bounds(max in 0usize..500, target in any::<i64>()) {
            let mut c = PlaybackController::new(max);
            let state = c.seek(target);
            let p = state.position().unwrap();
            prop_assert!(p <= max);
        }
    }
}
