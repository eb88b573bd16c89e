//! Immutable frame sequence for one loaded match.

use fxhash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::models::{Frame, MatchTimelineDto};

/// Ordered frames plus the static match identity.
///
/// Frames are expected in strictly increasing timestamp order and are never
/// re-sorted. The fingerprint is computed once so downstream memo keys are
/// cheap to build.
#[derive(Debug, Clone)]
pub struct FrameStore {
    match_id: Option<String>,
    frames: Vec<Frame>,
    fingerprint: u64,
}

impl FrameStore {
    pub fn new(match_id: Option<String>, frames: Vec<Frame>) -> Self {
        let fingerprint = fingerprint_frames(match_id.as_deref(), &frames);
        tracing::debug!(frames = frames.len(), fingerprint, "frame store loaded");
        Self { match_id, frames, fingerprint }
    }

    pub fn from_timeline(dto: MatchTimelineDto) -> Self {
        let match_id = dto.metadata.and_then(|meta| meta.match_id);
        Self::new(match_id, dto.info.frames)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Last valid frame index; `None` for an empty match.
    pub fn max_frame_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

// FxHasher is stable across runs and platforms, unlike the std RandomState.
fn fingerprint_frames(match_id: Option<&str>, frames: &[Frame]) -> u64 {
    let mut hasher = FxHasher::default();
    match_id.hash(&mut hasher);
    frames.len().hash(&mut hasher);
    for frame in frames {
        frame.timestamp.hash(&mut hasher);
        frame.participant_frames.len().hash(&mut hasher);
        frame.events.len().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{empty_frame, scenario_a_store};

    #[test]
    fn test_empty_store() {
        let store = FrameStore::new(None, Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.max_frame_index(), None);
    }

    #[test]
    fn test_max_frame_index() {
        let store = scenario_a_store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.max_frame_index(), Some(2));
        assert_eq!(store.frame(1).map(|f| f.timestamp), Some(60_000));
        assert!(store.frame(3).is_none());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = FrameStore::new(Some("M1".into()), vec![empty_frame(0), empty_frame(60_000)]);
        let b = FrameStore::new(Some("M1".into()), vec![empty_frame(0), empty_frame(60_000)]);
        let c = FrameStore::new(Some("M2".into()), vec![empty_frame(0), empty_frame(60_000)]);
        let d = FrameStore::new(Some("M1".into()), vec![empty_frame(0)]);

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    #[test]
    fn test_from_timeline_takes_match_id() {
        let dto: MatchTimelineDto = serde_json::from_value(serde_json::json!({
            "metadata": { "matchId": "NA1_123" },
            "info": { "frames": [ { "timestamp": 0 } ] }
        }))
        .unwrap();
        let store = FrameStore::from_timeline(dto);
        assert_eq!(store.match_id(), Some("NA1_123"));
        assert_eq!(store.len(), 1);
    }
}
