//! Query surface over one loaded match.
//!
//! [`MatchTimeline`] owns the frame store and the optional summary. The
//! participant index is built eagerly; every other index is built on first
//! use and kept for the lifetime of the value, so repeated queries never
//! rescan the frames.

use once_cell::unsync::OnceCell;
use std::borrow::Cow;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::context::{build_context, ContextBundle, ContextSources};
use crate::index::{
    build_team_stats, EventBucket, EventDetail, EventIndex, IndexedEvent, ParticipantIndex,
    ParticipantRecord, PlayerTimelinePoint, TeamSlice, TeamStats, TimelineSlices,
};
use crate::models::{MatchSummaryDto, MatchTimelineDto, ParticipantId, TeamKey, TeamPair};
use crate::playback::{PlaybackController, PlaybackDriver};
use crate::spatial::{DensityCache, DensityParams, DensityPoint, HeatPoint, PointSet};
use crate::store::FrameStore;

pub struct MatchTimeline {
    store: FrameStore,
    match_id: Option<String>,
    game_duration_secs: Option<u64>,
    main_participant: Option<ParticipantId>,
    config: EngineConfig,
    participants: ParticipantIndex,
    events: OnceCell<EventIndex>,
    slices: OnceCell<TimelineSlices>,
    team_stats: OnceCell<TeamPair<TeamStats>>,
    kill_points: OnceCell<PointSet>,
    density: DensityCache,
}

impl MatchTimeline {
    pub fn new(store: FrameStore, summary: Option<MatchSummaryDto>, config: EngineConfig) -> Self {
        let summary = summary.unwrap_or_default();
        let match_id = store
            .match_id()
            .map(str::to_string)
            .or_else(|| summary.metadata.as_ref().and_then(|meta| meta.match_id.clone()))
            .or_else(|| summary.info.game_id.map(|id| id.to_string()));

        let participants =
            ParticipantIndex::build(store.frames(), &summary.info.participants, config.teams.team_size);

        tracing::debug!(
            match_id = match_id.as_deref().unwrap_or("-"),
            frames = store.len(),
            participants = participants.len(),
            "match timeline loaded"
        );

        Self {
            match_id,
            game_duration_secs: summary.info.game_duration,
            main_participant: None,
            density: DensityCache::new(config.density.cache_capacity),
            config,
            participants,
            store,
            events: OnceCell::new(),
            slices: OnceCell::new(),
            team_stats: OnceCell::new(),
            kill_points: OnceCell::new(),
        }
    }

    pub fn from_dtos(
        timeline: MatchTimelineDto,
        summary: Option<MatchSummaryDto>,
        config: EngineConfig,
    ) -> Self {
        Self::new(FrameStore::from_timeline(timeline), summary, config)
    }

    /// Participant reported as `mainPlayer` in chat context.
    pub fn with_main_participant(mut self, id: ParticipantId) -> Self {
        self.main_participant = Some(id);
        self
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn participants(&self) -> &ParticipantIndex {
        &self.participants
    }

    pub fn events(&self) -> &EventIndex {
        self.events.get_or_init(|| EventIndex::build(self.store.frames(), &self.participants))
    }

    pub fn slices(&self) -> &TimelineSlices {
        self.slices
            .get_or_init(|| TimelineSlices::build(self.store.frames(), self.participants.team_table()))
    }

    pub fn team_stats(&self) -> &TeamPair<TeamStats> {
        self.team_stats
            .get_or_init(|| build_team_stats(&self.participants, self.events(), self.slices()))
    }

    /// Inclusive frame range, optionally restricted to `buckets`.
    pub fn get_events_in_range(
        &self,
        start: usize,
        end: usize,
        buckets: Option<&[EventBucket]>,
    ) -> Vec<&IndexedEvent> {
        self.events().events_in_range(start, end, buckets)
    }

    pub fn get_participant_stats(&self, id: ParticipantId) -> Cow<'_, ParticipantRecord> {
        self.participants.get(id)
    }

    pub fn get_player_timeline(&self, id: ParticipantId) -> &[PlayerTimelinePoint] {
        self.slices().player_timeline(id)
    }

    /// Full-match rollup for `team`.
    pub fn get_team_stats(&self, team: TeamKey) -> &TeamStats {
        self.team_stats().get(team)
    }

    pub fn slice_at(&self, frame_index: usize) -> Option<&TeamSlice> {
        self.slices().slice_at(frame_index)
    }

    pub fn slices_in_window(&self, center: usize, radius: usize) -> &[TeamSlice] {
        self.slices().slices_in_window(center, radius)
    }

    /// Positioned champion kills as heatmap points, chronological.
    pub fn kill_points(&self) -> &PointSet {
        self.kill_points.get_or_init(|| {
            self.events()
                .bucket(EventBucket::Kills)
                .filter_map(|event| {
                    let EventDetail::Kill(kill) = &event.detail else { return None };
                    let position = kill.position?;
                    let killer = kill.killer.as_ref();
                    let record = killer.map(|k| self.participants.get(k.id));
                    Some(HeatPoint {
                        match_id: self.match_id.clone(),
                        champion_name: killer.and_then(|k| k.champion.clone()),
                        role: record.and_then(|r| r.role.clone()),
                        killer_id: killer.map(|k| k.id),
                        victim_id: kill.victim.as_ref().map(|v| v.id),
                        ..HeatPoint::at(
                            position.x,
                            position.y,
                            event.timestamp.unwrap_or_else(|| (event.minute * 60_000.0) as i64),
                        )
                    })
                })
                .collect()
        })
    }

    /// Memoized density for `points`.
    ///
    /// `cell_size = None` uses the configured cell size; a non-positive or
    /// non-finite size falls back to the default grid.
    pub fn get_density_grid(
        &self,
        points: &PointSet,
        cutoff_minute: Option<u32>,
        cell_size: Option<f64>,
    ) -> Rc<[DensityPoint]> {
        let cell_size = cell_size.unwrap_or(self.config.density.cell_size);
        let params = DensityParams::new(cell_size, cutoff_minute);
        if params.effective_cell_size() != cell_size {
            tracing::warn!(cell_size, "invalid density cell size, using default");
        }
        self.density.get_or_compute(points, params)
    }

    /// `(hits, misses)` of the density memo.
    pub fn density_cache_stats(&self) -> (u64, u64) {
        self.density.stats()
    }

    /// Context bundle around `focus` (clamped to the last frame).
    pub fn get_chat_context(&self, focus: usize, selected: Option<ParticipantId>) -> ContextBundle {
        let sources = ContextSources {
            match_id: self.match_id.as_deref(),
            game_duration_secs: self.game_duration_secs,
            frame_count: self.store.len(),
            main_participant: self.main_participant,
            participants: &self.participants,
            events: self.events(),
            slices: self.slices(),
            teams: self.team_stats(),
            config: &self.config.context,
        };
        build_context(&sources, focus, selected)
    }

    /// Stopped controller over `[0, max_frame_index]`; an empty match gets `[0, 0]`.
    pub fn playback_controller(&self) -> PlaybackController {
        PlaybackController::new(self.store.max_frame_index().unwrap_or(0))
    }

    /// Timer-driven controller ticking at the configured match interval.
    pub fn playback_driver(&self) -> PlaybackDriver {
        PlaybackDriver::new(
            self.playback_controller(),
            self.config.playback.match_interval(),
            &self.config.playback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;
    use crate::proptest_gen::frames_strategy;
    use crate::test_fixtures::{
        empty_frame, frame_with_events, sample_summary, sample_timeline, scenario_a_store,
        unknown_event,
    };
    use proptest::prelude::*;

    fn timeline_of(store: FrameStore) -> MatchTimeline {
        MatchTimeline::new(store, None, EngineConfig::default())
    }

    #[test]
    fn test_single_kill_match() {
        let timeline = timeline_of(scenario_a_store());

        assert_eq!(timeline.events().count(EventBucket::Kills), 1);
        assert_eq!(timeline.get_team_stats(TeamKey::Blue).kills, 1);
        assert_eq!(timeline.get_team_stats(TeamKey::Red).kills, 0);
        assert_eq!(timeline.slices().len(), 3);
        assert_eq!(timeline.slice_at(1).map(|s| s.team(TeamKey::Blue).kills), Some(1));
        assert_eq!(timeline.match_id(), Some("SCENARIO_A"));
    }

    #[test]
    fn test_null_fields_keep_kill_and_frame() {
        let dto: MatchTimelineDto = serde_json::from_value(serde_json::json!({
            "info": {
                "frames": [
                    { "timestamp": 0, "participantFrames": null, "events": null },
                    {
                        "timestamp": 60000,
                        "events": [{
                            "type": "CHAMPION_KILL",
                            "timestamp": 61000,
                            "killerId": 2,
                            "victimId": 7,
                            "assistingParticipantIds": null,
                            "position": { "x": 500, "y": 600 }
                        }]
                    }
                ]
            }
        }))
        .unwrap();
        let timeline = MatchTimeline::from_dtos(dto, None, EngineConfig::default());

        assert_eq!(timeline.store().len(), 2);
        assert_eq!(timeline.events().count(EventBucket::Kills), 1);
        assert_eq!(timeline.get_team_stats(TeamKey::Blue).kills, 1);
        assert_eq!(timeline.kill_points().len(), 1);
    }

    #[test]
    fn test_kill_points_carry_position_and_ids() {
        let timeline = timeline_of(scenario_a_store());
        let points = timeline.kill_points().points();

        assert_eq!(points.len(), 1);
        assert_eq!((points[0].x, points[0].y), (100.0, 200.0));
        assert_eq!(points[0].killer_id, Some(1));
        assert_eq!(points[0].victim_id, Some(6));
        assert_eq!(points[0].timestamp, 60_500);
    }

    #[test]
    fn test_density_grid_memoized_and_default_cell_size() {
        let timeline = timeline_of(scenario_a_store());
        let set = PointSet::new(vec![
            HeatPoint::at(10.0, 10.0, 0),
            HeatPoint::at(200.0, 300.0, 0),
            HeatPoint::at(2000.0, 2000.0, 0),
        ]);

        let grid = timeline.get_density_grid(&set, None, None);
        let densities: Vec<f64> = grid.iter().map(|p| p.density).collect();
        assert_eq!(densities, vec![1.0, 1.0, 0.5]);

        let again = timeline.get_density_grid(&set, None, Some(f64::NAN));
        assert!(Rc::ptr_eq(&grid, &again));
        assert_eq!(timeline.density_cache_stats(), (1, 1));
    }

    #[test]
    fn test_density_grid_keeps_each_sets_payload() {
        let timeline = timeline_of(scenario_a_store());
        let point = |killer| HeatPoint { killer_id: Some(killer), ..HeatPoint::at(100.0, 100.0, 0) };
        let first = PointSet::new(vec![point(1)]);
        let second = PointSet::new(vec![point(7)]);

        let a = timeline.get_density_grid(&first, None, None);
        let b = timeline.get_density_grid(&second, None, None);
        assert_eq!(a[0].point.killer_id, Some(1));
        assert_eq!(b[0].point.killer_id, Some(7));
        assert_eq!(timeline.density_cache_stats(), (0, 2));
    }

    #[test]
    fn test_unknown_event_only_in_chronological_index() {
        let store = FrameStore::new(None, vec![frame_with_events(0, vec![unknown_event(10)])]);
        let timeline = timeline_of(store);

        assert_eq!(timeline.get_events_in_range(0, 0, None).len(), 1);
        let named: Vec<EventBucket> =
            EventBucket::ALL.into_iter().filter(|&b| b != EventBucket::Other).collect();
        assert!(timeline.get_events_in_range(0, 0, Some(&named)).is_empty());
    }

    #[test]
    fn test_controller_sized_to_frames() {
        let frames: Vec<_> = (0..41).map(|m| empty_frame(m * 60_000)).collect();
        let timeline = timeline_of(FrameStore::new(None, frames));
        let mut controller = timeline.playback_controller();

        assert_eq!(controller.max_position(), 40);
        assert_eq!(controller.seek(-5), PlaybackState::Paused(0));
        assert_eq!(controller.seek(999), PlaybackState::Paused(40));
    }

    #[test]
    fn test_empty_match() {
        let timeline = timeline_of(FrameStore::new(None, Vec::new()));

        assert!(timeline.events().is_empty());
        assert!(timeline.slice_at(0).is_none());
        assert!(timeline.slices_in_window(0, 3).is_empty());
        assert_eq!(timeline.playback_controller().max_position(), 0);
        assert_eq!(timeline.get_team_stats(TeamKey::Red).kills, 0);

        let context = timeline.get_chat_context(5, None);
        assert_eq!(context.current_frame, 0);
        assert_eq!(context.current_time, "0:00");
        assert!(context.timeline.current.is_none());
    }

    #[test]
    fn test_summary_supplies_identity_and_duration() {
        let timeline = MatchTimeline::from_dtos(
            sample_timeline(),
            Some(sample_summary()),
            EngineConfig::default(),
        )
        .with_main_participant(3);

        let ahri = timeline.get_participant_stats(3);
        assert_eq!(ahri.champion.as_deref(), Some("Ahri"));
        assert_eq!(timeline.get_player_timeline(3).len(), timeline.store().len());

        let context = timeline.get_chat_context(2, Some(7));
        assert_eq!(context.duration_minutes, 30.5);
        assert_eq!(context.main_player.as_ref().map(|p| p.id), Some(3));
        assert_eq!(context.selected_player.as_ref().map(|p| p.record.id), Some(7));
        assert_eq!(context.match_id.as_deref(), Some("NA1_42"));
    }

    #[test]
    fn test_indices_built_once() {
        let timeline = timeline_of(scenario_a_store());
        let first = timeline.events() as *const EventIndex;
        let second = timeline.events() as *const EventIndex;
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_range_is_ordered_subsequence(
            frames in frames_strategy(8, 4),
            a in 0usize..10,
            b in 0usize..10,
        ) {
            let timeline = timeline_of(FrameStore::new(None, frames));
            let all = timeline.events().all();

            let max = timeline.store().max_frame_index().unwrap_or(0);
            let full = timeline.get_events_in_range(0, max, None);
            prop_assert_eq!(full.len(), all.len());

            let (start, end) = (a.min(b), a.max(b));
            let range = timeline.get_events_in_range(start, end, None);
            let mut cursor = all.iter();
            for event in &range {
                prop_assert!((start..=end).contains(&event.frame_index));
                prop_assert!(cursor.any(|e| std::ptr::eq(e, *event)));
            }
        }

        #[test]
        fn prop_one_slice_per_frame_with_killer_attribution(frames in frames_strategy(8, 5)) {
            let timeline = timeline_of(FrameStore::new(None, frames.clone()));
            prop_assert_eq!(timeline.slices().len(), frames.len());

            for (i, frame) in frames.iter().enumerate() {
                let slice = timeline.slice_at(i).unwrap();
                prop_assert_eq!(slice.frame_index, i);
                let credited = frame
                    .events
                    .iter()
                    .filter_map(|e| match e {
                        crate::models::Event::ChampionKill(k) => k.killer_id,
                        _ => None,
                    })
                    .filter(|&id| (1..=10).contains(&id))
                    .count() as u32;
                prop_assert_eq!(
                    slice.team(TeamKey::Blue).kills + slice.team(TeamKey::Red).kills,
                    credited
                );
            }
        }

        #[test]
        fn prop_context_is_pure(frames in frames_strategy(6, 3), focus in 0usize..8) {
            let a = timeline_of(FrameStore::new(None, frames.clone()));
            let b = timeline_of(FrameStore::new(None, frames));
            let left = serde_json::to_string(&a.get_chat_context(focus, Some(2))).unwrap();
            let right = serde_json::to_string(&b.get_chat_context(focus, Some(2))).unwrap();
            prop_assert_eq!(&left, &right);

            // Warm indices and the density memo, then ask the same instance again.
            let _ = b.get_density_grid(b.kill_points(), None, None);
            let _ = b.get_events_in_range(0, focus, None);
            let again = serde_json::to_string(&b.get_chat_context(focus, Some(2))).unwrap();
            prop_assert_eq!(left, again);
        }
    }
}
