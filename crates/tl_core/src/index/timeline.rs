//! Per-frame team aggregates and per-player progress points.

use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

use super::participants::TeamTable;
use crate::models::{Event, Frame, ParticipantId, TeamKey, TeamPair};

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamTotals {
    pub gold: i64,
    pub xp: i64,
    pub cs: i64,
    /// Champion kills credited to this team within the frame.
    pub kills: u32,
    /// Running total of `kills` up to and including the frame.
    pub cumulative_kills: u32,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotableKill {
    pub frame_index: usize,
    pub timestamp: Option<i64>,
    pub killer: Option<ParticipantId>,
    pub victim: Option<ParticipantId>,
    pub killer_team: Option<TeamKey>,
}

/// Aggregate record for one frame.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSlice {
    pub minute: u32,
    pub frame_index: usize,
    pub teams: TeamPair<TeamTotals>,
    /// Always `blue.gold - red.gold`.
    pub gold_diff: i64,
    pub notable_events: Vec<NotableKill>,
}

impl TeamSlice {
    pub fn team(&self, team: TeamKey) -> &TeamTotals {
        self.teams.get(team)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct PlayerTimelinePoint {
    pub minute: u32,
    pub gold: i64,
    pub xp: i64,
    pub cs: i64,
    pub level: u32,
}

/// One [`TeamSlice`] per frame, index-aligned with the frame array.
#[derive(Debug, Clone, Default)]
pub struct TimelineSlices {
    slices: Vec<TeamSlice>,
    players: BTreeMap<ParticipantId, Vec<PlayerTimelinePoint>>,
}

impl TimelineSlices {
    pub fn build(frames: &[Frame], teams: &TeamTable) -> Self {
        let mut slices = Vec::with_capacity(frames.len());
        let mut players: BTreeMap<ParticipantId, Vec<PlayerTimelinePoint>> = BTreeMap::new();
        let mut running = TeamPair::new(0u32, 0u32);

        for (frame_index, frame) in frames.iter().enumerate() {
            let minute = frame.minute();
            let mut totals: TeamPair<TeamTotals> = TeamPair::default();

            for (&id, pf) in &frame.participant_frames {
                if let Some(team) = teams.team_of(id) {
                    let bucket = totals.get_mut(team);
                    bucket.gold += pf.total_gold;
                    bucket.xp += pf.xp;
                    bucket.cs += pf.cs();
                }
                if id != 0 {
                    players.entry(id).or_default().push(PlayerTimelinePoint {
                        minute,
                        gold: pf.total_gold,
                        xp: pf.xp,
                        cs: pf.cs(),
                        level: pf.level.max(1),
                    });
                }
            }

            let mut notable_events = Vec::new();
            for event in &frame.events {
                let Event::ChampionKill(kill) = event else { continue };
                let killer_team = kill.killer_id.and_then(|id| teams.team_of(id));
                if let Some(team) = killer_team {
                    totals.get_mut(team).kills += 1;
                }
                notable_events.push(NotableKill {
                    frame_index,
                    timestamp: kill.timestamp,
                    killer: kill.killer_id,
                    victim: kill.victim_id,
                    killer_team,
                });
            }

            for team in TeamKey::ALL {
                let cumulative = running.get_mut(team);
                *cumulative += totals.get(team).kills;
                totals.get_mut(team).cumulative_kills = *cumulative;
            }

            let gold_diff = totals.blue.gold - totals.red.gold;
            slices.push(TeamSlice { minute, frame_index, teams: totals, gold_diff, notable_events });
        }

        tracing::debug!(slices = slices.len(), players = players.len(), "timeline slices built");
        Self { slices, players }
    }

    pub fn all(&self) -> &[TeamSlice] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn slice_at(&self, frame_index: usize) -> Option<&TeamSlice> {
        self.slices.get(frame_index)
    }

    pub fn last(&self) -> Option<&TeamSlice> {
        self.slices.last()
    }

    /// `[center - radius, center + radius]` clamped to the slice array.
    pub fn slices_in_window(&self, center: usize, radius: usize) -> &[TeamSlice] {
        let Some(max) = self.slices.len().checked_sub(1) else {
            return &[];
        };
        let center = center.min(max);
        let lo = center.saturating_sub(radius);
        let hi = center.saturating_add(radius).min(max);
        &self.slices[lo..=hi]
    }

    /// Slices on an `every_minutes` boundary, plus those within `radius` of `focus`.
    pub fn sampled(&self, every_minutes: u32, focus: usize, radius: usize) -> Vec<&TeamSlice> {
        let every = every_minutes.max(1);
        self.slices
            .iter()
            .filter(|s| s.minute % every == 0 || s.frame_index.abs_diff(focus) <= radius)
            .collect()
    }

    /// Per-frame progress for one participant; empty when never seen.
    pub fn player_timeline(&self, id: ParticipantId) -> &[PlayerTimelinePoint] {
        self.players.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `player_timeline` reduced to every `every_minutes`-th minute.
    pub fn player_timeline_sampled(
        &self,
        id: ParticipantId,
        every_minutes: u32,
    ) -> Vec<PlayerTimelinePoint> {
        let every = every_minutes.max(1);
        self.player_timeline(id).iter().filter(|p| p.minute % every == 0).cloned().collect()
    }
}
