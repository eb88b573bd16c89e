//! Derived indices over one match: participants, events, timeline slices and
//! the full-match team rollups built from them.

pub mod events;
pub mod participants;
pub mod timeline;

pub use events::{
    BuildingDetail, EventBucket, EventCategory, EventDetail, EventIndex, IndexedEvent, ItemAction,
    ItemDetail, KillDetail, MonsterDetail, OtherDetail, ParticipantRef, SkillDetail, WardAction,
    WardDetail,
};
pub use participants::{
    DamageStats, GoldStats, KdaStats, Loadout, ObjectiveCounts, ParticipantIndex,
    ParticipantRecord, ParticipantStats, TeamTable, VisionStats,
};
pub use timeline::{NotableKill, PlayerTimelinePoint, TeamSlice, TeamTotals, TimelineSlices};

use schemars::JsonSchema;
use serde::Serialize;

use crate::models::{ParticipantId, TeamKey, TeamPair};

/// Full-match aggregate for one team.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    /// 100 / 200.
    pub team_id: u32,
    pub team: TeamKey,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub gold: i64,
    pub xp: i64,
    pub cs: i64,
    pub damage: u64,
    pub objectives: ObjectiveCounts,
    pub players: Vec<ParticipantId>,
}

impl TeamStats {
    fn empty(team: TeamKey) -> Self {
        Self {
            team_id: team.team_id(),
            team,
            name: team.display_name().to_string(),
            kills: 0,
            deaths: 0,
            assists: 0,
            gold: 0,
            xp: 0,
            cs: 0,
            damage: 0,
            objectives: ObjectiveCounts::default(),
            players: Vec::new(),
        }
    }
}

/// Roll up both teams.
///
/// Kills, deaths and assists come from champion-kill events so they are
/// available without a summary. Gold, xp and cs are the last frame's totals,
/// falling back to summary totals when the match has no frames. Damage is
/// summary-only.
pub fn build_team_stats(
    participants: &ParticipantIndex,
    events: &EventIndex,
    slices: &TimelineSlices,
) -> TeamPair<TeamStats> {
    let mut teams = TeamPair::new(TeamStats::empty(TeamKey::Blue), TeamStats::empty(TeamKey::Red));
    let table = participants.team_table();

    for record in participants.iter() {
        let Some(team) = record.team else { continue };
        let stats = teams.get_mut(team);
        stats.players.push(record.id);
        stats.damage += record.stats.damage.dealt;
    }

    for event in events.all() {
        match &event.detail {
            EventDetail::Kill(kill) => {
                if let Some(team) = kill.killer.as_ref().and_then(|k| k.team) {
                    teams.get_mut(team).kills += 1;
                }
                if let Some(team) = kill.victim.as_ref().and_then(|v| v.team) {
                    teams.get_mut(team).deaths += 1;
                }
                for assister in &kill.assisters {
                    if let Some(team) = table.team_of(assister.id) {
                        teams.get_mut(team).assists += 1;
                    }
                }
            }
            EventDetail::Monster(_) | EventDetail::Building(_) => {
                let Some(team) = event.detail.credited_team() else { continue };
                let objectives = &mut teams.get_mut(team).objectives;
                match event.category {
                    EventCategory::Dragon => objectives.dragons += 1,
                    EventCategory::Baron => objectives.barons += 1,
                    EventCategory::Herald => objectives.heralds += 1,
                    EventCategory::Tower => objectives.towers += 1,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    match slices.last() {
        Some(last) => {
            for team in TeamKey::ALL {
                let totals = last.team(team);
                let stats = teams.get_mut(team);
                stats.gold = totals.gold;
                stats.xp = totals.xp;
                stats.cs = totals.cs;
            }
        }
        None => {
            for record in participants.iter() {
                let Some(team) = record.team else { continue };
                let stats = teams.get_mut(team);
                stats.gold += i64::try_from(record.stats.gold.earned).unwrap_or(i64::MAX);
                stats.cs += i64::try_from(record.stats.cs).unwrap_or(i64::MAX);
            }
        }
    }

    teams
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        building_kill, frame_with_events, kill_event, monster_kill, scenario_a_store,
        summary_participant,
    };

    fn stats_for(frames: &[crate::models::Frame]) -> TeamPair<TeamStats> {
        let participants = ParticipantIndex::build(frames, &[], 5);
        let events = EventIndex::build(frames, &participants);
        let slices = TimelineSlices::build(frames, participants.team_table());
        build_team_stats(&participants, &events, &slices)
    }

    #[test]
    fn test_single_kill_credits_blue() {
        let store = scenario_a_store();
        let teams = stats_for(store.frames());

        assert_eq!(teams.blue.kills, 1);
        assert_eq!(teams.red.kills, 0);
        assert_eq!(teams.red.deaths, 1);
        assert_eq!(teams.blue.team_id, 100);
        assert_eq!(teams.red.name, "Red Team");
    }

    #[test]
    fn test_assists_and_objectives() {
        let frames = vec![frame_with_events(
            600_000,
            vec![
                kill_event(600_000, 6, 1, &[7, 8], None),
                monster_kill(601_000, 2, "DRAGON", Some("AIR_DRAGON")),
                monster_kill(602_000, 9, "RIFTHERALD", None),
                building_kill(603_000, 3, 200, "TOWER_BUILDING"),
                building_kill(604_000, 0, 200, "INHIBITOR_BUILDING"),
            ],
        )];
        let teams = stats_for(&frames);

        assert_eq!(teams.red.kills, 1);
        assert_eq!(teams.red.assists, 2);
        assert_eq!(teams.blue.deaths, 1);
        assert_eq!(teams.blue.objectives.dragons, 1);
        assert_eq!(teams.blue.objectives.towers, 1);
        assert_eq!(teams.red.objectives.heralds, 1);
        assert_eq!(teams.blue.objectives.total(), 2);
    }

    #[test]
    fn test_gold_falls_back_to_summary_without_frames() {
        let mut garen = summary_participant(1, "Garen");
        garen.gold_earned = 12_000;
        garen.total_damage_dealt_to_champions = 20_000;
        let participants = ParticipantIndex::build(&[], &[garen], 5);
        let events = EventIndex::build(&[], &participants);
        let slices = TimelineSlices::build(&[], participants.team_table());

        let teams = build_team_stats(&participants, &events, &slices);
        assert_eq!(teams.blue.gold, 12_000);
        assert_eq!(teams.blue.damage, 20_000);
        assert_eq!(teams.blue.players, vec![1]);
        assert!(teams.red.players.is_empty());
    }
}
