//! Frames, events and summaries shared by unit tests.

use std::collections::BTreeMap;

use crate::models::{
    BuildingKillEvent, ChampionKillEvent, EliteMonsterKillEvent, Event, Frame, MatchSummaryDto,
    MatchTimelineDto, OtherEvent, ParticipantFrame, ParticipantId, ParticipantSummary, Position,
    SummaryInfo, SummaryMetadata, TimelineInfo, TimelineMetadata, WardEvent,
};
use crate::store::FrameStore;

pub fn empty_frame(timestamp: i64) -> Frame {
    Frame { timestamp, ..Default::default() }
}

pub fn frame_with_events(timestamp: i64, events: Vec<Event>) -> Frame {
    Frame { timestamp, events, ..Default::default() }
}

/// `(id, total_gold)` pairs; xp and cs scale with gold.
pub fn frame_with_participants(timestamp: i64, players: &[(ParticipantId, i64)]) -> Frame {
    let participant_frames = players
        .iter()
        .map(|&(id, gold)| (id, participant_frame(gold)))
        .collect::<BTreeMap<_, _>>();
    Frame { timestamp, participant_frames, ..Default::default() }
}

fn participant_frame(gold: i64) -> ParticipantFrame {
    ParticipantFrame {
        position: Some(Position::new(1000.0, 1000.0)),
        level: 1 + (gold / 1000) as u32,
        total_gold: gold,
        current_gold: gold / 4,
        xp: gold / 2,
        minions_killed: gold / 100,
        jungle_minions_killed: 0,
        champion_stats: None,
    }
}

pub fn kill_event(
    timestamp: i64,
    killer: ParticipantId,
    victim: ParticipantId,
    assists: &[ParticipantId],
    position: Option<(f64, f64)>,
) -> Event {
    Event::ChampionKill(ChampionKillEvent {
        timestamp: Some(timestamp),
        killer_id: Some(killer),
        victim_id: Some(victim),
        assisting_participant_ids: assists.to_vec(),
        position: position.map(|(x, y)| Position::new(x, y)),
        bounty: Some(300),
        ..Default::default()
    })
}

pub fn monster_kill(
    timestamp: i64,
    killer: ParticipantId,
    monster_type: &str,
    sub_type: Option<&str>,
) -> Event {
    Event::EliteMonsterKill(EliteMonsterKillEvent {
        timestamp: Some(timestamp),
        killer_id: Some(killer),
        monster_type: Some(monster_type.to_string()),
        monster_sub_type: sub_type.map(str::to_string),
        position: Some(Position::new(9866.0, 4414.0)),
        ..Default::default()
    })
}

/// `team_id` is the team that owned the building.
pub fn building_kill(
    timestamp: i64,
    killer: ParticipantId,
    team_id: u32,
    building_type: &str,
) -> Event {
    Event::BuildingKill(BuildingKillEvent {
        timestamp: Some(timestamp),
        killer_id: Some(killer),
        team_id: Some(team_id),
        building_type: Some(building_type.to_string()),
        lane_type: Some("MID_LANE".to_string()),
        position: Some(Position::new(5846.0, 6396.0)),
        ..Default::default()
    })
}

pub fn ward_placed(timestamp: i64, creator: ParticipantId) -> Event {
    Event::WardPlaced(WardEvent {
        timestamp: Some(timestamp),
        creator_id: Some(creator),
        ward_type: Some("YELLOW_TRINKET".to_string()),
        ..Default::default()
    })
}

pub fn unknown_event(timestamp: i64) -> Event {
    Event::Other(OtherEvent {
        kind: "UNKNOWN_FUTURE_EVENT".to_string(),
        timestamp: Some(timestamp),
        fields: BTreeMap::new(),
    })
}

/// Summary row; team follows the 5v5 partition, name is `Summoner{id}`.
pub fn summary_participant(id: ParticipantId, champion: &str) -> ParticipantSummary {
    ParticipantSummary {
        participant_id: id,
        puuid: Some(format!("puuid-{id}")),
        summoner_name: Some(format!("Summoner{id}")),
        riot_id_game_name: None,
        champion_name: Some(champion.to_string()),
        team_id: Some(if id <= 5 { 100 } else { 200 }),
        team_position: Some("MIDDLE".to_string()),
        champ_level: Some(12),
        ..Default::default()
    }
}

/// Ten players with gold growing per minute.
fn full_roster(timestamp: i64) -> Frame {
    let minute = timestamp / 60_000;
    let players: Vec<(ParticipantId, i64)> =
        (1..=10).map(|id| (id, 500 + minute * (300 + i64::from(id) * 10))).collect();
    frame_with_participants(timestamp, &players)
}

/// Four frames: kills in frames 1 and 2, a dragon in 2, a tower in 3.
pub fn sample_frames() -> Vec<Frame> {
    let mut frames: Vec<Frame> = (0..4).map(|m| full_roster(m * 60_000)).collect();
    frames[1].events = vec![
        ward_placed(62_000, 4),
        kill_event(75_000, 1, 6, &[2], Some((3000.0, 4000.0))),
    ];
    frames[2].events = vec![
        kill_event(100_000, 7, 3, &[8, 9], Some((7000.0, 7100.0))),
        monster_kill(110_000, 2, "DRAGON", Some("FIRE_DRAGON")),
        kill_event(115_000, 2, 7, &[], Some((9000.0, 4500.0))),
    ];
    frames[3].events = vec![building_kill(170_000, 5, 200, "TOWER_BUILDING")];
    frames
}

pub fn sample_summary() -> MatchSummaryDto {
    let champions = [
        "Garen", "Lee Sin", "Ahri", "Jinx", "Thresh", "Darius", "Vi", "Syndra", "Caitlyn", "Lulu",
    ];
    let participants = champions
        .iter()
        .zip(1..)
        .map(|(champion, id)| {
            let mut p = summary_participant(id, champion);
            p.gold_earned = 8_000 + u64::from(id) * 100;
            p.total_damage_dealt_to_champions = 10_000 + u64::from(id) * 500;
            p
        })
        .collect();

    MatchSummaryDto {
        metadata: Some(SummaryMetadata { match_id: Some("NA1_42".to_string()), participants: vec![] }),
        info: SummaryInfo { game_id: Some(42), game_duration: Some(1_830), participants },
    }
}

pub fn sample_timeline() -> MatchTimelineDto {
    MatchTimelineDto {
        metadata: Some(TimelineMetadata { match_id: Some("NA1_42".to_string()), participants: vec![] }),
        info: TimelineInfo { frame_interval: Some(60_000), frames: sample_frames() },
    }
}

/// Three frames; frame 1 holds a single blue kill at (100, 200).
pub fn scenario_a_store() -> FrameStore {
    FrameStore::new(
        Some("SCENARIO_A".to_string()),
        vec![
            empty_frame(0),
            frame_with_events(60_000, vec![kill_event(60_500, 1, 6, &[], Some((100.0, 200.0)))]),
            empty_frame(120_000),
        ],
    )
}
