//! Proptest generators for frames, events and heatmap points.

use proptest::collection::vec;
use proptest::prelude::*;

use crate::models::{
    BuildingKillEvent, ChampionKillEvent, EliteMonsterKillEvent, Event, Frame, OtherEvent,
    ParticipantId, Position, WardEvent,
};
use crate::spatial::HeatPoint;
use crate::test_fixtures::frame_with_participants;

const MAP_SIZE: f64 = 15_000.0;

pub fn position_strategy() -> impl Strategy<Value = Position> {
    (0.0f64..=MAP_SIZE, 0.0f64..=MAP_SIZE).prop_map(|(x, y)| Position::new(x, y))
}

/// Includes id 0 (minions, turrets).
pub fn participant_strategy() -> impl Strategy<Value = ParticipantId> {
    0u32..=10
}

pub fn event_strategy(timestamp: i64) -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => (participant_strategy(), participant_strategy(), vec(1u32..=10, 0..4), proptest::option::of(position_strategy()))
            .prop_map(move |(killer, victim, assists, position)| {
                Event::ChampionKill(ChampionKillEvent {
                    timestamp: Some(timestamp),
                    killer_id: Some(killer),
                    victim_id: Some(victim),
                    assisting_participant_ids: assists,
                    position,
                    ..Default::default()
                })
            }),
        1 => (participant_strategy(), prop_oneof![Just("DRAGON"), Just("BARON_NASHOR"), Just("RIFTHERALD"), Just("HORDE")])
            .prop_map(move |(killer, monster)| {
                Event::EliteMonsterKill(EliteMonsterKillEvent {
                    timestamp: Some(timestamp),
                    killer_id: Some(killer),
                    monster_type: Some(monster.to_string()),
                    ..Default::default()
                })
            }),
        1 => (participant_strategy(), prop_oneof![Just(100u32), Just(200u32)], prop_oneof![Just("TOWER_BUILDING"), Just("INHIBITOR_BUILDING")])
            .prop_map(move |(killer, team_id, building)| {
                Event::BuildingKill(BuildingKillEvent {
                    timestamp: Some(timestamp),
                    killer_id: Some(killer),
                    team_id: Some(team_id),
                    building_type: Some(building.to_string()),
                    ..Default::default()
                })
            }),
        2 => (1u32..=10).prop_map(move |creator| {
            Event::WardPlaced(WardEvent {
                timestamp: Some(timestamp),
                creator_id: Some(creator),
                ..Default::default()
            })
        }),
        1 => Just(Event::Other(OtherEvent {
            kind: "LEVEL_UP".to_string(),
            timestamp: Some(timestamp),
            ..Default::default()
        })),
    ]
}

/// One frame per minute starting at 0, each with a full roster and up to
/// `max_events` events stamped inside the frame's minute.
pub fn frames_strategy(max_frames: usize, max_events: usize) -> impl Strategy<Value = Vec<Frame>> {
    (0..=max_frames).prop_flat_map(move |count| {
        let frames: Vec<_> = (0..count)
            .map(|i| {
                let timestamp = i as i64 * 60_000;
                (vec(event_strategy(timestamp), 0..=max_events), vec(0i64..20_000, 10))
                    .prop_map(move |(events, golds)| {
                        let players: Vec<_> = (1..=10).zip(golds).collect();
                        let mut frame = frame_with_participants(timestamp, &players);
                        frame.events = events;
                        frame
                    })
            })
            .collect();
        frames
    })
}

pub fn heat_point_strategy(max_minute: i64) -> impl Strategy<Value = HeatPoint> {
    (position_strategy(), 0..=max_minute * 60_000)
        .prop_map(|(pos, timestamp)| HeatPoint::at(pos.x, pos.y, timestamp))
}
