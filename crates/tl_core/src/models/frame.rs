use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::events::Event;
use super::types::{null_as_default, ParticipantId, Position};

/// Match timeline document as delivered by the fetch layer.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MatchTimelineDto {
    #[serde(default)]
    pub metadata: Option<TimelineMetadata>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: TimelineInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetadata {
    #[serde(default)]
    pub match_id: Option<String>,
    /// Participant puuids in participant-id order (index 0 = participant 1).
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimelineInfo {
    /// Nominal spacing between frames in ms (60000 for live matches).
    #[serde(default)]
    pub frame_interval: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub frames: Vec<Frame>,
}

/// One periodic snapshot of match state.
///
/// Missing `participantFrames` / `events` deserialize as empty, so a malformed
/// frame still occupies its index.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Milliseconds from match start.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participant_frames: BTreeMap<ParticipantId, ParticipantFrame>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

impl Frame {
    /// Frame minute (rounded), the unit used by team slices.
    pub fn minute(&self) -> u32 {
        let minutes = (self.timestamp as f64 / 60_000.0).round();
        if minutes.is_finite() && minutes > 0.0 {
            minutes as u32
        } else {
            0
        }
    }

    /// Frame time in fractional minutes.
    pub fn minutes_f64(&self) -> f64 {
        self.timestamp as f64 / 60_000.0
    }
}

/// Per-participant snapshot inside a frame.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFrame {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_gold: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_gold: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub xp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub minions_killed: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jungle_minions_killed: i64,
    #[serde(default)]
    pub champion_stats: Option<ChampionStats>,
}

impl ParticipantFrame {
    pub fn cs(&self) -> i64 {
        self.minions_killed + self.jungle_minions_killed
    }
}

/// Health/mana/offense/defense block.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub health: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_max: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub power: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub power_max: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub armor: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub magic_resist: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attack_damage: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ability_power: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attack_speed: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub movement_speed: i64,
}
