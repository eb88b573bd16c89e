use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::types::{null_as_default, ParticipantId, Position};

/// Timeline event, keyed by its `type` tag.
///
/// Every variant-specific field is optional: a `CHAMPION_KILL` without a
/// `victimId` still parses as a kill. Any tag this crate does not model is
/// kept as [`Event::Other`] together with its remaining fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventRepr", into = "EventRepr")]
pub enum Event {
    ChampionKill(ChampionKillEvent),
    EliteMonsterKill(EliteMonsterKillEvent),
    BuildingKill(BuildingKillEvent),
    WardPlaced(WardEvent),
    WardKill(WardEvent),
    ItemPurchased(ItemEvent),
    ItemSold(ItemEvent),
    ItemDestroyed(ItemEvent),
    ItemUndo(ItemUndoEvent),
    SkillLevelUp(SkillLevelUpEvent),
    Other(OtherEvent),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionKillEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victim_id: Option<ParticipantId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assisting_participant_ids: Vec<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_bounty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_streak_length: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliteMonsterKillEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_team_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monster_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monster_sub_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assisting_participant_ids: Vec<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounty: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingKillEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_id: Option<ParticipantId>,
    /// Team that owned the destroyed building.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tower_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assisting_participant_ids: Vec<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounty: Option<i64>,
}

/// `WARD_PLACED` carries `creatorId`, `WARD_KILL` carries `killerId`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUndoEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_gain: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLevelUpEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_slot: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_up_type: Option<String>,
}

/// Event with a tag outside the modeled set (e.g. `LEVEL_UP`, `GAME_END`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Event {
    /// Source `type` tag.
    pub fn type_name(&self) -> &str {
        match self {
            Event::ChampionKill(_) => "CHAMPION_KILL",
            Event::EliteMonsterKill(_) => "ELITE_MONSTER_KILL",
            Event::BuildingKill(_) => "BUILDING_KILL",
            Event::WardPlaced(_) => "WARD_PLACED",
            Event::WardKill(_) => "WARD_KILL",
            Event::ItemPurchased(_) => "ITEM_PURCHASED",
            Event::ItemSold(_) => "ITEM_SOLD",
            Event::ItemDestroyed(_) => "ITEM_DESTROYED",
            Event::ItemUndo(_) => "ITEM_UNDO",
            Event::SkillLevelUp(_) => "SKILL_LEVEL_UP",
            Event::Other(other) => &other.kind,
        }
    }

    /// Event time in ms, when the source carried one.
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Event::ChampionKill(e) => e.timestamp,
            Event::EliteMonsterKill(e) => e.timestamp,
            Event::BuildingKill(e) => e.timestamp,
            Event::WardPlaced(e) | Event::WardKill(e) => e.timestamp,
            Event::ItemPurchased(e) | Event::ItemSold(e) | Event::ItemDestroyed(e) => e.timestamp,
            Event::ItemUndo(e) => e.timestamp,
            Event::SkillLevelUp(e) => e.timestamp,
            Event::Other(e) => e.timestamp,
        }
    }

    /// Map anchor; `None` means the event is not tied to a location.
    pub fn position(&self) -> Option<Position> {
        match self {
            Event::ChampionKill(e) => e.position,
            Event::EliteMonsterKill(e) => e.position,
            Event::BuildingKill(e) => e.position,
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum KnownEvent {
    ChampionKill(ChampionKillEvent),
    EliteMonsterKill(EliteMonsterKillEvent),
    BuildingKill(BuildingKillEvent),
    WardPlaced(WardEvent),
    WardKill(WardEvent),
    ItemPurchased(ItemEvent),
    ItemSold(ItemEvent),
    ItemDestroyed(ItemEvent),
    ItemUndo(ItemUndoEvent),
    SkillLevelUp(SkillLevelUpEvent),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EventRepr {
    Known(KnownEvent),
    Other(OtherEvent),
}

impl From<EventRepr> for Event {
    fn from(repr: EventRepr) -> Self {
        match repr {
            EventRepr::Known(known) => match known {
                KnownEvent::ChampionKill(e) => Event::ChampionKill(e),
                KnownEvent::EliteMonsterKill(e) => Event::EliteMonsterKill(e),
                KnownEvent::BuildingKill(e) => Event::BuildingKill(e),
                KnownEvent::WardPlaced(e) => Event::WardPlaced(e),
                KnownEvent::WardKill(e) => Event::WardKill(e),
                KnownEvent::ItemPurchased(e) => Event::ItemPurchased(e),
                KnownEvent::ItemSold(e) => Event::ItemSold(e),
                KnownEvent::ItemDestroyed(e) => Event::ItemDestroyed(e),
                KnownEvent::ItemUndo(e) => Event::ItemUndo(e),
                KnownEvent::SkillLevelUp(e) => Event::SkillLevelUp(e),
            },
            EventRepr::Other(other) => Event::Other(other),
        }
    }
}

impl From<Event> for EventRepr {
    fn from(event: Event) -> Self {
        let known = match event {
            Event::ChampionKill(e) => KnownEvent::ChampionKill(e),
            Event::EliteMonsterKill(e) => KnownEvent::EliteMonsterKill(e),
            Event::BuildingKill(e) => KnownEvent::BuildingKill(e),
            Event::WardPlaced(e) => KnownEvent::WardPlaced(e),
            Event::WardKill(e) => KnownEvent::WardKill(e),
            Event::ItemPurchased(e) => KnownEvent::ItemPurchased(e),
            Event::ItemSold(e) => KnownEvent::ItemSold(e),
            Event::ItemDestroyed(e) => KnownEvent::ItemDestroyed(e),
            Event::ItemUndo(e) => KnownEvent::ItemUndo(e),
            Event::SkillLevelUp(e) => KnownEvent::SkillLevelUp(e),
            Event::Other(other) => return EventRepr::Other(other),
        };
        EventRepr::Known(known)
    }
}
