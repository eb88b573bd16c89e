//! Typed, chronologically ordered event index.
//!
//! Every event of every frame lands in [`EventIndex::all`] exactly once, in
//! `(frame index, source order)` order. Category buckets hold indices into
//! that list, so an event qualifying for several buckets (a dragon is both a
//! dragon and an objective) is stored once.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::participants::ParticipantIndex;
use crate::models::{
    BuildingKillEvent, ChampionKillEvent, EliteMonsterKillEvent, Event, Frame, ParticipantId,
    Position, TeamKey,
};

const DRAGON: &str = "DRAGON";
const BARON: &str = "BARON_NASHOR";
const HERALD_SOURCE: &str = "RIFTHERALD";
const HERALD: &str = "RIFT_HERALD";
const TOWER: &str = "TOWER_BUILDING";
const INHIBITOR: &str = "INHIBITOR_BUILDING";

/// Exactly one category per event.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Kill,
    Dragon,
    Baron,
    Herald,
    /// Elite monster with a missing or unrecognized monster type.
    EpicMonster,
    Tower,
    Inhibitor,
    Ward,
    Item,
    Skill,
    Other,
}

impl EventCategory {
    /// Buckets an event of this category is appended to.
    pub fn buckets(self) -> &'static [EventBucket] {
        use EventBucket as B;
        match self {
            EventCategory::Kill => &[B::Kills],
            EventCategory::Dragon => &[B::Dragons, B::Objectives],
            EventCategory::Baron => &[B::Barons, B::Objectives],
            EventCategory::Herald => &[B::Heralds, B::Objectives],
            EventCategory::EpicMonster => &[B::Objectives],
            EventCategory::Tower => &[B::Towers, B::Objectives],
            EventCategory::Inhibitor => &[B::Inhibitors],
            EventCategory::Ward => &[B::Wards],
            EventCategory::Item => &[B::Items],
            EventCategory::Skill => &[B::Skills],
            EventCategory::Other => &[B::Other],
        }
    }

    pub fn in_bucket(self, bucket: EventBucket) -> bool {
        self.buckets().contains(&bucket)
    }
}

/// Named, queryable event lists.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventBucket {
    Kills,
    Dragons,
    Barons,
    Heralds,
    Towers,
    Objectives,
    Inhibitors,
    Wards,
    Items,
    Skills,
    Other,
}

const BUCKET_COUNT: usize = 11;

impl EventBucket {
    pub const ALL: [EventBucket; BUCKET_COUNT] = [
        EventBucket::Kills,
        EventBucket::Dragons,
        EventBucket::Barons,
        EventBucket::Heralds,
        EventBucket::Towers,
        EventBucket::Objectives,
        EventBucket::Inhibitors,
        EventBucket::Wards,
        EventBucket::Items,
        EventBucket::Skills,
        EventBucket::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventBucket::Kills => "kills",
            EventBucket::Dragons => "dragons",
            EventBucket::Barons => "barons",
            EventBucket::Heralds => "heralds",
            EventBucket::Towers => "towers",
            EventBucket::Objectives => "objectives",
            EventBucket::Inhibitors => "inhibitors",
            EventBucket::Wards => "wards",
            EventBucket::Items => "items",
            EventBucket::Skills => "skills",
            EventBucket::Other => "other",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EventBucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == wanted)
            .ok_or_else(|| format!("unknown event bucket '{s}'"))
    }
}

/// Participant reference resolved through the participant index.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ParticipantRef {
    pub id: ParticipantId,
    pub name: String,
    pub champion: Option<String>,
    pub team: Option<TeamKey>,
}

impl ParticipantRef {
    fn resolve(participants: &ParticipantIndex, id: ParticipantId) -> Self {
        let record = participants.get(id);
        Self {
            id,
            name: record.name.clone(),
            champion: record.champion.clone(),
            team: record.team,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KillDetail {
    pub killer: Option<ParticipantRef>,
    pub victim: Option<ParticipantRef>,
    pub assisters: Vec<ParticipantRef>,
    pub position: Option<Position>,
    pub bounty: Option<i64>,
    pub shutdown_bounty: Option<i64>,
    pub kill_streak_length: Option<u32>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonsterDetail {
    /// Source monster type; `RIFTHERALD` is reported as `RIFT_HERALD`.
    pub monster_type: Option<String>,
    pub monster_sub_type: Option<String>,
    /// Dragon element, only set for dragons.
    pub dragon_type: Option<String>,
    pub killer: Option<ParticipantRef>,
    /// Team credited with the kill.
    pub team: Option<TeamKey>,
    pub assisters: Vec<ParticipantRef>,
    pub position: Option<Position>,
    pub bounty: Option<i64>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingDetail {
    pub building_type: Option<String>,
    pub lane_type: Option<String>,
    pub tower_type: Option<String>,
    pub killer: Option<ParticipantRef>,
    /// Team credited with the destruction.
    pub team: Option<TeamKey>,
    /// Team that owned the building.
    pub owner_team: Option<TeamKey>,
    pub assisters: Vec<ParticipantRef>,
    pub position: Option<Position>,
    pub bounty: Option<i64>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WardAction {
    Placed,
    Killed,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WardDetail {
    pub action: WardAction,
    pub participant: Option<ParticipantRef>,
    pub ward_type: Option<String>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Purchased,
    Sold,
    Destroyed,
    Undo,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub action: ItemAction,
    pub participant: Option<ParticipantRef>,
    pub item_id: Option<u32>,
    pub before_id: Option<u32>,
    pub after_id: Option<u32>,
    pub gold_gain: Option<i64>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillDetail {
    pub participant: Option<ParticipantRef>,
    pub skill_slot: Option<u32>,
    pub level_up_type: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct OtherDetail {
    pub fields: BTreeMap<String, Value>,
}

/// Category-specific payload with resolved references.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetail {
    Kill(KillDetail),
    Monster(MonsterDetail),
    Building(BuildingDetail),
    Ward(WardDetail),
    Item(ItemDetail),
    Skill(SkillDetail),
    Other(OtherDetail),
}

impl EventDetail {
    /// Team credited with a kill, monster or building.
    pub fn credited_team(&self) -> Option<TeamKey> {
        match self {
            EventDetail::Kill(kill) => kill.killer.as_ref().and_then(|k| k.team),
            EventDetail::Monster(monster) => monster.team,
            EventDetail::Building(building) => building.team,
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            EventDetail::Kill(kill) => kill.position,
            EventDetail::Monster(monster) => monster.position,
            EventDetail::Building(building) => building.position,
            _ => None,
        }
    }
}

/// One entry of the chronological list.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexedEvent {
    pub frame_index: usize,
    /// Frame time in fractional minutes.
    pub minute: f64,
    /// Event time in ms when the source carried one.
    pub timestamp: Option<i64>,
    pub category: EventCategory,
    /// Source `type` tag.
    pub event_type: String,
    /// Everyone involved, first-seen order, no duplicates, never `0`.
    pub participants: Vec<ParticipantId>,
    pub detail: EventDetail,
}

impl IndexedEvent {
    pub fn involves(&self, id: ParticipantId) -> bool {
        self.participants.contains(&id)
    }
}

/// Chronological event list plus per-bucket index lists.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    all: Vec<IndexedEvent>,
    buckets: [Vec<usize>; BUCKET_COUNT],
}

impl EventIndex {
    /// One linear pass over `(frame index, event)` pairs.
    pub fn build(frames: &[Frame], participants: &ParticipantIndex) -> Self {
        let mut index = EventIndex::default();

        for (frame_index, frame) in frames.iter().enumerate() {
            let minute = frame.minutes_f64();
            for event in &frame.events {
                let (category, detail, involved) = classify(event, participants);
                let position = index.all.len();
                for bucket in category.buckets() {
                    index.buckets[bucket.slot()].push(position);
                }
                index.all.push(IndexedEvent {
                    frame_index,
                    minute,
                    timestamp: event.timestamp(),
                    category,
                    event_type: event.type_name().to_string(),
                    participants: involved,
                    detail,
                });
            }
        }

        tracing::debug!(
            events = index.all.len(),
            kills = index.count(EventBucket::Kills),
            objectives = index.count(EventBucket::Objectives),
            other = index.count(EventBucket::Other),
            "event index built"
        );
        index
    }

    /// Every event in chronological order.
    pub fn all(&self) -> &[IndexedEvent] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn bucket(&self, bucket: EventBucket) -> impl Iterator<Item = &IndexedEvent> + '_ {
        self.buckets[bucket.slot()].iter().map(move |&i| &self.all[i])
    }

    pub fn count(&self, bucket: EventBucket) -> usize {
        self.buckets[bucket.slot()].len()
    }

    pub fn first(&self, bucket: EventBucket) -> Option<&IndexedEvent> {
        self.buckets[bucket.slot()].first().map(|&i| &self.all[i])
    }

    /// Events with `start <= frame_index <= end`, chronological.
    ///
    /// `buckets = None` returns every event; otherwise an event is kept when it
    /// belongs to any of the requested buckets.
    pub fn events_in_range(
        &self,
        start: usize,
        end: usize,
        buckets: Option<&[EventBucket]>,
    ) -> Vec<&IndexedEvent> {
        if start > end {
            return Vec::new();
        }
        let lo = self.all.partition_point(|e| e.frame_index < start);
        let hi = self.all.partition_point(|e| e.frame_index <= end);

        self.all[lo..hi]
            .iter()
            .filter(|event| match buckets {
                None => true,
                Some(wanted) => wanted.iter().any(|&b| event.category.in_bucket(b)),
            })
            .collect()
    }

    pub fn involving(&self, id: ParticipantId) -> Vec<&IndexedEvent> {
        self.all.iter().filter(|event| event.involves(id)).collect()
    }

    /// Bucket entries with `|frame_index - focus| <= window`.
    pub fn recent(&self, bucket: EventBucket, focus: usize, window: usize) -> Vec<&IndexedEvent> {
        self.bucket(bucket).filter(|event| event.frame_index.abs_diff(focus) <= window).collect()
    }
}

fn classify(
    event: &Event,
    participants: &ParticipantIndex,
) -> (EventCategory, EventDetail, Vec<ParticipantId>) {
    let resolve = |id: Option<ParticipantId>| {
        id.filter(|&id| id != 0).map(|id| ParticipantRef::resolve(participants, id))
    };
    let resolve_all = |ids: &[ParticipantId]| -> Vec<ParticipantRef> {
        ids.iter()
            .filter(|&&id| id != 0)
            .map(|&id| ParticipantRef::resolve(participants, id))
            .collect()
    };

    match event {
        Event::ChampionKill(kill) => {
            let detail = kill_detail(
                kill,
                resolve(kill.killer_id),
                resolve(kill.victim_id),
                resolve_all(&kill.assisting_participant_ids),
            );
            let involved = involved(
                [kill.killer_id, kill.victim_id].into_iter().flatten(),
                &kill.assisting_participant_ids,
            );
            (EventCategory::Kill, EventDetail::Kill(detail), involved)
        }
        Event::EliteMonsterKill(monster) => {
            let killer = resolve(monster.killer_id);
            let assisters = resolve_all(&monster.assisting_participant_ids);
            let (category, detail) = monster_detail(monster, killer, assisters);
            let involved = involved(monster.killer_id, &monster.assisting_participant_ids);
            (category, EventDetail::Monster(detail), involved)
        }
        Event::BuildingKill(building) => {
            let killer = resolve(building.killer_id);
            let assisters = resolve_all(&building.assisting_participant_ids);
            let (category, detail) = building_detail(building, killer, assisters);
            let involved = involved(building.killer_id, &building.assisting_participant_ids);
            (category, EventDetail::Building(detail), involved)
        }
        Event::WardPlaced(ward) | Event::WardKill(ward) => {
            let (action, actor) = match event {
                Event::WardPlaced(_) => (WardAction::Placed, ward.creator_id),
                _ => (WardAction::Killed, ward.killer_id),
            };
            let detail =
                WardDetail { action, participant: resolve(actor), ward_type: ward.ward_type.clone() };
            (EventCategory::Ward, EventDetail::Ward(detail), involved(actor, &[]))
        }
        Event::ItemPurchased(item) | Event::ItemSold(item) | Event::ItemDestroyed(item) => {
            let action = match event {
                Event::ItemPurchased(_) => ItemAction::Purchased,
                Event::ItemSold(_) => ItemAction::Sold,
                _ => ItemAction::Destroyed,
            };
            let detail = ItemDetail {
                action,
                participant: resolve(item.participant_id),
                item_id: item.item_id,
                before_id: None,
                after_id: None,
                gold_gain: None,
            };
            (EventCategory::Item, EventDetail::Item(detail), involved(item.participant_id, &[]))
        }
        Event::ItemUndo(undo) => {
            let detail = ItemDetail {
                action: ItemAction::Undo,
                participant: resolve(undo.participant_id),
                item_id: None,
                before_id: undo.before_id,
                after_id: undo.after_id,
                gold_gain: undo.gold_gain,
            };
            (EventCategory::Item, EventDetail::Item(detail), involved(undo.participant_id, &[]))
        }
        Event::SkillLevelUp(skill) => {
            let detail = SkillDetail {
                participant: resolve(skill.participant_id),
                skill_slot: skill.skill_slot,
                level_up_type: skill.level_up_type.clone(),
            };
            (EventCategory::Skill, EventDetail::Skill(detail), involved(skill.participant_id, &[]))
        }
        Event::Other(other) => {
            let detail = OtherDetail { fields: other.fields.clone() };
            (EventCategory::Other, EventDetail::Other(detail), Vec::new())
        }
    }
}

fn kill_detail(
    kill: &ChampionKillEvent,
    killer: Option<ParticipantRef>,
    victim: Option<ParticipantRef>,
    assisters: Vec<ParticipantRef>,
) -> KillDetail {
    KillDetail {
        killer,
        victim,
        assisters,
        position: kill.position,
        bounty: kill.bounty,
        shutdown_bounty: kill.shutdown_bounty,
        kill_streak_length: kill.kill_streak_length,
    }
}

fn monster_detail(
    monster: &EliteMonsterKillEvent,
    killer: Option<ParticipantRef>,
    assisters: Vec<ParticipantRef>,
) -> (EventCategory, MonsterDetail) {
    let category = match monster.monster_type.as_deref() {
        Some(DRAGON) => EventCategory::Dragon,
        Some(BARON) => EventCategory::Baron,
        Some(HERALD_SOURCE) | Some(HERALD) => EventCategory::Herald,
        _ => EventCategory::EpicMonster,
    };
    let monster_type = match category {
        EventCategory::Herald => Some(HERALD.to_string()),
        _ => monster.monster_type.clone(),
    };
    let dragon_type = match category {
        EventCategory::Dragon => monster.monster_sub_type.clone(),
        _ => None,
    };
    let team = killer
        .as_ref()
        .and_then(|k| k.team)
        .or_else(|| monster.killer_team_id.and_then(TeamKey::from_team_id));

    let detail = MonsterDetail {
        monster_type,
        monster_sub_type: monster.monster_sub_type.clone(),
        dragon_type,
        killer,
        team,
        assisters,
        position: monster.position,
        bounty: monster.bounty,
    };
    (category, detail)
}

fn building_detail(
    building: &BuildingKillEvent,
    killer: Option<ParticipantRef>,
    assisters: Vec<ParticipantRef>,
) -> (EventCategory, BuildingDetail) {
    // Without a building type, a tower type still identifies a turret.
    let category = match building.building_type.as_deref() {
        Some(TOWER) => EventCategory::Tower,
        Some(INHIBITOR) => EventCategory::Inhibitor,
        None if building.tower_type.is_some() => EventCategory::Tower,
        _ => EventCategory::Other,
    };
    let owner_team = building.team_id.and_then(TeamKey::from_team_id);
    // Minion and turret kills have no killer team; credit the side that did not own the building.
    let team = killer
        .as_ref()
        .and_then(|k| k.team)
        .or_else(|| owner_team.map(opponent));

    let detail = BuildingDetail {
        building_type: building.building_type.clone(),
        lane_type: building.lane_type.clone(),
        tower_type: building.tower_type.clone(),
        killer,
        team,
        owner_team,
        assisters,
        position: building.position,
        bounty: building.bounty,
    };
    (category, detail)
}

fn opponent(team: TeamKey) -> TeamKey {
    match team {
        TeamKey::Blue => TeamKey::Red,
        TeamKey::Red => TeamKey::Blue,
    }
}

fn involved(
    primary: impl IntoIterator<Item = ParticipantId>,
    assisters: &[ParticipantId],
) -> Vec<ParticipantId> {
    let mut ids: Vec<ParticipantId> = Vec::new();
    for id in primary.into_iter().chain(assisters.iter().copied()) {
        if id != 0 && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
