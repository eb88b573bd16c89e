//! Input data model: match timeline frames, typed events and the match summary.
//!
//! Field names follow the vendor JSON (camelCase); every optional field stays
//! `Option` so that absent data is never mistaken for zero.

pub mod events;
pub mod frame;
pub mod summary;
pub mod types;

pub use events::{
    BuildingKillEvent, ChampionKillEvent, EliteMonsterKillEvent, Event, ItemEvent, ItemUndoEvent,
    OtherEvent, SkillLevelUpEvent, WardEvent,
};
pub use frame::{ChampionStats, Frame, MatchTimelineDto, ParticipantFrame, TimelineInfo, TimelineMetadata};
pub use summary::{Challenges, MatchSummaryDto, ParticipantSummary, SummaryInfo, SummaryMetadata};
pub use types::{ParticipantId, Position, TeamKey, TeamPair};
