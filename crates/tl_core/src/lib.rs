//! # tl_core - Match Timeline Telemetry Engine
//!
//! Turns a loaded match timeline (periodic frames plus typed events) into
//! queryable views for a match-review UI and its chat assistant.
//!
//! ## Features
//! - Chronological event index with category buckets and range queries
//! - Per-participant and per-team rollups, per-frame team slices
//! - Grid density for heatmaps with minute cutoff, memoized per point set
//! - Deterministic playback state machine plus a Tokio timer driver
//! - Condensed, byte-stable context bundle for the assistant
//! - Multi-match year recap over the same density and playback machinery
//!
//! ## Example
//! ```no_run
//! use tl_core::{EngineConfig, MatchTimeline, TeamKey};
//!
//! # fn load() -> tl_core::models::MatchTimelineDto { unimplemented!() }
//! let timeline = MatchTimeline::from_dtos(load(), None, EngineConfig::default());
//! let blue = timeline.get_team_stats(TeamKey::Blue);
//! let context = timeline.get_chat_context(10, Some(3));
//! # let _ = (blue, context);
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod index;
pub mod models;
pub mod playback;
pub mod spatial;
pub mod store;
pub mod year;

#[cfg(test)]
mod proptest_gen;
#[cfg(test)]
mod test_fixtures;

pub use config::{EngineConfig, ENGINE_CONFIG_PATH_ENV};
pub use context::{build_context, context_bundle_schema, ContextBundle};
pub use engine::MatchTimeline;
pub use error::{CoreError, Result};
pub use index::{EventBucket, EventCategory, IndexedEvent, ParticipantRecord, TeamSlice, TeamStats};
pub use models::{MatchSummaryDto, MatchTimelineDto, ParticipantId, TeamKey};
pub use playback::{PlaybackController, PlaybackDriver, PlaybackState};
pub use spatial::{DensityPoint, HeatPoint, PointSet};
pub use store::FrameStore;
pub use year::{HeatmapFilter, MatchEntry, YearCategory, YearRecapBuilder, YearRecapData, YearRecapView};
