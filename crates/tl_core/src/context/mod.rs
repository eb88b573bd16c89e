//! Condensed match context for the chat assistant.

pub mod summarizer;

pub use summarizer::{
    build_context, context_bundle_schema, format_time, ContextBundle, ContextSources,
    EventTotals, EventsContext, Leader, LeaderValue, Leaders, ObjectiveFacts, ObjectiveTally,
    PlayerContext, QuickFacts, RecentEvents, TeamComparison, TimelineContext,
};
