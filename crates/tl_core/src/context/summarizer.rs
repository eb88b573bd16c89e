//! Condensed match context for a conversational consumer.
//!
//! [`build_context`] is a pure function of its sources; only ordered
//! collections reach the output, so equal inputs serialize byte-identically.

use schemars::JsonSchema;
use serde::Serialize;
use std::fmt::Display;

use crate::config::ContextConfig;
use crate::index::participants::round1;
use crate::index::{
    EventBucket, EventIndex, IndexedEvent, ParticipantIndex, ParticipantRecord,
    PlayerTimelinePoint, TeamSlice, TeamStats, TimelineSlices,
};
use crate::models::{ParticipantId, TeamKey, TeamPair};

/// Everything the summarizer reads.
#[derive(Clone, Copy)]
pub struct ContextSources<'a> {
    pub match_id: Option<&'a str>,
    /// Seconds, from the match summary.
    pub game_duration_secs: Option<u64>,
    pub frame_count: usize,
    pub main_participant: Option<ParticipantId>,
    pub participants: &'a ParticipantIndex,
    pub events: &'a EventIndex,
    pub slices: &'a TimelineSlices,
    pub teams: &'a TeamPair<TeamStats>,
    pub config: &'a ContextConfig,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContextBundle {
    pub match_id: Option<String>,
    pub duration_minutes: f64,
    pub current_frame: usize,
    /// `m:ss` of the focus slice.
    pub current_time: String,
    pub main_player: Option<ParticipantRecord>,
    pub selected_player: Option<PlayerContext>,
    pub teams: TeamPair<TeamStats>,
    pub timeline: TimelineContext,
    pub events: EventsContext,
    pub players: Vec<PlayerContext>,
    pub quick_facts: QuickFacts,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct PlayerContext {
    #[serde(flatten)]
    pub record: ParticipantRecord,
    pub timeline: Vec<PlayerTimelinePoint>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct TimelineContext {
    pub current: Option<TeamSlice>,
    /// Slices within the configured radius of the focus frame.
    pub window: Vec<TeamSlice>,
    /// Every N-th minute plus the focus window.
    pub summary: Vec<TeamSlice>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct EventTotals {
    pub kills: usize,
    pub dragons: usize,
    pub barons: usize,
    pub towers: usize,
    pub heralds: usize,
    pub inhibitors: usize,
    pub wards: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RecentEvents {
    pub kills: Vec<IndexedEvent>,
    pub objectives: Vec<IndexedEvent>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventsContext {
    pub totals: EventTotals,
    pub first_blood: Option<IndexedEvent>,
    pub first_dragon: Option<IndexedEvent>,
    pub first_baron: Option<IndexedEvent>,
    pub first_tower: Option<IndexedEvent>,
    pub recent: RecentEvents,
    pub kills: Vec<IndexedEvent>,
    pub dragons: Vec<IndexedEvent>,
    pub barons: Vec<IndexedEvent>,
    pub towers: Vec<IndexedEvent>,
    pub heralds: Vec<IndexedEvent>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum LeaderValue {
    Count(u64),
    Text(String),
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub participant_id: ParticipantId,
    /// `"name (champion)"`.
    pub player: String,
    pub value: LeaderValue,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leaders {
    #[serde(rename = "highestKDA")]
    pub highest_kda: Option<Leader>,
    pub most_kills: Option<Leader>,
    pub most_damage: Option<Leader>,
    pub most_gold: Option<Leader>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveTally {
    pub total: usize,
    pub blue_team: u32,
    pub red_team: u32,
    /// `"<team> team at <minute> min"`.
    pub first: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ObjectiveFacts {
    pub dragons: ObjectiveTally,
    pub barons: ObjectiveTally,
    pub towers: ObjectiveTally,
    pub heralds: ObjectiveTally,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct TeamComparison {
    pub kills: String,
    pub gold: String,
    pub damage: String,
    pub objectives: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickFacts {
    pub team_leaders: TeamPair<Leaders>,
    pub overall_leaders: Leaders,
    pub objectives: ObjectiveFacts,
    pub team_comparison: TeamComparison,
}

/// Assemble the bundle for `focus` (clamped to the last frame).
pub fn build_context(
    sources: &ContextSources<'_>,
    focus: usize,
    selected: Option<ParticipantId>,
) -> ContextBundle {
    let ContextSources { participants, events, slices, teams, config, .. } = *sources;
    let focus = focus.min(sources.frame_count.saturating_sub(1));
    let every = config.sample_every_minutes;

    let current = slices.slice_at(focus).cloned();
    let current_time =
        format_time(current.as_ref().map_or(focus as f64, |s| f64::from(s.minute)));

    let duration_minutes = match sources.game_duration_secs {
        Some(secs) => round1(secs as f64 / 60.0),
        None => sources.frame_count as f64,
    };

    let selected_player = selected.map(|id| PlayerContext {
        record: participants.get(id).into_owned(),
        timeline: slices.player_timeline(id).to_vec(),
    });

    let players = participants
        .iter()
        .map(|record| PlayerContext {
            record: record.clone(),
            timeline: slices.player_timeline_sampled(record.id, every),
        })
        .collect();

    ContextBundle {
        match_id: sources.match_id.map(str::to_string),
        duration_minutes,
        current_frame: focus,
        current_time,
        main_player: sources.main_participant.map(|id| participants.get(id).into_owned()),
        selected_player,
        teams: teams.clone(),
        timeline: TimelineContext {
            current,
            window: slices.slices_in_window(focus, config.window_radius).to_vec(),
            summary: slices
                .sampled(every, focus, config.window_radius)
                .into_iter()
                .cloned()
                .collect(),
        },
        events: events_context(events, focus, config.recent_event_window),
        players,
        quick_facts: quick_facts(participants, events, teams),
    }
}

/// JSON schema of [`ContextBundle`].
pub fn context_bundle_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ContextBundle)
}

/// Fractional minutes as `m:ss`.
pub fn format_time(minutes: f64) -> String {
    if !minutes.is_finite() || minutes <= 0.0 {
        return "0:00".to_string();
    }
    let whole = minutes.floor();
    let seconds = ((minutes - whole) * 60.0).floor() as u64;
    format!("{}:{:02}", whole as u64, seconds.min(59))
}

fn events_context(events: &EventIndex, focus: usize, window: usize) -> EventsContext {
    let owned = |bucket: EventBucket| events.bucket(bucket).cloned().collect::<Vec<_>>();
    let first = |bucket: EventBucket| events.first(bucket).cloned();

    EventsContext {
        totals: EventTotals {
            kills: events.count(EventBucket::Kills),
            dragons: events.count(EventBucket::Dragons),
            barons: events.count(EventBucket::Barons),
            towers: events.count(EventBucket::Towers),
            heralds: events.count(EventBucket::Heralds),
            inhibitors: events.count(EventBucket::Inhibitors),
            wards: events.count(EventBucket::Wards),
        },
        first_blood: first(EventBucket::Kills),
        first_dragon: first(EventBucket::Dragons),
        first_baron: first(EventBucket::Barons),
        first_tower: first(EventBucket::Towers),
        recent: RecentEvents {
            kills: events.recent(EventBucket::Kills, focus, window).into_iter().cloned().collect(),
            objectives: events
                .recent(EventBucket::Objectives, focus, window)
                .into_iter()
                .cloned()
                .collect(),
        },
        kills: owned(EventBucket::Kills),
        dragons: owned(EventBucket::Dragons),
        barons: owned(EventBucket::Barons),
        towers: owned(EventBucket::Towers),
        heralds: owned(EventBucket::Heralds),
    }
}

/// Max-by fold; the first record reaching the best score keeps the title.
fn leader_by<'a, S, V>(
    records: impl IntoIterator<Item = &'a ParticipantRecord>,
    score: S,
    value: V,
) -> Option<Leader>
where
    S: Fn(&ParticipantRecord) -> f64,
    V: Fn(&ParticipantRecord) -> LeaderValue,
{
    let mut best: Option<(&ParticipantRecord, f64)> = None;
    for record in records {
        let s = score(record);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((record, s));
        }
    }
    best.map(|(record, _)| Leader {
        participant_id: record.id,
        player: record.label(),
        value: value(record),
    })
}

fn leaders<'a>(records: impl Iterator<Item = &'a ParticipantRecord> + Clone) -> Leaders {
    Leaders {
        highest_kda: leader_by(records.clone(), |r| r.stats.kda.ratio, |r| {
            let kda = &r.stats.kda;
            LeaderValue::Text(format!(
                "{}/{}/{} ({} KDA)",
                kda.kills,
                kda.deaths,
                kda.assists,
                kda.display_ratio()
            ))
        }),
        most_kills: leader_by(
            records.clone(),
            |r| f64::from(r.stats.kda.kills),
            |r| LeaderValue::Count(u64::from(r.stats.kda.kills)),
        ),
        most_damage: leader_by(
            records.clone(),
            |r| r.stats.damage.dealt as f64,
            |r| LeaderValue::Count(r.stats.damage.dealt),
        ),
        most_gold: leader_by(
            records,
            |r| r.stats.gold.earned as f64,
            |r| LeaderValue::Count(r.stats.gold.earned),
        ),
    }
}

fn objective_tally(
    events: &EventIndex,
    bucket: EventBucket,
    per_team: impl Fn(&TeamStats) -> u32,
    teams: &TeamPair<TeamStats>,
) -> ObjectiveTally {
    let first = events.first(bucket).map(|event| {
        let team = event.detail.credited_team().map_or("unknown", TeamKey::as_str);
        format!("{team} team at {:.1} min", event.minute)
    });
    ObjectiveTally {
        total: events.count(bucket),
        blue_team: per_team(&teams.blue),
        red_team: per_team(&teams.red),
        first,
    }
}

fn versus(blue: impl Display, red: impl Display) -> String {
    format!("Blue {blue} - {red} Red")
}

fn quick_facts(
    participants: &ParticipantIndex,
    events: &EventIndex,
    teams: &TeamPair<TeamStats>,
) -> QuickFacts {
    let on_team = |team: TeamKey| participants.iter().filter(move |r| r.team == Some(team));

    QuickFacts {
        team_leaders: TeamPair::new(
            leaders(on_team(TeamKey::Blue)),
            leaders(on_team(TeamKey::Red)),
        ),
        overall_leaders: leaders(participants.iter()),
        objectives: ObjectiveFacts {
            dragons: objective_tally(events, EventBucket::Dragons, |t| t.objectives.dragons, teams),
            barons: objective_tally(events, EventBucket::Barons, |t| t.objectives.barons, teams),
            towers: objective_tally(events, EventBucket::Towers, |t| t.objectives.towers, teams),
            heralds: objective_tally(events, EventBucket::Heralds, |t| t.objectives.heralds, teams),
        },
        team_comparison: TeamComparison {
            kills: versus(teams.blue.kills, teams.red.kills),
            gold: versus(teams.blue.gold, teams.red.gold),
            damage: versus(teams.blue.damage, teams.red.damage),
            objectives: versus(teams.blue.objectives.total(), teams.red.objectives.total()),
        },
    }
}
