//! Year recap: one player's positioned events across many matches.
//!
//! [`YearRecapBuilder`] walks each match once and sorts the player's events
//! into four categories. [`YearRecapView`] serves the result through the same
//! density memo and playback controller the single-match view uses, with
//! minutes instead of frames as the playback position.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::index::participants::round2;
use crate::models::{Event, ParticipantId, Position};
use crate::playback::{PlaybackController, PlaybackDriver, PlaybackState};
use crate::spatial::{DensityCache, DensityParams, DensityPoint, HeatPoint, PointSet, SpatialPoint};
use crate::store::FrameStore;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum YearCategory {
    Deaths,
    Kills,
    Assists,
    Objectives,
}

impl YearCategory {
    pub const ALL: [YearCategory; 4] =
        [YearCategory::Deaths, YearCategory::Kills, YearCategory::Assists, YearCategory::Objectives];

    pub fn as_str(self) -> &'static str {
        match self {
            YearCategory::Deaths => "deaths",
            YearCategory::Kills => "kills",
            YearCategory::Assists => "assists",
            YearCategory::Objectives => "objectives",
        }
    }
}

impl fmt::Display for YearCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YearCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        YearCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| format!("unknown year category '{s}'"))
    }
}

/// One value per category, serialized as `{deaths, kills, assists, objectives}`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ByCategory<T> {
    pub deaths: T,
    pub kills: T,
    pub assists: T,
    pub objectives: T,
}

impl<T> ByCategory<T> {
    pub fn get(&self, category: YearCategory) -> &T {
        match category {
            YearCategory::Deaths => &self.deaths,
            YearCategory::Kills => &self.kills,
            YearCategory::Assists => &self.assists,
            YearCategory::Objectives => &self.objectives,
        }
    }

    pub fn get_mut(&mut self, category: YearCategory) -> &mut T {
        match category {
            YearCategory::Deaths => &mut self.deaths,
            YearCategory::Kills => &mut self.kills,
            YearCategory::Assists => &mut self.assists,
            YearCategory::Objectives => &mut self.objectives,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(YearCategory, &T) -> U) -> ByCategory<U> {
        ByCategory {
            deaths: f(YearCategory::Deaths, &self.deaths),
            kills: f(YearCategory::Kills, &self.kills),
            assists: f(YearCategory::Assists, &self.assists),
            objectives: f(YearCategory::Objectives, &self.objectives),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct YearStats {
    pub total_matches: usize,
    pub deaths_count: usize,
    pub kills_count: usize,
    pub assists_count: usize,
    pub objectives_count: usize,
}

/// Events of one category in one game minute, summed over all matches.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct MinuteBucket {
    pub minute: u32,
    pub count: u32,
    pub cumulative: u32,
    pub average_per_game: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct YearRecapData {
    pub player_puuid: String,
    pub player_name: String,
    pub stats: YearStats,
    /// Match ids in the order they were added.
    #[serde(default)]
    pub match_ids: Vec<String>,
    pub heatmap_data: ByCategory<Vec<HeatPoint>>,
    pub timeline_data: ByCategory<Vec<MinuteBucket>>,
}

/// One match to fold into the recap.
#[derive(Debug, Clone)]
pub struct MatchEntry<'a> {
    pub match_id: String,
    pub store: &'a FrameStore,
    /// The player's participant id in this match.
    pub participant_id: ParticipantId,
    pub champion_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct YearRecapBuilder {
    player_puuid: String,
    player_name: String,
    match_ids: Vec<String>,
    points: ByCategory<Vec<HeatPoint>>,
    minutes: ByCategory<BTreeMap<u32, u32>>,
}

impl YearRecapBuilder {
    pub fn new(player_puuid: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            player_puuid: player_puuid.into(),
            player_name: player_name.into(),
            match_ids: Vec::new(),
            points: ByCategory::default(),
            minutes: ByCategory::default(),
        }
    }

    /// Classify every positioned event of the match from the player's side.
    pub fn add_match(&mut self, entry: MatchEntry<'_>) -> &mut Self {
        self.match_ids.push(entry.match_id.clone());
        let player = entry.participant_id;
        let mut added = 0usize;

        for frame in entry.store.frames() {
            for event in &frame.events {
                let Some(position) = event.position() else { continue };
                let Some((category, mut point)) = classify(event, player, position) else {
                    continue;
                };
                point.timestamp = event.timestamp().unwrap_or(frame.timestamp);
                point.match_id = Some(entry.match_id.clone());
                point.champion_name = entry.champion_name.clone();
                point.role = entry.role.clone();

                let minute = u32::try_from(point.minute_floor().max(0)).unwrap_or(u32::MAX);
                *self.minutes.get_mut(category).entry(minute).or_insert(0) += 1;
                self.points.get_mut(category).push(point);
                added += 1;
            }
        }

        tracing::debug!(match_id = %entry.match_id, player, events = added, "year recap match added");
        self
    }

    pub fn build(self) -> YearRecapData {
        let matches = self.match_ids.len();
        let stats = YearStats {
            total_matches: matches,
            deaths_count: self.points.deaths.len(),
            kills_count: self.points.kills.len(),
            assists_count: self.points.assists.len(),
            objectives_count: self.points.objectives.len(),
        };
        let timeline_data = self.minutes.map(|_, buckets| minute_buckets(buckets, matches));

        YearRecapData {
            player_puuid: self.player_puuid,
            player_name: self.player_name,
            stats,
            match_ids: self.match_ids,
            heatmap_data: self.points,
            timeline_data,
        }
    }
}

fn classify(
    event: &Event,
    player: ParticipantId,
    position: Position,
) -> Option<(YearCategory, HeatPoint)> {
    let mut point = HeatPoint::at(position.x, position.y, 0);
    let category = match event {
        Event::ChampionKill(kill) => {
            if kill.victim_id == Some(player) {
                point.killer_id = kill.killer_id;
                YearCategory::Deaths
            } else if kill.killer_id == Some(player) {
                point.victim_id = kill.victim_id;
                YearCategory::Kills
            } else if kill.assisting_participant_ids.contains(&player) {
                point.victim_id = kill.victim_id;
                YearCategory::Assists
            } else {
                return None;
            }
        }
        Event::EliteMonsterKill(monster) if monster.killer_id == Some(player) => {
            point.monster_type = monster.monster_type.clone();
            YearCategory::Objectives
        }
        Event::BuildingKill(building)
            if building.killer_id == Some(player)
                || building.assisting_participant_ids.contains(&player) =>
        {
            point.building_type = building.building_type.clone();
            YearCategory::Objectives
        }
        _ => return None,
    };
    Some((category, point))
}

/// Dense `0..=max` minute series; empty when nothing was counted.
fn minute_buckets(counts: &BTreeMap<u32, u32>, matches: usize) -> Vec<MinuteBucket> {
    let Some(&max_minute) = counts.keys().next_back() else {
        return Vec::new();
    };
    let divisor = matches.max(1) as f64;
    let mut cumulative = 0u32;

    (0..=max_minute)
        .map(|minute| {
            let count = counts.get(&minute).copied().unwrap_or(0);
            cumulative += count;
            MinuteBucket {
                minute,
                count,
                cumulative,
                average_per_game: round2(f64::from(count) / divisor),
            }
        })
        .collect()
}

/// Point filter for recap heatmaps. Unset fields keep everything.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct HeatmapFilter {
    #[serde(default)]
    pub champion: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Keep only points from the first N matches of the recap.
    #[serde(default)]
    pub match_count: Option<usize>,
    /// Inclusive lower bound, game minutes.
    #[serde(default)]
    pub game_time_start: Option<u32>,
    /// Inclusive upper bound, game minutes.
    #[serde(default)]
    pub game_time_end: Option<u32>,
}

impl HeatmapFilter {
    pub fn is_empty(&self) -> bool {
        *self == HeatmapFilter::default()
    }

    /// Match ids admitted by `match_count`, cut from `match_ids` (recap order).
    ///
    /// `None` when every match is admitted.
    pub fn allowed_matches<'a>(&self, match_ids: &'a [String]) -> Option<BTreeSet<&'a str>> {
        self.match_count
            .map(|n| match_ids.iter().take(n).map(String::as_str).collect())
    }

    /// Filter `points`; `match_ids` is the recap's match order.
    pub fn apply(&self, points: &[HeatPoint], match_ids: &[String]) -> Vec<HeatPoint> {
        let allowed_matches = self.allowed_matches(match_ids);
        points
            .iter()
            .filter(|point| {
                allowed_matches.as_ref().map_or(true, |ids| {
                    point.match_id.as_deref().is_some_and(|id| ids.contains(id))
                })
            })
            .filter(|point| matches_field(&self.champion, &point.champion_name))
            .filter(|point| matches_field(&self.role, &point.role))
            .filter(|point| self.admits_time(point.timestamp))
            .cloned()
            .collect()
    }

    fn admits_time(&self, timestamp: i64) -> bool {
        let minutes = timestamp as f64 / 60_000.0;
        let after_start = self.game_time_start.map_or(true, |start| minutes >= f64::from(start));
        let before_end = self.game_time_end.map_or(true, |end| minutes <= f64::from(end));
        after_start && before_end
    }
}

fn matches_field(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        Some(wanted) => actual.as_deref() == Some(wanted.as_str()),
        None => true,
    }
}

/// Recap data plus the per-category point sets the heatmap reads.
pub struct YearRecapView {
    data: YearRecapData,
    sets: ByCategory<PointSet>,
    cache: DensityCache,
    config: EngineConfig,
}

impl YearRecapView {
    pub fn new(data: YearRecapData, config: EngineConfig) -> Self {
        let sets = data.heatmap_data.map(|_, points| PointSet::new(points.clone()));
        Self { cache: DensityCache::new(config.density.cache_capacity), data, sets, config }
    }

    /// Rebuild the point sets from the unfiltered data through `filter`.
    pub fn with_filter(mut self, filter: &HeatmapFilter) -> Self {
        let match_ids = &self.data.match_ids;
        self.sets = self.data.heatmap_data.map(|category, points| {
            let kept = filter.apply(points, match_ids);
            tracing::debug!(
                %category,
                before = points.len(),
                after = kept.len(),
                "heatmap filter applied"
            );
            PointSet::new(kept)
        });
        self
    }

    pub fn data(&self) -> &YearRecapData {
        &self.data
    }

    pub fn points(&self, category: YearCategory) -> &PointSet {
        self.sets.get(category)
    }

    /// Density of the category's points up to `cutoff_minute` (inclusive).
    pub fn density(&self, category: YearCategory, cutoff_minute: Option<u32>) -> Rc<[DensityPoint]> {
        let params = DensityParams::new(self.config.density.cell_size, cutoff_minute);
        self.cache.get_or_compute(self.sets.get(category), params)
    }

    /// Density at a playback position; a stopped playback shows every point.
    pub fn density_at(&self, category: YearCategory, state: PlaybackState) -> Rc<[DensityPoint]> {
        let cutoff = state.cutoff().map(|minute| u32::try_from(minute).unwrap_or(u32::MAX));
        self.density(category, cutoff)
    }

    /// Last minute of the category's timeline, or the configured default when it has none.
    pub fn max_minute(&self, category: YearCategory) -> u32 {
        self.data
            .timeline_data
            .get(category)
            .last()
            .map_or(self.config.year.default_max_minute, |bucket| bucket.minute)
    }

    /// Minute-scrubbing controller for `category`.
    pub fn controller(&self, category: YearCategory) -> PlaybackController {
        PlaybackController::new(self.max_minute(category) as usize)
    }

    pub fn driver(&self, category: YearCategory) -> PlaybackDriver {
        PlaybackDriver::new(
            self.controller(category),
            self.config.playback.year_interval(),
            &self.config.playback,
        )
    }
}
