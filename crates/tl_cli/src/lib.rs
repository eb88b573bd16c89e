//! File loading for the timeline CLI.
//!
//! Timeline and summary documents are read from disk as JSON; a year recap is
//! described by a small manifest listing one timeline per match.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tl_core::models::{MatchSummaryDto, MatchTimelineDto};
use tl_core::{
    EngineConfig, FrameStore, MatchEntry, MatchTimeline, ParticipantId, YearRecapBuilder,
    YearRecapData,
};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

pub fn load_timeline(path: &Path) -> Result<MatchTimelineDto> {
    read_json(path)
}

pub fn load_summary(path: &Path) -> Result<MatchSummaryDto> {
    read_json(path)
}

/// Explicit config file, else `TL_ENGINE_CONFIG_PATH`, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::from_env().context("Failed to load config from environment")?,
    };
    Ok(config)
}

pub fn open_match(
    timeline: &Path,
    summary: Option<&Path>,
    config: EngineConfig,
) -> Result<MatchTimeline> {
    let timeline = load_timeline(timeline)?;
    let summary = summary.map(load_summary).transpose()?;
    Ok(MatchTimeline::from_dtos(timeline, summary, config))
}

/// Year recap input: one player, many matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearManifest {
    pub player_puuid: String,
    #[serde(default = "default_player_name")]
    pub player_name: String,
    pub matches: Vec<ManifestMatch>,
}

fn default_player_name() -> String {
    "Player".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMatch {
    pub match_id: String,
    /// Timeline JSON, relative to the manifest's directory.
    pub timeline: PathBuf,
    pub participant_id: ParticipantId,
    #[serde(default)]
    pub champion_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Fold every manifest match into a recap, in manifest order.
pub fn build_year_recap(manifest_path: &Path) -> Result<YearRecapData> {
    let manifest: YearManifest = read_json(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut builder = YearRecapBuilder::new(manifest.player_puuid, manifest.player_name);

    for entry in manifest.matches {
        let path = base.join(&entry.timeline);
        tracing::debug!(match_id = %entry.match_id, path = %path.display(), "loading recap match");
        let store = FrameStore::from_timeline(
            load_timeline(&path).with_context(|| format!("Match {}", entry.match_id))?,
        );
        builder.add_match(MatchEntry {
            match_id: entry.match_id,
            store: &store,
            participant_id: entry.participant_id,
            champion_name: entry.champion_name,
            role: entry.role,
        });
    }

    Ok(builder.build())
}
