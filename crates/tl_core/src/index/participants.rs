//! Participant identity, team membership and end-of-match stat rollups.

use schemars::JsonSchema;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::models::{Frame, ParticipantId, ParticipantSummary, TeamKey};

/// Round to two decimals, the precision used for ratios in the output.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `teamOf(participantId)` lookup, built once per match.
///
/// Explicit team ids from the summary win; everything else falls back to the
/// fixed partition `1..=team_size` blue, `team_size+1..=2*team_size` red.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamTable {
    members: BTreeMap<ParticipantId, TeamKey>,
    team_size: u32,
}

impl TeamTable {
    pub fn new(team_size: u32) -> Self {
        Self { members: BTreeMap::new(), team_size }
    }

    /// Partition rule used for ids without an explicit team.
    pub fn partition(&self, id: ParticipantId) -> Option<TeamKey> {
        if id == 0 {
            None
        } else if id <= self.team_size {
            Some(TeamKey::Blue)
        } else if id <= self.team_size.saturating_mul(2) {
            Some(TeamKey::Red)
        } else {
            None
        }
    }

    pub fn assign(&mut self, id: ParticipantId, team: TeamKey) {
        self.members.insert(id, team);
    }

    /// Register `id` under the partition rule unless it already has a team.
    pub fn register(&mut self, id: ParticipantId) {
        if self.members.contains_key(&id) {
            return;
        }
        if let Some(team) = self.partition(id) {
            self.members.insert(id, team);
        }
    }

    pub fn team_of(&self, id: ParticipantId) -> Option<TeamKey> {
        self.members.get(&id).copied().or_else(|| self.partition(id))
    }

    /// Registered ids on `team`, ascending.
    pub fn ids_on(&self, team: TeamKey) -> Vec<ParticipantId> {
        self.members.iter().filter(|(_, t)| **t == team).map(|(id, _)| *id).collect()
    }

    pub fn team_size(&self) -> u32 {
        self.team_size
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct KdaStats {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// `(kills + assists) / max(1, deaths)`, two decimals.
    pub ratio: f64,
    /// No deaths; displayed as "Perfect".
    pub perfect: bool,
}

impl KdaStats {
    pub fn new(kills: u32, deaths: u32, assists: u32) -> Self {
        let ratio = round2(f64::from(kills + assists) / f64::from(deaths.max(1)));
        Self { kills, deaths, assists, ratio, perfect: deaths == 0 }
    }

    pub fn display_ratio(&self) -> String {
        if self.perfect {
            "Perfect".to_string()
        } else {
            format!("{:.2}", self.ratio)
        }
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct GoldStats {
    pub earned: u64,
    pub spent: u64,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DamageStats {
    pub dealt: u64,
    pub taken: u64,
    /// Percent of team damage to champions, one decimal.
    pub share: Option<f64>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisionStats {
    pub score: u64,
    pub wards_placed: u32,
    pub wards_killed: u32,
    pub control_wards: u32,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct ObjectiveCounts {
    pub dragons: u32,
    pub barons: u32,
    pub towers: u32,
    pub heralds: u32,
}

impl ObjectiveCounts {
    pub fn total(&self) -> u32 {
        self.dragons + self.barons + self.towers + self.heralds
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStats {
    pub kda: KdaStats,
    pub gold: GoldStats,
    pub cs: u64,
    pub damage: DamageStats,
    pub vision: VisionStats,
    pub objectives: ObjectiveCounts,
    pub damage_per_minute: Option<f64>,
    pub gold_per_minute: Option<f64>,
    pub xp_per_minute: Option<f64>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct Loadout {
    pub level: Option<u32>,
    pub spells: Vec<u32>,
    pub items: Vec<u32>,
}

/// Stable per-participant record for one match.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    pub name: String,
    pub champion: Option<String>,
    pub role: Option<String>,
    pub team: Option<TeamKey>,
    pub puuid: Option<String>,
    pub stats: ParticipantStats,
    pub loadout: Loadout,
}

impl ParticipantRecord {
    /// Synthetic record for an id the summary does not know about.
    pub fn placeholder(id: ParticipantId, team: Option<TeamKey>) -> Self {
        Self {
            id,
            name: placeholder_name(id),
            champion: None,
            role: None,
            team,
            puuid: None,
            stats: ParticipantStats { kda: KdaStats::new(0, 0, 0), ..Default::default() },
            loadout: Loadout::default(),
        }
    }

    fn from_summary(summary: &ParticipantSummary, team: Option<TeamKey>) -> Self {
        let id = summary.participant_id;
        let name = non_empty(&summary.summoner_name)
            .or_else(|| non_empty(&summary.riot_id_game_name))
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_name(id));
        let role = non_empty(&summary.team_position)
            .or_else(|| non_empty(&summary.individual_position))
            .map(str::to_string);
        let challenges = summary.challenges.as_ref();

        let stats = ParticipantStats {
            kda: KdaStats::new(summary.kills, summary.deaths, summary.assists),
            gold: GoldStats { earned: summary.gold_earned, spent: summary.gold_spent },
            cs: summary.cs(),
            damage: DamageStats {
                dealt: summary.total_damage_dealt_to_champions,
                taken: summary.total_damage_taken,
                share: challenges
                    .and_then(|c| c.team_damage_percentage)
                    .filter(|share| share.is_finite())
                    .map(|share| round1(share * 100.0)),
            },
            vision: VisionStats {
                score: summary.vision_score,
                wards_placed: summary.wards_placed,
                wards_killed: summary.wards_killed,
                control_wards: summary.vision_wards_bought_in_game,
            },
            objectives: ObjectiveCounts {
                dragons: summary.dragon_kills,
                barons: summary.baron_kills,
                towers: summary.turret_kills,
                heralds: summary.rift_herald_kills,
            },
            damage_per_minute: challenges.and_then(|c| c.damage_per_minute).filter(|v| v.is_finite()),
            gold_per_minute: challenges.and_then(|c| c.gold_per_minute).filter(|v| v.is_finite()),
            xp_per_minute: challenges.and_then(|c| c.experience_per_minute).filter(|v| v.is_finite()),
        };

        Self {
            id,
            name,
            champion: non_empty(&summary.champion_name).map(str::to_string),
            role,
            team,
            puuid: summary.puuid.clone(),
            stats,
            loadout: Loadout {
                level: summary.champ_level,
                spells: summary.spells(),
                items: summary.items(),
            },
        }
    }

    /// `"name (champion)"`, or just the name when the champion is unknown.
    pub fn label(&self) -> String {
        match &self.champion {
            Some(champion) => format!("{} ({})", self.name, champion),
            None => self.name.clone(),
        }
    }
}

fn placeholder_name(id: ParticipantId) -> String {
    format!("Player {id}")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Participant records keyed by id plus the [`TeamTable`].
#[derive(Debug, Clone)]
pub struct ParticipantIndex {
    records: BTreeMap<ParticipantId, ParticipantRecord>,
    teams: TeamTable,
}

impl ParticipantIndex {
    /// Single pass over the summary list, then register participants that only
    /// appear in frames so every id seen in the match has a record.
    pub fn build(frames: &[Frame], summary: &[ParticipantSummary], team_size: u32) -> Self {
        let mut teams = TeamTable::new(team_size);
        let mut records = BTreeMap::new();

        for participant in summary {
            let id = participant.participant_id;
            match participant.team_id.and_then(TeamKey::from_team_id) {
                Some(team) => teams.assign(id, team),
                None => teams.register(id),
            }
            records.insert(id, ParticipantRecord::from_summary(participant, teams.team_of(id)));
        }

        let summary_count = records.len();
        for id in frames.iter().flat_map(|frame| frame.participant_frames.keys().copied()) {
            if id == 0 || records.contains_key(&id) {
                continue;
            }
            teams.register(id);
            records.insert(id, ParticipantRecord::placeholder(id, teams.team_of(id)));
        }

        tracing::debug!(
            participants = records.len(),
            from_summary = summary_count,
            team_size,
            "participant index built"
        );

        Self { records, teams }
    }

    /// Record for `id`, or a placeholder when the id is unknown.
    pub fn get(&self, id: ParticipantId) -> Cow<'_, ParticipantRecord> {
        match self.records.get(&id) {
            Some(record) => Cow::Borrowed(record),
            None => Cow::Owned(ParticipantRecord::placeholder(id, self.teams.team_of(id))),
        }
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn name_of(&self, id: ParticipantId) -> Cow<'_, str> {
        match self.records.get(&id) {
            Some(record) => Cow::Borrowed(record.name.as_str()),
            None => Cow::Owned(placeholder_name(id)),
        }
    }

    pub fn team_of(&self, id: ParticipantId) -> Option<TeamKey> {
        self.teams.team_of(id)
    }

    /// Known participants on `team`, ascending id.
    pub fn ids_on(&self, team: TeamKey) -> Vec<ParticipantId> {
        self.records.values().filter(|r| r.team == Some(team)).map(|r| r.id).collect()
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticipantRecord> + Clone {
        self.records.values()
    }

    pub fn team_table(&self) -> &TeamTable {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{frame_with_participants, summary_participant};

    #[test]
    fn test_kda_ratio() {
        let kda = KdaStats::new(7, 2, 5);
        assert_eq!(kda.ratio, 6.0);
        assert!(!kda.perfect);

        let kda = KdaStats::new(4, 3, 3);
        assert_eq!(kda.ratio, 2.33);
        assert_eq!(kda.display_ratio(), "2.33");
    }

    #[test]
    fn test_kda_perfect_when_deathless() {
        let kda = KdaStats::new(3, 0, 4);
        assert!(kda.perfect);
        assert_eq!(kda.ratio, 7.0);
        assert_eq!(kda.display_ratio(), "Perfect");

        let zero = KdaStats::new(0, 0, 0);
        assert_eq!(zero.ratio, 0.0);
        assert!(zero.ratio.is_finite());
    }

    #[test]
    fn test_partition_rule() {
        let table = TeamTable::new(5);
        assert_eq!(table.team_of(0), None);
        assert_eq!(table.team_of(1), Some(TeamKey::Blue));
        assert_eq!(table.team_of(5), Some(TeamKey::Blue));
        assert_eq!(table.team_of(6), Some(TeamKey::Red));
        assert_eq!(table.team_of(10), Some(TeamKey::Red));
        assert_eq!(table.team_of(11), None);
    }

    #[test]
    fn test_explicit_team_overrides_partition() {
        let mut swapped = summary_participant(2, "Ahri");
        swapped.team_id = Some(200);
        let index = ParticipantIndex::build(&[], &[swapped], 5);

        assert_eq!(index.team_of(2), Some(TeamKey::Red));
        assert_eq!(index.get(2).team, Some(TeamKey::Red));
        assert_eq!(index.ids_on(TeamKey::Red), vec![2]);
        assert_eq!(index.team_table().ids_on(TeamKey::Red), vec![2]);
    }

    #[test]
    fn test_name_and_role_fallbacks() {
        let mut riot_only = summary_participant(3, "Lux");
        riot_only.summoner_name = Some(String::new());
        riot_only.riot_id_game_name = Some("Lumi".into());
        riot_only.team_position = Some(String::new());
        riot_only.individual_position = Some("UTILITY".into());

        let mut nameless = summary_participant(4, "Jinx");
        nameless.summoner_name = None;

        let index = ParticipantIndex::build(&[], &[riot_only, nameless], 5);
        let lux = index.get(3);
        assert_eq!(lux.name, "Lumi");
        assert_eq!(lux.role.as_deref(), Some("UTILITY"));
        assert_eq!(index.name_of(4), "Player 4");
        assert_eq!(lux.label(), "Lumi (Lux)");
    }

    #[test]
    fn test_unknown_participant_resolves_to_placeholder() {
        let index = ParticipantIndex::build(&[], &[], 5);
        let ghost = index.get(7);

        assert!(matches!(ghost, Cow::Owned(_)));
        assert_eq!(ghost.name, "Player 7");
        assert_eq!(ghost.team, Some(TeamKey::Red));
        assert_eq!(ghost.stats.kda.kills, 0);
        assert_eq!(index.name_of(42), "Player 42");
    }

    #[test]
    fn test_frame_only_participants_are_registered() {
        let frames = vec![frame_with_participants(60_000, &[(1, 500), (6, 400), (0, 0)])];
        let index = ParticipantIndex::build(&frames, &[summary_participant(1, "Garen")], 5);

        assert_eq!(index.len(), 2);
        assert!(index.contains(6));
        assert!(!index.contains(0));
        assert_eq!(index.get(6).name, "Player 6");
        assert_eq!(index.ids_on(TeamKey::Blue), vec![1]);
        assert_eq!(index.ids_on(TeamKey::Red), vec![6]);
    }

    #[test]
    fn test_summary_fields_copied() {
        let mut p = summary_participant(1, "Garen");
        p.total_minions_killed = 150;
        p.neutral_minions_killed = 12;
        p.item0 = Some(3071);
        p.item1 = Some(0);
        p.challenges = Some(crate::models::Challenges {
            team_damage_percentage: Some(0.2831),
            damage_per_minute: Some(812.5),
            ..Default::default()
        });

        let index = ParticipantIndex::build(&[], &[p], 5);
        let record = index.get(1);
        assert_eq!(record.stats.cs, 162);
        assert_eq!(record.stats.damage.share, Some(28.3));
        assert_eq!(record.stats.damage_per_minute, Some(812.5));
        assert_eq!(record.loadout.items, vec![3071]);
    }
}
