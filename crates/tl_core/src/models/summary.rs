use serde::{Deserialize, Serialize};

use super::types::{null_as_default, ParticipantId};

/// Match summary document (end-of-match totals).
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MatchSummaryDto {
    #[serde(default)]
    pub metadata: Option<SummaryMetadata>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: SummaryInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInfo {
    #[serde(default)]
    pub game_id: Option<u64>,
    /// Seconds.
    #[serde(default)]
    pub game_duration: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<ParticipantSummary>,
}

/// Authoritative end-of-match record for one participant.
///
/// Counters absent from the source default to zero.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub participant_id: ParticipantId,
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub summoner_name: Option<String>,
    #[serde(default)]
    pub riot_id_game_name: Option<String>,
    #[serde(default)]
    pub champion_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<u32>,
    #[serde(default)]
    pub team_position: Option<String>,
    #[serde(default)]
    pub individual_position: Option<String>,
    #[serde(default)]
    pub champ_level: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub kills: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deaths: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assists: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gold_earned: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gold_spent: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_minions_killed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub neutral_minions_killed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_damage_dealt_to_champions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_damage_taken: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub vision_score: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wards_placed: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wards_killed: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vision_wards_bought_in_game: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dragon_kills: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub baron_kills: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub turret_kills: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rift_herald_kills: u32,

    #[serde(default)]
    pub summoner1_id: Option<u32>,
    #[serde(default)]
    pub summoner2_id: Option<u32>,
    #[serde(default)]
    pub item0: Option<u32>,
    #[serde(default)]
    pub item1: Option<u32>,
    #[serde(default)]
    pub item2: Option<u32>,
    #[serde(default)]
    pub item3: Option<u32>,
    #[serde(default)]
    pub item4: Option<u32>,
    #[serde(default)]
    pub item5: Option<u32>,
    #[serde(default)]
    pub item6: Option<u32>,

    #[serde(default)]
    pub challenges: Option<Challenges>,
}

impl ParticipantSummary {
    pub fn cs(&self) -> u64 {
        self.total_minions_killed + self.neutral_minions_killed
    }

    /// Inventory slots in order, empty slots (`0` / absent) dropped.
    pub fn items(&self) -> Vec<u32> {
        [self.item0, self.item1, self.item2, self.item3, self.item4, self.item5, self.item6]
            .into_iter()
            .flatten()
            .filter(|&id| id != 0)
            .collect()
    }

    pub fn spells(&self) -> Vec<u32> {
        [self.summoner1_id, self.summoner2_id].into_iter().flatten().collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenges {
    #[serde(default)]
    pub team_damage_percentage: Option<f64>,
    #[serde(default)]
    pub damage_per_minute: Option<f64>,
    #[serde(default)]
    pub gold_per_minute: Option<f64>,
    #[serde(default)]
    pub experience_per_minute: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_parses_with_missing_counters() {
        let summary: MatchSummaryDto = serde_json::from_value(json!({
            "info": {
                "gameId": 42,
                "gameDuration": 1830,
                "participants": [
                    { "participantId": 1, "championName": "Ahri", "teamId": 100, "kills": 5,
                      "item0": 3089, "item1": 0, "summoner1Id": 4,
                      "challenges": { "teamDamagePercentage": 0.31 } },
                    { "participantId": 6 }
                ]
            }
        }))
        .unwrap();

        assert_eq!(summary.info.game_id, Some(42));
        let ahri = &summary.info.participants[0];
        assert_eq!(ahri.kills, 5);
        assert_eq!(ahri.deaths, 0);
        assert_eq!(ahri.items(), vec![3089]);
        assert_eq!(ahri.spells(), vec![4]);
        assert_eq!(summary.info.participants[1].champion_name, None);
    }
}
