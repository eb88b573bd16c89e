use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Participant identifier as transmitted by the match timeline (1..=10 in 5v5).
///
/// `0` is used by the source data for non-player killers (minions, turrets).
pub type ParticipantId = u32;

/// Field deserializer that reads an explicit `null` like an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Map position in game units.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The two sides of a match.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamKey {
    Blue,
    Red,
}

impl TeamKey {
    pub const ALL: [TeamKey; 2] = [TeamKey::Blue, TeamKey::Red];

    /// Numeric team id used by the match summary (100 / 200).
    pub fn team_id(self) -> u32 {
        match self {
            TeamKey::Blue => 100,
            TeamKey::Red => 200,
        }
    }

    pub fn from_team_id(team_id: u32) -> Option<Self> {
        match team_id {
            100 => Some(TeamKey::Blue),
            200 => Some(TeamKey::Red),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamKey::Blue => "blue",
            TeamKey::Red => "red",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TeamKey::Blue => "Blue Team",
            TeamKey::Red => "Red Team",
        }
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" | "100" => Ok(TeamKey::Blue),
            "red" | "200" => Ok(TeamKey::Red),
            other => Err(format!("unknown team '{other}' (expected blue or red)")),
        }
    }
}

/// One value per team, serialized as `{ "blue": .., "red": .. }`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct TeamPair<T> {
    pub blue: T,
    pub red: T,
}

impl<T> TeamPair<T> {
    pub fn new(blue: T, red: T) -> Self {
        Self { blue, red }
    }

    pub fn get(&self, team: TeamKey) -> &T {
        match team {
            TeamKey::Blue => &self.blue,
            TeamKey::Red => &self.red,
        }
    }

    pub fn get_mut(&mut self, team: TeamKey) -> &mut T {
        match team {
            TeamKey::Blue => &mut self.blue,
            TeamKey::Red => &mut self.red,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(TeamKey, &T) -> U) -> TeamPair<U> {
        TeamPair { blue: f(TeamKey::Blue, &self.blue), red: f(TeamKey::Red, &self.red) }
    }
}
