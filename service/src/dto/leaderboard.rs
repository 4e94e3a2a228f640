use std::fmt::{Display, Formatter};
use std::str::FromStr;

use entity::sea_orm_active_enums::ScoreStatus;
use itertools::Itertools;
use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, VecSkipError};
use strum_macros::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlayerStatus {
    Active,
    Cut,
    Wd,
    Complete,
    Dq,
}

impl PlayerStatus {
    fn from_position(position: &Position) -> Self {
        match position {
            Position::Cut => PlayerStatus::Cut,
            Position::Withdrawn => PlayerStatus::Wd,
            Position::Disqualified => PlayerStatus::Dq,
            Position::Rank { .. } | Position::Unknown => PlayerStatus::Active,
        }
    }
}

impl From<PlayerStatus> for ScoreStatus {
    fn from(status: PlayerStatus) -> Self {
        match status {
            PlayerStatus::Active => ScoreStatus::Active,
            PlayerStatus::Cut => ScoreStatus::Cut,
            PlayerStatus::Wd => ScoreStatus::Wd,
            PlayerStatus::Complete => ScoreStatus::Complete,
            PlayerStatus::Dq => ScoreStatus::Dq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Rank { rank: u32, tied: bool },
    Cut,
    Withdrawn,
    Disqualified,
    Unknown,
}

impl Position {
    pub fn numeric(&self) -> Option<u32> {
        match self {
            Position::Rank { rank, .. } => Some(*rank),
            _ => None,
        }
    }

    /// Anything without a rank sorts behind every ranked position.
    pub fn sort_key(rank: Option<u32>) -> u64 {
        rank.map(u64::from).unwrap_or(u64::MAX)
    }

    pub fn is_at_or_behind(&self, threshold: Option<u32>) -> bool {
        Self::sort_key(self.numeric()) >= Self::sort_key(threshold)
    }

    /// The string stored on a score row. Only ranked positions are kept there,
    /// CUT/WD/DQ travel in the status instead.
    pub fn label(&self) -> Option<String> {
        match self {
            Position::Rank { rank, tied: true } => Some(format!("T{rank}")),
            Position::Rank { rank, tied: false } => Some(rank.to_string()),
            _ => None,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Rank { rank, tied: true } => write!(f, "T{rank}"),
            Position::Rank { rank, tied: false } => write!(f, "{rank}"),
            Position::Cut => write!(f, "CUT"),
            Position::Withdrawn => write!(f, "WD"),
            Position::Disqualified => write!(f, "DQ"),
            Position::Unknown => write!(f, "-"),
        }
    }
}

/// Strips everything but digits, so `"T5"` and `"5"` both rank fifth.
pub fn parse_position(raw: &str) -> Position {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if let Ok(rank) = digits.parse::<u32>() {
        return Position::Rank {
            rank,
            tied: trimmed.starts_with(|c: char| c == 'T' || c == 't'),
        };
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "CUT" | "MC" => Position::Cut,
        "WD" => Position::Withdrawn,
        "DQ" => Position::Disqualified,
        _ => Position::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEntry {
    pub round: i32,
    pub strokes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub player_id: String,
    pub name: String,
    pub status: PlayerStatus,
    pub position: Position,
    pub rounds: Vec<RoundEntry>,
}

impl LeaderboardRow {
    pub fn new(player_id: impl Into<String>, position: &str, status: PlayerStatus) -> Self {
        let player_id = player_id.into();
        Self {
            name: player_id.clone(),
            player_id,
            status,
            position: parse_position(position),
            rounds: vec![],
        }
    }

    pub fn with_round(mut self, round: i32, strokes: i32) -> Self {
        self.rounds.push(RoundEntry { round, strokes });
        self.rounds.sort_by_key(|r| r.round);
        self
    }

    pub fn is_withdrawn(&self) -> bool {
        self.status == PlayerStatus::Wd
    }

    pub fn latest_round(&self) -> Option<i32> {
        self.rounds.iter().map(|r| r.round).max()
    }
}

/// A typed leaderboard snapshot. Raw payload quirks stop at [`Leaderboard::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn new(rows: Vec<LeaderboardRow>) -> Self {
        Self { rows }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let snapshot: RawSnapshot = serde_json::from_str(raw)?;
        let rows = snapshot
            .players
            .into_iter()
            .map(LeaderboardRow::from)
            .collect_vec();
        debug!("Parsed leaderboard snapshot with {} rows", rows.len());
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, player_id: &str) -> Option<&LeaderboardRow> {
        self.rows.iter().find(|r| r.player_id == player_id)
    }

    pub fn withdrawn(&self) -> impl Iterator<Item = &LeaderboardRow> {
        self.rows.iter().filter(|r| r.is_withdrawn())
    }

    pub fn winner(&self) -> Option<&LeaderboardRow> {
        self.rows.iter().find(|r| r.position.numeric() == Some(1))
    }
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct RawSnapshot {
    #[serde(alias = "leaderboard", alias = "rows")]
    #[serde_as(as = "VecSkipError<_>")]
    players: Vec<RawRow>,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct RawRow {
    #[serde(alias = "playerId", alias = "id", deserialize_with = "unwrap_text")]
    player_id: String,
    #[serde(default, alias = "playerName", alias = "name")]
    display_name: Option<String>,
    #[serde(default, alias = "firstName")]
    first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    last_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, deserialize_with = "unwrap_optional_text")]
    position: Option<String>,
    #[serde(default)]
    #[serde_as(as = "VecSkipError<_>")]
    rounds: Vec<RawRound>,
}

#[derive(Deserialize, Debug)]
struct RawRound {
    #[serde(alias = "roundNumber", alias = "round", deserialize_with = "unwrap_i32")]
    round_number: i32,
    #[serde(default, alias = "score", deserialize_with = "unwrap_optional_i32")]
    strokes: Option<i32>,
}

impl From<RawRow> for LeaderboardRow {
    fn from(raw: RawRow) -> Self {
        let position = raw
            .position
            .as_deref()
            .map(parse_position)
            .unwrap_or(Position::Unknown);
        let status = raw
            .status
            .as_deref()
            .and_then(|s| PlayerStatus::from_str(s.trim()).ok())
            .unwrap_or_else(|| PlayerStatus::from_position(&position));
        let name = raw.display_name.unwrap_or_else(|| {
            [raw.first_name, raw.last_name]
                .into_iter()
                .flatten()
                .join(" ")
        });
        let rounds = raw
            .rounds
            .into_iter()
            .filter_map(|r| {
                r.strokes.map(|strokes| RoundEntry {
                    round: r.round_number,
                    strokes,
                })
            })
            .sorted_by_key(|r| r.round)
            .collect();
        Self {
            player_id: raw.player_id,
            name,
            status,
            position,
            rounds,
        }
    }
}

/// Numbers arrive bare, as strings, or inside a legacy extended-JSON envelope.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Wrapped(ExtendedNumber),
}

#[derive(Deserialize, Debug)]
struct ExtendedNumber {
    #[serde(
        rename = "$numberInt",
        alias = "$numberLong",
        alias = "$numberDouble",
        alias = "$numberDecimal"
    )]
    value: String,
}

impl LooseNumber {
    fn as_i32(&self) -> Option<i32> {
        let value = match self {
            LooseNumber::Int(v) => Some(*v),
            LooseNumber::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) | LooseNumber::Wrapped(ExtendedNumber { value: s }) => {
                parse_whole_number(s)
            }
        };
        value.and_then(|v| i32::try_from(v).ok())
    }

    fn into_text(self) -> String {
        match self {
            LooseNumber::Int(v) => v.to_string(),
            LooseNumber::Float(v) => v.to_string(),
            LooseNumber::Text(s) => s,
            LooseNumber::Wrapped(e) => e.value,
        }
    }
}

fn parse_whole_number(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn unwrap_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LooseNumber::deserialize(deserializer)?.into_text())
}

fn unwrap_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseNumber>::deserialize(deserializer)?.map(LooseNumber::into_text))
}

fn unwrap_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    LooseNumber::deserialize(deserializer)?
        .as_i32()
        .ok_or_else(|| D::Error::custom("expected a whole number"))
}

fn unwrap_optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseNumber>::deserialize(deserializer)?.and_then(|n| n.as_i32()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tie_prefix_is_stripped() {
        assert_eq!(parse_position("T5"), Position::Rank { rank: 5, tied: true });
        assert_eq!(parse_position("12"), Position::Rank { rank: 12, tied: false });
        assert_eq!(parse_position(" t10 ").numeric(), Some(10));
    }

    #[test]
    fn non_numeric_positions_rank_behind_everyone() {
        assert_eq!(parse_position("CUT"), Position::Cut);
        assert_eq!(parse_position("wd"), Position::Withdrawn);
        assert_eq!(parse_position("DQ"), Position::Disqualified);
        assert_eq!(parse_position(""), Position::Unknown);

        assert!(Position::Cut.is_at_or_behind(Some(70)));
        assert!(Position::Cut.is_at_or_behind(None));
        assert!(!parse_position("T9").is_at_or_behind(Some(10)));
        assert!(parse_position("T10").is_at_or_behind(Some(10)));
        assert!(!parse_position("80").is_at_or_behind(None));
    }

    #[test]
    fn labels_only_keep_ranks() {
        assert_eq!(parse_position("T3").label().as_deref(), Some("T3"));
        assert_eq!(parse_position("3").label().as_deref(), Some("3"));
        assert_eq!(Position::Cut.label(), None);
        assert_eq!(Position::Cut.to_string(), "CUT");
    }

    #[test]
    fn extended_json_numbers_are_unwrapped() {
        let raw = r#"{
            "players": [
                {
                    "playerId": {"$numberInt": "46046"},
                    "firstName": "Scottie",
                    "lastName": "Scheffler",
                    "status": "active",
                    "position": "T2",
                    "rounds": [
                        {"roundNumber": {"$numberInt": "2"}, "strokes": {"$numberLong": "68"}},
                        {"roundNumber": 1, "strokes": "70"}
                    ]
                },
                {
                    "playerId": "28237",
                    "name": "Rory McIlroy",
                    "position": "WD",
                    "rounds": [{"roundNumber": 1, "strokes": {"$numberDouble": "74.0"}}]
                }
            ]
        }"#;
        let leaderboard = Leaderboard::from_json(raw).unwrap();
        let scottie = leaderboard.row("46046").unwrap();
        assert_eq!(scottie.name, "Scottie Scheffler");
        assert_eq!(scottie.position, Position::Rank { rank: 2, tied: true });
        assert_eq!(
            scottie.rounds,
            vec![
                RoundEntry { round: 1, strokes: 70 },
                RoundEntry { round: 2, strokes: 68 }
            ]
        );

        let rory = leaderboard.row("28237").unwrap();
        assert_eq!(rory.status, PlayerStatus::Wd);
        assert!(rory.is_withdrawn());
        assert_eq!(rory.rounds[0].strokes, 74);
        assert_eq!(leaderboard.withdrawn().count(), 1);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let raw = r#"{
            "leaderboard": [
                {"name": "no id at all"},
                {"playerId": "1", "status": "active", "position": "1"},
                {"playerId": "2", "status": "cut", "position": "CUT",
                 "rounds": [{"roundNumber": "x", "strokes": 71}, {"roundNumber": 1, "strokes": 75}]}
            ]
        }"#;
        let leaderboard = Leaderboard::from_json(raw).unwrap();
        assert_eq!(leaderboard.rows().len(), 2);
        assert_eq!(leaderboard.winner().map(|r| r.player_id.as_str()), Some("1"));
        assert_eq!(leaderboard.row("2").unwrap().rounds.len(), 1);
        assert_eq!(leaderboard.row("2").unwrap().status, PlayerStatus::Cut);
    }

    #[test]
    fn garbage_snapshot_is_an_error() {
        assert!(Leaderboard::from_json("not json").is_err());
        assert!(Leaderboard::from_json(r#"{"something": []}"#).is_err());
    }
}
