use std::str::FromStr;

use dotenvy::dotenv;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use strum_macros::{Display, EnumString};

use crate::error::GenericError;

/// How two users with identical stroke totals are ordered at close-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlacementTieBreak {
    #[default]
    UserId,
    CutsMissedThenUserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub drafted_per_user: usize,
    pub max_priority: i32,
    pub max_selections_per_season: u64,
    /// Points by place, index 0 is first place. Places past the end score 0.
    pub place_points: Vec<i32>,
    pub major_winner_bonus: i32,
    pub winner_picked_bonus: i32,
    pub placement_tie_break: PlacementTieBreak,
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drafted_per_user: 2,
            max_priority: 8,
            max_selections_per_season: 3,
            place_points: vec![-4, -3, -2, -1],
            major_winner_bonus: -2,
            winner_picked_bonus: -1,
            placement_tie_break: PlacementTieBreak::UserId,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by whatever is set in the environment or `.env`.
    pub fn from_env() -> Result<Self, GenericError> {
        dotenv().ok();
        let mut config = Self::default();
        if let Some(v) = env_value("DRAFTED_PER_USER")? {
            config.drafted_per_user = v;
        }
        if let Some(v) = env_value("MAX_PICK_PRIORITY")? {
            config.max_priority = v;
        }
        if let Some(v) = env_value("MAX_SELECTIONS_PER_SEASON")? {
            config.max_selections_per_season = v;
        }
        if let Ok(raw) = std::env::var("PLACE_POINTS") {
            config.place_points = parse_points(&raw).ok_or_else(|| {
                error!("PLACE_POINTS must be a comma separated list of integers, got {raw:?}");
                GenericError::InvalidConfig("PLACE_POINTS")
            })?;
        }
        if let Some(v) = env_value("MAJOR_WINNER_BONUS")? {
            config.major_winner_bonus = v;
        }
        if let Some(v) = env_value("WINNER_PICKED_BONUS")? {
            config.winner_picked_bonus = v;
        }
        if let Some(v) = env_value("PLACEMENT_TIE_BREAK")? {
            config.placement_tie_break = v;
        }
        config.rng_seed = env_value("RNG_SEED")?;
        info!("Loaded engine config: {:?}", config);
        Ok(config)
    }

    pub fn points_for_place(&self, place: usize) -> i32 {
        place
            .checked_sub(1)
            .and_then(|i| self.place_points.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn env_value<T: FromStr>(key: &'static str) -> Result<Option<T>, GenericError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            error!("Unable to parse {key}={raw:?}");
            GenericError::InvalidConfig(key)
        }),
        Err(_) => Ok(None),
    }
}

fn parse_points(raw: &str) -> Option<Vec<i32>> {
    raw.split(',')
        .map(|p| p.trim().parse::<i32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_point_table() {
        let config = EngineConfig::default();
        assert_eq!(config.points_for_place(1), -4);
        assert_eq!(config.points_for_place(2), -3);
        assert_eq!(config.points_for_place(3), -2);
        assert_eq!(config.points_for_place(4), -1);
        assert_eq!(config.points_for_place(5), 0);
        assert_eq!(config.points_for_place(0), 0);
    }

    #[test]
    fn points_parse_from_list() {
        assert_eq!(parse_points("-5, -3,-1"), Some(vec![-5, -3, -1]));
        assert_eq!(parse_points("-5,x"), None);
    }

    #[test]
    fn tie_break_parses_snake_case() {
        assert_eq!(
            "cuts_missed_then_user_id".parse::<PlacementTieBreak>().unwrap(),
            PlacementTieBreak::CutsMissedThenUserId
        );
        assert_eq!(PlacementTieBreak::UserId.to_string(), "user_id");
    }
}
