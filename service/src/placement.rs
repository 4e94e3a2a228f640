use std::cmp::Ordering;
use std::collections::BTreeMap;

use entity::sea_orm_active_enums::ScoreStatus;
use entity::{tournament, tournament_result};
use itertools::Itertools;
use log::{info, warn};
use sea_orm::ConnectionTrait;

use crate::config::{EngineConfig, PlacementTieBreak};
use crate::dto::Leaderboard;
use crate::error::GenericError;
use crate::mutation::NewResult;
use crate::query::{drafted_picks_with_scores, find_golfer_by_source_id};

/// A user's aggregate over their drafted picks for one tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub user_id: i32,
    pub total_strokes: i32,
    pub winner_picked: bool,
    pub cuts_missed: i32,
}

impl Standing {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            total_strokes: 0,
            winner_picked: false,
            cuts_missed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub user_id: i32,
    pub place: i32,
    pub points: i32,
    pub winner_picked: bool,
    pub cuts_missed: i32,
}

pub fn compare_standings(a: &Standing, b: &Standing, tie_break: PlacementTieBreak) -> Ordering {
    a.total_strokes
        .cmp(&b.total_strokes)
        .then_with(|| match tie_break {
            PlacementTieBreak::UserId => Ordering::Equal,
            PlacementTieBreak::CutsMissedThenUserId => a.cuts_missed.cmp(&b.cuts_missed),
        })
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Lowest strokes places first. Places are unique and consecutive from 1.
pub fn rank_standings(
    standings: Vec<Standing>,
    major: bool,
    config: &EngineConfig,
) -> Vec<Placement> {
    standings
        .into_iter()
        .sorted_by(|a, b| compare_standings(a, b, config.placement_tie_break))
        .enumerate()
        .map(|(i, standing)| {
            let place = i + 1;
            let mut points = config.points_for_place(place);
            if major && place == 1 {
                points += config.major_winner_bonus;
            }
            if standing.winner_picked {
                points += config.winner_picked_bonus;
            }
            Placement {
                user_id: standing.user_id,
                place: place as i32,
                points,
                winner_picked: standing.winner_picked,
                cuts_missed: standing.cuts_missed,
            }
        })
        .collect()
}

/// Sums every drafted pick's recorded rounds per user.
pub async fn standings(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
    winning_golfer: Option<i32>,
) -> Result<Vec<Standing>, GenericError> {
    let mut by_user: BTreeMap<i32, Standing> = BTreeMap::new();
    for (pick, scores) in drafted_picks_with_scores(db, tournament.id).await? {
        let standing = by_user
            .entry(pick.user_id)
            .or_insert_with(|| Standing::new(pick.user_id));
        standing.total_strokes += scores.iter().map(|s| s.score).sum::<i32>();
        if winning_golfer == Some(pick.golfer_id) {
            standing.winner_picked = true;
        }
        if scores.iter().any(|s| s.status == ScoreStatus::Cut) {
            standing.cuts_missed += 1;
        }
    }
    Ok(by_user.into_values().collect())
}

/// Closes out a tournament: places every user with drafted picks and writes their result.
/// Running it again overwrites the earlier results.
pub async fn calculate(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
    leaderboard: &Leaderboard,
    config: &EngineConfig,
) -> Result<Vec<tournament_result::Model>, GenericError> {
    let winner = match leaderboard.winner() {
        Some(row) => find_golfer_by_source_id(db, &row.player_id)
            .await?
            .map(|g| g.id),
        None => None,
    };
    if winner.is_none() {
        info!("No winning golfer known for tournament {}", tournament.id);
    }

    let standings = standings(db, tournament, winner).await?;
    if standings.is_empty() {
        info!("No drafted picks in tournament {}, nothing to place", tournament.id);
        return Ok(vec![]);
    }

    let mut results = Vec::with_capacity(standings.len());
    for placement in rank_standings(standings, tournament.major, config) {
        let new_result = NewResult {
            tournament_id: tournament.id,
            user_id: placement.user_id,
            place: placement.place,
            total_score: placement.points,
            winner_picked: placement.winner_picked,
            cuts_missed: placement.cuts_missed,
        };
        match new_result.upsert(db).await {
            Ok(result) => results.push(result),
            Err(e) if e.is_validation() => {
                warn!("Skipping result for user {}: {e}", placement.user_id)
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        "Closed out tournament {} with {} results",
        tournament.id,
        results.len()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(user_id: i32, total_strokes: i32) -> Standing {
        Standing {
            total_strokes,
            ..Standing::new(user_id)
        }
    }

    #[test]
    fn regular_event_pays_the_point_table() {
        let standings = vec![
            standing(1, 288),
            standing(2, 280),
            standing(3, 292),
            standing(4, 284),
        ];
        let placed = rank_standings(standings, false, &EngineConfig::default());
        let summary = placed.iter().map(|p| (p.user_id, p.place, p.points)).collect_vec();
        assert_eq!(summary, vec![(2, 1, -4), (4, 2, -3), (1, 3, -2), (3, 4, -1)]);
    }

    #[test]
    fn major_winner_who_picked_the_champion() {
        let mut winner = standing(2, 280);
        winner.winner_picked = true;
        let standings = vec![standing(1, 288), winner, standing(3, 292), standing(4, 284)];
        let placed = rank_standings(standings, true, &EngineConfig::default());
        assert_eq!(placed[0].user_id, 2);
        assert_eq!(placed[0].points, -7);
        assert!(placed[0].winner_picked);
        assert_eq!(placed[1].points, -3);
    }

    #[test]
    fn winner_bonus_applies_outside_first() {
        let mut picked = standing(3, 292);
        picked.winner_picked = true;
        let placed = rank_standings(vec![standing(1, 280), picked], true, &EngineConfig::default());
        assert_eq!(placed[0].points, -6);
        assert_eq!(placed[1].points, -4);
    }

    #[test]
    fn tied_strokes_get_distinct_places() {
        let mut more_cuts = standing(1, 280);
        more_cuts.cuts_missed = 1;
        let standings = vec![more_cuts, standing(2, 280), standing(3, 0)];

        let by_id = rank_standings(standings.clone(), false, &EngineConfig::default());
        assert_eq!(by_id.iter().map(|p| p.user_id).collect_vec(), vec![3, 1, 2]);
        assert_eq!(by_id.iter().map(|p| p.place).collect_vec(), vec![1, 2, 3]);

        let config = EngineConfig {
            placement_tie_break: PlacementTieBreak::CutsMissedThenUserId,
            ..EngineConfig::default()
        };
        let by_cuts = rank_standings(standings, false, &config);
        assert_eq!(by_cuts.iter().map(|p| p.user_id).collect_vec(), vec![3, 2, 1]);
    }

    #[test]
    fn places_past_the_table_score_nothing() {
        let standings = (1..=6).map(|id| standing(id, 270 + id)).collect_vec();
        let placed = rank_standings(standings, false, &EngineConfig::default());
        assert_eq!(placed[4].points, 0);
        assert_eq!(placed[5].place, 6);
    }
}
