use std::collections::HashSet;

use entity::sea_orm_active_enums::ReplacementReason;
use entity::{golfer, pick, tournament};
use log::{debug, error, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::ConnectionTrait;

use crate::config::EngineConfig;
use crate::dto::{parse_position, Leaderboard, LeaderboardRow};
use crate::error::GenericError;
use crate::mutation::replace_golfer;
use crate::query::{
    drafted_picks_with_golfers, find_golfer_by_source_id, latest_positioned_score,
    registered_golfers, season_selection_count,
};

/// Where a withdrawn golfer stood when they left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastKnown {
    /// No score with a position was ever recorded.
    Unplaced,
    /// Rank from the most recent positioned score, `None` when it had no number.
    Placed(Option<u32>),
}

impl LastKnown {
    pub fn reason(&self) -> ReplacementReason {
        match self {
            LastKnown::Unplaced => ReplacementReason::WdEarly,
            LastKnown::Placed(_) => ReplacementReason::Wd,
        }
    }

    fn admits(&self, row: &LeaderboardRow) -> bool {
        match self {
            LastKnown::Unplaced => true,
            LastKnown::Placed(threshold) => row.position.is_at_or_behind(*threshold),
        }
    }
}

/// Rows a withdrawn golfer may be swapped for: never withdrawn themselves and,
/// once placed, only at or behind the golfer's last rank.
pub fn eligible_rows(leaderboard: &Leaderboard, last_known: LastKnown) -> Vec<&LeaderboardRow> {
    leaderboard
        .rows()
        .iter()
        .filter(|row| !row.is_withdrawn() && last_known.admits(row))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub pick_id: i32,
    pub user_id: i32,
    pub withdrawn_golfer_id: i32,
    pub replacement_golfer_id: i32,
    pub round: i32,
    pub reason: ReplacementReason,
}

/// Swaps every drafted golfer the snapshot lists as withdrawn. Picks that were
/// replaced before are left alone, and a failure on one pick never stops the rest.
pub async fn detect_and_replace(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
    current_round: i32,
    leaderboard: &Leaderboard,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Replacement>, GenericError> {
    if leaderboard.is_empty() {
        info!(
            "Empty leaderboard for tournament {}, nothing to replace",
            tournament.id
        );
        return Ok(vec![]);
    }

    let picks = drafted_picks_with_golfers(db, tournament.id).await?;
    let mut drafted: HashSet<i32> = picks.iter().map(|(p, _)| p.golfer_id).collect();
    let mut replaced: HashSet<i32> = HashSet::new();
    let mut replacements = Vec::new();
    let swap = Swap {
        tournament,
        round: current_round,
        leaderboard,
        config,
    };

    for row in leaderboard.withdrawn() {
        let Some((pick, _)) = picks.iter().find(|(_, golfer)| {
            golfer
                .as_ref()
                .is_some_and(|g| g.source_id == row.player_id)
        }) else {
            debug!("Withdrawn player {} was not drafted", row.player_id);
            continue;
        };
        if pick.original_golfer_id.is_some() || replaced.contains(&pick.id) {
            debug!("Pick {} has already been replaced", pick.id);
            continue;
        }

        match swap.replace(db, pick, &drafted, rng).await {
            Ok(Some(replacement)) => {
                info!(
                    "Replaced withdrawn golfer {} with {} on pick {} ({:?})",
                    replacement.withdrawn_golfer_id,
                    replacement.replacement_golfer_id,
                    replacement.pick_id,
                    replacement.reason
                );
                drafted.insert(replacement.replacement_golfer_id);
                replaced.insert(replacement.pick_id);
                replacements.push(replacement);
            }
            Ok(None) => {}
            Err(e) => error!(
                "Unable to replace withdrawn player {} on pick {}: {}",
                row.player_id, pick.id, e
            ),
        }
    }
    Ok(replacements)
}

struct Swap<'a> {
    tournament: &'a tournament::Model,
    round: i32,
    leaderboard: &'a Leaderboard,
    config: &'a EngineConfig,
}

impl Swap<'_> {
    /// The pick's owner may not exceed the season selection limit through a replacement.
    async fn allowed(
        &self,
        db: &impl ConnectionTrait,
        pick: &pick::Model,
        golfer: &golfer::Model,
        drafted: &HashSet<i32>,
    ) -> Result<bool, GenericError> {
        if drafted.contains(&golfer.id) {
            return Ok(false);
        }
        let selections =
            season_selection_count(db, pick.user_id, golfer.id, self.tournament.year, pick.id)
                .await?;
        Ok(selections < self.config.max_selections_per_season)
    }

    async fn replace(
        &self,
        db: &impl ConnectionTrait,
        pick: &pick::Model,
        drafted: &HashSet<i32>,
        rng: &mut impl Rng,
    ) -> Result<Option<Replacement>, GenericError> {
        let last_known = match latest_positioned_score(db, pick.id).await? {
            Some(score) => LastKnown::Placed(
                score
                    .position
                    .as_deref()
                    .map(parse_position)
                    .and_then(|p| p.numeric()),
            ),
            None => LastKnown::Unplaced,
        };

        let mut pool: Vec<golfer::Model> = Vec::new();
        for row in eligible_rows(self.leaderboard, last_known) {
            if let Some(golfer) = find_golfer_by_source_id(db, &row.player_id).await? {
                if self.allowed(db, pick, &golfer, drafted).await? {
                    pool.push(golfer);
                }
            }
        }

        if pool.is_empty() {
            let withdrawn: HashSet<&str> = self
                .leaderboard
                .withdrawn()
                .map(|r| r.player_id.as_str())
                .collect();
            for golfer in registered_golfers(db, self.tournament).await? {
                if !withdrawn.contains(golfer.source_id.as_str())
                    && self.allowed(db, pick, &golfer, drafted).await?
                {
                    pool.push(golfer);
                }
            }
            if !pool.is_empty() {
                info!(
                    "No leaderboard replacement for pick {}, using the registered field",
                    pick.id
                );
            }
        }

        let Some(replacement) = pool.choose(rng) else {
            warn!(
                "No eligible replacement for golfer {} on pick {}, abandoning",
                pick.golfer_id, pick.id
            );
            return Ok(None);
        };

        let reason = last_known.reason();
        let updated = replace_golfer(
            db,
            pick.id,
            replacement.id,
            self.round,
            reason,
            self.config,
        )
        .await?;
        Ok(Some(Replacement {
            pick_id: updated.id,
            user_id: updated.user_id,
            withdrawn_golfer_id: updated.original_golfer_id.unwrap_or_default(),
            replacement_golfer_id: updated.golfer_id,
            round: self.round,
            reason,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::PlayerStatus;
    use itertools::Itertools;

    fn field() -> Leaderboard {
        let mut rows = (1..=20)
            .map(|i| {
                let position = if i % 5 == 0 { format!("T{i}") } else { i.to_string() };
                LeaderboardRow::new(format!("p{i}"), &position, PlayerStatus::Active)
            })
            .collect_vec();
        rows[13] = LeaderboardRow::new("p14", "WD", PlayerStatus::Wd);
        rows.push(LeaderboardRow::new("p21", "CUT", PlayerStatus::Cut));
        Leaderboard::new(rows)
    }

    fn ids(rows: &[&LeaderboardRow]) -> Vec<String> {
        rows.iter().map(|r| r.player_id.clone()).collect()
    }

    #[test]
    fn placed_golfer_is_replaced_from_at_or_behind() {
        let leaderboard = field();
        let eligible = eligible_rows(&leaderboard, LastKnown::Placed(Some(10)));
        let expected = (10..=21)
            .filter(|i| *i != 14)
            .map(|i| format!("p{i}"))
            .collect_vec();
        assert_eq!(ids(&eligible), expected);
    }

    #[test]
    fn early_withdrawal_uses_the_whole_field() {
        let leaderboard = field();
        let eligible = eligible_rows(&leaderboard, LastKnown::Unplaced);
        assert_eq!(eligible.len(), 20);
        assert!(eligible.iter().all(|r| !r.is_withdrawn()));
        assert_eq!(LastKnown::Unplaced.reason(), ReplacementReason::WdEarly);
        assert_eq!(LastKnown::Placed(Some(3)).reason(), ReplacementReason::Wd);
    }

    #[test]
    fn unranked_last_position_only_admits_unranked_rows() {
        let leaderboard = field();
        let eligible = eligible_rows(&leaderboard, LastKnown::Placed(None));
        assert_eq!(ids(&eligible), vec!["p21".to_string()]);
    }
}
