use entity::sea_orm_active_enums::ScoreStatus;
use entity::{pick, tournament};
use log::{debug, info, warn};
use sea_orm::ConnectionTrait;

use crate::dto::{Leaderboard, LeaderboardRow};
use crate::error::GenericError;
use crate::mutation::RoundScore;
use crate::query::drafted_picks_with_golfers;

/// The rows to write for one pick. Only the newest round carries the live
/// position and status, earlier rounds are finished.
pub fn round_scores_for(pick: &pick::Model, row: &LeaderboardRow) -> Vec<RoundScore> {
    let latest = row.latest_round();
    row.rounds
        .iter()
        // rounds before a replacement belong to the withdrawn golfer
        .filter(|entry| pick.replaced_at_round.map_or(true, |r| entry.round >= r))
        .map(|entry| {
            let is_latest = Some(entry.round) == latest;
            RoundScore {
                pick_id: pick.id,
                round: entry.round,
                score: entry.strokes,
                position: if is_latest { row.position.label() } else { None },
                status: if is_latest {
                    row.status.into()
                } else {
                    ScoreStatus::Complete
                },
            }
        })
        .collect()
}

/// Copies the snapshot's round scores onto every drafted pick of the tournament.
/// Returns how many score rows were written.
pub async fn record_round_scores(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
    leaderboard: &Leaderboard,
) -> Result<usize, GenericError> {
    if leaderboard.is_empty() {
        info!("Empty leaderboard for tournament {}, no scores to record", tournament.id);
        return Ok(0);
    }

    let mut written = 0;
    for (pick, golfer) in drafted_picks_with_golfers(db, tournament.id).await? {
        let Some(golfer) = golfer else {
            warn!("Pick {} points at a missing golfer", pick.id);
            continue;
        };
        let Some(row) = leaderboard.row(&golfer.source_id) else {
            debug!("Golfer {} is not on the leaderboard", golfer.source_id);
            continue;
        };
        for round_score in round_scores_for(&pick, row) {
            let round = round_score.round;
            match round_score.upsert(db).await {
                Ok(_) => written += 1,
                Err(e) if e.is_validation() => {
                    warn!("Skipping round {round} for pick {}: {e}", pick.id)
                }
                Err(e) => return Err(e),
            }
        }
    }
    info!("Recorded {written} round scores for tournament {}", tournament.id);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::PlayerStatus;

    fn drafted(replaced_at_round: Option<i32>) -> pick::Model {
        pick::Model {
            id: 7,
            user_id: 1,
            tournament_id: 1,
            golfer_id: 3,
            priority: 1,
            drafted: true,
            original_golfer_id: replaced_at_round.map(|_| 2),
            replaced_at_round,
            replacement_reason: None,
        }
    }

    #[test]
    fn latest_round_carries_position_and_status() {
        let row = LeaderboardRow::new("3", "CUT", PlayerStatus::Cut)
            .with_round(2, 76)
            .with_round(1, 74);
        let scores = round_scores_for(&drafted(None), &row);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].round, 1);
        assert_eq!(scores[0].status, ScoreStatus::Complete);
        assert_eq!(scores[1].round, 2);
        assert_eq!(scores[1].status, ScoreStatus::Cut);
        // CUT is not a rank, so nothing is stored as position
        assert_eq!(scores[1].position, None);
    }

    #[test]
    fn ranked_position_is_stored_as_label() {
        let row = LeaderboardRow::new("3", "T4", PlayerStatus::Active).with_round(1, 68);
        let scores = round_scores_for(&drafted(None), &row);
        assert_eq!(scores[0].position.as_deref(), Some("T4"));
        assert_eq!(scores[0].status, ScoreStatus::Active);
    }

    #[test]
    fn rounds_before_replacement_are_left_alone() {
        let row = LeaderboardRow::new("3", "12", PlayerStatus::Active)
            .with_round(1, 70)
            .with_round(2, 71)
            .with_round(3, 69);
        let rounds: Vec<i32> = round_scores_for(&drafted(Some(2)), &row)
            .iter()
            .map(|s| s.round)
            .collect();
        assert_eq!(rounds, vec![2, 3]);
    }
}
