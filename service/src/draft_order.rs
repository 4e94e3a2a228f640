use std::cmp::Ordering;
use std::collections::HashMap;

use entity::{tournament, user};
use itertools::Itertools;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::ConnectionTrait;

use crate::error::GenericError;
use crate::query::{
    is_first_of_season, previous_tournament_with_results, results_for_tournament,
    round_scores_by_user, season_totals,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSource {
    /// Seeded from the places of this earlier tournament.
    PreviousTournament(i32),
    /// Seeded from cumulative points of this earlier season.
    PriorSeason(i32),
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrder {
    pub source: OrderSource,
    pub user_ids: Vec<i32>,
}

/// How one user finished the tournament the order is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorFinish {
    pub user_id: i32,
    pub place: Option<i32>,
    pub round_scores: Vec<i32>,
}

/// Worst finisher drafts first.
///
/// Users without a recorded place go before everyone else. Within a place the
/// user with the lower sorted round scores goes first, then the lower user id.
pub fn order_from_previous(finishes: &[PriorFinish]) -> Vec<i32> {
    finishes
        .iter()
        .map(|f| {
            let mut scores = f.round_scores.clone();
            scores.sort_unstable();
            (f, scores)
        })
        .sorted_by(|(a, a_scores), (b, b_scores)| {
            place_rank(b.place)
                .cmp(&place_rank(a.place))
                .then_with(|| compare_round_scores(a_scores, b_scores))
                .then_with(|| a.user_id.cmp(&b.user_id))
        })
        .map(|(f, _)| f.user_id)
        .collect()
}

fn place_rank(place: Option<i32>) -> i64 {
    place.map(i64::from).unwrap_or(i64::MAX)
}

/// Element-wise over two ascending score lists. The first strictly lower
/// score wins; a shared prefix is a tie.
pub fn compare_round_scores(a: &[i32], b: &[i32]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Highest (least negative) season total drafts first.
pub fn order_from_season_totals(user_ids: &[i32], totals: &HashMap<i32, i32>) -> Vec<i32> {
    user_ids
        .iter()
        .copied()
        .sorted_by(|a, b| {
            let a_total = totals.get(a).copied().unwrap_or(0);
            let b_total = totals.get(b).copied().unwrap_or(0);
            b_total.cmp(&a_total).then_with(|| a.cmp(b))
        })
        .collect()
}

pub fn random_order(user_ids: &[i32], rng: &mut impl Rng) -> Vec<i32> {
    let mut order = user_ids.to_vec();
    order.shuffle(rng);
    order
}

pub async fn resolve_order(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
    users: &[user::Model],
    rng: &mut impl Rng,
) -> Result<DraftOrder, GenericError> {
    let user_ids = users.iter().map(|u| u.id).sorted().dedup().collect_vec();
    if user_ids.is_empty() {
        info!("No users to order for tournament {}", tournament.id);
        return Ok(DraftOrder {
            source: OrderSource::Random,
            user_ids,
        });
    }

    if is_first_of_season(db, tournament).await? {
        let prior_year = tournament.year - 1;
        let totals = season_totals(db, prior_year).await?;
        if !totals.is_empty() {
            info!(
                "Seeding draft for tournament {} from {} season totals",
                tournament.id, prior_year
            );
            return Ok(DraftOrder {
                source: OrderSource::PriorSeason(prior_year),
                user_ids: order_from_season_totals(&user_ids, &totals),
            });
        }
    } else if let Some(previous) = previous_tournament_with_results(db, tournament).await? {
        let places: HashMap<i32, i32> = results_for_tournament(db, previous.id)
            .await?
            .into_iter()
            .map(|r| (r.user_id, r.place))
            .collect();
        let mut scores = round_scores_by_user(db, previous.id).await?;
        let finishes = user_ids
            .iter()
            .map(|&user_id| PriorFinish {
                user_id,
                place: places.get(&user_id).copied(),
                round_scores: scores.remove(&user_id).unwrap_or_default(),
            })
            .collect_vec();
        info!(
            "Seeding draft for tournament {} from results of tournament {}",
            tournament.id, previous.id
        );
        return Ok(DraftOrder {
            source: OrderSource::PreviousTournament(previous.id),
            user_ids: order_from_previous(&finishes),
        });
    }

    info!(
        "No history for tournament {}, drafting in random order",
        tournament.id
    );
    Ok(DraftOrder {
        source: OrderSource::Random,
        user_ids: random_order(&user_ids, rng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn finish(user_id: i32, place: i32, round_scores: &[i32]) -> PriorFinish {
        PriorFinish {
            user_id,
            place: Some(place),
            round_scores: round_scores.to_vec(),
        }
    }

    #[test]
    fn worst_place_drafts_first() {
        let finishes = vec![
            finish(1, 1, &[68, 70]),
            finish(2, 2, &[70, 71]),
            finish(3, 3, &[71, 72]),
            finish(4, 4, &[72, 73]),
        ];
        assert_eq!(order_from_previous(&finishes), vec![4, 3, 2, 1]);
    }

    #[test]
    fn lower_round_score_breaks_a_tied_place() {
        let finishes = vec![
            finish(1, 2, &[70, 72, 69]),
            finish(2, 2, &[71, 68, 75]),
            finish(3, 1, &[66]),
        ];
        // sorted: user 1 -> [69, 70, 72], user 2 -> [68, 71, 75]
        assert_eq!(order_from_previous(&finishes), vec![2, 1, 3]);
    }

    #[test]
    fn tie_break_ignores_input_order() {
        let mut finishes = vec![
            finish(7, 3, &[70, 71]),
            finish(3, 3, &[71, 70]),
            finish(5, 3, &[69, 74]),
            finish(9, 4, &[80]),
        ];
        let first = order_from_previous(&finishes);
        finishes.reverse();
        assert_eq!(order_from_previous(&finishes), first);
        assert_eq!(first, vec![9, 5, 3, 7]);
    }

    #[test]
    fn exhausted_scores_fall_back_to_user_id() {
        assert_eq!(compare_round_scores(&[68, 70], &[68, 70, 72]), Ordering::Equal);
        let finishes = vec![finish(8, 2, &[68, 70, 72]), finish(4, 2, &[68, 70])];
        assert_eq!(order_from_previous(&finishes), vec![4, 8]);
    }

    #[test]
    fn users_without_a_place_go_first() {
        let finishes = vec![
            finish(1, 4, &[75]),
            PriorFinish {
                user_id: 2,
                place: None,
                round_scores: vec![],
            },
        ];
        assert_eq!(order_from_previous(&finishes), vec![2, 1]);
    }

    #[test]
    fn season_totals_worst_first() {
        let totals = HashMap::from([(1, -30), (2, -12), (3, -12), (4, -25)]);
        assert_eq!(order_from_season_totals(&[1, 2, 3, 4, 5], &totals), vec![5, 2, 3, 4, 1]);
    }

    #[test]
    fn random_order_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let ids = vec![1, 2, 3, 4, 5, 6];
        let order = random_order(&ids, &mut rng);
        assert_eq!(order.iter().copied().sorted().collect_vec(), ids);

        let mut again = StdRng::seed_from_u64(11);
        assert_eq!(random_order(&ids, &mut again), order);
    }
}
