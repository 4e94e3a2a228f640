use std::collections::{HashMap, HashSet, VecDeque};

use entity::{pick, tournament};
use log::{debug, info, warn};
use rand::Rng;
use sea_orm::ConnectionTrait;

use crate::config::EngineConfig;
use crate::draft_order::{resolve_order, DraftOrder};
use crate::error::GenericError;
use crate::mutation::mark_drafted;
use crate::query::{drafted_golfer_ids, get_users, user_picks};

/// `order`, then `order` reversed, repeated until every user has `rounds` turns.
pub fn snake_sequence(order: &[i32], rounds: usize) -> Vec<i32> {
    (0..rounds)
        .flat_map(|round| {
            let mut pass = order.to_vec();
            if round % 2 == 1 {
                pass.reverse();
            }
            pass
        })
        .collect()
}

/// State of one draft: each user's remaining candidates and every golfer taken so far.
#[derive(Debug, Default)]
pub struct DraftSession {
    drafted: HashSet<i32>,
    candidates: HashMap<i32, VecDeque<pick::Model>>,
}

impl DraftSession {
    pub fn new(already_drafted: HashSet<i32>) -> Self {
        Self {
            drafted: already_drafted,
            candidates: HashMap::new(),
        }
    }

    /// `picks` must already be in priority order.
    pub fn add_candidates(&mut self, user_id: i32, picks: impl IntoIterator<Item = pick::Model>) {
        self.candidates
            .entry(user_id)
            .or_default()
            .extend(picks.into_iter().filter(|p| !p.drafted));
    }

    /// Pops the user's best remaining candidate whose golfer is still free.
    pub fn next_candidate(&mut self, user_id: i32) -> Option<pick::Model> {
        let queue = self.candidates.get_mut(&user_id)?;
        while let Some(candidate) = queue.pop_front() {
            if !self.drafted.contains(&candidate.golfer_id) {
                return Some(candidate);
            }
        }
        None
    }

    pub fn record(&mut self, golfer_id: i32) {
        self.drafted.insert(golfer_id);
    }
}

/// Marks picks drafted in snake order. Returns how many picks were drafted.
pub async fn assign(
    db: &impl ConnectionTrait,
    order: &[i32],
    tournament: &tournament::Model,
    config: &EngineConfig,
) -> Result<usize, GenericError> {
    if order.is_empty() {
        info!("Nobody to draft for tournament {}", tournament.id);
        return Ok(0);
    }

    let mut session = DraftSession::new(drafted_golfer_ids(db, tournament.id).await?);
    for &user_id in order {
        session.add_candidates(user_id, user_picks(db, user_id, tournament.id).await?);
    }

    let mut count = 0;
    for user_id in snake_sequence(order, config.drafted_per_user) {
        loop {
            let Some(candidate) = session.next_candidate(user_id) else {
                warn!(
                    "User {user_id} has no eligible golfers left in tournament {}, skipping turn",
                    tournament.id
                );
                break;
            };
            let golfer_id = candidate.golfer_id;
            match mark_drafted(db, candidate, config).await {
                Ok(pick) => {
                    debug!("User {user_id} drafted golfer {golfer_id} (pick {})", pick.id);
                    session.record(golfer_id);
                    count += 1;
                    break;
                }
                Err(GenericError::Validation(errors)) => {
                    warn!("User {user_id} cannot draft golfer {golfer_id}: {errors}");
                }
                Err(e) => return Err(e),
            }
        }
    }
    info!("Drafted {count} picks for tournament {}", tournament.id);
    Ok(count)
}

/// Resolves the order for every user and runs the snake draft.
pub async fn draft_tournament(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Result<(DraftOrder, usize), GenericError> {
    let users = get_users(db).await?;
    let order = resolve_order(db, tournament, &users, rng).await?;
    let drafted = assign(db, &order.user_ids, tournament, config).await?;
    Ok((order, drafted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn candidate(id: i32, user_id: i32, golfer_id: i32, priority: i32) -> pick::Model {
        pick::Model {
            id,
            user_id,
            tournament_id: 1,
            golfer_id,
            priority,
            drafted: false,
            original_golfer_id: None,
            replaced_at_round: None,
            replacement_reason: None,
        }
    }

    #[test]
    fn snake_reverses_on_the_second_pass() {
        assert_eq!(snake_sequence(&[3, 1, 2], 2), vec![3, 1, 2, 2, 1, 3]);
        assert_eq!(snake_sequence(&[3, 1], 3), vec![3, 1, 1, 3, 3, 1]);
        assert!(snake_sequence(&[], 2).is_empty());
    }

    #[test]
    fn taken_golfers_are_skipped() {
        let mut session = DraftSession::new(HashSet::from([10]));
        session.add_candidates(1, vec![candidate(1, 1, 10, 1), candidate(2, 1, 11, 2)]);
        session.add_candidates(2, vec![candidate(3, 2, 11, 1), candidate(4, 2, 12, 2)]);

        let first = session.next_candidate(1).unwrap();
        assert_eq!(first.golfer_id, 11);
        session.record(first.golfer_id);

        let second = session.next_candidate(2).unwrap();
        assert_eq!(second.golfer_id, 12);
        assert!(session.next_candidate(1).is_none());
        assert!(session.next_candidate(99).is_none());
    }

    #[test]
    fn every_user_gets_two_distinct_golfers() {
        // Everyone ranks the same golfers in the same order.
        let order = vec![4, 2, 1, 3];
        let mut session = DraftSession::default();
        for &user in &order {
            session.add_candidates(
                user,
                (1..=8).map(|p| candidate(user * 10 + p, user, 100 + p, p)),
            );
        }
        let mut drafted: HashMap<i32, Vec<i32>> = HashMap::new();
        for user in snake_sequence(&order, 2) {
            let pick = session.next_candidate(user).unwrap();
            session.record(pick.golfer_id);
            drafted.entry(user).or_default().push(pick.golfer_id);
        }
        assert!(drafted.values().all(|g| g.len() == 2));
        let all = drafted.values().flatten().copied().collect_vec();
        assert_eq!(all.iter().unique().count(), all.len());
        // First pick of the first pass and last of the second belong to the same user.
        assert_eq!(drafted[&4], vec![101, 108]);
        assert_eq!(drafted[&3], vec![104, 105]);
    }

    #[test]
    fn already_drafted_picks_are_not_candidates() {
        let mut session = DraftSession::default();
        let mut done = candidate(1, 1, 50, 1);
        done.drafted = true;
        session.add_candidates(1, vec![done, candidate(2, 1, 51, 2)]);
        assert_eq!(session.next_candidate(1).unwrap().golfer_id, 51);
        assert!(session.next_candidate(1).is_none());
    }
}
