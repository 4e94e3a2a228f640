use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use entity::prelude::*;
use entity::*;
use log::{debug, error};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::error::GenericError;

pub async fn get_tournament(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<Option<tournament::Model>, GenericError> {
    Tournament::find_by_id(tournament_id)
        .one(db)
        .await
        .map_err(|e| {
            error!("Error while getting tournament: {:#?}", e);
            GenericError::UnknownError("Unknown error while getting tournament")
        })
}

/// The tournament being played on `as_of`, falling back to the one scheduled
/// for the same ISO week.
pub async fn current_tournament(
    db: &impl ConnectionTrait,
    as_of: NaiveDate,
) -> Result<Option<tournament::Model>, GenericError> {
    let running = Tournament::find()
        .filter(
            tournament::Column::StartDate
                .lte(as_of)
                .and(tournament::Column::EndDate.gte(as_of)),
        )
        .order_by_asc(tournament::Column::StartDate)
        .one(db)
        .await?;
    if running.is_some() {
        return Ok(running);
    }
    let week = as_of.iso_week();
    Ok(Tournament::find()
        .filter(
            tournament::Column::Year
                .eq(week.year())
                .and(tournament::Column::WeekNumber.eq(week.week() as i32)),
        )
        .one(db)
        .await?)
}

/// Most recent earlier tournament of the same season that already has results.
pub async fn previous_tournament_with_results(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
) -> Result<Option<tournament::Model>, GenericError> {
    let earlier = Tournament::find()
        .filter(
            tournament::Column::Year
                .eq(tournament.year)
                .and(tournament::Column::StartDate.lt(tournament.start_date)),
        )
        .order_by_desc(tournament::Column::StartDate)
        .all(db)
        .await?;
    for candidate in earlier {
        let results = TournamentResult::find()
            .filter(tournament_result::Column::TournamentId.eq(candidate.id))
            .count(db)
            .await?;
        if results > 0 {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

pub async fn is_first_of_season(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
) -> Result<bool, GenericError> {
    let earlier = Tournament::find()
        .filter(
            tournament::Column::Year
                .eq(tournament.year)
                .and(tournament::Column::StartDate.lt(tournament.start_date)),
        )
        .count(db)
        .await?;
    Ok(earlier == 0)
}

/// Cumulative point totals per user over every result recorded in `year`.
pub async fn season_totals(
    db: &impl ConnectionTrait,
    year: i32,
) -> Result<HashMap<i32, i32>, GenericError> {
    let results = TournamentResult::find()
        .inner_join(Tournament)
        .filter(tournament::Column::Year.eq(year))
        .all(db)
        .await?;
    Ok(results.iter().fold(HashMap::new(), |mut totals, r| {
        *totals.entry(r.user_id).or_insert(0) += r.total_score;
        totals
    }))
}

pub async fn results_for_tournament(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<Vec<tournament_result::Model>, GenericError> {
    Ok(TournamentResult::find()
        .filter(tournament_result::Column::TournamentId.eq(tournament_id))
        .order_by_asc(tournament_result::Column::Place)
        .all(db)
        .await?)
}

pub async fn get_users(db: &impl ConnectionTrait) -> Result<Vec<user::Model>, GenericError> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(|_| GenericError::UnknownError("Unable to recieve users from database"))
}

pub async fn find_golfer_by_source_id(
    db: &impl ConnectionTrait,
    source_id: &str,
) -> Result<Option<golfer::Model>, GenericError> {
    Ok(Golfer::find()
        .filter(golfer::Column::SourceId.eq(source_id))
        .one(db)
        .await?)
}

/// Golfers whose current eligibility points at this tournament.
pub async fn registered_golfers(
    db: &impl ConnectionTrait,
    tournament: &tournament::Model,
) -> Result<Vec<golfer::Model>, GenericError> {
    Ok(Golfer::find()
        .filter(golfer::Column::TournamentUniqueId.eq(tournament.unique_id.as_str()))
        .order_by_asc(golfer::Column::Id)
        .all(db)
        .await?)
}

pub async fn drafted_picks_with_golfers(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<Vec<(pick::Model, Option<golfer::Model>)>, GenericError> {
    Ok(Pick::find()
        .filter(
            pick::Column::TournamentId
                .eq(tournament_id)
                .and(pick::Column::Drafted.eq(true)),
        )
        .order_by_asc(pick::Column::Id)
        .find_also_related(Golfer)
        .all(db)
        .await?)
}

pub async fn drafted_picks_with_scores(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<Vec<(pick::Model, Vec<score::Model>)>, GenericError> {
    Ok(Pick::find()
        .filter(
            pick::Column::TournamentId
                .eq(tournament_id)
                .and(pick::Column::Drafted.eq(true)),
        )
        .order_by_asc(pick::Column::UserId)
        .order_by_asc(pick::Column::Id)
        .find_with_related(Score)
        .all(db)
        .await?)
}

pub async fn drafted_golfer_ids(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<HashSet<i32>, GenericError> {
    let ids: Vec<i32> = Pick::find()
        .select_only()
        .column(pick::Column::GolferId)
        .filter(
            pick::Column::TournamentId
                .eq(tournament_id)
                .and(pick::Column::Drafted.eq(true)),
        )
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// A user's candidates for one tournament, best priority first.
pub async fn user_picks(
    db: &impl ConnectionTrait,
    user_id: i32,
    tournament_id: i32,
) -> Result<Vec<pick::Model>, GenericError> {
    Ok(Pick::find()
        .filter(
            pick::Column::UserId
                .eq(user_id)
                .and(pick::Column::TournamentId.eq(tournament_id)),
        )
        .order_by_asc(pick::Column::Priority)
        .all(db)
        .await?)
}

pub async fn latest_positioned_score(
    db: &impl ConnectionTrait,
    pick_id: i32,
) -> Result<Option<score::Model>, GenericError> {
    Ok(Score::find()
        .filter(
            score::Column::PickId
                .eq(pick_id)
                .and(score::Column::Position.is_not_null()),
        )
        .order_by_desc(score::Column::Round)
        .one(db)
        .await?)
}

pub async fn get_score(
    db: &impl ConnectionTrait,
    pick_id: i32,
    round: i32,
) -> Result<Option<score::Model>, GenericError> {
    Ok(Score::find()
        .filter(
            score::Column::PickId
                .eq(pick_id)
                .and(score::Column::Round.eq(round)),
        )
        .one(db)
        .await?)
}

/// How many times `user_id` has drafted `golfer_id` in tournaments of `year`,
/// not counting `excluding_pick`.
pub async fn season_selection_count(
    db: &impl ConnectionTrait,
    user_id: i32,
    golfer_id: i32,
    year: i32,
    excluding_pick: i32,
) -> Result<u64, GenericError> {
    let count = Pick::find()
        .inner_join(Tournament)
        .filter(
            pick::Column::UserId
                .eq(user_id)
                .and(pick::Column::GolferId.eq(golfer_id))
                .and(pick::Column::Drafted.eq(true))
                .and(pick::Column::Id.ne(excluding_pick))
                .and(tournament::Column::Year.eq(year)),
        )
        .count(db)
        .await?;
    debug!("User {user_id} has drafted golfer {golfer_id} {count} times in {year}");
    Ok(count)
}

/// Round scores of every drafted golfer per user, used for draft order tie-breaks.
pub async fn round_scores_by_user(
    db: &impl ConnectionTrait,
    tournament_id: i32,
) -> Result<HashMap<i32, Vec<i32>>, GenericError> {
    let picks = drafted_picks_with_scores(db, tournament_id).await?;
    Ok(picks
        .into_iter()
        .fold(HashMap::new(), |mut by_user, (pick, scores)| {
            by_user
                .entry(pick.user_id)
                .or_insert_with(Vec::new)
                .extend(scores.iter().map(|s| s.score));
            by_user
        }))
}
