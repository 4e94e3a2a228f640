use entity::prelude::*;
use entity::sea_orm_active_enums::{ReplacementReason, ScoreStatus};
use entity::*;
use log::warn;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter,
};

use crate::config::EngineConfig;
use crate::dto::ValidationErrors;
use crate::error::GenericError;
use crate::query::{get_score, get_tournament, season_selection_count};

pub struct NewPick {
    pub user_id: i32,
    pub tournament_id: i32,
    pub golfer_id: i32,
    pub priority: i32,
}

impl NewPick {
    fn to_model(&self) -> pick::Model {
        pick::Model {
            id: 0,
            user_id: self.user_id,
            tournament_id: self.tournament_id,
            golfer_id: self.golfer_id,
            priority: self.priority,
            drafted: false,
            original_golfer_id: None,
            replaced_at_round: None,
            replacement_reason: None,
        }
    }

    pub async fn insert(
        self,
        db: &impl ConnectionTrait,
        config: &EngineConfig,
    ) -> Result<pick::Model, GenericError> {
        validate_pick(db, &self.to_model(), config).await?.into_result()?;
        let new_pick = pick::ActiveModel {
            id: NotSet,
            user_id: Set(self.user_id),
            tournament_id: Set(self.tournament_id),
            golfer_id: Set(self.golfer_id),
            priority: Set(self.priority),
            drafted: Set(false),
            original_golfer_id: Set(None),
            replaced_at_round: Set(None),
            replacement_reason: Set(None),
        };
        Ok(new_pick.insert(db).await?)
    }
}

/// Checks a pick in the state it is about to be written in.
/// Unsaved picks carry id 0, which never matches a stored row.
pub async fn validate_pick(
    db: &impl ConnectionTrait,
    candidate: &pick::Model,
    config: &EngineConfig,
) -> Result<ValidationErrors, GenericError> {
    let mut errors = ValidationErrors::new();

    if !(1..=config.max_priority).contains(&candidate.priority) {
        errors.add(
            "priority",
            format!("must be between 1 and {}", config.max_priority),
        );
    }

    let same_slot = Pick::find()
        .filter(
            pick::Column::UserId
                .eq(candidate.user_id)
                .and(pick::Column::TournamentId.eq(candidate.tournament_id))
                .and(pick::Column::Id.ne(candidate.id)),
        );
    if same_slot
        .clone()
        .filter(pick::Column::Priority.eq(candidate.priority))
        .count(db)
        .await?
        > 0
    {
        errors.add("priority", "is already taken for this tournament");
    }
    if same_slot
        .clone()
        .filter(pick::Column::GolferId.eq(candidate.golfer_id))
        .count(db)
        .await?
        > 0
    {
        errors.add("golfer_id", "has already been picked for this tournament");
    }

    if candidate.replacement_reason.is_some() && candidate.original_golfer_id.is_none() {
        errors.add("replacement_reason", "requires original_golfer_id");
    }

    if candidate.drafted {
        let drafted = same_slot
            .filter(pick::Column::Drafted.eq(true))
            .count(db)
            .await?;
        if drafted >= config.drafted_per_user as u64 {
            errors.add(
                "drafted",
                format!(
                    "user already has {} drafted picks for this tournament",
                    config.drafted_per_user
                ),
            );
        }

        let tournament = get_tournament(db, candidate.tournament_id)
            .await?
            .ok_or(GenericError::NotFound("Tournament not found"))?;
        let selections = season_selection_count(
            db,
            candidate.user_id,
            candidate.golfer_id,
            tournament.year,
            candidate.id,
        )
        .await?;
        if selections >= config.max_selections_per_season {
            errors.add(
                "golfer_id",
                format!(
                    "has already been drafted {} times in {}",
                    selections, tournament.year
                ),
            );
        }
    }

    Ok(errors)
}

pub async fn mark_drafted(
    db: &impl ConnectionTrait,
    pick: pick::Model,
    config: &EngineConfig,
) -> Result<pick::Model, GenericError> {
    let candidate = pick::Model {
        drafted: true,
        ..pick.clone()
    };
    validate_pick(db, &candidate, config).await?.into_result()?;
    let mut active = pick.into_active_model();
    active.drafted = Set(true);
    Ok(active.update(db).await?)
}

/// Swaps the golfer on a drafted pick. A pick keeps the first golfer it lost,
/// so it can only ever be replaced once. Checks run against the stored row.
pub async fn replace_golfer(
    db: &impl ConnectionTrait,
    pick_id: i32,
    replacement_golfer_id: i32,
    round: i32,
    reason: ReplacementReason,
    config: &EngineConfig,
) -> Result<pick::Model, GenericError> {
    let pick = Pick::find_by_id(pick_id)
        .one(db)
        .await?
        .ok_or(GenericError::NotFound("Pick not found"))?;

    let mut errors = ValidationErrors::new();
    if pick.original_golfer_id.is_some() {
        errors.add("original_golfer_id", "has already been set");
    }
    if !pick.drafted {
        errors.add("drafted", "only drafted picks can be replaced");
    }
    if replacement_golfer_id == pick.golfer_id {
        errors.add("golfer_id", "replacement must differ from the withdrawn golfer");
    }
    let tournament = get_tournament(db, pick.tournament_id)
        .await?
        .ok_or(GenericError::NotFound("Tournament not found"))?;
    let selections = season_selection_count(
        db,
        pick.user_id,
        replacement_golfer_id,
        tournament.year,
        pick.id,
    )
    .await?;
    if selections >= config.max_selections_per_season {
        errors.add(
            "golfer_id",
            format!(
                "has already been drafted {} times in {}",
                selections, tournament.year
            ),
        );
    }
    errors.into_result()?;

    let original = pick.golfer_id;
    let mut active = pick.into_active_model();
    active.original_golfer_id = Set(Some(original));
    active.golfer_id = Set(replacement_golfer_id);
    active.replaced_at_round = Set(Some(round));
    active.replacement_reason = Set(Some(reason));
    Ok(active.update(db).await?)
}

pub struct RoundScore {
    pub pick_id: i32,
    pub round: i32,
    pub score: i32,
    pub position: Option<String>,
    pub status: ScoreStatus,
}

impl RoundScore {
    /// One row per (pick, round). An existing position is kept when the new one is empty.
    pub async fn upsert(self, db: &impl ConnectionTrait) -> Result<score::Model, GenericError> {
        if !(1..=4).contains(&self.round) {
            let mut errors = ValidationErrors::new();
            errors.add("round", "must be between 1 and 4");
            return Err(errors.into());
        }
        match get_score(db, self.pick_id, self.round).await? {
            Some(existing) => {
                let keep_position = existing.position.clone();
                let mut active = existing.into_active_model();
                active.score = Set(self.score);
                active.status = Set(self.status);
                active.position = Set(self.position.or(keep_position));
                Ok(active.update(db).await?)
            }
            None => Ok(score::ActiveModel {
                id: NotSet,
                pick_id: Set(self.pick_id),
                round: Set(self.round),
                score: Set(self.score),
                position: Set(self.position),
                status: Set(self.status),
            }
            .insert(db)
            .await?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResult {
    pub tournament_id: i32,
    pub user_id: i32,
    pub place: i32,
    pub total_score: i32,
    pub winner_picked: bool,
    pub cuts_missed: i32,
}

impl NewResult {
    /// Writes by (tournament, user) so a repeated close-out overwrites instead of duplicating.
    pub async fn upsert(
        self,
        db: &impl ConnectionTrait,
    ) -> Result<tournament_result::Model, GenericError> {
        let mut errors = ValidationErrors::new();
        if self.place < 1 {
            errors.add("place", "must be at least 1");
        }
        if self.cuts_missed < 0 {
            errors.add("cuts_missed", "cannot be negative");
        }
        errors.into_result()?;

        let existing = TournamentResult::find()
            .filter(
                tournament_result::Column::TournamentId
                    .eq(self.tournament_id)
                    .and(tournament_result::Column::UserId.eq(self.user_id)),
            )
            .one(db)
            .await?;
        match existing {
            Some(existing) => {
                warn!(
                    "Overwriting result for user {} in tournament {}",
                    self.user_id, self.tournament_id
                );
                let mut active = existing.into_active_model();
                active.place = Set(self.place);
                active.total_score = Set(self.total_score);
                active.winner_picked = Set(self.winner_picked);
                active.cuts_missed = Set(self.cuts_missed);
                Ok(active.update(db).await?)
            }
            None => Ok(tournament_result::ActiveModel {
                id: NotSet,
                tournament_id: Set(self.tournament_id),
                user_id: Set(self.user_id),
                place: Set(self.place),
                total_score: Set(self.total_score),
                winner_picked: Set(self.winner_picked),
                cuts_missed: Set(self.cuts_missed),
            }
            .insert(db)
            .await?),
        }
    }
}
