use crate::enums::*;
use crate::macros::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pick::Table)
                    .col(
                        ColumnDef::new(Pick::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pick::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(Pick::TournamentId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::TournamentId)
                            .to(Tournament::Table, Tournament::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(Pick::GolferId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pick::Table, Pick::GolferId)
                            .to(Golfer::Table, Golfer::Id),
                    )
                    .col(ColumnDef::new(Pick::Priority).integer().not_null())
                    .col(
                        ColumnDef::new(Pick::Drafted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Pick::OriginalGolferId).integer())
                    .col(ColumnDef::new(Pick::ReplacedAtRound).integer())
                    .col(ColumnDef::new(Pick::ReplacementReason).string_len(8))
                    .to_owned(),
            )
            .await?;
        unique_index!(
            "pick_user_tournament_priority",
            Pick,
            manager,
            UserId,
            TournamentId,
            Priority
        );

        manager
            .create_table(
                Table::create()
                    .table(Score::Table)
                    .col(
                        ColumnDef::new(Score::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Score::PickId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Score::Table, Score::PickId)
                            .to(Pick::Table, Pick::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(Score::Round).integer().not_null())
                    .col(ColumnDef::new(Score::Score).integer().not_null())
                    .col(ColumnDef::new(Score::Position).string())
                    .col(ColumnDef::new(Score::Status).string_len(8).not_null())
                    .to_owned(),
            )
            .await?;
        unique_index!("score_pick_round", Score, manager, PickId, Round);

        manager
            .create_table(
                Table::create()
                    .table(TournamentResult::Table)
                    .col(
                        ColumnDef::new(TournamentResult::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TournamentResult::TournamentId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TournamentResult::Table, TournamentResult::TournamentId)
                            .to(Tournament::Table, Tournament::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(TournamentResult::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TournamentResult::Table, TournamentResult::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .col(ColumnDef::new(TournamentResult::Place).integer().not_null())
                    .col(
                        ColumnDef::new(TournamentResult::TotalScore)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentResult::WinnerPicked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TournamentResult::CutsMissed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index!(
            "tournament_result_tournament_user",
            TournamentResult,
            manager,
            TournamentId,
            UserId
        );
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table!(TournamentResult, manager);
        drop_table!(Score, manager);
        drop_table!(Pick, manager);
        Ok(())
    }
}
