use sea_orm_migration::prelude::*;

use crate::enums::*;
use crate::macros::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tournament::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournament::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tournament::Name).string().not_null())
                    .col(
                        ColumnDef::new(Tournament::UniqueId)
                            .string()
                            .unique_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tournament::Year).integer().not_null())
                    .col(ColumnDef::new(Tournament::WeekNumber).integer().not_null())
                    .col(ColumnDef::new(Tournament::Purse).big_integer())
                    .col(
                        ColumnDef::new(Tournament::Major)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tournament::StartDate).date().not_null())
                    .col(ColumnDef::new(Tournament::EndDate).date().not_null())
                    .to_owned(),
            )
            .await?;

        unique_index!(
            "tournament_year_week",
            Tournament,
            manager,
            Year,
            WeekNumber
        );
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table!(Tournament, manager);
        Ok(())
    }
}
