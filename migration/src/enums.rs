use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub(crate) enum Golfer {
    Table,
    Id,
    SourceId,
    FirstName,
    LastName,
    TournamentUniqueId,
}

#[derive(DeriveIden)]
pub(crate) enum Tournament {
    Table,
    Id,
    Name,
    UniqueId,
    Year,
    WeekNumber,
    Purse,
    Major,
    StartDate,
    EndDate,
}

#[derive(DeriveIden)]
pub(crate) enum Pick {
    Table,
    Id,
    UserId,
    TournamentId,
    GolferId,
    Priority,
    Drafted,
    OriginalGolferId,
    ReplacedAtRound,
    ReplacementReason,
}

#[derive(DeriveIden)]
pub(crate) enum Score {
    Table,
    Id,
    PickId,
    Round,
    Score,
    Position,
    Status,
}

#[derive(DeriveIden)]
pub(crate) enum TournamentResult {
    Table,
    Id,
    TournamentId,
    UserId,
    Place,
    TotalScore,
    WinnerPicked,
    CutsMissed,
}
