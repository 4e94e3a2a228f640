use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use pico_args::Arguments;
use sea_orm::{Database, DatabaseConnection};
use service::config::EngineConfig;
use service::dto::Leaderboard;
use service::error::GenericError;
use service::{placement, score_sync, snake_draft, withdrawals};

const HELP: &str = "\
Fantasy golf draft and scoring engine

USAGE:
  fantasy_golf <COMMAND>

COMMANDS:
  migrate                                   Apply pending database migrations
  current [YYYY-MM-DD]                      Show the tournament running on a date [default: today]
  draft <TOURNAMENT>                        Resolve the draft order and assign picks
  withdrawals <TOURNAMENT> <ROUND> <FILE>   Replace withdrawn golfers, then record round scores
  close-out <TOURNAMENT> <FILE>             Record final scores and write placements

FLAGS:
  -h, --help                                Print help information

ENVIRONMENT:
  DATABASE_URL                              Database connection string
  RNG_SEED                                  Fixed seed for random draft orders and replacements
  DRAFTED_PER_USER                          Picks drafted per user per tournament [default: 2]
  MAX_PICK_PRIORITY                         Highest allowed pick priority [default: 8]
  MAX_SELECTIONS_PER_SEASON                 Drafts of one golfer per user per season [default: 3]
  PLACE_POINTS                              Comma separated points by place [default: -4,-3,-2,-1]
  MAJOR_WINNER_BONUS                        Extra points for first place at a major [default: -2]
  WINNER_PICKED_BONUS                       Extra points for drafting the winner [default: -1]
  PLACEMENT_TIE_BREAK                       user_id or cuts_missed_then_user_id
  RUST_LOG                                  Log level filter
";

enum Command {
    Migrate,
    Current(Option<NaiveDate>),
    Draft(i32),
    Withdrawals {
        tournament_id: i32,
        round: i32,
        snapshot: PathBuf,
    },
    CloseOut {
        tournament_id: i32,
        snapshot: PathBuf,
    },
}

fn parse_args() -> Result<Command, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let command = match pargs.subcommand()?.as_deref() {
        Some("migrate") => Command::Migrate,
        Some("current") => Command::Current(pargs.opt_free_from_str()?),
        Some("draft") => Command::Draft(pargs.free_from_str()?),
        Some("withdrawals") => Command::Withdrawals {
            tournament_id: pargs.free_from_str()?,
            round: pargs.free_from_str()?,
            snapshot: pargs.free_from_str()?,
        },
        Some("close-out") => Command::CloseOut {
            tournament_id: pargs.free_from_str()?,
            snapshot: pargs.free_from_str()?,
        },
        _ => {
            print!("{HELP}");
            std::process::exit(2);
        }
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unused arguments: {:?}", remaining);
    }
    Ok(command)
}

/// A snapshot that cannot be read counts as no data.
fn load_snapshot(path: &Path) -> Leaderboard {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Unable to read snapshot {}: {}", path.display(), e);
            return Leaderboard::default();
        }
    };
    Leaderboard::from_json(&raw).unwrap_or_else(|e| {
        warn!("Unable to parse snapshot {}: {}", path.display(), e);
        Leaderboard::default()
    })
}

async fn find_tournament(
    db: &DatabaseConnection,
    tournament_id: i32,
) -> Result<Option<entity::tournament::Model>, GenericError> {
    let tournament = service::get_tournament(db, tournament_id).await?;
    if tournament.is_none() {
        warn!("Tournament {tournament_id} does not exist, nothing to do");
    }
    Ok(tournament)
}

async fn run(db: &DatabaseConnection, command: Command) -> Result<(), GenericError> {
    let config = EngineConfig::from_env()?;
    let mut rng = config.rng();

    match command {
        Command::Migrate => {
            Migrator::up(db, None).await?;
            info!("Migrations applied");
        }
        Command::Current(date) => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            match service::current_tournament(db, date).await? {
                Some(t) => println!("{} {} ({} to {})", t.id, t.name, t.start_date, t.end_date),
                None => println!("No tournament on {date}"),
            }
        }
        Command::Draft(tournament_id) => {
            let Some(tournament) = find_tournament(db, tournament_id).await? else {
                return Ok(());
            };
            let (order, drafted) =
                snake_draft::draft_tournament(db, &tournament, &config, &mut rng).await?;
            info!(
                "Draft order for {} ({:?}): {:?}",
                tournament.name, order.source, order.user_ids
            );
            println!("Drafted {drafted} picks for {}", tournament.name);
        }
        Command::Withdrawals {
            tournament_id,
            round,
            snapshot,
        } => {
            let Some(tournament) = find_tournament(db, tournament_id).await? else {
                return Ok(());
            };
            let leaderboard = load_snapshot(&snapshot);
            // positions stored so far decide the replacement thresholds
            let replaced = withdrawals::detect_and_replace(
                db,
                &tournament,
                round,
                &leaderboard,
                &config,
                &mut rng,
            )
            .await?;
            let written = score_sync::record_round_scores(db, &tournament, &leaderboard).await?;
            println!(
                "Replaced {} withdrawn golfers and recorded {written} scores for {}",
                replaced.len(),
                tournament.name
            );
        }
        Command::CloseOut {
            tournament_id,
            snapshot,
        } => {
            let Some(tournament) = find_tournament(db, tournament_id).await? else {
                return Ok(());
            };
            let leaderboard = load_snapshot(&snapshot);
            if leaderboard.is_empty() {
                warn!("No leaderboard data, skipping close-out of {}", tournament.name);
                return Ok(());
            }
            score_sync::record_round_scores(db, &tournament, &leaderboard).await?;
            let results = placement::calculate(db, &tournament, &leaderboard, &config).await?;
            for result in &results {
                println!(
                    "{}. user {} ({} points)",
                    result.place, result.user_id, result.total_score
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let command = match parse_args() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    let url = std::env::var("DATABASE_URL")
        .map_err(|_| GenericError::InvalidConfig("DATABASE_URL"))?;
    let db = Database::connect(url).await?;

    run(&db, command).await.map_err(|e| {
        error!("{e}");
        e
    })
}
