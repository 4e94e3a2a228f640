mod leaderboard;
mod validation;

pub use leaderboard::{
    parse_position, Leaderboard, LeaderboardRow, PlayerStatus, Position, RoundEntry,
};
pub use validation::{FieldError, ValidationErrors};
