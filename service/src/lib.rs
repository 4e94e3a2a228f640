pub mod config;
pub mod draft_order;
pub mod dto;
pub mod error;
pub mod mutation;
pub mod placement;
pub mod query;
pub mod score_sync;
pub mod snake_draft;
pub mod withdrawals;

pub use mutation::*;
pub use query::*;

pub use sea_orm;
