pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod display;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod store;
pub mod window;

#[cfg(test)]
pub mod test_utils;

pub use analysis::{compute_insights, compute_stats_cards, InsightsResult, StatsCardsResult};
pub use config::AppConfig;
pub use db::AppState;
