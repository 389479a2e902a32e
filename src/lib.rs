pub mod app;
pub mod cache;
pub mod config;
pub mod debut;
pub mod format;
pub mod http_cache;
pub mod http_client;
pub mod leaderboard;
pub mod logging;
pub mod merge;
pub mod season;
pub mod similarity;
pub mod stat_labels;
pub mod state;
pub mod stats_fetch;
pub mod table;
pub mod views;
