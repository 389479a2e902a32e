use std::path::PathBuf;

use anyhow::{Context, Result};

use nba_terminal::config::AppConfig;
use nba_terminal::format::{MAIN_PERCENT_DECIMALS, display_rows};
use nba_terminal::leaderboard::{clamp_top_n, rank_leaderboard};
use nba_terminal::logging::init_stderr_logging;
use nba_terminal::merge::fetch_combined_stats;
use nba_terminal::season::{PerMode, Season};
use nba_terminal::stats_fetch::{JsonDirSource, NbaStatsApi, StatsSource};
use nba_terminal::views::no_data_message;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_stderr_logging();

    let config = AppConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let season = match arg_value(&args, "season") {
        Some(raw) => raw
            .parse::<Season>()
            .with_context(|| format!("invalid --season {raw}"))?
            .to_string(),
        None => nba_terminal::season::current_season_options(config.first_season)
            .first()
            .map(|s| s.to_string())
            .context("no seasons available")?,
    };
    let per_mode = match arg_value(&args, "per-mode") {
        Some(raw) => PerMode::from_label(&raw)
            .with_context(|| format!("unknown --per-mode {raw}"))?,
        None => PerMode::PerGame,
    };
    let stat = arg_value(&args, "stat").unwrap_or_else(|| "PTS".to_string());
    let top_n = match arg_value(&args, "top") {
        Some(raw) => clamp_top_n(raw.parse().with_context(|| format!("invalid --top {raw}"))?),
        None => clamp_top_n(config.default_top_n),
    };

    let source: Box<dyn StatsSource> = match arg_value(&args, "fixture-dir") {
        Some(dir) => Box::new(JsonDirSource::new(PathBuf::from(dir))),
        None => Box::new(NbaStatsApi::new(config.base_url.clone(), config.timeout_secs)),
    };

    let combined = fetch_combined_stats(source.as_ref(), &season, per_mode);
    if combined.is_empty() {
        println!("{}", no_data_message(&season));
        return Ok(());
    }

    println!("{season} {} | {} players", per_mode.label(), combined.len());
    let board = rank_leaderboard(&combined, &stat, top_n);
    if board.is_empty() {
        println!("No rows with {stat}");
        return Ok(());
    }
    println!("Top {} by {stat}", board.len());
    for (idx, row) in display_rows(&board, MAIN_PERCENT_DECIMALS)
        .iter()
        .enumerate()
        .skip(1)
    {
        println!("{idx:>3}. {}", row.join("  "));
    }
    Ok(())
}

/// `--name value` or `--name=value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
