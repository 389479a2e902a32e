use std::env;
use std::path::PathBuf;

use crate::season::DEFAULT_FIRST_SEASON;

pub const APP_DIR: &str = "nba_terminal";
pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub first_season: i32,
    pub default_top_n: usize,
    pub fetch_threads: usize,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            first_season: DEFAULT_FIRST_SEASON,
            default_top_n: 10,
            fetch_threads: 4,
            log_dir: cache_dir().map(|dir| dir.join("logs")),
        }
    }
}

impl AppConfig {
    /// Read settings from the environment. Call after `dotenvy` has loaded
    /// `.env.local` / `.env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("NBA_STATS_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);
        let timeout_secs = lookup("NBA_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs)
            .max(5);
        let first_season = lookup("NBA_FIRST_SEASON")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(defaults.first_season);
        let default_top_n = lookup("NBA_DEFAULT_TOP_N")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.default_top_n)
            .clamp(TOP_N_MIN, TOP_N_MAX);
        let fetch_threads = lookup("NBA_FETCH_THREADS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.fetch_threads)
            .clamp(1, 16);
        let log_dir = lookup("NBA_LOG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or(defaults.log_dir);
        Self {
            base_url,
            timeout_secs,
            first_season,
            default_top_n,
            fetch_threads,
            log_dir,
        }
    }
}

/// `$XDG_CACHE_HOME/nba_terminal`, falling back to `~/.cache/nba_terminal`.
pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.first_season, 2010);
        assert_eq!(cfg.default_top_n, 10);
    }

    #[test]
    fn values_are_clamped() {
        let cfg = config_from(&[
            ("NBA_DEFAULT_TOP_N", "500"),
            ("NBA_HTTP_TIMEOUT_SECS", "1"),
            ("NBA_FETCH_THREADS", "0"),
            ("NBA_STATS_BASE_URL", "http://localhost:9000/stats/"),
        ]);
        assert_eq!(cfg.default_top_n, TOP_N_MAX);
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.fetch_threads, 1);
        assert_eq!(cfg.base_url, "http://localhost:9000/stats");
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let cfg = config_from(&[("NBA_FIRST_SEASON", "twenty-ten")]);
        assert_eq!(cfg.first_season, 2010);
    }
}
