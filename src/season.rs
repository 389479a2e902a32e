use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FIRST_SEASON: i32 = 2010;

/// An NBA season identified by the year it starts in; shown as `2023-24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Season {
    pub start_year: i32,
}

impl Season {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (start, end) = raw
            .split_once('-')
            .with_context(|| format!("season {raw:?} is not YYYY-YY"))?;
        if start.len() != 4 || end.len() != 2 {
            return Err(anyhow::anyhow!("season {raw:?} is not YYYY-YY"));
        }
        let start_year: i32 = start
            .parse()
            .with_context(|| format!("invalid season start in {raw:?}"))?;
        let end_year: i32 = end
            .parse()
            .with_context(|| format!("invalid season end in {raw:?}"))?;
        if (start_year + 1).rem_euclid(100) != end_year {
            return Err(anyhow::anyhow!("season {raw:?} does not span consecutive years"));
        }
        Ok(Season { start_year })
    }
}

/// Leading four digits of a season string, the way debut years are keyed.
pub fn season_start_year(raw: &str) -> Option<i32> {
    raw.get(..4)?.parse().ok()
}

/// Seasons from `first_year` up to the current (or just finished) one, newest first.
/// A season counts as started from October on.
pub fn season_options(first_year: i32, today: NaiveDate) -> Vec<Season> {
    let end_year = if today.month() >= 10 {
        today.year()
    } else {
        today.year() - 1
    };
    (first_year..=end_year).rev().map(Season::new).collect()
}

pub fn current_season_options(first_year: i32) -> Vec<Season> {
    season_options(first_year, chrono::Local::now().date_naive())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerMode {
    PerGame,
    Totals,
    Per36,
}

impl PerMode {
    pub const ALL: [PerMode; 3] = [PerMode::PerGame, PerMode::Totals, PerMode::Per36];

    pub fn api_value(self) -> &'static str {
        match self {
            PerMode::PerGame => "PerGame",
            PerMode::Totals => "Totals",
            PerMode::Per36 => "Per36",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerMode::PerGame => "Per Game",
            PerMode::Totals => "Totals",
            PerMode::Per36 => "Per 36 Minutes",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(raw) || m.api_value().eq_ignore_ascii_case(raw))
    }

    pub fn next(self) -> Self {
        match self {
            PerMode::PerGame => PerMode::Totals,
            PerMode::Totals => PerMode::Per36,
            PerMode::Per36 => PerMode::PerGame,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    Base,
    Advanced,
}

impl MeasureType {
    pub fn api_value(self) -> &'static str {
        match self {
            MeasureType::Base => "Base",
            MeasureType::Advanced => "Advanced",
        }
    }
}
