use std::collections::{BTreeSet, HashSet};

use crate::debut::DebutYearMap;
use crate::format::{GAME_PERCENT_DECIMALS, display_rows, format_percent, round_to};
use crate::leaderboard::{LEADERBOARD_STATS, PLAYER_COL, TEAM_COL, rank_leaderboard};
use crate::similarity::{GAME_STATS, GameRound, GameSession};
use crate::stat_labels::is_percent_label;
use crate::table::{Cell, StatTable};

pub const ALL_TEAMS: &str = "All Teams";
pub const ALL_YEARS: &str = "All Years";
pub const PLAYER_YEAR_COL: &str = "Player Year";
pub const PICK_COL: &str = "Pick #";

pub const IDENTITY_COLUMNS: &[&str] = &[PLAYER_COL, TEAM_COL, "Age", "Games Played", "Minutes"];

pub const BASIC_STATS: &[&str] = &[
    "PTS", "AST", "REB", "OREB", "DREB", "STL", "BLK", "TOV", "FG %", "3PT %", "FT %",
];

pub const ADVANCED_STATS: &[&str] = &[
    "True Shooting %",
    "Effective FG %",
    "Usage Rate",
    "Assist %",
    "Turnover %",
    "Net Rating",
    "Offensive Rating",
    "Defensive Rating",
    "Pace",
    "Player Impact Estimate",
    "AST/TO Ratio",
];

const DEFAULT_BASIC: &[&str] = &["PTS", "AST", "REB", "FG %"];
const DEFAULT_ADVANCED: &[&str] = &["True Shooting %", "Usage Rate"];

pub const MSG_SELECT_STAT: &str = "Please select at least one stat column.";
pub const MSG_NOT_ENOUGH_GAME_DATA: &str = "Not enough data to play the game.";

pub fn no_data_message(season: &str) -> String {
    format!("No data available for the {season} season.")
}

/// Which of the page's wanted columns this table can actually serve.
/// Worked out once per table, before anything indexes a column by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSchema {
    pub identity: Vec<String>,
    pub basic: Vec<String>,
    pub advanced: Vec<String>,
    pub teams: Vec<String>,
}

impl DashboardSchema {
    pub fn negotiate(table: &StatTable) -> Self {
        let teams: BTreeSet<String> = table
            .column_values(TEAM_COL)
            .into_iter()
            .filter_map(|c| c.as_str().map(str::to_string))
            .collect();
        Self {
            identity: table.available(IDENTITY_COLUMNS),
            basic: table.available(BASIC_STATS),
            advanced: table.available(ADVANCED_STATS),
            teams: teams.into_iter().collect(),
        }
    }

    pub fn default_basic(&self) -> Vec<String> {
        keep_available(DEFAULT_BASIC, &self.basic)
    }

    pub fn default_advanced(&self) -> Vec<String> {
        keep_available(DEFAULT_ADVANCED, &self.advanced)
    }

    /// "All Teams" followed by each team.
    pub fn team_options(&self) -> Vec<String> {
        std::iter::once(ALL_TEAMS.to_string())
            .chain(self.teams.iter().cloned())
            .collect()
    }
}

fn keep_available(wanted: &[&str], available: &[String]) -> Vec<String> {
    wanted
        .iter()
        .filter(|w| available.iter().any(|a| a == *w))
        .map(|w| w.to_string())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    pub basic: Vec<String>,
    pub advanced: Vec<String>,
    /// `None` means all teams.
    pub team: Option<String>,
    pub search: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Table(StatTable),
    Warning(String),
}

/// Team filter, column selection and name search for the dashboard page.
pub fn dashboard_view(
    table: &StatTable,
    schema: &DashboardSchema,
    filter: &DashboardFilter,
    season: &str,
) -> DashboardView {
    if table.is_empty() {
        return DashboardView::Warning(no_data_message(season));
    }
    let mut rows = match filter.team.as_deref() {
        Some(team) if team != ALL_TEAMS => table.filter_rows(|row| row.text(TEAM_COL) == Some(team)),
        _ => table.clone(),
    };

    let mut selected: Vec<String> = schema.identity.clone();
    selected.extend(filter.basic.iter().cloned());
    selected.extend(filter.advanced.iter().cloned());
    if selected.len() <= schema.identity.len() {
        return DashboardView::Warning(MSG_SELECT_STAT.to_string());
    }
    rows = rows.select(&selected);

    let needle = filter.search.trim().to_lowercase();
    if !needle.is_empty() && rows.has_column(PLAYER_COL) {
        rows = rows.filter_rows(|row| {
            row.text(PLAYER_COL)
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
    }
    DashboardView::Table(rows)
}

/// Leaderboard stats this table carries, in display order.
pub fn leaderboard_stats(table: &StatTable) -> Vec<String> {
    table.available(LEADERBOARD_STATS)
}

/// Add the "Player Year" column (season start − debut + 1).
pub fn with_player_year(table: &StatTable, debuts: &DebutYearMap, season_start: i32) -> StatTable {
    table.with_column(PLAYER_YEAR_COL, |row| match row.text(PLAYER_COL) {
        Some(name) => Cell::Num(f64::from(debuts.player_year(name, season_start))),
        None => Cell::Null,
    })
}

/// "All Years" followed by the sorted distinct player years.
pub fn player_year_options(table: &StatTable) -> Vec<String> {
    let years: BTreeSet<i64> = table
        .column_values(PLAYER_YEAR_COL)
        .into_iter()
        .filter_map(|c| c.as_f64())
        .map(|v| v as i64)
        .collect();
    std::iter::once(ALL_YEARS.to_string())
        .chain(years.into_iter().map(|y| y.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRequest {
    pub stat: String,
    pub top_n: usize,
    /// `None` means every player year.
    pub player_year: Option<i64>,
}

/// Player-year filter then ranking. `table` must already carry "Player Year".
pub fn leaderboard_view(table: &StatTable, request: &LeaderboardRequest) -> StatTable {
    let filtered = match request.player_year {
        Some(year) => table.filter_rows(|row| row.num(PLAYER_YEAR_COL).map(|v| v as i64) == Some(year)),
        None => table.clone(),
    };
    rank_leaderboard(&filtered, &request.stat, request.top_n)
}

/// Anonymous statlines for a round: one row per label, game stats rounded to
/// two places. Percent columns render with one decimal.
pub fn statline_rows(round: &GameRound) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(4);
    let mut header = vec![String::new()];
    header.extend(GAME_STATS.iter().map(|s| s.to_string()));
    out.push(header);
    for (label, entry) in round.sample.labeled() {
        let mut line = vec![label.to_string()];
        for (col, value) in GAME_STATS.iter().zip(entry.player.stats) {
            line.push(game_value(col, value));
        }
        out.push(line);
    }
    out
}

/// Label → Player, Team, once the round has been revealed.
pub fn reveal_rows(round: &GameRound) -> Vec<Vec<String>> {
    let mut out = vec![vec![String::new(), PLAYER_COL.to_string(), TEAM_COL.to_string()]];
    for (label, entry) in round.sample.labeled() {
        out.push(vec![
            label.to_string(),
            entry.player.player.clone(),
            entry.player.team.clone().unwrap_or_default(),
        ]);
    }
    out
}

/// Values are rounded to two places first, so percents show the rounded fraction.
fn game_value(col: &str, value: f64) -> String {
    let value = round_to(value, 2);
    if is_percent_label(col) {
        format_percent(value, GAME_PERCENT_DECIMALS)
    } else {
        format!("{value:.2}")
    }
}

/// Current-season rows of every picked player, duplicates dropped and
/// numbered from 1. Column order: Pick #, Player, then the game stats.
pub fn picks_table(table: &StatTable, session: &GameSession) -> StatTable {
    let history = session.history();
    if history.is_empty() {
        return StatTable::empty();
    }
    let mut columns: Vec<&str> = vec![PLAYER_COL];
    columns.extend(GAME_STATS);
    let picked = table
        .filter_rows(|row| row.text(PLAYER_COL).is_some_and(|p| history.contains(p)))
        .select(&columns);

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let unique = picked.filter_rows(|row| {
        let key: Vec<String> = row.cells().iter().map(cell_key).collect();
        seen.insert(key)
    });

    let mut pick = 0usize;
    let numbered = unique.with_column(PICK_COL, |_| {
        pick += 1;
        Cell::Num(pick as f64)
    });
    let mut ordered = vec![PICK_COL];
    ordered.extend(columns);
    numbered.select(&ordered)
}

fn cell_key(cell: &Cell) -> String {
    match cell {
        Cell::Null => "\u{0}null".to_string(),
        Cell::Num(v) if v.is_nan() => "\u{0}null".to_string(),
        Cell::Num(v) => format!("n:{}", v.to_bits()),
        Cell::Text(s) => format!("t:{s}"),
    }
}

/// Display strings for the picks table; percent columns at game precision.
/// Nothing, not even a header, before the first pick.
pub fn picks_rows(picks: &StatTable) -> Vec<Vec<String>> {
    if picks.is_empty() {
        return Vec::new();
    }
    display_rows(picks, GAME_PERCENT_DECIMALS)
}
