use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client_with_timeout;
use crate::season::{MeasureType, PerMode};
use crate::table::{Cell, StatTable};

const LEAGUE_DASH_ENDPOINT: &str = "leaguedashplayerstats";
const REGULAR_SEASON: &str = "Regular Season";

/// One provider query. `season` stays a raw string so a malformed value
/// reaches the provider (and fails there) instead of being rejected early.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatsQuery {
    pub season: String,
    pub per_mode: PerMode,
    pub measure_type: MeasureType,
}

impl StatsQuery {
    pub fn new(season: impl Into<String>, per_mode: PerMode, measure_type: MeasureType) -> Self {
        Self {
            season: season.into(),
            per_mode,
            measure_type,
        }
    }
}

/// Anything that can answer a [`StatsQuery`] with raw provider columns.
pub trait StatsSource: Sync {
    fn fetch(&self, query: &StatsQuery) -> Result<StatTable>;
}

impl<S: StatsSource + ?Sized> StatsSource for &S {
    fn fetch(&self, query: &StatsQuery) -> Result<StatTable> {
        (**self).fetch(query)
    }
}

/// Live stats.nba.com source.
#[derive(Debug, Clone)]
pub struct NbaStatsApi {
    base_url: String,
    timeout_secs: u64,
}

impl NbaStatsApi {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs,
        }
    }
}

impl StatsSource for NbaStatsApi {
    fn fetch(&self, query: &StatsQuery) -> Result<StatTable> {
        let client = http_client_with_timeout(self.timeout_secs)?;
        let url = format!("{}/{LEAGUE_DASH_ENDPOINT}", self.base_url);
        let params = league_dash_params(query);
        debug!(season = %query.season, per_mode = query.per_mode.api_value(), measure = query.measure_type.api_value(), "fetching player stats");
        let body = fetch_json_cached(client, &url, &params)
            .with_context(|| format!("{LEAGUE_DASH_ENDPOINT} {} request failed", query.season))?;
        parse_league_dash_json(&body)
    }
}

/// Reads `<season>_<PerMode>_<Measure>.json` files saved from the endpoint.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(query: &StatsQuery) -> String {
        format!(
            "{}_{}_{}.json",
            query.season,
            query.per_mode.api_value(),
            query.measure_type.api_value()
        )
    }
}

impl StatsSource for JsonDirSource {
    fn fetch(&self, query: &StatsQuery) -> Result<StatTable> {
        let path = self.dir.join(Self::file_name(query));
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        parse_league_dash_json(&raw)
    }
}

/// The endpoint rejects requests missing any of its filter parameters, so
/// every one is sent with its neutral value.
fn league_dash_params(query: &StatsQuery) -> Vec<(&'static str, &str)> {
    vec![
        ("College", ""),
        ("Conference", ""),
        ("Country", ""),
        ("DateFrom", ""),
        ("DateTo", ""),
        ("Division", ""),
        ("DraftPick", ""),
        ("DraftYear", ""),
        ("GameScope", ""),
        ("GameSegment", ""),
        ("Height", ""),
        ("LastNGames", "0"),
        ("LeagueID", "00"),
        ("Location", ""),
        ("MeasureType", query.measure_type.api_value()),
        ("Month", "0"),
        ("OpponentTeamID", "0"),
        ("Outcome", ""),
        ("PORound", "0"),
        ("PaceAdjust", "N"),
        ("PerMode", query.per_mode.api_value()),
        ("Period", "0"),
        ("PlayerExperience", ""),
        ("PlayerPosition", ""),
        ("PlusMinus", "N"),
        ("Rank", "N"),
        ("Season", query.season.as_str()),
        ("SeasonSegment", ""),
        ("SeasonType", REGULAR_SEASON),
        ("ShotClockRange", ""),
        ("StarterBench", ""),
        ("TeamID", "0"),
        ("TwoWay", "0"),
        ("VsConference", ""),
        ("VsDivision", ""),
        ("Weight", ""),
    ]
}

#[derive(Debug, Deserialize)]
struct LeagueDashResponse {
    #[serde(rename = "resultSets", alias = "resultSet", deserialize_with = "result_sets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    name: Option<String>,
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<serde_json::Value>>,
}

// Some endpoints send a single object under `resultSet` instead of a list.
fn result_sets<'de, D>(deserializer: D) -> std::result::Result<Vec<ResultSet>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ResultSet>),
        One(ResultSet),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(sets) => sets,
        OneOrMany::One(set) => vec![set],
    })
}

/// Parse a `leaguedashplayerstats` body into a table keyed by raw stat codes.
pub fn parse_league_dash_json(raw: &str) -> Result<StatTable> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty stats response"));
    }
    let parsed: LeagueDashResponse =
        serde_json::from_str(trimmed).context("invalid stats json")?;
    let set = parsed
        .result_sets
        .into_iter()
        .next()
        .context("stats response has no result sets")?;
    debug!(name = set.name.as_deref().unwrap_or("?"), rows = set.row_set.len(), "parsed result set");

    let mut table = StatTable::new(set.headers).context("invalid stats headers")?;
    for row in set.row_set {
        let cells = row.iter().map(Cell::from_json).collect();
        table.push_row(cells).context("malformed stats row")?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_result_set_rows() {
        let raw = r#"{"resultSets":[{"name":"LeagueDashPlayerStats","headers":["PLAYER_ID","PLAYER_NAME","PTS"],"rowSet":[[1,"A",20.5],[2,"B",null]]}]}"#;
        let table = parse_league_dash_json(raw).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0).and_then(|r| r.text("PLAYER_NAME")), Some("A"));
        assert!(table.row(1).and_then(|r| r.get("PTS")).unwrap().is_null());
    }

    #[test]
    fn accepts_single_result_set_object() {
        let raw = r#"{"resultSet":{"headers":["PLAYER_NAME"],"rowSet":[["A"]]}}"#;
        assert_eq!(parse_league_dash_json(raw).unwrap().len(), 1);
    }

    #[test]
    fn rejects_ragged_rows() {
        let raw = r#"{"resultSets":[{"headers":["A","B"],"rowSet":[[1]]}]}"#;
        assert!(parse_league_dash_json(raw).is_err());
    }

    #[test]
    fn params_carry_query_values() {
        let query = StatsQuery::new("2023-24", PerMode::Per36, MeasureType::Advanced);
        let params = league_dash_params(&query);
        assert!(params.contains(&("Season", "2023-24")));
        assert!(params.contains(&("PerMode", "Per36")));
        assert!(params.contains(&("MeasureType", "Advanced")));
        assert!(params.contains(&("SeasonType", "Regular Season")));
    }
}
