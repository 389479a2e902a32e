use std::fs;
use std::path::PathBuf;

use nba_terminal::season::{MeasureType, PerMode};
use nba_terminal::stat_labels::display_label;
use nba_terminal::stats_fetch::{JsonDirSource, StatsQuery, StatsSource, parse_league_dash_json};

fn fixture_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_dir().join(name)).expect("fixture file should be readable")
}

#[test]
fn parses_base_fixture() {
    let raw = read_fixture("2023-24_PerGame_Base.json");
    let table = parse_league_dash_json(&raw).expect("fixture should parse");
    assert_eq!(table.len(), 9);
    assert_eq!(table.columns()[1], "PLAYER_NAME");
    let luka = table.row(0).expect("first row");
    assert_eq!(luka.text("PLAYER_NAME"), Some("Luka Doncic"));
    assert_eq!(luka.num("PTS"), Some(33.9));
    assert_eq!(luka.num("GP"), Some(70.0));

    let wemby = table.row(8).expect("last row");
    assert!(wemby.get("FG3_PCT").is_some_and(|c| c.is_null()));
}

#[test]
fn json_dir_source_reads_by_query() {
    let source = JsonDirSource::new(fixture_dir());
    let query = StatsQuery::new("2023-24", PerMode::PerGame, MeasureType::Advanced);
    assert_eq!(JsonDirSource::file_name(&query), "2023-24_PerGame_Advanced.json");
    let table = source.fetch(&query).expect("advanced fixture");
    assert!(table.has_column("USG_PCT"));
    assert!(!table.has_column("PTS"));
}

#[test]
fn json_dir_source_errors_for_unknown_season() {
    let source = JsonDirSource::new(fixture_dir());
    let query = StatsQuery::new("2023", PerMode::PerGame, MeasureType::Base);
    assert!(source.fetch(&query).is_err());
}

#[test]
fn every_fixture_column_gets_a_label() {
    let raw = read_fixture("2023-24_PerGame_Base.json");
    let table = parse_league_dash_json(&raw).expect("fixture should parse");
    let labels: Vec<String> = table.columns().iter().map(|c| display_label(c)).collect();
    assert!(labels.contains(&"Player".to_string()));
    assert!(labels.contains(&"3PT %".to_string()));
    assert!(labels.contains(&"PTS Rank".to_string()));
    assert!(labels.iter().all(|l| !l.is_empty()));
}

#[test]
fn rejects_empty_and_garbage_bodies() {
    assert!(parse_league_dash_json("").is_err());
    assert!(parse_league_dash_json("null").is_err());
    assert!(parse_league_dash_json("<html>rate limited</html>").is_err());
    assert!(parse_league_dash_json(r#"{"resultSets":[]}"#).is_err());
}
