use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;

use nba_terminal::cache::StatsCache;
use nba_terminal::debut::build_debut_years;
use nba_terminal::leaderboard::rank_leaderboard;
use nba_terminal::merge::fetch_combined_stats;
use nba_terminal::season::{PerMode, Season};
use nba_terminal::stats_fetch::{JsonDirSource, StatsQuery, StatsSource};
use nba_terminal::table::StatTable;
use nba_terminal::views::{
    LeaderboardRequest, PLAYER_YEAR_COL, leaderboard_view, player_year_options, with_player_year,
};

fn fixture_source() -> JsonDirSource {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    JsonDirSource::new(path)
}

/// Fixture source that counts provider calls.
struct CountingSource {
    inner: JsonDirSource,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            inner: fixture_source(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatsSource for CountingSource {
    fn fetch(&self, query: &StatsQuery) -> Result<StatTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query)
    }
}

fn seasons(years: &[i32]) -> Vec<Season> {
    years.iter().copied().map(Season::new).collect()
}

fn players(table: &StatTable) -> Vec<String> {
    table
        .rows()
        .filter_map(|r| r.text("Player").map(str::to_string))
        .collect()
}

#[test]
fn top_five_scorers_2023_24() {
    let combined = fetch_combined_stats(&fixture_source(), "2023-24", PerMode::PerGame);
    let board = rank_leaderboard(&combined, "PTS", 5);
    assert_eq!(board.columns(), &["Player".to_string(), "Team".to_string(), "PTS".to_string()]);
    // Durant and Booker tie on 27.1; Durant comes first in the data.
    assert_eq!(
        players(&board),
        vec![
            "Luka Doncic",
            "Giannis Antetokounmpo",
            "Shai Gilgeous-Alexander",
            "Jalen Brunson",
            "Kevin Durant",
        ]
    );
}

#[test]
fn leaderboard_is_sorted_and_bounded() {
    let combined = fetch_combined_stats(&fixture_source(), "2023-24", PerMode::PerGame);
    for stat in ["PTS", "AST", "True Shooting %", "Usage Rate"] {
        let valid = combined.drop_nulls(&[stat]).len();
        for top_n in [5, 10, 50] {
            let board = rank_leaderboard(&combined, stat, top_n);
            assert_eq!(board.len(), top_n.min(valid), "{stat} top {top_n}");
            let values: Vec<f64> = board.rows().filter_map(|r| r.num(stat)).collect();
            assert_eq!(values.len(), board.len());
            assert!(values.windows(2).all(|w| w[0] >= w[1]), "{stat} not descending");
        }
    }
}

#[test]
fn debut_year_ignores_season_order() {
    let source = fixture_source();
    let forward = build_debut_years(&source, PerMode::PerGame, &seasons(&[2015, 2018, 2020]), 2);
    let shuffled = build_debut_years(&source, PerMode::PerGame, &seasons(&[2020, 2015, 2018, 2015]), 3);
    assert_eq!(forward, shuffled);
    assert_eq!(forward.get("Nikola Jokic"), Some(2015));
    assert_eq!(forward.get("Luka Doncic"), Some(2018));
    assert_eq!(forward.get("Jayson Tatum"), Some(2020));
    assert_eq!(forward.get("Giannis Antetokounmpo"), None);
}

#[test]
fn debut_scan_skips_missing_seasons() {
    let source = fixture_source();
    // No fixture exists for 2016-17 or 2017-18.
    let map = build_debut_years(&source, PerMode::PerGame, &seasons(&[2015, 2016, 2017, 2018]), 4);
    assert_eq!(map.get("Devin Booker"), Some(2015));
    assert_eq!(map.get("Shai Gilgeous-Alexander"), Some(2018));
}

#[test]
fn player_year_column_counts_from_debut() {
    let source = fixture_source();
    let combined = fetch_combined_stats(&source, "2023-24", PerMode::PerGame);
    let debuts = build_debut_years(&source, PerMode::PerGame, &seasons(&[2023, 2020, 2018, 2015]), 4);
    let with_year = with_player_year(&combined, &debuts, 2023);

    let year_of = |name: &str| {
        with_year
            .rows()
            .find(|r| r.text("Player") == Some(name))
            .and_then(|r| r.num(PLAYER_YEAR_COL))
    };
    assert_eq!(year_of("Nikola Jokic"), Some(9.0));
    assert_eq!(year_of("Luka Doncic"), Some(6.0));
    assert_eq!(year_of("Jayson Tatum"), Some(4.0));
    assert_eq!(year_of("Victor Wembanyama"), Some(1.0));

    let options = player_year_options(&with_year);
    assert_eq!(options.first().map(String::as_str), Some("All Years"));
    assert!(options.contains(&"9".to_string()));

    let request = LeaderboardRequest {
        stat: "PTS".into(),
        top_n: 10,
        player_year: Some(1),
    };
    let rookies = leaderboard_view(&with_year, &request);
    assert_eq!(
        players(&rookies),
        vec!["Giannis Antetokounmpo", "Jalen Brunson", "Victor Wembanyama"]
    );
}

#[test]
fn cache_computes_each_key_once() {
    let source = CountingSource::new();
    let mut cache = StatsCache::new(2);

    let first = cache.combined(&source, "2023-24", PerMode::PerGame).len();
    assert_eq!(source.calls(), 2);
    let again = cache.combined(&source, "2023-24", PerMode::PerGame).len();
    assert_eq!(first, again);
    assert_eq!(source.calls(), 2);

    // Empty results are memoized too.
    assert!(cache.combined(&source, "1999-00", PerMode::PerGame).is_empty());
    let after_miss = source.calls();
    assert!(cache.combined(&source, "1999-00", PerMode::PerGame).is_empty());
    assert_eq!(source.calls(), after_miss);

    let all = seasons(&[2023, 2020, 2018, 2015]);
    cache.debut_years(&source, PerMode::PerGame, &all);
    let after_debuts = source.calls();
    assert_eq!(after_debuts, after_miss + 4);
    cache.debut_years(&source, PerMode::PerGame, &all);
    assert_eq!(source.calls(), after_debuts);

    cache.invalidate();
    assert!(!cache.has_combined("2023-24", PerMode::PerGame));
    cache.combined(&source, "2023-24", PerMode::PerGame);
    assert_eq!(source.calls(), after_debuts + 2);
}
