use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use nba_terminal::app::App;
use nba_terminal::config::AppConfig;
use nba_terminal::merge::fetch_combined_stats;
use nba_terminal::season::{PerMode, Season};
use nba_terminal::similarity::{
    GameError, GameSession, GuessLabel, MIN_POPULATION, SAMPLE_SIZE, STAT_DIMS, SimilarityPool,
};
use nba_terminal::state::{Action, GameOutput, LeaderboardOutput, Screen};
use nba_terminal::stats_fetch::JsonDirSource;
use nba_terminal::table::StatTable;
use nba_terminal::views::{DashboardView, MSG_NOT_ENOUGH_GAME_DATA, PICK_COL, picks_table};

fn fixture_source() -> JsonDirSource {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    JsonDirSource::new(path)
}

fn season_table(season: &str) -> StatTable {
    fetch_combined_stats(&fixture_source(), season, PerMode::PerGame)
}

fn key(season: &str) -> (String, PerMode) {
    (season.to_string(), PerMode::PerGame)
}

fn test_app() -> App<JsonDirSource, StdRng> {
    let config = AppConfig {
        log_dir: None,
        ..AppConfig::default()
    };
    let seasons = [2023, 2020, 2018, 2015, 2012].into_iter().map(Season::new).collect();
    App::new(&config, seasons, fixture_source(), StdRng::seed_from_u64(7))
}

#[test]
fn pool_drops_rows_missing_game_stats() {
    let pool = SimilarityPool::from_table(&season_table("2023-24")).expect("pool");
    // Wembanyama has no 3PT %, Daniels has no box score.
    assert_eq!(pool.len(), 8);
    assert!(pool.players().iter().all(|p| p.player != "Victor Wembanyama"));
    assert!(pool.players().iter().all(|p| p.player != "Dyson Daniels"));
}

#[test]
fn standardized_columns_have_zero_mean_unit_variance() {
    let pool = SimilarityPool::from_table(&season_table("2023-24")).expect("pool");
    let n = pool.len() as f64;
    let pts = pool.scales()[0];
    assert!(pts.stdev > 0.0);
    let raw_mean = pool.players().iter().map(|p| p.stats[0]).sum::<f64>() / n;
    assert!((pts.mean - raw_mean).abs() < 1e-9);
    for dim in 0..STAT_DIMS {
        let values: Vec<f64> = pool.scaled().iter().map(|v| v[dim]).collect();
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-9, "dim {dim} mean {mean}");
        assert!((var - 1.0).abs() < 1e-9, "dim {dim} var {var}");
    }
}

#[test]
fn every_anchor_gets_three_other_players() {
    let pool = SimilarityPool::from_table(&season_table("2023-24")).expect("pool");
    for anchor in 0..pool.len() {
        let sample = pool.sample_for_anchor(anchor).expect("anchor in pool");
        assert_eq!(sample.entries.len(), SAMPLE_SIZE);
        assert!(sample.entries.iter().all(|e| e.player.player != sample.anchor));
        assert!(sample.entries.windows(2).all(|w| w[0].distance <= w[1].distance));

        let picked = pool.nearest_neighbors(anchor, SAMPLE_SIZE);
        let farthest = sample.entries.last().map(|e| e.distance).unwrap_or(0.0);
        for (idx, vector) in pool.scaled().iter().enumerate() {
            if idx == anchor || picked.contains(&idx) {
                continue;
            }
            let d = nba_terminal::similarity::euclidean(&pool.scaled()[anchor], vector);
            assert!(d >= farthest, "anchor {anchor} skipped a closer player");
        }
    }
}

#[test]
fn two_player_season_is_insufficient() {
    let table = season_table("2012-13");
    assert_eq!(table.len(), 2);
    let err = SimilarityPool::from_table(&table).expect_err("too few players");
    assert_eq!(
        err,
        GameError::InsufficientData {
            valid: 2,
            required: MIN_POPULATION
        }
    );

    let mut session = GameSession::new();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(session.ensure_round(&key("2012-13"), &table, &mut rng).is_err());
    assert!(session.round().is_none());
    assert_eq!(session.reveal(), Err(GameError::NoRound));
}

#[test]
fn session_keeps_round_until_play_again() {
    let table = season_table("2023-24");
    let mut session = GameSession::new();
    let mut rng = StdRng::seed_from_u64(42);

    let first = session
        .ensure_round(&key("2023-24"), &table, &mut rng)
        .expect("round")
        .clone();
    assert_eq!(first.selected, GuessLabel::A);
    assert!(!first.revealed);

    let same = session
        .ensure_round(&key("2023-24"), &table, &mut rng)
        .expect("round")
        .clone();
    assert_eq!(first.sample, same.sample);

    session.choose(GuessLabel::C).expect("choose");
    let reveal = session.reveal().expect("reveal");
    assert_eq!(reveal.label, GuessLabel::C);
    assert_eq!(reveal.player, first.sample.entries[2].player.player);
    assert_eq!(session.history().picks(), &[reveal.player.clone()]);
    assert!(session.round().is_some_and(|r| r.revealed));

    // Revealing twice records the pick twice.
    session.reveal().expect("reveal");
    assert_eq!(session.history().len(), 2);

    session.play_again();
    assert!(session.round().is_none());
    session
        .ensure_round(&key("2023-24"), &table, &mut rng)
        .expect("round");
    assert_eq!(session.history().len(), 2);
}

#[test]
fn picks_table_dedups_and_numbers() {
    let table = season_table("2023-24");
    let mut session = GameSession::new();
    let mut rng = StdRng::seed_from_u64(3);
    session
        .ensure_round(&key("2023-24"), &table, &mut rng)
        .expect("round");
    session.reveal().expect("reveal");
    session.reveal().expect("reveal");
    session.choose(GuessLabel::B).expect("choose");
    session.reveal().expect("reveal");

    let picks = picks_table(&table, &session);
    assert_eq!(picks.len(), 2);
    assert_eq!(picks.columns()[0], PICK_COL);
    assert_eq!(picks.columns()[1], "Player");
    let numbers: Vec<f64> = picks.rows().filter_map(|r| r.num(PICK_COL)).collect();
    assert_eq!(numbers, vec![1.0, 2.0]);
}

#[test]
fn app_dashboard_defaults_and_filters() {
    let mut app = test_app();
    assert_eq!(app.state.season_label(), "2023-24");
    let DashboardView::Table(view) = &app.state.dashboard.view else {
        panic!("expected a dashboard table");
    };
    assert_eq!(view.len(), 10);
    for col in ["Player", "Team", "PTS", "FG %", "True Shooting %", "Usage Rate"] {
        assert!(view.has_column(col), "missing {col}");
    }
    assert!(!view.has_column("STL"));

    app.handle(Action::CycleTeam);
    assert_eq!(app.state.dashboard.filter.team.as_deref(), Some("BOS"));
    let DashboardView::Table(view) = &app.state.dashboard.view else {
        panic!("expected a dashboard table");
    };
    assert_eq!(view.len(), 1);

    app.handle(Action::ClearSearch);
    for _ in 0..8 {
        app.handle(Action::CycleTeam);
    }
    assert_eq!(app.state.dashboard.filter.team, None);
    app.handle(Action::StartSearch);
    for ch in "jok".chars() {
        app.handle(Action::SearchInput(ch));
    }
    app.handle(Action::EndSearch);
    let DashboardView::Table(view) = &app.state.dashboard.view else {
        panic!("expected a dashboard table");
    };
    assert_eq!(view.len(), 1);
    assert_eq!(view.row(0).and_then(|r| r.text("Player")), Some("Nikola Jokic"));
}

#[test]
fn app_leaderboard_page() {
    let mut app = test_app();
    app.handle(Action::Show(Screen::Leaderboards));
    let LeaderboardOutput::Table(board) = &app.state.leaderboard.view else {
        panic!("expected a leaderboard");
    };
    assert_eq!(app.state.leaderboard_stat(), Some("PTS"));
    assert_eq!(board.len(), 9);
    assert_eq!(board.row(0).and_then(|r| r.text("Player")), Some("Luka Doncic"));

    for _ in 0..10 {
        app.handle(Action::TopNDown);
    }
    assert_eq!(app.state.leaderboard.top_n, 5);
    let LeaderboardOutput::Table(board) = &app.state.leaderboard.view else {
        panic!("expected a leaderboard");
    };
    assert_eq!(board.len(), 5);

    app.handle(Action::CyclePlayerYear);
    assert_eq!(app.state.selected_player_year(), Some(1));
}

#[test]
fn app_game_flow() {
    let mut app = test_app();
    app.handle(Action::Show(Screen::Game));
    let GameOutput::Round { statlines, reveal, picks } = &app.state.game.view else {
        panic!("expected a round");
    };
    assert_eq!(statlines.len(), SAMPLE_SIZE + 1);
    assert_eq!(statlines[1][0], "Player A");
    assert!(reveal.is_none());
    assert!(picks.is_empty());

    app.handle(Action::Choose(GuessLabel::B));
    app.handle(Action::Reveal);
    let revealed = app.state.game.last_reveal.clone().expect("reveal");
    assert_eq!(revealed.label, GuessLabel::B);
    let GameOutput::Round { reveal, picks, .. } = &app.state.game.view else {
        panic!("expected a round");
    };
    assert!(reveal.is_some());
    assert_eq!(picks.len(), 2);
    assert!(picks[1].contains(&revealed.player));

    app.handle(Action::PlayAgain);
    assert!(app.state.game.last_reveal.is_none());
    assert_eq!(app.state.game.session.history().len(), 1);

    for _ in 0..4 {
        app.handle(Action::NextSeason);
    }
    assert_eq!(app.state.season_label(), "2012-13");
    assert_eq!(
        app.state.game.view,
        GameOutput::Warning(MSG_NOT_ENOUGH_GAME_DATA.to_string())
    );
}

#[test]
fn app_warns_for_season_without_data() {
    let mut app = test_app();
    app.handle(Action::NextSeason);
    assert_eq!(app.state.season_label(), "2020-21");
    assert_eq!(
        app.state.dashboard.view,
        DashboardView::Warning("No data available for the 2020-21 season.".to_string())
    );
}
