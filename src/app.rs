use rand::Rng;
use tracing::{info, warn};

use crate::cache::StatsCache;
use crate::config::AppConfig;
use crate::leaderboard::clamp_top_n;
use crate::season::Season;
use crate::similarity::{GameError, PoolKey};
use crate::state::{Action, AppState, GameOutput, LeaderboardOutput, Screen};
use crate::stats_fetch::StatsSource;
use crate::table::StatTable;
use crate::views::{
    DashboardSchema, LeaderboardRequest, MSG_NOT_ENOUGH_GAME_DATA, dashboard_view,
    leaderboard_stats, leaderboard_view, no_data_message, picks_rows, picks_table,
    player_year_options, reveal_rows, statline_rows, with_player_year,
};

/// One user's session: data source, memoized tables and UI state. Every
/// [`App::handle`] call runs to completion and leaves the current page's
/// view up to date.
pub struct App<S: StatsSource, R: Rng> {
    pub state: AppState,
    cache: StatsCache,
    source: S,
    rng: R,
}

impl<S: StatsSource, R: Rng> App<S, R> {
    pub fn new(config: &AppConfig, seasons: Vec<Season>, source: S, rng: R) -> Self {
        let mut app = Self {
            state: AppState::new(config, seasons),
            cache: StatsCache::new(config.fetch_threads),
            source,
            rng,
        };
        app.recompute();
        app
    }

    pub fn handle(&mut self, action: Action) {
        let mut reset_scroll = true;
        match action {
            Action::Quit => {
                self.state.should_quit = true;
                return;
            }
            Action::ToggleHelp => {
                self.state.help_overlay = !self.state.help_overlay;
                return;
            }
            Action::Show(screen) => self.state.screen = screen,
            Action::NextSeason => self.state.select_older_season(),
            Action::PrevSeason => self.state.select_newer_season(),
            Action::CyclePerMode => {
                self.state.per_mode = self.state.per_mode.next();
                self.state
                    .push_log(format!("[INFO] Stats per: {}", self.state.per_mode.label()));
            }
            Action::Refresh => {
                self.cache.invalidate();
                self.state.game.session.reset_round();
                self.state.game.last_reveal = None;
                self.state.push_log("[INFO] Cache cleared, refetching");
            }
            Action::ScrollDown => {
                self.state.scroll = self.state.scroll.saturating_add(1);
                reset_scroll = false;
            }
            Action::ScrollUp => {
                self.state.scroll = self.state.scroll.saturating_sub(1);
                reset_scroll = false;
            }
            Action::StatCursorNext => self.state.move_stat_cursor(true),
            Action::StatCursorPrev => self.state.move_stat_cursor(false),
            Action::ToggleStat => self.state.toggle_stat_at_cursor(),
            Action::CycleTeam => self.state.cycle_team(),
            Action::StartSearch => self.state.dashboard.search_active = true,
            Action::SearchInput(ch) => self.state.dashboard.filter.search.push(ch),
            Action::SearchBackspace => {
                self.state.dashboard.filter.search.pop();
            }
            Action::EndSearch => self.state.dashboard.search_active = false,
            Action::ClearSearch => {
                self.state.dashboard.search_active = false;
                self.state.dashboard.filter.search.clear();
            }
            Action::CycleLeaderboardStat => {
                let total = self.state.leaderboard.stats.len().max(1);
                self.state.leaderboard.stat_idx = (self.state.leaderboard.stat_idx + 1) % total;
            }
            Action::TopNUp => {
                self.state.leaderboard.top_n = clamp_top_n(self.state.leaderboard.top_n + 1);
            }
            Action::TopNDown => {
                self.state.leaderboard.top_n =
                    clamp_top_n(self.state.leaderboard.top_n.saturating_sub(1));
            }
            Action::CyclePlayerYear => {
                let total = self.state.leaderboard.year_options.len().max(1);
                self.state.leaderboard.year_idx = (self.state.leaderboard.year_idx + 1) % total;
            }
            Action::Choose(label) => {
                if self.state.game.session.choose(label).is_ok() {
                    self.state.game.last_reveal = None;
                }
            }
            Action::Reveal => match self.state.game.session.reveal() {
                Ok(reveal) => {
                    info!(label = %reveal.label, player = %reveal.player, "pick revealed");
                    self.state
                        .push_log(format!("[INFO] {} was {}", reveal.label, reveal.player));
                    self.state.game.last_reveal = Some(reveal);
                }
                Err(err) => self.state.push_log(format!("[WARN] {err}")),
            },
            Action::PlayAgain => {
                self.state.game.session.play_again();
                self.state.game.last_reveal = None;
            }
        }
        if reset_scroll {
            self.state.scroll = 0;
        }
        self.recompute();
    }

    /// Refresh the view for the current page from the cached table.
    pub fn recompute(&mut self) {
        let season = self.state.season_label();
        let per_mode = self.state.per_mode;
        if !self.cache.has_combined(&season, per_mode) {
            self.state.push_log(format!(
                "[INFO] Loading {season} ({})",
                per_mode.label()
            ));
        }
        let table = self.cache.combined(&self.source, &season, per_mode).clone();
        if table.is_empty() {
            warn!(season = %season, "no player stats for season");
        }

        match self.state.screen {
            Screen::Dashboard => self.recompute_dashboard(&table, &season),
            Screen::Leaderboards => self.recompute_leaderboard(&table, &season),
            Screen::Game => self.recompute_game(&table, &season),
        }
    }

    fn recompute_dashboard(&mut self, table: &StatTable, season: &str) {
        let schema = DashboardSchema::negotiate(table);
        let dash = &mut self.state.dashboard;
        if !dash.initialised || dash.schema != schema {
            if !dash.initialised || dash.schema.basic != schema.basic || dash.schema.advanced != schema.advanced {
                dash.filter.basic = schema.default_basic();
                dash.filter.advanced = schema.default_advanced();
                dash.stat_cursor = 0;
            }
            if let Some(team) = dash.filter.team.as_ref() {
                if !schema.teams.contains(team) {
                    dash.filter.team = None;
                }
            }
            dash.initialised = !table.is_empty();
            dash.schema = schema;
        }
        dash.view = dashboard_view(table, &dash.schema, &dash.filter, season);
    }

    fn recompute_leaderboard(&mut self, table: &StatTable, season: &str) {
        if table.is_empty() {
            self.state.leaderboard.view = LeaderboardOutput::Warning(no_data_message(season));
            return;
        }
        let stats = leaderboard_stats(table);
        if stats != self.state.leaderboard.stats {
            let keep = self
                .state
                .leaderboard_stat()
                .and_then(|cur| stats.iter().position(|s| s == cur))
                .unwrap_or(0);
            self.state.leaderboard.stats = stats;
            self.state.leaderboard.stat_idx = keep;
        }
        let Some(stat) = self.state.leaderboard_stat().map(str::to_string) else {
            self.state.leaderboard.view =
                LeaderboardOutput::Warning("No leaderboard stats in this data.".to_string());
            return;
        };

        let Some(current) = self.state.current_season() else {
            return;
        };
        let per_mode = self.state.per_mode;
        if !self.cache.has_debut_years(per_mode) {
            self.state
                .push_log("[INFO] Building debut years across all seasons");
        }
        let seasons = self.state.seasons.clone();
        let debuts = self.cache.debut_years(&self.source, per_mode, &seasons);
        let with_year = with_player_year(table, debuts, current.start_year);

        let options = player_year_options(&with_year);
        if options != self.state.leaderboard.year_options {
            let keep = self
                .state
                .leaderboard
                .year_options
                .get(self.state.leaderboard.year_idx)
                .and_then(|cur| options.iter().position(|o| o == cur))
                .unwrap_or(0);
            self.state.leaderboard.year_options = options;
            self.state.leaderboard.year_idx = keep;
        }

        let request = LeaderboardRequest {
            stat,
            top_n: self.state.leaderboard.top_n,
            player_year: self.state.selected_player_year(),
        };
        self.state.leaderboard.view = LeaderboardOutput::Table(leaderboard_view(&with_year, &request));
    }

    fn recompute_game(&mut self, table: &StatTable, season: &str) {
        let key: PoolKey = (season.to_string(), self.state.per_mode);
        let game = &mut self.state.game;
        let round = match game.session.ensure_round(&key, table, &mut self.rng) {
            Ok(round) => round.clone(),
            Err(GameError::InsufficientData { valid, .. }) => {
                info!(season, valid, "game refused: insufficient data");
                game.view = GameOutput::Warning(MSG_NOT_ENOUGH_GAME_DATA.to_string());
                return;
            }
            Err(err) => {
                game.view = GameOutput::Warning(err.to_string());
                return;
            }
        };
        let reveal = game.last_reveal.as_ref().map(|_| reveal_rows(&round));
        let picks = picks_rows(&picks_table(table, &game.session));
        game.view = GameOutput::Round {
            statlines: statline_rows(&round),
            reveal,
            picks,
        };
    }
}
