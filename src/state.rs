use std::collections::VecDeque;

use crate::config::AppConfig;
use crate::leaderboard::clamp_top_n;
use crate::season::{PerMode, Season};
use crate::similarity::{GameSession, GuessLabel, Reveal};
use crate::table::StatTable;
use crate::views::{ALL_TEAMS, DashboardFilter, DashboardSchema, DashboardView};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Leaderboards,
    Game,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Leaderboards => "Leaderboards",
            Screen::Game => "Player A/B/C",
        }
    }
}

/// Everything a key press can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Show(Screen),
    NextSeason,
    PrevSeason,
    CyclePerMode,
    Refresh,
    ToggleHelp,
    Quit,
    ScrollDown,
    ScrollUp,
    // Dashboard
    StatCursorNext,
    StatCursorPrev,
    ToggleStat,
    CycleTeam,
    StartSearch,
    SearchInput(char),
    SearchBackspace,
    EndSearch,
    ClearSearch,
    // Leaderboards
    CycleLeaderboardStat,
    TopNUp,
    TopNDown,
    CyclePlayerYear,
    // Game
    Choose(GuessLabel),
    Reveal,
    PlayAgain,
}

/// Rendered output of the leaderboard page.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardOutput {
    Table(StatTable),
    Warning(String),
}

/// Rendered output of the game page.
#[derive(Debug, Clone, PartialEq)]
pub enum GameOutput {
    Round {
        statlines: Vec<Vec<String>>,
        reveal: Option<Vec<Vec<String>>>,
        picks: Vec<Vec<String>>,
    },
    Warning(String),
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub schema: DashboardSchema,
    pub filter: DashboardFilter,
    /// Position in `schema.basic ++ schema.advanced`.
    pub stat_cursor: usize,
    pub search_active: bool,
    /// Whether `filter` already holds the defaults for `schema`.
    pub initialised: bool,
    pub view: DashboardView,
}

#[derive(Debug, Clone)]
pub struct LeaderboardState {
    pub stats: Vec<String>,
    pub stat_idx: usize,
    pub top_n: usize,
    pub year_options: Vec<String>,
    pub year_idx: usize,
    pub view: LeaderboardOutput,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub session: GameSession,
    pub last_reveal: Option<Reveal>,
    pub view: GameOutput,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub seasons: Vec<Season>,
    pub season_idx: usize,
    pub per_mode: PerMode,
    pub dashboard: DashboardState,
    pub leaderboard: LeaderboardState,
    pub game: GameState,
    pub scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, seasons: Vec<Season>) -> Self {
        Self {
            screen: Screen::Dashboard,
            seasons,
            season_idx: 0,
            per_mode: PerMode::PerGame,
            dashboard: DashboardState {
                schema: DashboardSchema::default(),
                filter: DashboardFilter::default(),
                stat_cursor: 0,
                search_active: false,
                initialised: false,
                view: DashboardView::Warning(String::new()),
            },
            leaderboard: LeaderboardState {
                stats: Vec::new(),
                stat_idx: 0,
                top_n: clamp_top_n(config.default_top_n),
                year_options: Vec::new(),
                year_idx: 0,
                view: LeaderboardOutput::Warning(String::new()),
            },
            game: GameState {
                session: GameSession::new(),
                last_reveal: None,
                view: GameOutput::Warning(String::new()),
            },
            scroll: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            should_quit: false,
        }
    }

    /// Selected season as the provider spells it.
    pub fn season_label(&self) -> String {
        self.current_season()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    pub fn current_season(&self) -> Option<Season> {
        self.seasons.get(self.season_idx).copied()
    }

    /// Seasons are listed newest first, so "next" moves back in time.
    pub fn select_older_season(&mut self) {
        if self.season_idx + 1 < self.seasons.len() {
            self.season_idx += 1;
        }
    }

    pub fn select_newer_season(&mut self) {
        self.season_idx = self.season_idx.saturating_sub(1);
    }

    /// Every stat the dashboard can toggle, basic first.
    pub fn dashboard_stat_options(&self) -> Vec<String> {
        let schema = &self.dashboard.schema;
        schema
            .basic
            .iter()
            .chain(schema.advanced.iter())
            .cloned()
            .collect()
    }

    pub fn stat_selected(&self, stat: &str) -> bool {
        let filter = &self.dashboard.filter;
        filter.basic.iter().chain(filter.advanced.iter()).any(|s| s == stat)
    }

    pub fn toggle_stat_at_cursor(&mut self) {
        let options = self.dashboard_stat_options();
        let Some(stat) = options.get(self.dashboard.stat_cursor).cloned() else {
            return;
        };
        let is_basic = self.dashboard.schema.basic.contains(&stat);
        let list = if is_basic {
            &mut self.dashboard.filter.basic
        } else {
            &mut self.dashboard.filter.advanced
        };
        if let Some(pos) = list.iter().position(|s| *s == stat) {
            list.remove(pos);
        } else {
            list.push(stat);
            let order: &[String] = if is_basic {
                &self.dashboard.schema.basic
            } else {
                &self.dashboard.schema.advanced
            };
            list.sort_by_key(|s| order.iter().position(|o| o == s).unwrap_or(usize::MAX));
        }
    }

    pub fn move_stat_cursor(&mut self, forward: bool) {
        let total = self.dashboard_stat_options().len();
        if total == 0 {
            self.dashboard.stat_cursor = 0;
            return;
        }
        let cur = self.dashboard.stat_cursor.min(total - 1);
        self.dashboard.stat_cursor = if forward {
            (cur + 1) % total
        } else {
            (cur + total - 1) % total
        };
    }

    pub fn cycle_team(&mut self) {
        let options = self.dashboard.schema.team_options();
        let current = self.dashboard.filter.team.as_deref().unwrap_or(ALL_TEAMS);
        let pos = options.iter().position(|t| t == current).unwrap_or(0);
        let next = options.get((pos + 1) % options.len().max(1)).cloned();
        self.dashboard.filter.team = next.filter(|t| t != ALL_TEAMS);
    }

    pub fn leaderboard_stat(&self) -> Option<&str> {
        self.leaderboard
            .stats
            .get(self.leaderboard.stat_idx)
            .map(String::as_str)
    }

    pub fn selected_player_year(&self) -> Option<i64> {
        self.leaderboard
            .year_options
            .get(self.leaderboard.year_idx)
            .and_then(|y| y.parse::<i64>().ok())
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}
