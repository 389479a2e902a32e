use std::io;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap};

use nba_terminal::app::App;
use nba_terminal::config::AppConfig;
use nba_terminal::format::{MAIN_PERCENT_DECIMALS, display_rows};
use nba_terminal::logging::init_file_logging;
use nba_terminal::season::current_season_options;
use nba_terminal::similarity::GuessLabel;
use nba_terminal::state::{Action, AppState, GameOutput, LeaderboardOutput, Screen};
use nba_terminal::stats_fetch::{NbaStatsApi, StatsSource};
use nba_terminal::views::{ALL_TEAMS, ALL_YEARS, DashboardView};

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    init_file_logging(config.log_dir.as_deref());
    tracing::info!(base_url = %config.base_url, "starting nba terminal");

    let source = NbaStatsApi::new(config.base_url.clone(), config.timeout_secs);
    let seasons = current_season_options(config.first_season);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    terminal.draw(|f| render_loading(f))?;
    let mut app = App::new(&config, seasons, source, rand::thread_rng());
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend, S: StatsSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, rand::rngs::ThreadRng>,
) -> io::Result<()> {
    let poll = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, &app.state))?;

        if event::poll(poll)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = key_action(&app.state, key) {
                        // Fetches block; show that something is happening.
                        if needs_fetch(&action) {
                            terminal.draw(|f| render_loading(f))?;
                        }
                        app.handle(action);
                    }
                }
            }
        }

        if app.state.should_quit {
            return Ok(());
        }
    }
}

fn needs_fetch(action: &Action) -> bool {
    matches!(
        action,
        Action::NextSeason
            | Action::PrevSeason
            | Action::CyclePerMode
            | Action::Refresh
            | Action::Show(Screen::Leaderboards)
    )
}

fn key_action(state: &AppState, key: KeyEvent) -> Option<Action> {
    if state.screen == Screen::Dashboard && state.dashboard.search_active {
        return match key.code {
            KeyCode::Enter => Some(Action::EndSearch),
            KeyCode::Esc => Some(Action::ClearSearch),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(ch) => Some(Action::SearchInput(ch)),
            _ => None,
        };
    }

    let global = match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('1') => Some(Action::Show(Screen::Dashboard)),
        KeyCode::Char('2') => Some(Action::Show(Screen::Leaderboards)),
        KeyCode::Char('3') => Some(Action::Show(Screen::Game)),
        KeyCode::Left | KeyCode::Char('[') => Some(Action::NextSeason),
        KeyCode::Right | KeyCode::Char(']') => Some(Action::PrevSeason),
        KeyCode::Char('m') => Some(Action::CyclePerMode),
        KeyCode::Char('R') => Some(Action::Refresh),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
        _ => None,
    };
    if global.is_some() {
        return global;
    }

    match state.screen {
        Screen::Dashboard => match key.code {
            KeyCode::Tab => Some(Action::StatCursorNext),
            KeyCode::BackTab => Some(Action::StatCursorPrev),
            KeyCode::Char(' ') => Some(Action::ToggleStat),
            KeyCode::Char('t') => Some(Action::CycleTeam),
            KeyCode::Char('/') => Some(Action::StartSearch),
            KeyCode::Esc => Some(Action::ClearSearch),
            _ => None,
        },
        Screen::Leaderboards => match key.code {
            KeyCode::Char('s') => Some(Action::CycleLeaderboardStat),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::TopNUp),
            KeyCode::Char('-') => Some(Action::TopNDown),
            KeyCode::Char('y') => Some(Action::CyclePlayerYear),
            _ => None,
        },
        Screen::Game => match key.code {
            KeyCode::Char('a') => Some(Action::Choose(GuessLabel::A)),
            KeyCode::Char('b') => Some(Action::Choose(GuessLabel::B)),
            KeyCode::Char('c') => Some(Action::Choose(GuessLabel::C)),
            KeyCode::Char('r') | KeyCode::Enter => Some(Action::Reveal),
            KeyCode::Char('n') => Some(Action::PlayAgain),
            _ => None,
        },
    }
}

fn ui(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], state),
        Screen::Leaderboards => render_leaderboard(frame, chunks[1], state),
        Screen::Game => render_game(frame, chunks[1], state),
    }

    let console = Paragraph::new(console_text(state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP).title("Log"));
    frame.render_widget(console, chunks[2]);

    frame.render_widget(Paragraph::new(footer_text(state)), chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!(
        "  NBA STATS | {} | Season {} | {}",
        state.screen.title(),
        state.season_label(),
        state.per_mode.label()
    );
    let line2 = match state.screen {
        Screen::Dashboard => {
            let team = state.dashboard.filter.team.as_deref().unwrap_or(ALL_TEAMS);
            let search = &state.dashboard.filter.search;
            let cursor = if state.dashboard.search_active { "_" } else { "" };
            format!("  Team: {team} | Search: {search}{cursor}")
        }
        Screen::Leaderboards => {
            let year = state
                .leaderboard
                .year_options
                .get(state.leaderboard.year_idx)
                .map(String::as_str)
                .unwrap_or(ALL_YEARS);
            format!(
                "  Stat: {} | Top {} | Player Year: {year}",
                state.leaderboard_stat().unwrap_or("-"),
                state.leaderboard.top_n
            )
        }
        Screen::Game => {
            let picked = state
                .game
                .session
                .round()
                .map(|r| r.selected.label())
                .unwrap_or("-");
            format!("  Your pick: {picked} | Picks so far: {}", state.game.session.history().len())
        }
    };
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Dashboard => {
            "1/2/3 Page | ←/→ Season | m Per-mode | Tab Stat | Space Toggle | t Team | / Search | ? Help | q Quit".to_string()
        }
        Screen::Leaderboards => {
            "1/2/3 Page | ←/→ Season | m Per-mode | s Stat | +/- Top N | y Player Year | ? Help | q Quit".to_string()
        }
        Screen::Game => {
            "1/2/3 Page | a/b/c Pick | r Reveal | n Play again | ←/→ Season | ? Help | q Quit".to_string()
        }
    }
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(1)])
        .split(area);

    let options = state.dashboard_stat_options();
    let picker: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(idx, stat)| {
            let mark = if state.stat_selected(stat) { "[x]" } else { "[ ]" };
            let style = if idx == state.dashboard.stat_cursor {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(format!("{mark} {stat}"), style)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(picker).block(Block::default().borders(Borders::RIGHT).title("Stats")),
        cols[0],
    );

    match &state.dashboard.view {
        DashboardView::Table(table) => {
            let rows = display_rows(table, MAIN_PERCENT_DECIMALS);
            render_string_table(frame, cols[1], &rows, state.scroll as usize);
        }
        DashboardView::Warning(msg) => render_warning(frame, cols[1], msg),
    }
}

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState) {
    match &state.leaderboard.view {
        LeaderboardOutput::Table(table) => {
            let mut rows = display_rows(table, MAIN_PERCENT_DECIMALS);
            for (rank, row) in rows.iter_mut().enumerate() {
                let label = if rank == 0 { "#".to_string() } else { rank.to_string() };
                row.insert(0, label);
            }
            render_string_table(frame, area, &rows, state.scroll as usize);
        }
        LeaderboardOutput::Warning(msg) => render_warning(frame, area, msg),
    }
}

fn render_game(frame: &mut Frame, area: Rect, state: &AppState) {
    let (statlines, reveal, picks) = match &state.game.view {
        GameOutput::Round {
            statlines,
            reveal,
            picks,
        } => (statlines, reveal, picks),
        GameOutput::Warning(msg) => {
            render_warning(frame, area, msg);
            return;
        }
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(1),
        ])
        .split(area);

    let selected = state.game.session.round().map(|r| r.selected.index() + 1);
    render_titled_table(frame, sections[0], "Statlines", statlines, selected);
    match reveal {
        Some(rows) => render_titled_table(frame, sections[1], "Identity Revealed", rows, selected),
        None => render_warning(frame, sections[1], "Pick a, b or c, then press r to reveal."),
    }
    if picks.len() > 1 {
        render_titled_table(frame, sections[2], "Your Picks So Far", picks, None);
    }
}

fn render_titled_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[Vec<String>],
    highlight: Option<usize>,
) {
    let block = Block::default().borders(Borders::TOP).title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let Some((header, body)) = rows.split_first() else {
        return;
    };
    let widths = column_widths(rows);
    let body = body.iter().enumerate().map(|(idx, r)| {
        let row = Row::new(r.clone());
        if highlight == Some(idx + 1) {
            row.style(Style::default().fg(Color::Yellow))
        } else {
            row
        }
    });
    let table = Table::new(body, widths)
        .header(Row::new(header.clone()).style(Style::default().add_modifier(Modifier::BOLD)));
    frame.render_widget(table, inner);
}

fn render_string_table(frame: &mut Frame, area: Rect, rows: &[Vec<String>], scroll: usize) {
    let Some((header, body)) = rows.split_first() else {
        return;
    };
    let visible = area.height.saturating_sub(1) as usize;
    let start = scroll.min(body.len().saturating_sub(visible));
    let widths = column_widths(rows);
    let body = body
        .iter()
        .skip(start)
        .take(visible)
        .map(|r| Row::new(r.clone()));
    let table = Table::new(body, widths)
        .header(Row::new(header.clone()).style(Style::default().add_modifier(Modifier::BOLD)));
    frame.render_widget(table, area);
}

fn column_widths(rows: &[Vec<String>]) -> Vec<Constraint> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    (0..cols)
        .map(|c| {
            let widest = rows
                .iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(1);
            Constraint::Length(widest.clamp(2, 28) as u16)
        })
        .collect()
}

fn render_warning(frame: &mut Frame, area: Rect, msg: &str) {
    let warn = Paragraph::new(msg.to_string())
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true });
    frame.render_widget(warn, area);
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect(40, 20, frame.size());
    frame.render_widget(Clear, area);
    let loading = Paragraph::new("Loading stats...")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(loading, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NBA Stats Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Dashboard / Leaderboards / Player A/B/C",
        "  ← / →        Older / newer season",
        "  m            Per Game / Totals / Per 36",
        "  j/k or ↑/↓   Scroll",
        "  R            Clear cache and refetch",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Dashboard:",
        "  Tab          Move stat cursor",
        "  Space        Toggle stat",
        "  t            Cycle team",
        "  /            Search player (Enter keeps, Esc clears)",
        "",
        "Leaderboards:",
        "  s            Cycle stat",
        "  + / -        Top N (5-50)",
        "  y            Cycle player year",
        "",
        "Player A/B/C:",
        "  a / b / c    Choose",
        "  r            Reveal",
        "  n            Play again",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
