const RANK_SUFFIX: &str = "_RANK";
const RANK_LABEL_SUFFIX: &str = " Rank";

/// Provider stat code → display label.
const STAT_LABELS: &[(&str, &str)] = &[
    ("PLAYER_ID", "Player ID"),
    ("PLAYER_NAME", "Player"),
    ("TEAM_ID", "Team ID"),
    ("TEAM_ABBREVIATION", "Team"),
    ("AGE", "Age"),
    ("GP", "Games Played"),
    ("W", "Wins"),
    ("L", "Losses"),
    ("W_PCT", "Win %"),
    ("MIN", "Minutes"),
    ("PTS", "PTS"),
    ("AST", "AST"),
    ("REB", "REB"),
    ("OREB", "OREB"),
    ("DREB", "DREB"),
    ("STL", "STL"),
    ("BLK", "BLK"),
    ("TOV", "TOV"),
    ("FG_PCT", "FG %"),
    ("FG3_PCT", "3PT %"),
    ("FT_PCT", "FT %"),
    ("OFF_RATING", "Offensive Rating"),
    ("DEF_RATING", "Defensive Rating"),
    ("NET_RATING", "Net Rating"),
    ("AST_PCT", "Assist %"),
    ("AST_TO", "AST/TO Ratio"),
    ("AST_RATIO", "Assist Ratio"),
    ("OREB_PCT", "Offensive Rebound %"),
    ("DREB_PCT", "Defensive Rebound %"),
    ("REB_PCT", "Total Rebound %"),
    ("TO_PCT", "Turnover %"),
    ("EFG_PCT", "Effective FG %"),
    ("TS_PCT", "True Shooting %"),
    ("USG_PCT", "Usage Rate"),
    ("PACE", "Pace"),
    ("PIE", "Player Impact Estimate"),
    ("SEASON_ID", "Season"),
];

pub fn known_codes() -> impl Iterator<Item = &'static str> {
    STAT_LABELS.iter().map(|(code, _)| *code)
}

/// Human-readable label for a raw column code. `X_RANK` resolves `X` first
/// and appends " Rank"; anything unknown is title-cased.
pub fn display_label(code: &str) -> String {
    if let Some(base) = code.strip_suffix(RANK_SUFFIX) {
        return format!("{}{RANK_LABEL_SUFFIX}", base_label(base));
    }
    base_label(code)
}

fn base_label(code: &str) -> String {
    STAT_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| title_case(&code.replace('_', " ")))
}

/// Inverse of [`display_label`] for labels coming from the fixed table.
pub fn stat_code(label: &str) -> Option<String> {
    if let Some(code) = STAT_LABELS.iter().find(|(_, l)| *l == label).map(|(c, _)| *c) {
        return Some(code.to_string());
    }
    let base = label.strip_suffix(RANK_LABEL_SUFFIX)?;
    let code = STAT_LABELS.iter().find(|(_, l)| *l == base).map(|(c, _)| *c)?;
    Some(format!("{code}{RANK_SUFFIX}"))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Percent-valued columns are recognised by their display label.
pub fn is_percent_label(label: &str) -> bool {
    label.contains('%')
}
