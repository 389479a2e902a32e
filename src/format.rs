use crate::stat_labels::is_percent_label;
use crate::table::{Cell, StatTable};

/// Decimal places for percent columns in the dashboard and leaderboard.
pub const MAIN_PERCENT_DECIMALS: usize = 2;
/// Decimal places for percent columns in the guessing game.
pub const GAME_PERCENT_DECIMALS: usize = 1;

/// `0.5123` → `"51.23%"` with two decimals.
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Plain numbers print without a trailing `.0`; fractional values keep at
/// most `max_decimals` places with trailing zeros trimmed.
pub fn format_number(value: f64, max_decimals: usize) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let raw = format!("{:.*}", max_decimals, value);
    if raw.contains('.') {
        raw.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        raw
    }
}

pub fn format_cell(column: &str, cell: &Cell, percent_decimals: usize) -> String {
    match cell {
        Cell::Num(v) if v.is_nan() => String::new(),
        Cell::Num(v) if is_percent_label(column) => format_percent(*v, percent_decimals),
        Cell::Num(v) => format_number(*v, 3),
        Cell::Text(s) => s.clone(),
        Cell::Null => String::new(),
    }
}

/// Render a table into display strings, header row first. Stored values are
/// left untouched.
pub fn display_rows(table: &StatTable, percent_decimals: usize) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(table.len() + 1);
    out.push(table.columns().to_vec());
    for row in table.rows() {
        out.push(
            table
                .columns()
                .iter()
                .zip(row.cells())
                .map(|(col, cell)| format_cell(col, cell, percent_decimals))
                .collect(),
        );
    }
    out
}

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
