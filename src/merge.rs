use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::season::{MeasureType, PerMode};
use crate::stat_labels::display_label;
use crate::stats_fetch::{StatsQuery, StatsSource};
use crate::table::{Cell, StatTable};

/// Columns expected to be identical between base and advanced results.
pub const MERGE_KEYS: &[&str] = &[
    "PLAYER_ID",
    "PLAYER_NAME",
    "TEAM_ID",
    "TEAM_ABBREVIATION",
    "AGE",
    "GP",
    "W",
    "L",
    "W_PCT",
    "MIN",
];

/// Fetch base + advanced stats for one season and merge them into a relabeled
/// table. Any failure along the way yields [`StatTable::empty`].
pub fn fetch_combined_stats(source: &dyn StatsSource, season: &str, per_mode: PerMode) -> StatTable {
    match try_combined_stats(source, season, per_mode) {
        Ok(table) => {
            info!(season, per_mode = per_mode.api_value(), rows = table.len(), "combined stats ready");
            table
        }
        Err(err) => {
            warn!(season, per_mode = per_mode.api_value(), "combined stats unavailable: {err:#}");
            StatTable::empty()
        }
    }
}

fn try_combined_stats(source: &dyn StatsSource, season: &str, per_mode: PerMode) -> Result<StatTable> {
    let base = source
        .fetch(&StatsQuery::new(season, per_mode, MeasureType::Base))
        .context("base stats fetch failed")?;
    let advanced = source
        .fetch(&StatsQuery::new(season, per_mode, MeasureType::Advanced))
        .context("advanced stats fetch failed")?;
    let mut merged = outer_join(&base, &advanced, MERGE_KEYS)?;
    relabel_columns(&mut merged);
    Ok(merged)
}

pub fn relabel_columns(table: &mut StatTable) {
    table.rename_columns(display_label);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Num(u64),
    Text(String),
}

impl KeyPart {
    fn from_cell(cell: &Cell) -> Self {
        if cell.is_null() {
            return KeyPart::Null;
        }
        match cell {
            // -0.0 and 0.0 must land on the same key.
            Cell::Num(v) => KeyPart::Num(if *v == 0.0 { 0 } else { v.to_bits() }),
            Cell::Text(s) => KeyPart::Text(s.clone()),
            Cell::Null => KeyPart::Null,
        }
    }
}

/// Full outer join on `keys`.
///
/// Output columns are every left column followed by the right columns not
/// already present. A shared non-key column takes the left value, or the
/// right one when the left cell is null. Rows come out left-first (each left
/// row followed by all its right matches), then right rows nothing matched.
pub fn outer_join(left: &StatTable, right: &StatTable, keys: &[&str]) -> Result<StatTable> {
    let left_keys = key_indices(left, keys).context("left table is missing join keys")?;
    let right_keys = key_indices(right, keys).context("right table is missing join keys")?;

    let mut columns: Vec<String> = left.columns().to_vec();
    // Where each output column reads from: (left index, right index).
    let mut sources: Vec<(Option<usize>, Option<usize>)> = left
        .columns()
        .iter()
        .map(|name| (left.column_index(name), right.column_index(name)))
        .collect();
    for (idx, name) in right.columns().iter().enumerate() {
        if !left.has_column(name) {
            columns.push(name.clone());
            sources.push((None, Some(idx)));
        }
    }

    let mut right_by_key: HashMap<Vec<KeyPart>, Vec<usize>> = HashMap::new();
    for (idx, row) in right.raw_rows().iter().enumerate() {
        right_by_key
            .entry(row_key(row, &right_keys))
            .or_default()
            .push(idx);
    }

    let mut right_matched = vec![false; right.len()];
    let mut rows = Vec::with_capacity(left.len().max(right.len()));
    for left_row in left.raw_rows() {
        let key = row_key(left_row, &left_keys);
        match right_by_key.get(&key) {
            Some(matches) => {
                for &ridx in matches {
                    right_matched[ridx] = true;
                    rows.push(combine(&sources, Some(left_row), Some(&right.raw_rows()[ridx])));
                }
            }
            None => rows.push(combine(&sources, Some(left_row), None)),
        }
    }
    for (ridx, right_row) in right.raw_rows().iter().enumerate() {
        if !right_matched[ridx] {
            rows.push(combine(&sources, None, Some(right_row)));
        }
    }

    Ok(StatTable::from_rows(columns, rows)?)
}

fn key_indices(table: &StatTable, keys: &[&str]) -> Result<Vec<usize>> {
    keys.iter()
        .map(|k| {
            table
                .column_index(k)
                .with_context(|| format!("missing column {k}"))
        })
        .collect()
}

fn row_key(row: &[Cell], idxs: &[usize]) -> Vec<KeyPart> {
    idxs.iter().map(|idx| KeyPart::from_cell(&row[*idx])).collect()
}

fn combine(
    sources: &[(Option<usize>, Option<usize>)],
    left: Option<&Vec<Cell>>,
    right: Option<&Vec<Cell>>,
) -> Vec<Cell> {
    sources
        .iter()
        .map(|(lidx, ridx)| {
            let from_left = left.zip(*lidx).map(|(row, idx)| &row[idx]);
            let from_right = right.zip(*ridx).map(|(row, idx)| &row[idx]);
            match (from_left, from_right) {
                (Some(l), _) if !l.is_null() => l.clone(),
                (_, Some(r)) => r.clone(),
                (Some(l), None) => l.clone(),
                (None, None) => Cell::Null,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> StatTable {
        StatTable::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn shared_column_prefers_left_then_right() {
        let left = table(&["ID", "NICK"], vec![vec![Cell::Num(1.0), Cell::Null]]);
        let right = table(&["ID", "NICK"], vec![vec![Cell::Num(1.0), t("Joker")]]);
        let merged = outer_join(&left, &right, &["ID"]).unwrap();
        assert_eq!(merged.columns(), &["ID".to_string(), "NICK".to_string()]);
        assert_eq!(merged.row(0).and_then(|r| r.text("NICK")), Some("Joker"));
    }

    #[test]
    fn duplicate_keys_produce_every_pair() {
        let left = table(&["ID", "A"], vec![vec![Cell::Num(1.0), Cell::Num(1.0)]]);
        let right = table(
            &["ID", "B"],
            vec![
                vec![Cell::Num(1.0), Cell::Num(10.0)],
                vec![Cell::Num(1.0), Cell::Num(20.0)],
            ],
        );
        let merged = outer_join(&left, &right, &["ID"]).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn negative_zero_matches_zero() {
        let left = table(&["ID"], vec![vec![Cell::Num(-0.0)]]);
        let right = table(&["ID", "B"], vec![vec![Cell::Num(0.0), Cell::Num(3.0)]]);
        let merged = outer_join(&left, &right, &["ID"]).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.row(0).and_then(|r| r.num("B")), Some(3.0));
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let left = table(&["ID"], vec![]);
        let right = table(&["OTHER"], vec![]);
        assert!(outer_join(&left, &right, &["ID"]).is_err());
    }
}
