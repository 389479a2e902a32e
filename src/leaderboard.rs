use std::cmp::Ordering;

use crate::config::{TOP_N_MAX, TOP_N_MIN};
use crate::table::StatTable;

pub const PLAYER_COL: &str = "Player";
pub const TEAM_COL: &str = "Team";

/// Stats offered on the leaderboard page, filtered to what the table has.
pub const LEADERBOARD_STATS: &[&str] = &[
    "PTS",
    "AST",
    "REB",
    "FG %",
    "3PT %",
    "True Shooting %",
    "Usage Rate",
    "Offensive Rating",
    "Net Rating",
];

pub fn clamp_top_n(n: usize) -> usize {
    n.clamp(TOP_N_MIN, TOP_N_MAX)
}

/// Top `top_n` rows by `stat`, highest first.
///
/// Only Player, Team and the stat survive; rows missing any of the three are
/// dropped. Equal values keep their original order.
pub fn rank_leaderboard(table: &StatTable, stat: &str, top_n: usize) -> StatTable {
    let columns = [PLAYER_COL, TEAM_COL, stat];
    let ranked = table.select(&columns).drop_nulls(&columns);
    let Some(stat_idx) = ranked.column_index(stat) else {
        return ranked;
    };

    let mut order: Vec<(usize, f64)> = ranked
        .raw_rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| (idx, row[stat_idx].as_f64().unwrap_or(f64::NEG_INFINITY)))
        .collect();
    // sort_by is stable, so ties fall back to input order.
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    order.truncate(top_n);

    let rows = order
        .iter()
        .map(|(idx, _)| ranked.raw_rows()[*idx].clone())
        .collect();
    StatTable::from_parts(ranked.columns().to_vec(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn board(values: &[(&str, Option<f64>)]) -> StatTable {
        StatTable::from_rows(
            vec![PLAYER_COL.into(), TEAM_COL.into(), "PTS".into(), "AST".into()],
            values
                .iter()
                .map(|(name, pts)| {
                    vec![
                        Cell::Text(name.to_string()),
                        Cell::Text("BOS".into()),
                        pts.map(Cell::Num).unwrap_or(Cell::Null),
                        Cell::Num(1.0),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn drops_other_columns_and_null_rows() {
        let ranked = rank_leaderboard(&board(&[("A", Some(3.0)), ("B", None)]), "PTS", 10);
        assert_eq!(ranked.columns(), &["Player".to_string(), "Team".into(), "PTS".into()]);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_leaderboard(
            &board(&[("A", Some(10.0)), ("B", Some(20.0)), ("C", Some(10.0))]),
            "PTS",
            5,
        );
        let names: Vec<&str> = ranked.rows().filter_map(|r| r.text("Player")).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn unknown_stat_yields_no_rows() {
        let ranked = rank_leaderboard(&board(&[("A", Some(1.0))]), "Pace", 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn top_n_is_clamped_to_slider_range() {
        assert_eq!(clamp_top_n(1), 5);
        assert_eq!(clamp_top_n(99), 50);
        assert_eq!(clamp_top_n(12), 12);
    }
}
