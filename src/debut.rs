use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::season::{MeasureType, PerMode, Season};
use crate::stats_fetch::{StatsQuery, StatsSource};
use crate::table::StatTable;

const PLAYER_NAME: &str = "PLAYER_NAME";

/// Player name → start year of the first season the player shows up in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebutYearMap {
    years: HashMap<String, i32>,
}

impl DebutYearMap {
    pub fn get(&self, player: &str) -> Option<i32> {
        self.years.get(player).copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Seasons since debut, counting the viewed one. Players we never saw
    /// are treated as rookies of `season_start`.
    pub fn player_year(&self, player: &str, season_start: i32) -> i32 {
        season_start - self.get(player).unwrap_or(season_start) + 1
    }
}

/// Scan `seasons` oldest to newest and record each name's first appearance.
/// Seasons that fail to load are skipped.
pub fn build_debut_years(
    source: &dyn StatsSource,
    per_mode: PerMode,
    seasons: &[Season],
    threads: usize,
) -> DebutYearMap {
    let mut ordered: Vec<Season> = seasons.to_vec();
    ordered.sort();
    ordered.dedup();

    let tables: Vec<(Season, Option<StatTable>)> = with_fetch_pool(threads, || {
        ordered
            .par_iter()
            .map(|season| {
                let query = StatsQuery::new(season.to_string(), per_mode, MeasureType::Base);
                match source.fetch(&query) {
                    Ok(table) => (*season, Some(table)),
                    Err(err) => {
                        debug!(season = %season, "debut scan skipped season: {err:#}");
                        (*season, None)
                    }
                }
            })
            .collect()
    });

    let mut map = DebutYearMap::default();
    for (season, table) in tables {
        let Some(table) = table else { continue };
        record_season(&mut map, season.start_year, &table);
    }
    info!(per_mode = per_mode.api_value(), players = map.len(), "debut years built");
    map
}

fn record_season(map: &mut DebutYearMap, start_year: i32, table: &StatTable) {
    for cell in table.column_values(PLAYER_NAME) {
        let Some(name) = cell.as_str() else { continue };
        map.years.entry(name.to_string()).or_insert(start_year);
    }
}

// par_iter keeps input order on collect, so the fold above stays oldest-first.
fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads.max(1)).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
