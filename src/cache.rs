use std::collections::HashMap;

use tracing::debug;

use crate::debut::{DebutYearMap, build_debut_years};
use crate::merge::fetch_combined_stats;
use crate::season::{PerMode, Season};
use crate::stats_fetch::StatsSource;
use crate::table::StatTable;

/// Process-lifetime memo of merged tables and debut-year maps.
///
/// Each key is computed at most once until [`StatsCache::invalidate`];
/// empty "no data" results are memoized like any other.
#[derive(Debug, Default)]
pub struct StatsCache {
    combined: HashMap<(String, PerMode), StatTable>,
    debuts: HashMap<PerMode, DebutYearMap>,
    fetch_threads: usize,
}

impl StatsCache {
    pub fn new(fetch_threads: usize) -> Self {
        Self {
            combined: HashMap::new(),
            debuts: HashMap::new(),
            fetch_threads,
        }
    }

    pub fn combined(&mut self, source: &dyn StatsSource, season: &str, per_mode: PerMode) -> &StatTable {
        self.combined
            .entry((season.to_string(), per_mode))
            .or_insert_with(|| {
                debug!(season, per_mode = per_mode.api_value(), "combined stats cache miss");
                fetch_combined_stats(source, season, per_mode)
            })
    }

    pub fn debut_years(
        &mut self,
        source: &dyn StatsSource,
        per_mode: PerMode,
        seasons: &[Season],
    ) -> &DebutYearMap {
        let threads = self.fetch_threads;
        self.debuts.entry(per_mode).or_insert_with(|| {
            debug!(per_mode = per_mode.api_value(), "debut years cache miss");
            build_debut_years(source, per_mode, seasons, threads)
        })
    }

    pub fn has_combined(&self, season: &str, per_mode: PerMode) -> bool {
        self.combined.contains_key(&(season.to_string(), per_mode))
    }

    pub fn has_debut_years(&self, per_mode: PerMode) -> bool {
        self.debuts.contains_key(&per_mode)
    }

    pub fn invalidate(&mut self) {
        self.combined.clear();
        self.debuts.clear();
    }
}
