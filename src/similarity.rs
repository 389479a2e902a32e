use std::cmp::Ordering;
use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::leaderboard::{PLAYER_COL, TEAM_COL};
use crate::season::PerMode;
use crate::table::StatTable;

pub const STAT_DIMS: usize = 6;

/// Stats the nearest-neighbour search runs over.
pub const GAME_STATS: [&str; STAT_DIMS] = [
    "PTS",
    "AST",
    "REB",
    "3PT %",
    "True Shooting %",
    "Usage Rate",
];

pub const SAMPLE_SIZE: usize = 3;
/// The anchor plus its three neighbours.
pub const MIN_POPULATION: usize = SAMPLE_SIZE + 1;

const STDEV_EPSILON: f64 = 1e-12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("not enough data to play the game ({valid} valid players, need {required})")]
    InsufficientData { valid: usize, required: usize },
    #[error("no round in progress")]
    NoRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuessLabel {
    A,
    B,
    C,
}

impl GuessLabel {
    pub const ALL: [GuessLabel; SAMPLE_SIZE] = [GuessLabel::A, GuessLabel::B, GuessLabel::C];

    pub fn index(self) -> usize {
        match self {
            GuessLabel::A => 0,
            GuessLabel::B => 1,
            GuessLabel::C => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GuessLabel::A => "Player A",
            GuessLabel::B => "Player B",
            GuessLabel::C => "Player C",
        }
    }
}

impl fmt::Display for GuessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mean and population standard deviation of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScale {
    pub mean: f64,
    pub stdev: f64,
}

impl ColumnScale {
    pub fn fit(values: impl Iterator<Item = f64> + Clone) -> Self {
        let n = values.clone().count();
        if n == 0 {
            return Self { mean: 0.0, stdev: 0.0 };
        }
        let mean = values.clone().sum::<f64>() / n as f64;
        let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        Self {
            mean,
            stdev: var.sqrt(),
        }
    }

    /// Zero-variance columns map every value to 0.
    pub fn transform(&self, value: f64) -> f64 {
        if self.stdev < STDEV_EPSILON {
            return 0.0;
        }
        (value - self.mean) / self.stdev
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolPlayer {
    pub player: String,
    pub team: Option<String>,
    pub stats: [f64; STAT_DIMS],
}

/// Players with all six game stats present, plus their standardized vectors.
#[derive(Debug, Clone)]
pub struct SimilarityPool {
    players: Vec<PoolPlayer>,
    scaled: Vec<[f64; STAT_DIMS]>,
    scales: [ColumnScale; STAT_DIMS],
}

impl SimilarityPool {
    pub fn from_table(table: &StatTable) -> Result<Self, GameError> {
        let valid = table.drop_nulls(&GAME_STATS);

        let mut players = Vec::with_capacity(valid.len());
        for row in valid.rows() {
            let mut stats = [0.0; STAT_DIMS];
            for (slot, col) in stats.iter_mut().zip(GAME_STATS) {
                *slot = row.num(col).unwrap_or(f64::NAN);
            }
            // Text in a stat column survives the null filter but can't be measured.
            if stats.iter().any(|v| v.is_nan()) {
                continue;
            }
            players.push(PoolPlayer {
                player: row.text(PLAYER_COL).unwrap_or_default().to_string(),
                team: row.text(TEAM_COL).map(str::to_string),
                stats,
            });
        }

        if players.len() < MIN_POPULATION {
            return Err(GameError::InsufficientData {
                valid: players.len(),
                required: MIN_POPULATION,
            });
        }

        let scales: [ColumnScale; STAT_DIMS] =
            std::array::from_fn(|dim| ColumnScale::fit(players.iter().map(move |p| p.stats[dim])));
        let scaled = players
            .iter()
            .map(|p| std::array::from_fn(|dim| scales[dim].transform(p.stats[dim])))
            .collect();
        debug!(players = players.len(), "similarity pool standardized");
        Ok(Self {
            players,
            scaled,
            scales,
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[PoolPlayer] {
        &self.players
    }

    pub fn scaled(&self) -> &[[f64; STAT_DIMS]] {
        &self.scaled
    }

    pub fn scales(&self) -> &[ColumnScale; STAT_DIMS] {
        &self.scales
    }

    /// The `k` players closest to `anchor`, nearest first. The anchor itself
    /// never appears, even when another player sits at distance zero; equal
    /// distances keep table order.
    pub fn nearest_neighbors(&self, anchor: usize, k: usize) -> Vec<usize> {
        let Some(origin) = self.scaled.get(anchor) else {
            return Vec::new();
        };
        let mut ranked: Vec<(usize, f64)> = self
            .scaled
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != anchor)
            .map(|(idx, v)| (idx, euclidean(origin, v)))
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        ranked.into_iter().take(k).map(|(idx, _)| idx).collect()
    }

    /// Draw a random anchor and return its three nearest neighbours.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SimilaritySample> {
        if self.players.is_empty() {
            return None;
        }
        let anchor = rng.gen_range(0..self.players.len());
        self.sample_for_anchor(anchor)
    }

    /// `None` when `anchor` is not a row of the pool.
    pub fn sample_for_anchor(&self, anchor: usize) -> Option<SimilaritySample> {
        let origin = self.scaled.get(anchor)?;
        let anchor_player = self.players.get(anchor)?;
        let entries = self
            .nearest_neighbors(anchor, SAMPLE_SIZE)
            .into_iter()
            .map(|idx| SampleEntry {
                distance: euclidean(origin, &self.scaled[idx]),
                player: self.players[idx].clone(),
            })
            .collect();
        Some(SimilaritySample {
            anchor: anchor_player.player.clone(),
            entries,
        })
    }
}

pub fn euclidean(a: &[f64; STAT_DIMS], b: &[f64; STAT_DIMS]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleEntry {
    pub player: PoolPlayer,
    pub distance: f64,
}

/// The three players shown in one round, closest to the anchor first.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilaritySample {
    pub anchor: String,
    pub entries: Vec<SampleEntry>,
}

impl SimilaritySample {
    pub fn entry(&self, label: GuessLabel) -> Option<&SampleEntry> {
        self.entries.get(label.index())
    }

    pub fn labeled(&self) -> impl Iterator<Item = (GuessLabel, &SampleEntry)> + '_ {
        GuessLabel::ALL.into_iter().zip(self.entries.iter())
    }
}

/// Every revealed pick, in order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessHistory {
    picks: Vec<String>,
}

impl GuessHistory {
    pub fn push(&mut self, player: impl Into<String>) {
        self.picks.push(player.into());
    }

    pub fn picks(&self) -> &[String] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn contains(&self, player: &str) -> bool {
        self.picks.iter().any(|p| p == player)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRound {
    pub sample: SimilaritySample,
    pub selected: GuessLabel,
    pub revealed: bool,
}

/// Identity behind the chosen label, produced by [`GameSession::reveal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub label: GuessLabel,
    pub player: String,
}

/// Key the standardized pool was built for; a different key forces a rebuild.
pub type PoolKey = (String, PerMode);

/// Guessing-game state for one user: pick history, the round in play and
/// the standardized pool it was drawn from.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    history: GuessHistory,
    round: Option<GameRound>,
    pool: Option<(PoolKey, SimilarityPool)>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &GuessHistory {
        &self.history
    }

    pub fn round(&self) -> Option<&GameRound> {
        self.round.as_ref()
    }

    /// Return the current round, starting one if none is held. Steps that
    /// only depend on the table are reused while `key` stays the same.
    pub fn ensure_round<R: Rng + ?Sized>(
        &mut self,
        key: &PoolKey,
        table: &StatTable,
        rng: &mut R,
    ) -> Result<&GameRound, GameError> {
        let stale = !matches!(&self.pool, Some((k, _)) if k == key);
        if stale {
            self.round = None;
            self.pool = None;
            let pool = SimilarityPool::from_table(table)?;
            self.pool = Some((key.clone(), pool));
        }
        if self.round.is_none() {
            let Some((_, pool)) = self.pool.as_ref() else {
                return Err(GameError::NoRound);
            };
            let Some(sample) = pool.sample(rng) else {
                return Err(GameError::NoRound);
            };
            debug!(anchor = %sample.anchor, "new similarity round");
            self.round = Some(GameRound {
                sample,
                selected: GuessLabel::A,
                revealed: false,
            });
        }
        self.round.as_ref().ok_or(GameError::NoRound)
    }

    pub fn choose(&mut self, label: GuessLabel) -> Result<(), GameError> {
        let round = self.round.as_mut().ok_or(GameError::NoRound)?;
        round.selected = label;
        Ok(())
    }

    /// Resolve the selected label and record the pick.
    pub fn reveal(&mut self) -> Result<Reveal, GameError> {
        let round = self.round.as_mut().ok_or(GameError::NoRound)?;
        let entry = round.sample.entry(round.selected).ok_or(GameError::NoRound)?;
        let reveal = Reveal {
            label: round.selected,
            player: entry.player.player.clone(),
        };
        round.revealed = true;
        self.history.push(reveal.player.clone());
        Ok(reveal)
    }

    /// Discard the held sample; the next [`GameSession::ensure_round`] draws anew.
    pub fn play_again(&mut self) {
        self.round = None;
    }

    /// Forget the cached pool as well, e.g. after the data was refreshed.
    pub fn reset_round(&mut self) {
        self.round = None;
        self.pool = None;
    }
}
