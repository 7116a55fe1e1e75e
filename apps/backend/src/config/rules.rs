//! Map pool and series rules, loaded once at startup.
//!
//! The stock rules are compiled in. `PICKBAN_RULES_PATH` may point at a JSON
//! file with the same shape to replace them. Either way the rules are checked
//! against every flow table before the server accepts traffic.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::flow::{build_flow, mode_demand, SeriesLength};
use crate::domain::map_pool::{GameMode, MapPool};
use crate::error::AppError;

const BUILTIN_RULES: &str = include_str!("default_rules.json");
const DEFAULT_TURN_TIMER_SECS: u64 = 60;
const MAX_TURN_TIMER_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("rules file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{mode} has no maps")]
    EmptyMode { mode: GameMode },
    #[error("{mode} lists {name} more than once")]
    DuplicateMap { mode: GameMode, name: String },
    #[error("{series} requires {wins} wins, expected more than half of {maps} maps")]
    RequiredWins { series: SeriesLength, wins: u8, maps: u8 },
    #[error("{series} needs {needed} {mode} maps but only {available} are configured")]
    PoolTooSmall {
        series: SeriesLength,
        mode: GameMode,
        needed: usize,
        available: usize,
    },
    #[error("turn_timer_secs must be between 1 and {max}, got {secs}")]
    TurnTimer { secs: u64, max: u64 },
    #[error("decider mode {mode} must have exactly {expected} maps, found {available}")]
    DeciderPool {
        mode: GameMode,
        expected: usize,
        available: usize,
    },
}

impl From<RulesError> for AppError {
    fn from(err: RulesError) -> Self {
        AppError::config(format!("Invalid match rules: {err}"), err)
    }
}

fn default_turn_timer() -> u64 {
    DEFAULT_TURN_TIMER_SECS
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    map_pool: MapPool,
    #[serde(default)]
    required_wins: BTreeMap<SeriesLength, u8>,
    #[serde(default = "default_turn_timer")]
    turn_timer_secs: u64,
}

/// Static configuration shared by every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRules {
    pub map_pool: MapPool,
    required_wins: BTreeMap<SeriesLength, u8>,
    pub turn_timer_secs: u64,
}

impl MatchRules {
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_json(BUILTIN_RULES)
    }

    pub fn from_json(raw: &str) -> Result<Self, RulesError> {
        let file: RulesFile = serde_json::from_str(raw)?;
        let rules = Self::new(file.map_pool, file.required_wins, file.turn_timer_secs);
        rules.validate()?;
        Ok(rules)
    }

    /// Load from `path` when given, otherwise the compiled-in rules.
    pub fn load(path: Option<&Path>) -> Result<Self, RulesError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&raw)
            }
            None => Self::builtin(),
        }
    }

    /// Unvalidated constructor. Missing series lengths fall back to a strict majority.
    pub fn new(
        map_pool: MapPool,
        mut required_wins: BTreeMap<SeriesLength, u8>,
        turn_timer_secs: u64,
    ) -> Self {
        for series in SeriesLength::ALL {
            required_wins
                .entry(series)
                .or_insert_with(|| series.default_required_wins());
        }
        Self {
            map_pool,
            required_wins,
            turn_timer_secs,
        }
    }

    pub fn required_wins(&self, series: SeriesLength) -> u8 {
        self.required_wins
            .get(&series)
            .copied()
            .unwrap_or_else(|| series.default_required_wins())
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if !(1..=MAX_TURN_TIMER_SECS).contains(&self.turn_timer_secs) {
            return Err(RulesError::TurnTimer {
                secs: self.turn_timer_secs,
                max: MAX_TURN_TIMER_SECS,
            });
        }

        for (mode, maps) in self.map_pool.modes() {
            if maps.is_empty() {
                return Err(RulesError::EmptyMode { mode });
            }
            let mut seen = BTreeSet::new();
            for name in maps {
                if !seen.insert(name.to_ascii_lowercase()) {
                    return Err(RulesError::DuplicateMap {
                        mode,
                        name: name.clone(),
                    });
                }
            }
        }

        for series in SeriesLength::ALL {
            let maps = series.map_count();
            let wins = self.required_wins(series);
            if wins <= maps / 2 || wins > maps {
                return Err(RulesError::RequiredWins { series, wins, maps });
            }

            for (mode, demand) in mode_demand(&build_flow(series)) {
                let available = self.map_pool.maps(mode).len();
                if demand.deciders > 0 {
                    let expected = demand.bans + demand.picks + demand.deciders;
                    if available != expected {
                        return Err(RulesError::DeciderPool {
                            mode,
                            expected,
                            available,
                        });
                    }
                } else if available < demand.total() {
                    return Err(RulesError::PoolTooSmall {
                        series,
                        mode,
                        needed: demand.total(),
                        available,
                    });
                }
            }
        }
        Ok(())
    }
}
