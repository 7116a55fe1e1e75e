//! Game modes and the per-mode map pool.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Competitive game modes, in the order their phases run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "HP", alias = "hp", alias = "Hardpoint")]
    Hardpoint,
    #[serde(rename = "SnD", alias = "snd", alias = "SND")]
    SearchAndDestroy,
    #[serde(rename = "Overload", alias = "overload", alias = "OVERLOAD")]
    Overload,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [
        GameMode::Hardpoint,
        GameMode::SearchAndDestroy,
        GameMode::Overload,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            GameMode::Hardpoint => "HP",
            GameMode::SearchAndDestroy => "SnD",
            GameMode::Overload => "Overload",
        }
    }

    /// Case-insensitive lookup by wire label.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed list of map names per mode. Names are unique within a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapPool {
    modes: BTreeMap<GameMode, Vec<String>>,
}

impl MapPool {
    pub fn new(modes: BTreeMap<GameMode, Vec<String>>) -> Self {
        Self { modes }
    }

    /// Maps configured for `mode`, in configuration order.
    pub fn maps(&self, mode: GameMode) -> &[String] {
        self.modes.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modes(&self) -> impl Iterator<Item = (GameMode, &[String])> {
        self.modes.iter().map(|(mode, maps)| (*mode, maps.as_slice()))
    }

    /// Canonical spelling of `name` within `mode`, matched case-insensitively.
    pub fn resolve(&self, mode: GameMode, name: &str) -> Option<&str> {
        let name = name.trim();
        self.maps(mode)
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Every mode whose pool contains `name`.
    pub fn modes_containing(&self, name: &str) -> Vec<GameMode> {
        self.modes()
            .filter(|(mode, _)| self.resolve(*mode, name).is_some())
            .map(|(mode, _)| mode)
            .collect()
    }
}
