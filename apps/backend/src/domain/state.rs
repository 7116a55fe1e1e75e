use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

use crate::domain::flow::{FlowStep, SeriesLength};
use crate::domain::map_pool::{GameMode, MapPool};
use crate::domain::match_id::MatchId;
use crate::errors::domain::{DomainError, ValidationKind};

/// One of the two competing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSlot {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
}

impl TeamSlot {
    pub const BOTH: [TeamSlot; 2] = [TeamSlot::A, TeamSlot::B];

    pub const fn other(self) -> Self {
        match self {
            TeamSlot::A => TeamSlot::B,
            TeamSlot::B => TeamSlot::A,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            TeamSlot::A => 0,
            TeamSlot::B => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TeamSlot::A => "A",
            TeamSlot::B => "B",
        }
    }
}

impl fmt::Display for TeamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who banned or picked a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Team(TeamSlot),
    Decider,
}

impl Owner {
    pub const fn as_str(self) -> &'static str {
        match self {
            Owner::Team(team) => team.as_str(),
            Owner::Decider => "DECIDER",
        }
    }
}

impl Serialize for Owner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Attack,
    Defense,
}

impl Side {
    pub const fn other(self) -> Self {
        match self {
            Side::Attack => Side::Defense,
            Side::Defense => Side::Attack,
        }
    }
}

/// The side chosen for a map, and by whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SidePick {
    pub team: TeamSlot,
    pub side: Side,
}

impl SidePick {
    /// Side `team` plays on this map.
    pub fn side_for(&self, team: TeamSlot) -> Side {
        if team == self.team {
            self.side
        } else {
            self.side.other()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStatus {
    Free,
    Banned,
    Picked,
}

/// Identity of a map in the pool. The same name may appear in several modes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapKey {
    pub mode: GameMode,
    pub name: String,
}

impl MapKey {
    pub fn new(mode: GameMode, name: impl Into<String>) -> Self {
        Self {
            mode,
            name: name.into(),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub mode: GameMode,
    pub name: String,
    pub status: MapStatus,
    pub owner: Option<Owner>,
    pub slot: Option<u8>,
    pub side: Option<SidePick>,
}

impl MapEntry {
    pub fn free(mode: GameMode, name: impl Into<String>) -> Self {
        Self {
            mode,
            name: name.into(),
            status: MapStatus::Free,
            owner: None,
            slot: None,
            side: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == MapStatus::Free
    }

    pub fn key(&self) -> MapKey {
        MapKey::new(self.mode, self.name.clone())
    }
}

/// A team's display name and the auth role that identifies its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBinding {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapScore {
    pub a: u32,
    pub b: u32,
}

impl MapScore {
    /// Team with more rounds; `None` on a tie.
    pub fn leader(&self) -> Option<TeamSlot> {
        match self.a.cmp(&self.b) {
            std::cmp::Ordering::Greater => Some(TeamSlot::A),
            std::cmp::Ordering::Less => Some(TeamSlot::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub slot: u8,
    pub winner: TeamSlot,
    pub score: Option<MapScore>,
}

/// Coarse lifecycle used by dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    PickBan,
    Playing,
    Finished,
    Faulted,
}

/// Authoritative state of one match.
///
/// Mutated only through the executor and series functions, which leave the
/// value untouched on any error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub match_id: MatchId,
    pub teams: [TeamBinding; 2],
    pub series: Option<SeriesLength>,
    pub required_wins: u8,
    pub flow: Vec<FlowStep>,
    pub step: usize,
    pub maps: BTreeMap<MapKey, MapEntry>,
    pub results: Vec<MapResult>,
    pub series_finished: bool,
    pub series_winner: Option<TeamSlot>,
    /// Set once the finished series has been handed to the exporter.
    pub exported: bool,
    /// Consistency failure that froze the match.
    pub fault: Option<String>,
    /// Set by a referee ending the match. The state is already out of the
    /// registry and must not change again.
    pub ended: bool,
    /// Incremented on every committed mutation.
    pub version: u64,
    /// When the current step became actionable.
    pub turn_started_at: Option<OffsetDateTime>,
}

impl MatchState {
    pub fn new(
        match_id: MatchId,
        team_a: TeamBinding,
        team_b: TeamBinding,
    ) -> Result<Self, DomainError> {
        for team in [&team_a, &team_b] {
            if team.name.trim().is_empty() || team.role.trim().is_empty() {
                return Err(DomainError::validation(
                    ValidationKind::InvalidTeams,
                    "Team name and role must not be empty",
                ));
            }
        }
        if team_a.role == team_b.role {
            return Err(DomainError::validation(
                ValidationKind::InvalidTeams,
                "Both teams cannot share the same role",
            ));
        }

        Ok(Self {
            match_id,
            teams: [team_a, team_b],
            series: None,
            required_wins: 0,
            flow: Vec::new(),
            step: 0,
            maps: BTreeMap::new(),
            results: Vec::new(),
            series_finished: false,
            series_winner: None,
            exported: false,
            fault: None,
            ended: false,
            version: 0,
            turn_started_at: None,
        })
    }

    pub fn team(&self, slot: TeamSlot) -> &TeamBinding {
        &self.teams[slot.index()]
    }

    pub fn current_step(&self) -> Option<&FlowStep> {
        self.series.and(self.flow.get(self.step))
    }

    pub fn is_flow_complete(&self) -> bool {
        self.series.is_some() && self.step >= self.flow.len()
    }

    /// Picked map occupying `slot`, if any.
    pub fn map_in_slot(&self, slot: u8) -> Option<&MapEntry> {
        self.maps
            .values()
            .find(|entry| entry.status == MapStatus::Picked && entry.slot == Some(slot))
    }

    /// Picked maps ordered by slot.
    pub fn picked_maps(&self) -> Vec<&MapEntry> {
        let mut picked: Vec<&MapEntry> = self
            .maps
            .values()
            .filter(|entry| entry.status == MapStatus::Picked)
            .collect();
        picked.sort_by_key(|entry| entry.slot);
        picked
    }

    pub fn wins(&self, team: TeamSlot) -> u8 {
        self.results.iter().filter(|r| r.winner == team).count() as u8
    }

    pub fn status(&self) -> MatchStatus {
        if self.fault.is_some() {
            MatchStatus::Faulted
        } else if self.series_finished {
            MatchStatus::Finished
        } else if self.series.is_none() {
            MatchStatus::Waiting
        } else if self.is_flow_complete() {
            MatchStatus::Playing
        } else {
            MatchStatus::PickBan
        }
    }

    /// Replace the map table with every map of `pool`, all free.
    pub(crate) fn reset_maps(&mut self, pool: &MapPool) {
        self.maps = pool
            .modes()
            .flat_map(|(mode, names)| {
                names
                    .iter()
                    .map(move |name| (MapKey::new(mode, name.clone()), MapEntry::free(mode, name.clone())))
            })
            .collect();
    }

    /// Freeze the match after a consistency failure.
    pub fn mark_faulted(&mut self, reason: impl Into<String>) {
        self.fault = Some(reason.into());
        self.version += 1;
    }
}
