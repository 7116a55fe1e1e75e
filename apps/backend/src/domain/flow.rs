//! Series lengths and the pick/ban flow table.
//!
//! The flow is a pure function of the series length. Each game mode runs a
//! phase: two bans followed by either a team pick and an opposing side pick,
//! or an automatic decider and a side pick for the team that banned first.
//! Longer series append extra pick/side pairs for the non-decider modes,
//! alternating who picks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::map_pool::GameMode;
use crate::domain::state::TeamSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesLength {
    #[serde(alias = "BO3", alias = "Bo3")]
    Bo3,
    #[serde(alias = "BO5", alias = "Bo5")]
    Bo5,
    #[serde(alias = "BO7", alias = "Bo7")]
    Bo7,
}

impl SeriesLength {
    pub const ALL: [SeriesLength; 3] = [SeriesLength::Bo3, SeriesLength::Bo5, SeriesLength::Bo7];

    /// Number of maps the series plays at most.
    pub const fn map_count(self) -> u8 {
        match self {
            SeriesLength::Bo3 => 3,
            SeriesLength::Bo5 => 5,
            SeriesLength::Bo7 => 7,
        }
    }

    /// Strict majority of `map_count`.
    pub const fn default_required_wins(self) -> u8 {
        self.map_count() / 2 + 1
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SeriesLength::Bo3 => "bo3",
            SeriesLength::Bo5 => "bo5",
            SeriesLength::Bo7 => "bo7",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        SeriesLength::ALL
            .into_iter()
            .find(|series| series.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for SeriesLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a flow step asks for, independent of mode and team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Ban,
    PickMap,
    PickSide,
    AutoDecider,
}

impl StepAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            StepAction::Ban => "ban",
            StepAction::PickMap => "pick_map",
            StepAction::PickSide => "pick_side",
            StepAction::AutoDecider => "auto_decider",
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the flow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowStep {
    Ban { mode: GameMode, team: TeamSlot },
    PickMap { mode: GameMode, team: TeamSlot, slot: u8 },
    PickSide { mode: GameMode, team: TeamSlot, slot: u8 },
    AutoDecider { mode: GameMode, slot: u8 },
}

impl FlowStep {
    pub fn action(&self) -> StepAction {
        match self {
            FlowStep::Ban { .. } => StepAction::Ban,
            FlowStep::PickMap { .. } => StepAction::PickMap,
            FlowStep::PickSide { .. } => StepAction::PickSide,
            FlowStep::AutoDecider { .. } => StepAction::AutoDecider,
        }
    }

    pub fn mode(&self) -> GameMode {
        match *self {
            FlowStep::Ban { mode, .. }
            | FlowStep::PickMap { mode, .. }
            | FlowStep::PickSide { mode, .. }
            | FlowStep::AutoDecider { mode, .. } => mode,
        }
    }

    /// Acting team; `None` for system-resolved steps.
    pub fn team(&self) -> Option<TeamSlot> {
        match *self {
            FlowStep::Ban { team, .. }
            | FlowStep::PickMap { team, .. }
            | FlowStep::PickSide { team, .. } => Some(team),
            FlowStep::AutoDecider { .. } => None,
        }
    }

    /// Series slot this step fills or refers to. Bans have none.
    pub fn slot(&self) -> Option<u8> {
        match *self {
            FlowStep::Ban { .. } => None,
            FlowStep::PickMap { slot, .. }
            | FlowStep::PickSide { slot, .. }
            | FlowStep::AutoDecider { slot, .. } => Some(slot),
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.team() {
            Some(team) => write!(f, "{} {} ({team})", self.action(), self.mode()),
            None => write!(f, "{} {}", self.action(), self.mode()),
        }
    }
}

struct Phase {
    mode: GameMode,
    first: TeamSlot,
    decider: bool,
}

const PHASES: [Phase; 3] = [
    Phase {
        mode: GameMode::Hardpoint,
        first: TeamSlot::A,
        decider: false,
    },
    Phase {
        mode: GameMode::SearchAndDestroy,
        first: TeamSlot::B,
        decider: false,
    },
    Phase {
        mode: GameMode::Overload,
        first: TeamSlot::A,
        decider: true,
    },
];

/// Ordered flow for a series length.
pub fn build_flow(series: SeriesLength) -> Vec<FlowStep> {
    let mut flow = Vec::new();

    for (idx, phase) in PHASES.iter().enumerate() {
        let slot = idx as u8 + 1;
        let (mode, first) = (phase.mode, phase.first);
        flow.push(FlowStep::Ban { mode, team: first });
        flow.push(FlowStep::Ban {
            mode,
            team: first.other(),
        });
        if phase.decider {
            flow.push(FlowStep::AutoDecider { mode, slot });
            flow.push(FlowStep::PickSide {
                mode,
                team: first,
                slot,
            });
        } else {
            flow.push(FlowStep::PickMap {
                mode,
                team: first,
                slot,
            });
            flow.push(FlowStep::PickSide {
                mode,
                team: first.other(),
                slot,
            });
        }
    }

    let total = series.map_count();
    let mut slot = PHASES.len() as u8 + 1;
    let mut round = 0usize;
    while slot <= total {
        for phase in PHASES.iter().filter(|p| !p.decider) {
            if slot > total {
                break;
            }
            let picker = if round % 2 == 0 {
                phase.first.other()
            } else {
                phase.first
            };
            flow.push(FlowStep::PickMap {
                mode: phase.mode,
                team: picker,
                slot,
            });
            flow.push(FlowStep::PickSide {
                mode: phase.mode,
                team: picker.other(),
                slot,
            });
            slot += 1;
        }
        round += 1;
    }

    flow
}

/// How many maps of each mode a flow consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeDemand {
    pub bans: usize,
    pub picks: usize,
    pub deciders: usize,
}

impl ModeDemand {
    pub fn total(&self) -> usize {
        self.bans + self.picks + self.deciders
    }
}

pub fn mode_demand(flow: &[FlowStep]) -> BTreeMap<GameMode, ModeDemand> {
    let mut demand: BTreeMap<GameMode, ModeDemand> = BTreeMap::new();
    for step in flow {
        let entry = demand.entry(step.mode()).or_default();
        match step.action() {
            StepAction::Ban => entry.bans += 1,
            StepAction::PickMap => entry.picks += 1,
            StepAction::AutoDecider => entry.deciders += 1,
            StepAction::PickSide => {}
        }
    }
    demand
}
