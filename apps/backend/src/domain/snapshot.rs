//! Read-only projection of a match for overlays, dashboards and API clients.
//!
//! Snapshots are plain data: they never borrow from the live state, so they
//! can be handed to any number of observers after the lock is released.

use std::collections::BTreeMap;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::domain::flow::{FlowStep, SeriesLength, StepAction};
use crate::domain::map_pool::GameMode;
use crate::domain::match_id::MatchId;
use crate::domain::state::{
    MapScore, MapStatus, MatchState, MatchStatus, Owner, Side, SidePick, TeamSlot,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub version: u64,
    pub status: MatchStatus,
    pub teams: BTreeMap<TeamSlot, TeamPublic>,
    pub series: Option<SeriesLength>,
    pub required_wins: u8,
    pub step: usize,
    pub total_steps: usize,
    pub current_step: Option<StepPublic>,
    pub flow: Vec<FlowStep>,
    pub maps: Vec<MapPublic>,
    pub results: Vec<ResultPublic>,
    pub series_finished: bool,
    pub series_winner: Option<TeamSlot>,
    pub fault: Option<String>,
    pub turn: Option<TurnTimer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPublic {
    pub name: String,
    pub wins: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPublic {
    pub index: usize,
    pub action: StepAction,
    pub mode: GameMode,
    pub team: Option<TeamSlot>,
    pub team_name: Option<String>,
    pub slot: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPublic {
    pub mode: GameMode,
    pub name: String,
    pub status: MapStatus,
    pub owner: Option<Owner>,
    pub slot: Option<u8>,
    pub side: Option<SidePick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPublic {
    pub slot: u8,
    pub mode: Option<GameMode>,
    pub map: Option<String>,
    pub winner: TeamSlot,
    pub score: Option<MapScore>,
}

/// Advisory countdown for the current step. Nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnTimer {
    pub started_at: String,
    pub deadline: String,
    pub duration_secs: u64,
}

/// Team-facing view of a picked map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub slot: u8,
    pub mode: GameMode,
    pub map: String,
    pub picked_by: Owner,
    pub side_a: Option<Side>,
    pub side_b: Option<Side>,
}

fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

pub fn snapshot(state: &MatchState, turn_timer_secs: u64) -> MatchSnapshot {
    let teams = TeamSlot::BOTH
        .into_iter()
        .map(|slot| {
            (
                slot,
                TeamPublic {
                    name: state.team(slot).name.clone(),
                    wins: state.wins(slot),
                },
            )
        })
        .collect();

    let current_step = state.current_step().map(|step| StepPublic {
        index: state.step,
        action: step.action(),
        mode: step.mode(),
        team: step.team(),
        team_name: step.team().map(|team| state.team(team).name.clone()),
        slot: step.slot(),
    });

    let maps = state
        .maps
        .values()
        .map(|entry| MapPublic {
            mode: entry.mode,
            name: entry.name.clone(),
            status: entry.status,
            owner: entry.owner,
            slot: entry.slot,
            side: entry.side,
        })
        .collect();

    let results = state
        .results
        .iter()
        .map(|result| {
            let map = state.map_in_slot(result.slot);
            ResultPublic {
                slot: result.slot,
                mode: map.map(|m| m.mode),
                map: map.map(|m| m.name.clone()),
                winner: result.winner,
                score: result.score,
            }
        })
        .collect();

    let turn = match (state.turn_started_at, current_step.is_some()) {
        // A deadline past the representable range is left off.
        (Some(started), true) if state.fault.is_none() => i64::try_from(turn_timer_secs)
            .ok()
            .and_then(|secs| started.checked_add(Duration::seconds(secs)))
            .map(|deadline| TurnTimer {
                started_at: rfc3339(started),
                deadline: rfc3339(deadline),
                duration_secs: turn_timer_secs,
            }),
        _ => None,
    };

    MatchSnapshot {
        match_id: state.match_id.clone(),
        version: state.version,
        status: state.status(),
        teams,
        series: state.series,
        required_wins: state.required_wins,
        step: state.step,
        total_steps: state.flow.len(),
        current_step,
        flow: state.flow.clone(),
        maps,
        results,
        series_finished: state.series_finished,
        series_winner: state.series_winner,
        fault: state.fault.clone(),
        turn,
    }
}

/// Picked maps in slot order, with each team's side.
pub fn slot_views(state: &MatchState) -> Vec<SlotView> {
    state
        .picked_maps()
        .into_iter()
        .filter_map(|entry| {
            Some(SlotView {
                slot: entry.slot?,
                mode: entry.mode,
                map: entry.name.clone(),
                picked_by: entry.owner?,
                side_a: entry.side.map(|pick| pick.side_for(TeamSlot::A)),
                side_b: entry.side.map(|pick| pick.side_for(TeamSlot::B)),
            })
        })
        .collect()
}
