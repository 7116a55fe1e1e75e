//! Applies pick/ban actions to a match.
//!
//! Every entry point validates and mutates a working copy, then commits it
//! in one assignment. A rejected action leaves the caller's state untouched.

use serde::Deserialize;

use crate::domain::flow::{build_flow, FlowStep, SeriesLength, StepAction};
use crate::domain::map_pool::{GameMode, MapPool};
use crate::domain::state::{MapKey, MapStatus, MatchState, Owner, Side, SidePick};
use crate::errors::domain::{ConsistencyKind, DomainError, ValidationKind};

/// An action submitted for the current step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Ban {
        map: String,
        #[serde(default)]
        mode: Option<GameMode>,
    },
    PickMap {
        map: String,
        #[serde(default)]
        mode: Option<GameMode>,
    },
    PickSide {
        side: Side,
    },
}

impl ActionRequest {
    pub fn action(&self) -> StepAction {
        match self {
            ActionRequest::Ban { .. } => StepAction::Ban,
            ActionRequest::PickMap { .. } => StepAction::PickMap,
            ActionRequest::PickSide { .. } => StepAction::PickSide,
        }
    }
}

/// What a committed action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub applied: FlowStep,
    /// Maps assigned automatically after the action, in flow order.
    pub auto_deciders: Vec<MapKey>,
    pub flow_complete: bool,
}

/// Reset `state` to the start of a new series. Also clears a fault.
pub fn start_series(
    state: &mut MatchState,
    series: SeriesLength,
    pool: &MapPool,
    required_wins: u8,
) -> Result<Vec<MapKey>, DomainError> {
    if state.series_finished {
        return Err(DomainError::validation(
            ValidationKind::SeriesFinished,
            "The series is already finished",
        ));
    }

    let mut next = state.clone();
    next.series = Some(series);
    next.required_wins = required_wins;
    next.flow = build_flow(series);
    next.step = 0;
    next.results.clear();
    next.fault = None;
    next.reset_maps(pool);
    let auto = drain_deciders(&mut next)?;
    next.version += 1;

    *state = next;
    Ok(auto)
}

/// Reject the request unless the match can accept a pick/ban action.
pub fn ensure_accepting_actions(state: &MatchState) -> Result<&FlowStep, DomainError> {
    ensure_not_faulted(state)?;
    if state.series.is_none() {
        return Err(DomainError::validation(
            ValidationKind::SeriesNotStarted,
            "No series has been started for this match",
        ));
    }
    if state.series_finished {
        return Err(DomainError::validation(
            ValidationKind::SeriesFinished,
            "The series is already finished",
        ));
    }
    state.current_step().ok_or_else(|| {
        DomainError::validation(
            ValidationKind::FlowComplete,
            "Pick & ban is already complete",
        )
    })
}

pub(crate) fn ensure_not_faulted(state: &MatchState) -> Result<(), DomainError> {
    match &state.fault {
        Some(reason) => Err(DomainError::consistency(
            ConsistencyKind::MatchFaulted,
            format!("Match is frozen after an internal error: {reason}"),
        )),
        None => Ok(()),
    }
}

/// Apply `request` to the current step. Authorization is the caller's job.
pub fn apply_action(
    state: &mut MatchState,
    request: &ActionRequest,
) -> Result<ActionOutcome, DomainError> {
    let step = *ensure_accepting_actions(state)?;

    if step.action() != request.action() {
        return Err(DomainError::validation(
            ValidationKind::ActionMismatch,
            format!(
                "Current step is {}, not {}",
                step.action(),
                request.action()
            ),
        ));
    }

    let mut next = state.clone();
    match (step, request) {
        (FlowStep::Ban { mode, team }, ActionRequest::Ban { map, mode: requested }) => {
            let key = resolve_free_map(&next, mode, map, *requested)?;
            claim(&mut next, &key, MapStatus::Banned, Owner::Team(team), None);
        }
        (
            FlowStep::PickMap { mode, team, slot },
            ActionRequest::PickMap { map, mode: requested },
        ) => {
            let key = resolve_free_map(&next, mode, map, *requested)?;
            claim(&mut next, &key, MapStatus::Picked, Owner::Team(team), Some(slot));
        }
        (FlowStep::PickSide { team, slot, .. }, ActionRequest::PickSide { side }) => {
            let entry = next
                .maps
                .values_mut()
                .find(|entry| entry.status == MapStatus::Picked && entry.slot == Some(slot))
                .ok_or_else(|| {
                    DomainError::consistency(
                        ConsistencyKind::SideWithoutMap,
                        format!("No picked map in slot {slot} to choose a side for"),
                    )
                })?;
            entry.side = Some(SidePick { team, side: *side });
        }
        _ => {
            return Err(DomainError::validation(
                ValidationKind::ActionMismatch,
                format!("Current step is {}", step.action()),
            ));
        }
    }

    next.step += 1;
    let auto_deciders = drain_deciders(&mut next)?;
    next.version += 1;
    let flow_complete = next.is_flow_complete();

    *state = next;
    Ok(ActionOutcome {
        applied: step,
        auto_deciders,
        flow_complete,
    })
}

/// Resolve every `AutoDecider` step at the cursor, in order.
fn drain_deciders(state: &mut MatchState) -> Result<Vec<MapKey>, DomainError> {
    let mut assigned = Vec::new();
    while let Some(FlowStep::AutoDecider { mode, slot }) = state.current_step().copied() {
        let free: Vec<MapKey> = state
            .maps
            .values()
            .filter(|entry| entry.mode == mode && entry.is_free())
            .map(|entry| entry.key())
            .collect();

        let key = match free.as_slice() {
            [only] => only.clone(),
            [] => {
                return Err(DomainError::consistency(
                    ConsistencyKind::DeciderMissing,
                    format!("No free {mode} map left for the decider"),
                ));
            }
            many => {
                return Err(DomainError::consistency(
                    ConsistencyKind::DeciderAmbiguous,
                    format!("{} free {mode} maps left for the decider", many.len()),
                ));
            }
        };

        claim(state, &key, MapStatus::Picked, Owner::Decider, Some(slot));
        state.step += 1;
        assigned.push(key);
    }
    Ok(assigned)
}

fn resolve_free_map(
    state: &MatchState,
    mode: GameMode,
    name: &str,
    requested_mode: Option<GameMode>,
) -> Result<MapKey, DomainError> {
    if let Some(requested) = requested_mode {
        if requested != mode {
            return Err(DomainError::validation(
                ValidationKind::WrongMode,
                format!("This step is for {mode}, not {requested}"),
            ));
        }
    }

    let name = name.trim();
    let found = state
        .maps
        .values()
        .find(|entry| entry.mode == mode && entry.name.eq_ignore_ascii_case(name));

    match found {
        Some(entry) if entry.is_free() => Ok(entry.key()),
        Some(entry) => Err(DomainError::validation(
            ValidationKind::MapUnavailable,
            format!("{} {} is no longer available", mode, entry.name),
        )),
        None if state
            .maps
            .values()
            .any(|entry| entry.name.eq_ignore_ascii_case(name)) =>
        {
            Err(DomainError::validation(
                ValidationKind::WrongMode,
                format!("{name} is not a {mode} map"),
            ))
        }
        None => Err(DomainError::validation(
            ValidationKind::UnknownMap,
            format!("Unknown map: {name}"),
        )),
    }
}

fn claim(state: &mut MatchState, key: &MapKey, status: MapStatus, owner: Owner, slot: Option<u8>) {
    if let Some(entry) = state.maps.get_mut(key) {
        entry.status = status;
        entry.owner = Some(owner);
        entry.slot = slot;
    }
}

