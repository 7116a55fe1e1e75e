//! Match flow service: serializes every mutation of a match behind its lock,
//! publishes the resulting snapshot to spectators and hands finished series
//! to the exporter.
//!
//! Snapshots are published while the match lock is held so spectators see
//! mutations in commit order.

use std::collections::BTreeMap;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::domain::authorization::{can_act, require_participant, require_referee, ActorCapabilities};
use crate::domain::executor::{self, ActionRequest};
use crate::domain::flow::SeriesLength;
use crate::domain::match_id::MatchId;
use crate::domain::series::{self, ResultSubmission};
use crate::domain::snapshot::{snapshot, MatchSnapshot, ResultPublic};
use crate::domain::state::{MapKey, MatchState, MatchStatus, TeamBinding, TeamSlot};
use crate::domain::summary::summarize;
use crate::services::registry;
use crate::errors::domain::{ConflictKind, ConsistencyKind, DomainError, ForbiddenKind};
use crate::state::app_state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub flow_complete: bool,
    /// `"Overload Scar"` style labels of maps assigned automatically.
    pub deciders: Vec<String>,
    pub snapshot: MatchSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub series_finished: bool,
    pub series_winner: Option<TeamSlot>,
    pub snapshot: MatchSnapshot,
}

/// One row of the referee dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct MatchListing {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub version: u64,
    pub series: Option<SeriesLength>,
    pub teams: BTreeMap<TeamSlot, String>,
    pub wins: BTreeMap<TeamSlot, u8>,
    pub results: Vec<ResultPublic>,
}

pub struct MatchFlowService<'a> {
    app: &'a AppState,
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

fn labels(keys: &[MapKey]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

impl<'a> MatchFlowService<'a> {
    pub fn new(app: &'a AppState) -> Self {
        Self { app }
    }

    fn render(&self, state: &MatchState) -> MatchSnapshot {
        snapshot(state, self.app.rules.turn_timer_secs)
    }

    /// Render and fan out. Call with the match lock held.
    fn publish(&self, state: &MatchState) -> MatchSnapshot {
        let snap = self.render(state);
        self.app.sessions.publish(&state.match_id, snap.clone());
        snap
    }

    /// Freeze the match on a fresh consistency failure, then hand the error back.
    fn on_failure(&self, state: &mut MatchState, err: DomainError) -> DomainError {
        if let DomainError::Consistency(kind, detail) = &err {
            if *kind != ConsistencyKind::MatchFaulted {
                error!(
                    match_id = %state.match_id,
                    step = state.step,
                    version = state.version,
                    kind = ?kind,
                    detail = %detail,
                    "Internal consistency failure, match frozen"
                );
                state.mark_faulted(detail.clone());
                state.turn_started_at = None;
                self.publish(state);
            }
        }
        err
    }

    /// A handle fetched before `end_match` won the lock points at a dead match.
    fn ensure_live(state: &MatchState) -> Result<(), DomainError> {
        if state.ended {
            Err(registry::not_found(&state.match_id))
        } else {
            Ok(())
        }
    }

    fn reset_turn_clock(state: &mut MatchState) {
        state.turn_started_at = if state.current_step().is_some() {
            Some(OffsetDateTime::now_utc())
        } else {
            None
        };
    }

    pub fn create_match<A: ActorCapabilities + ?Sized>(
        &self,
        actor: &A,
        match_id: MatchId,
        team_a: TeamBinding,
        team_b: TeamBinding,
    ) -> Result<MatchSnapshot, DomainError> {
        require_referee(actor)?;
        let state = MatchState::new(match_id, team_a, team_b)?;
        let handle = self.app.matches.insert(state)?;

        let state = handle.lock();
        info!(
            match_id = %state.match_id,
            team_a = %state.team(TeamSlot::A).name,
            team_b = %state.team(TeamSlot::B).name,
            "Match created"
        );
        Ok(self.publish(&state))
    }

    pub fn start_series<A: ActorCapabilities + ?Sized>(
        &self,
        actor: &A,
        match_id: &MatchId,
        series: SeriesLength,
    ) -> Result<MatchSnapshot, DomainError> {
        require_referee(actor)?;
        let handle = self.app.matches.get(match_id)?;
        let mut state = handle.lock();
        Self::ensure_live(&state)?;

        let rules = &self.app.rules;
        let deciders = match executor::start_series(
            &mut state,
            series,
            &rules.map_pool,
            rules.required_wins(series),
        ) {
            Ok(deciders) => deciders,
            Err(err) => return Err(self.on_failure(&mut state, err)),
        };
        Self::reset_turn_clock(&mut state);

        info!(
            match_id = %match_id,
            series = %series,
            required_wins = state.required_wins,
            steps = state.flow.len(),
            deciders = ?labels(&deciders),
            version = state.version,
            "Series started"
        );
        Ok(self.publish(&state))
    }

    pub fn submit_action<A: ActorCapabilities + ?Sized>(
        &self,
        actor: &A,
        match_id: &MatchId,
        request: &ActionRequest,
        expected_version: Option<u64>,
    ) -> Result<ActionReport, DomainError> {
        let handle = self.app.matches.get(match_id)?;
        let mut state = handle.lock();
        Self::ensure_live(&state)?;

        if let Some(expected) = expected_version {
            if expected != state.version {
                return Err(DomainError::conflict(
                    ConflictKind::StaleVersion,
                    format!(
                        "Match changed since version {expected} (now {}). Refresh and retry.",
                        state.version
                    ),
                ));
            }
        }

        let step = match executor::ensure_accepting_actions(&state) {
            Ok(step) => *step,
            Err(err) => return Err(self.on_failure(&mut state, err)),
        };

        if !can_act(actor, &state) {
            let owner = step
                .team()
                .map(|team| state.team(team).name.clone())
                .unwrap_or_else(|| "the system".to_string());
            debug!(match_id = %match_id, step = state.step, "Actor does not own the current step");
            return Err(DomainError::forbidden(
                ForbiddenKind::NotYourTurn,
                format!("It is {owner}'s turn to {}", step.action()),
            ));
        }

        let outcome = match executor::apply_action(&mut state, request) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.on_failure(&mut state, err)),
        };
        Self::reset_turn_clock(&mut state);

        info!(
            match_id = %match_id,
            step = %outcome.applied,
            version = state.version,
            "Action applied"
        );
        for key in &outcome.auto_deciders {
            info!(match_id = %match_id, map = %key, "Decider assigned");
        }
        if outcome.flow_complete {
            info!(match_id = %match_id, "Pick & ban complete");
        }

        let snapshot = self.publish(&state);
        Ok(ActionReport {
            flow_complete: outcome.flow_complete,
            deciders: labels(&outcome.auto_deciders),
            snapshot,
        })
    }

    pub fn submit_result<A: ActorCapabilities + ?Sized>(
        &self,
        actor: &A,
        match_id: &MatchId,
        submission: &ResultSubmission,
    ) -> Result<ResultReport, DomainError> {
        let handle = self.app.matches.get(match_id)?;
        let mut state = handle.lock();
        Self::ensure_live(&state)?;
        require_participant(actor, &state)?;

        let outcome = match series::submit_result(&mut state, submission) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.on_failure(&mut state, err)),
        };

        info!(
            match_id = %match_id,
            slot = outcome.recorded.slot,
            winner = %outcome.recorded.winner,
            wins_a = outcome.wins[0],
            wins_b = outcome.wins[1],
            version = state.version,
            "Map result recorded"
        );

        if let Some(winner) = outcome.series_winner {
            info!(
                match_id = %match_id,
                winner = %state.team(winner).name,
                "Series finished"
            );
            self.export_once(&mut state);
        }

        let snapshot = self.publish(&state);
        Ok(ResultReport {
            series_finished: state.series_finished,
            series_winner: state.series_winner,
            snapshot,
        })
    }

    fn export_once(&self, state: &mut MatchState) {
        if state.exported {
            warn!(match_id = %state.match_id, "Series already exported, skipping");
            return;
        }
        state.exported = true;
        self.app.exports.enqueue(summarize(state, now_rfc3339()));
    }

    pub fn snapshot(&self, match_id: &MatchId) -> Result<MatchSnapshot, DomainError> {
        let handle = self.app.matches.get(match_id)?;
        let state = handle.lock();
        Self::ensure_live(&state)?;
        Ok(self.render(&state))
    }

    pub fn list_matches(&self) -> Vec<MatchListing> {
        self.app
            .matches
            .all()
            .into_iter()
            .filter_map(|(_, handle)| {
                let state = handle.lock();
                if state.ended {
                    return None;
                }
                let snap = self.render(&state);
                Some(MatchListing {
                    match_id: snap.match_id,
                    status: snap.status,
                    version: snap.version,
                    series: snap.series,
                    teams: snap
                        .teams
                        .iter()
                        .map(|(slot, team)| (*slot, team.name.clone()))
                        .collect(),
                    wins: snap
                        .teams
                        .iter()
                        .map(|(slot, team)| (*slot, team.wins))
                        .collect(),
                    results: snap.results,
                })
            })
            .collect()
    }

    /// Drop the match and disconnect its spectators. Callers already waiting
    /// on the lock see the match as gone.
    pub fn end_match<A: ActorCapabilities + ?Sized>(
        &self,
        actor: &A,
        match_id: &MatchId,
    ) -> Result<(), DomainError> {
        require_referee(actor)?;
        let handle = self.app.matches.get(match_id)?;
        let mut state = handle.lock();
        Self::ensure_live(&state)?;
        state.ended = true;
        state.turn_started_at = None;
        self.app.matches.remove(match_id)?;
        self.app.sessions.close_match(match_id);
        info!(
            match_id = %match_id,
            status = ?state.status(),
            version = state.version,
            "Match ended"
        );
        Ok(())
    }
}
