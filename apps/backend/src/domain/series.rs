//! Map results and series completion.

use serde::Deserialize;

use crate::domain::executor::ensure_not_faulted;
use crate::domain::state::{MapResult, MapScore, MatchState, TeamSlot};
use crate::errors::domain::{DomainError, ValidationKind};

/// A reported map result. At least one of `winner` and `score` is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResultSubmission {
    pub slot: u8,
    #[serde(default)]
    pub winner: Option<TeamSlot>,
    #[serde(default)]
    pub score: Option<MapScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultOutcome {
    pub recorded: MapResult,
    pub wins: [u8; 2],
    /// Set when this result decided the series.
    pub series_winner: Option<TeamSlot>,
}

/// Slot the next result must be reported for.
pub fn next_result_slot(state: &MatchState) -> u8 {
    state.results.len() as u8 + 1
}

fn resolve_winner(submission: &ResultSubmission) -> Result<TeamSlot, DomainError> {
    match (submission.winner, submission.score) {
        (winner, Some(score)) => {
            let leader = score.leader().ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::TiedScore,
                    format!("A map cannot end tied ({}-{})", score.a, score.b),
                )
            })?;
            match winner {
                Some(winner) if winner != leader => Err(DomainError::validation(
                    ValidationKind::ScoreWinnerMismatch,
                    format!(
                        "Score {}-{} does not match winner {winner}",
                        score.a, score.b
                    ),
                )),
                _ => Ok(leader),
            }
        }
        (Some(winner), None) => Ok(winner),
        (None, None) => Err(DomainError::validation_other(
            "A result needs a winner or a score",
        )),
    }
}

/// Record the result of the next unplayed map.
pub fn submit_result(
    state: &mut MatchState,
    submission: &ResultSubmission,
) -> Result<ResultOutcome, DomainError> {
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
    if !state.is_flow_complete() {
        return Err(DomainError::validation(
            ValidationKind::FlowIncomplete,
            "Results can only be reported after pick & ban",
        ));
    }

    let expected = next_result_slot(state);
    if submission.slot != expected || state.map_in_slot(submission.slot).is_none() {
        return Err(DomainError::validation(
            ValidationKind::ResultOutOfOrder,
            format!(
                "Expected the result for map {expected}, got map {}",
                submission.slot
            ),
        ));
    }

    let winner = resolve_winner(submission)?;
    let recorded = MapResult {
        slot: submission.slot,
        winner,
        score: submission.score,
    };

    let mut next = state.clone();
    next.results.push(recorded);
    let wins = [next.wins(TeamSlot::A), next.wins(TeamSlot::B)];
    let series_winner = TeamSlot::BOTH
        .into_iter()
        .find(|team| wins[team.index()] >= next.required_wins);
    if series_winner.is_some() {
        next.series_finished = true;
        next.series_winner = series_winner;
    }
    next.version += 1;

    *state = next;
    Ok(ResultOutcome {
        recorded,
        wins,
        series_winner,
    })
}
