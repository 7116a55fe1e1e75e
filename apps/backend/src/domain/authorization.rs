//! Who may act on the current flow step.

use crate::domain::state::{MatchState, TeamBinding};
use crate::errors::domain::{DomainError, ForbiddenKind};

/// Capabilities of an authenticated actor as seen by the domain.
pub trait ActorCapabilities {
    /// Holds the match-referee role.
    fn is_referee(&self) -> bool;

    /// Holds the role bound to `team`.
    fn is_member_of(&self, team: &TeamBinding) -> bool;
}

/// Whether `actor` may submit the action for the current step.
///
/// System-resolved steps accept nobody, referees included. Otherwise referees
/// may act on any step and team members only on their own team's steps.
pub fn can_act<A: ActorCapabilities + ?Sized>(actor: &A, state: &MatchState) -> bool {
    let Some(step) = state.current_step() else {
        return false;
    };
    let Some(team) = step.team() else {
        return false;
    };
    actor.is_referee() || actor.is_member_of(state.team(team))
}

pub fn require_referee<A: ActorCapabilities + ?Sized>(actor: &A) -> Result<(), DomainError> {
    if actor.is_referee() {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            ForbiddenKind::RefereeOnly,
            "Only a referee can do that",
        ))
    }
}

/// Referees and members of either team.
pub fn require_participant<A: ActorCapabilities + ?Sized>(
    actor: &A,
    state: &MatchState,
) -> Result<(), DomainError> {
    if actor.is_referee() || state.teams.iter().any(|team| actor.is_member_of(team)) {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            ForbiddenKind::RefereeOnly,
            "Only a referee or a team member can do that",
        ))
    }
}
