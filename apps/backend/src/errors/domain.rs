//! Domain-level error type used across the pick/ban core and services.
//!
//! This error type is HTTP-agnostic. Handlers should return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Actor-visible rule violations. Never mutate state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    MapUnavailable,
    UnknownMap,
    WrongMode,
    ActionMismatch,
    FlowComplete,
    FlowIncomplete,
    SeriesNotStarted,
    SeriesFinished,
    ResultOutOfOrder,
    TiedScore,
    ScoreWinnerMismatch,
    InvalidTeams,
    InvalidMatchId,
    Other(String),
}

/// Authorization failures surfaced to the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ForbiddenKind {
    NotYourTurn,
    RefereeOnly,
}

/// Flow-table or executor bugs. The core refuses to guess.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConsistencyKind {
    /// More than one free map remains for an auto-assigned decider.
    DeciderAmbiguous,
    /// No free map remains for an auto-assigned decider.
    DeciderMissing,
    /// A side pick targets a slot that has no picked map.
    SideWithoutMap,
    /// The match already hit one of the above and is frozen.
    MatchFaulted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Match,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    MatchExists,
    StaleVersion,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Actor is not allowed to perform the operation right now
    Forbidden(ForbiddenKind, String),
    /// Internal invariant violated (flow table or executor bug)
    Consistency(ConsistencyKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Forbidden(kind, d) => write!(f, "forbidden {kind:?}: {d}"),
            DomainError::Consistency(kind, d) => {
                write!(f, "internal consistency error {kind:?}: {d}")
            }
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn forbidden(kind: ForbiddenKind, detail: impl Into<String>) -> Self {
        Self::Forbidden(kind, detail.into())
    }
    pub fn consistency(kind: ConsistencyKind, detail: impl Into<String>) -> Self {
        Self::Consistency(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, DomainError::Consistency(..))
    }

    /// Human-readable reason suitable for the acting user.
    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Forbidden(_, d)
            | DomainError::Consistency(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Conflict(_, d) => d,
        }
    }
}
