//! Error codes for the pick/ban API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the pick/ban API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Authentication required
    Unauthorized,
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Invalid JWT token
    UnauthorizedInvalidJwt,
    /// JWT token has expired
    UnauthorizedExpiredJwt,
    /// Access denied
    Forbidden,
    /// The current step belongs to the other team (or to nobody)
    NotYourTurn,
    /// Only a referee may perform this operation
    RefereeOnly,

    // Request Validation
    /// Invalid match id in the path
    InvalidMatchId,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,
    /// Malformed conditional header (If-Match / If-None-Match)
    InvalidHeader,
    /// Map is already banned or picked
    MapUnavailable,
    /// Map is not part of the pool
    UnknownMap,
    /// Map belongs to a different mode than the current step
    WrongMode,
    /// Submitted action does not match the current step
    ActionMismatch,
    /// Pick & ban flow already finished
    FlowComplete,
    /// Pick & ban flow not finished yet
    FlowIncomplete,
    /// Series length not chosen yet
    SeriesNotStarted,
    /// Series already has a winner
    SeriesFinished,
    /// Result submitted for the wrong slot
    ResultOutOfOrder,
    /// Map score is a draw
    TiedScore,
    /// Declared winner disagrees with the score
    ScoreWinnerMismatch,
    /// Team bindings are invalid
    InvalidTeams,

    // Resource Not Found
    /// Match not found
    MatchNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// A match with this id is already active
    MatchExists,
    /// Action was based on an outdated match version
    StaleVersion,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // Internal consistency
    /// Match is stuck after an internal consistency failure
    MatchFaulted,
    /// Flow table or executor invariant violated
    InternalConsistency,

    /// Internal server error
    Internal,
    /// Internal server error (explicit problem code)
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Every variant, in declaration order.
    pub const ALL: &'static [ErrorCode] = &[
        Self::Unauthorized,
        Self::UnauthorizedMissingBearer,
        Self::UnauthorizedInvalidJwt,
        Self::UnauthorizedExpiredJwt,
        Self::Forbidden,
        Self::NotYourTurn,
        Self::RefereeOnly,
        Self::InvalidMatchId,
        Self::ValidationError,
        Self::BadRequest,
        Self::InvalidHeader,
        Self::MapUnavailable,
        Self::UnknownMap,
        Self::WrongMode,
        Self::ActionMismatch,
        Self::FlowComplete,
        Self::FlowIncomplete,
        Self::SeriesNotStarted,
        Self::SeriesFinished,
        Self::ResultOutOfOrder,
        Self::TiedScore,
        Self::ScoreWinnerMismatch,
        Self::InvalidTeams,
        Self::MatchNotFound,
        Self::NotFound,
        Self::MatchExists,
        Self::StaleVersion,
        Self::Conflict,
        Self::MatchFaulted,
        Self::InternalConsistency,
        Self::Internal,
        Self::InternalError,
        Self::ConfigError,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    ///
    /// This is the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Authentication & Authorization
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::Forbidden => "FORBIDDEN",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::RefereeOnly => "REFEREE_ONLY",

            // Request Validation
            Self::InvalidMatchId => "INVALID_MATCH_ID",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::MapUnavailable => "MAP_UNAVAILABLE",
            Self::UnknownMap => "UNKNOWN_MAP",
            Self::WrongMode => "WRONG_MODE",
            Self::ActionMismatch => "ACTION_MISMATCH",
            Self::FlowComplete => "FLOW_COMPLETE",
            Self::FlowIncomplete => "FLOW_INCOMPLETE",
            Self::SeriesNotStarted => "SERIES_NOT_STARTED",
            Self::SeriesFinished => "SERIES_FINISHED",
            Self::ResultOutOfOrder => "RESULT_OUT_OF_ORDER",
            Self::TiedScore => "TIED_SCORE",
            Self::ScoreWinnerMismatch => "SCORE_WINNER_MISMATCH",
            Self::InvalidTeams => "INVALID_TEAMS",

            // Resource Not Found
            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Business Logic Conflicts
            Self::MatchExists => "MATCH_EXISTS",
            Self::StaleVersion => "STALE_VERSION",
            Self::Conflict => "CONFLICT",

            // Internal consistency
            Self::MatchFaulted => "MATCH_FAULTED",
            Self::InternalConsistency => "INTERNAL_CONSISTENCY",

            Self::Internal => "INTERNAL",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
