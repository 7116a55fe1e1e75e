// Unit tests for error mapping - pure domain logic without HTTP plumbing
use crate::errors::domain::{
    ConflictKind, ConsistencyKind, DomainError, ForbiddenKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_422() {
    let de = DomainError::validation(ValidationKind::MapUnavailable, "Den is already banned");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::MapUnavailable);
    assert_eq!(app.status().as_u16(), 422);
    assert_eq!(app.detail(), "Den is already banned");
}

#[test]
fn maps_invalid_match_id_to_400() {
    let de = DomainError::validation(ValidationKind::InvalidMatchId, "bad id");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidMatchId);
    assert_eq!(app.status().as_u16(), 400);
}

#[test]
fn maps_forbidden_kinds() {
    let app: AppError = DomainError::forbidden(ForbiddenKind::NotYourTurn, "not your turn").into();
    assert_eq!(app.code().as_str(), "NOT_YOUR_TURN");
    assert_eq!(app.status().as_u16(), 403);

    let app: AppError = DomainError::forbidden(ForbiddenKind::RefereeOnly, "referee only").into();
    assert_eq!(app.code().as_str(), "REFEREE_ONLY");
    assert_eq!(app.status().as_u16(), 403);
}

#[test]
fn maps_not_found_and_conflict() {
    let app: AppError = DomainError::not_found(NotFoundKind::Match, "no match").into();
    assert_eq!(app.code(), ErrorCode::MatchNotFound);
    assert_eq!(app.status().as_u16(), 404);

    let app: AppError = DomainError::conflict(ConflictKind::MatchExists, "exists").into();
    assert_eq!(app.code(), ErrorCode::MatchExists);

    let app: AppError = DomainError::conflict(ConflictKind::StaleVersion, "stale").into();
    assert_eq!(app.code(), ErrorCode::StaleVersion);
    assert_eq!(app.status().as_u16(), 409);

    let app: AppError =
        DomainError::conflict(ConflictKind::Other("x".to_string()), "generic").into();
    assert_eq!(app.code(), ErrorCode::Conflict);
}

#[test]
fn maps_consistency_to_500_with_distinct_codes() {
    let app: AppError =
        DomainError::consistency(ConsistencyKind::DeciderAmbiguous, "two maps left").into();
    assert_eq!(app.code(), ErrorCode::InternalConsistency);
    assert_eq!(app.status().as_u16(), 500);
    assert!(matches!(app, AppError::Internal { .. }));

    let app: AppError = DomainError::consistency(ConsistencyKind::MatchFaulted, "frozen").into();
    assert_eq!(app.code(), ErrorCode::MatchFaulted);
    assert_eq!(app.detail(), "frozen");
}

#[test]
fn unauthorized_details_follow_code() {
    let app = AppError::unauthorized(ErrorCode::UnauthorizedExpiredJwt);
    assert_eq!(app.status().as_u16(), 401);
    assert_eq!(app.detail(), "Token expired");
}
