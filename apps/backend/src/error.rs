use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, ConsistencyKind, DomainError, ForbiddenKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// RFC 7807 body returned for every error response.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation {
        code: ErrorCode,
        detail: String,
        status: StatusCode,
    },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Unauthorized")]
    Unauthorized { code: ErrorCode },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal {
        code: ErrorCode,
        detail: String,
        #[source]
        source: BoxedSource,
    },
    #[error("Configuration error: {detail}")]
    Config {
        detail: String,
        #[source]
        source: BoxedSource,
    },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Unauthorized { code }
            | AppError::Forbidden { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail, .. } => detail.clone(),
            AppError::Unauthorized { code } => match code {
                ErrorCode::UnauthorizedMissingBearer => {
                    "Missing or malformed Bearer token".to_string()
                }
                ErrorCode::UnauthorizedExpiredJwt => "Token expired".to_string(),
                ErrorCode::UnauthorizedInvalidJwt => "Invalid JWT".to_string(),
                _ => "Authentication required".to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::Unauthorized { code }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(
        code: ErrorCode,
        detail: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
            source: Box::new(source),
        }
    }

    pub fn config(
        detail: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            detail: detail.into(),
            source: Box::new(source),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn validation_code(kind: &ValidationKind) -> ErrorCode {
    match kind {
        ValidationKind::MapUnavailable => ErrorCode::MapUnavailable,
        ValidationKind::UnknownMap => ErrorCode::UnknownMap,
        ValidationKind::WrongMode => ErrorCode::WrongMode,
        ValidationKind::ActionMismatch => ErrorCode::ActionMismatch,
        ValidationKind::FlowComplete => ErrorCode::FlowComplete,
        ValidationKind::FlowIncomplete => ErrorCode::FlowIncomplete,
        ValidationKind::SeriesNotStarted => ErrorCode::SeriesNotStarted,
        ValidationKind::SeriesFinished => ErrorCode::SeriesFinished,
        ValidationKind::ResultOutOfOrder => ErrorCode::ResultOutOfOrder,
        ValidationKind::TiedScore => ErrorCode::TiedScore,
        ValidationKind::ScoreWinnerMismatch => ErrorCode::ScoreWinnerMismatch,
        ValidationKind::InvalidTeams => ErrorCode::InvalidTeams,
        ValidationKind::InvalidMatchId => ErrorCode::InvalidMatchId,
        ValidationKind::Other(_) => ErrorCode::ValidationError,
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(ValidationKind::InvalidMatchId, detail) => {
                AppError::bad_request(ErrorCode::InvalidMatchId, detail)
            }
            DomainError::Validation(kind, detail) => AppError::invalid(validation_code(&kind), detail),
            DomainError::Forbidden(kind, detail) => {
                let code = match kind {
                    ForbiddenKind::NotYourTurn => ErrorCode::NotYourTurn,
                    ForbiddenKind::RefereeOnly => ErrorCode::RefereeOnly,
                };
                AppError::forbidden(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Match => ErrorCode::MatchNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::MatchExists => ErrorCode::MatchExists,
                    ConflictKind::StaleVersion => ErrorCode::StaleVersion,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::Consistency(ref kind, ref detail) => {
                let code = match kind {
                    ConsistencyKind::MatchFaulted => ErrorCode::MatchFaulted,
                    _ => ErrorCode::InternalConsistency,
                };
                let detail = detail.clone();
                AppError::internal(code, detail, err)
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::internal(ErrorCode::InternalError, "JSON serialization failed", e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://pickban.app/errors/{}", code.as_str()),
            title: Self::humanize_code(code.as_str()),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.as_str().to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
