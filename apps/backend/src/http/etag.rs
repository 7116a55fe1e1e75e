//! ETag helpers for match snapshots.
//!
//! The match `version` doubles as the entity tag: `GET .../snapshot` returns
//! it and `POST .../actions` accepts it back in `If-Match` so a caller acting
//! on an outdated view is rejected instead of silently applied.

use actix_web::http::header::{IF_MATCH, IF_NONE_MATCH};
use actix_web::HttpRequest;

use crate::domain::match_id::MatchId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Format: `"match-{id}-v{version}"`, quoted as HTTP requires.
pub fn match_etag(match_id: &MatchId, version: u64) -> String {
    format!(r#""match-{match_id}-v{version}""#)
}

/// Version number after the last `-v` of a match ETag.
pub fn parse_match_version_from_etag(s: &str) -> Result<u64, AppError> {
    let s = s.trim().trim_start_matches("W/").trim_matches('"');

    let version_start = s
        .rfind("-v")
        .ok_or_else(|| {
            AppError::bad_request(
                ErrorCode::InvalidHeader,
                format!(
                    "Invalid ETag format: expected \"match-{{id}}-v{{version}}\", got \"{s}\""
                ),
            )
        })?
        + 2;

    let version_str = &s[version_start..];
    version_str.parse::<u64>().map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag format: version must be an integer, got \"{version_str}\""),
        )
    })
}

/// Expected version from `If-Match`, if the client sent one.
pub fn expected_version(req: &HttpRequest) -> Result<Option<u64>, AppError> {
    let Some(value) = req.headers().get(IF_MATCH) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidHeader, "If-Match must be visible ASCII")
    })?;
    if value.trim() == "*" {
        return Ok(None);
    }
    parse_match_version_from_etag(value).map(Some)
}

/// Whether `If-None-Match` already names `etag` (or is the `*` wildcard).
pub fn if_none_match_hits(req: &HttpRequest, etag: &str) -> bool {
    req.headers()
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value.trim() == "*" || value.split(',').map(str::trim).any(|tag| tag == etag)
        })
}
