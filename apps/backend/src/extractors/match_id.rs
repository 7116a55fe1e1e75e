use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::match_id::MatchId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Match id taken from the `{match_id}` path segment.
///
/// Only the format is checked here; unknown ids surface as 404 from the service.
impl FromRequest for MatchId {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("match_id").map(str::to_string);

        Box::pin(async move {
            let raw = raw.ok_or_else(|| {
                AppError::bad_request(ErrorCode::InvalidMatchId, "Missing match_id parameter")
            })?;
            Ok(MatchId::parse(&raw)?)
        })
    }
}
