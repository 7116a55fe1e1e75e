use actix_web::dev::Payload;
use actix_web::{http::header, web, FromRequest, HttpRequest};
use serde::Serialize;

use crate::auth::jwt::verify_access_token;
use crate::domain::authorization::ActorCapabilities;
use crate::domain::state::TeamBinding;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;

/// Authenticated actor, decoded from the `Authorization: Bearer` token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentActor {
    pub sub: String,
    pub name: String,
    pub roles: Vec<String>,
    pub referee: bool,
}

impl ActorCapabilities for CurrentActor {
    fn is_referee(&self) -> bool {
        self.referee
    }

    fn is_member_of(&self, team: &TeamBinding) -> bool {
        self.roles.iter().any(|role| *role == team.role)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let missing = || AppError::unauthorized(ErrorCode::UnauthorizedMissingBearer);

    let auth_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(missing)?
        .to_str()
        .map_err(|_| missing())?;

    // Parse "Bearer <token>" format
    let mut parts = auth_value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(missing()),
    }
}

impl FromRequest for CurrentActor {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token = bearer_token(&req)?;

            let app_state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                AppError::internal(
                    ErrorCode::InternalError,
                    "AppState not available",
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "AppState missing from request",
                    ),
                )
            })?;

            let claims = verify_access_token(&token, &app_state.security)?;
            let referee = claims
                .roles
                .iter()
                .any(|role| *role == app_state.security.referee_role);

            Ok(CurrentActor {
                sub: claims.sub,
                name: claims.name,
                roles: claims.roles,
                referee,
            })
        })
    }
}
