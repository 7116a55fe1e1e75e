//! Match HTTP routes: the action source for referees and team captains.

use actix_web::http::header::ETAG;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::domain::authorization::require_referee;
use crate::domain::executor::ActionRequest;
use crate::domain::flow::SeriesLength;
use crate::domain::match_id::MatchId;
use crate::domain::series::ResultSubmission;
use crate::domain::state::TeamBinding;
use crate::error::AppError;
use crate::extractors::current_actor::CurrentActor;
use crate::extractors::validated_json::ValidatedJson;
use crate::http::etag::{expected_version, if_none_match_hits, match_etag};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub match_id: String,
    pub team_a: TeamBinding,
    pub team_b: TeamBinding,
}

#[derive(Debug, Deserialize)]
pub struct StartSeriesRequest {
    pub series: SeriesLength,
}

/// POST /api/matches
async fn create_match(
    actor: CurrentActor,
    body: ValidatedJson<CreateMatchRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let CreateMatchRequest {
        match_id,
        team_a,
        team_b,
    } = body.into_inner();
    let match_id = MatchId::parse(&match_id)?;

    let snapshot = app_state
        .flow()
        .create_match(&actor, match_id, team_a, team_b)?;

    Ok(HttpResponse::Created()
        .insert_header((ETAG, match_etag(&snapshot.match_id, snapshot.version)))
        .json(snapshot))
}

/// GET /api/matches
///
/// Referee dashboard listing.
async fn list_matches(
    actor: CurrentActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_referee(&actor)?;
    Ok(HttpResponse::Ok().json(app_state.flow().list_matches()))
}

/// POST /api/matches/{match_id}/series
async fn start_series(
    actor: CurrentActor,
    match_id: MatchId,
    body: ValidatedJson<StartSeriesRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state
        .flow()
        .start_series(&actor, &match_id, body.series)?;

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, match_etag(&match_id, snapshot.version)))
        .json(snapshot))
}

/// POST /api/matches/{match_id}/actions
///
/// Honours `If-Match` with the ETag of a previously read snapshot.
async fn submit_action(
    http_req: HttpRequest,
    actor: CurrentActor,
    match_id: MatchId,
    body: ValidatedJson<ActionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let expected = expected_version(&http_req)?;
    let report = app_state
        .flow()
        .submit_action(&actor, &match_id, &body, expected)?;

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, match_etag(&match_id, report.snapshot.version)))
        .json(report))
}

/// POST /api/matches/{match_id}/results
async fn submit_result(
    actor: CurrentActor,
    match_id: MatchId,
    body: ValidatedJson<ResultSubmission>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let report = app_state
        .flow()
        .submit_result(&actor, &match_id, &body)?;

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, match_etag(&match_id, report.snapshot.version)))
        .json(report))
}

/// GET /api/matches/{match_id}/snapshot
///
/// Public, like the spectator feed. Supports `If-None-Match`.
async fn get_snapshot(
    http_req: HttpRequest,
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.flow().snapshot(&match_id)?;
    let etag_value = match_etag(&match_id, snapshot.version);

    if if_none_match_hits(&http_req, &etag_value) {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag_value))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(snapshot))
}

/// DELETE /api/matches/{match_id}
async fn end_match(
    actor: CurrentActor,
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.flow().end_match(&actor, &match_id)?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_matches))
            .route(web::post().to(create_match)),
    );
    cfg.service(web::resource("/{match_id}").route(web::delete().to(end_match)));
    cfg.service(web::resource("/{match_id}/series").route(web::post().to(start_series)));
    cfg.service(web::resource("/{match_id}/actions").route(web::post().to(submit_action)));
    cfg.service(web::resource("/{match_id}/results").route(web::post().to(submit_result)));
    cfg.service(web::resource("/{match_id}/snapshot").route(web::get().to(get_snapshot)));
}
