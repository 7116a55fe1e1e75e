use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use pickban::domain::SeriesLength;

use crate::support::auth::Actors;
use crate::support::draft::{ban, MatchSetup};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn errors_are_problem_json_with_matching_trace_id() {
    let ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    let actors = Actors::new(&ts.state.security, &setup.role_a, &setup.role_b);
    let app = create_test_app(ts.state.clone()).await;

    let req = test::TestRequest::post()
        .uri(&setup.path("/actions"))
        .insert_header(actors.team_b.clone())
        .set_json(ban("Den"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem_details_from_service_response(
        resp,
        "NOT_YOUR_TURN",
        StatusCode::FORBIDDEN,
        Some("Alpha"),
    )
    .await;
    assert_eq!(problem.title, "Not Your Turn");
    assert!(problem.type_.ends_with("NOT_YOUR_TURN"), "{}", problem.type_);
}

#[actix_web::test]
async fn extractor_failures_share_the_contract() {
    let ts = build_test_state();
    let app = create_test_app(ts.state.clone()).await;

    let req = test::TestRequest::get()
        .uri("/api/matches")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "UNAUTHORIZED_MISSING_BEARER",
        StatusCode::UNAUTHORIZED,
        None,
    )
    .await;

    let too_long = "x".repeat(65);
    let req = test::TestRequest::get()
        .uri(&format!("/api/matches/{too_long}/snapshot"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "INVALID_MATCH_ID",
        StatusCode::BAD_REQUEST,
        Some("64"),
    )
    .await;
}
