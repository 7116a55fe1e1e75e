use actix_web::http::StatusCode;
use actix_web::test;
use pickban::domain::SeriesLength;
use serde_json::json;

use crate::common::{call_json, call_problem};
use crate::support::auth::Actors;
use crate::support::draft::{bo3_script, MatchSetup};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn bo3_series_finishes_after_two_wins_and_is_exported_once() {
    let mut ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    setup.play(&ts.state, &bo3_script());
    let actors = Actors::new(&ts.state.security, &setup.role_a, &setup.role_b);
    let app = create_test_app(ts.state.clone()).await;

    let req = test::TestRequest::post()
        .uri(&setup.path("/results"))
        .insert_header(actors.team_b.clone())
        .set_json(json!({"slot": 1, "score": {"a": 250, "b": 180}}))
        .to_request();
    let (status, report) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["series_finished"], false);
    assert_eq!(report["snapshot"]["teams"]["A"]["wins"], 1);
    assert_eq!(report["snapshot"]["results"][0]["winner"], "A");
    assert_eq!(report["snapshot"]["results"][0]["map"], "Den");
    assert_eq!(report["snapshot"]["results"][0]["mode"], "HP");
    assert!(ts.exports.try_recv().is_err(), "nothing exported mid-series");

    let req = test::TestRequest::post()
        .uri(&setup.path("/results"))
        .insert_header(actors.referee.clone())
        .set_json(json!({"slot": 2, "winner": "A"}))
        .to_request();
    let (status, report) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["series_finished"], true);
    assert_eq!(report["series_winner"], "A");
    assert_eq!(report["snapshot"]["status"], "finished");

    let summary = ts.exports.try_recv().expect("summary queued for export");
    assert_eq!(summary.match_id, setup.match_id.as_str());
    assert_eq!(summary.winner_name.as_deref(), Some("Alpha"));
    assert_eq!(summary.maps.len(), 3);

    // The decider map is never played and the series is closed.
    let req = test::TestRequest::post()
        .uri(&setup.path("/results"))
        .insert_header(actors.referee.clone())
        .set_json(json!({"slot": 3, "winner": "B"}))
        .to_request();
    let (status, code) = call_problem(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(code, "SERIES_FINISHED");
    assert!(ts.exports.try_recv().is_err(), "exported exactly once");

    // A finished series cannot be restarted.
    let req = test::TestRequest::post()
        .uri(&setup.path("/series"))
        .insert_header(actors.referee.clone())
        .set_json(json!({"series": "bo3"}))
        .to_request();
    let (status, code) = call_problem(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(code, "SERIES_FINISHED");
}

#[actix_web::test]
async fn result_validation() {
    let ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    let actors = Actors::new(&ts.state.security, &setup.role_a, &setup.role_b);
    let app = create_test_app(ts.state.clone()).await;

    // Draft not finished yet.
    let req = test::TestRequest::post()
        .uri(&setup.path("/results"))
        .insert_header(actors.referee.clone())
        .set_json(json!({"slot": 1, "winner": "A"}))
        .to_request();
    let (status, code) = call_problem(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(code, "FLOW_INCOMPLETE");

    setup.play(&ts.state, &bo3_script());

    let cases = [
        (json!({"slot": 2, "winner": "A"}), "RESULT_OUT_OF_ORDER"),
        (json!({"slot": 1, "score": {"a": 6, "b": 6}}), "TIED_SCORE"),
        (
            json!({"slot": 1, "winner": "B", "score": {"a": 6, "b": 2}}),
            "SCORE_WINNER_MISMATCH",
        ),
        (json!({"slot": 1}), "VALIDATION_ERROR"),
    ];
    for (body, expected) in cases {
        let req = test::TestRequest::post()
            .uri(&setup.path("/results"))
            .insert_header(actors.referee.clone())
            .set_json(&body)
            .to_request();
        let (status, code) = call_problem(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(code, expected, "{body}");
    }

    let req = test::TestRequest::post()
        .uri(&setup.path("/results"))
        .insert_header(actors.outsider.clone())
        .set_json(json!({"slot": 1, "winner": "A"}))
        .to_request();
    let (status, _) = call_problem(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let snapshot = ts.state.flow().snapshot(&setup.match_id).unwrap();
    assert!(snapshot.results.is_empty());
}
