use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use parking_lot::Mutex;
use pickban::domain::state::TeamSlot;
use pickban::domain::summary::MatchSummary;
use pickban::domain::SeriesLength;
use pickban::export::{export_with_retry, ExportQueue, RetryPolicy, WebhookExporter};
use serde_json::{json, Value};

use crate::support::auth::referee_actor;
use crate::support::build_test_state;
use crate::support::draft::{bo3_script, MatchSetup};

/// Records posted bodies; answers 503 for the first `failures` calls.
#[derive(Clone)]
struct Sink {
    failures: Arc<AtomicU32>,
    reject_with: u16,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn receive(sink: web::Data<Sink>, body: web::Json<Value>) -> HttpResponse {
    sink.received.lock().push(body.into_inner());
    let remaining = sink.failures.load(Ordering::SeqCst);
    if remaining > 0 {
        sink.failures.store(remaining - 1, Ordering::SeqCst);
        HttpResponse::build(
            actix_web::http::StatusCode::from_u16(sink.reject_with).unwrap(),
        )
        .finish()
    } else {
        HttpResponse::NoContent().finish()
    }
}

async fn start_sink(
    failures: u32,
    reject_with: u16,
) -> (Sink, String, actix_web::dev::ServerHandle) {
    let sink = Sink {
        failures: Arc::new(AtomicU32::new(failures)),
        reject_with,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let data = web::Data::new(sink.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/hook", web::post().to(receive))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    let handle = server.handle();
    tokio::spawn(server);
    (sink, format!("http://{addr}/hook"), handle)
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 4,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        multiplier: 2.0,
        jitter: 0.0,
    }
}

/// Summary of a real BO3 that team A won 2-0.
fn finished_summary() -> MatchSummary {
    let mut ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    setup.play(&ts.state, &bo3_script());
    for slot in [1u8, 2] {
        let submission =
            serde_json::from_value(json!({"slot": slot, "score": {"a": 6, "b": 3}})).unwrap();
        ts.state
            .flow()
            .submit_result(&referee_actor(), &setup.match_id, &submission)
            .unwrap();
    }
    ts.exports.try_recv().expect("summary queued")
}

#[actix_web::test]
async fn webhook_retries_transient_failures() {
    let (sink, url, server) = start_sink(2, 503).await;
    let summary = finished_summary();

    let exporter = WebhookExporter::new(url).unwrap();
    assert!(export_with_retry(&exporter, &summary, &fast_policy()).await);

    let received = sink.received.lock().clone();
    assert_eq!(received.len(), 3, "two failures then success");
    let body = &received[2];
    assert_eq!(body["match_id"], summary.match_id.as_str());
    assert_eq!(body["team_a"], "Alpha");
    assert_eq!(body["winner"], "A");
    assert_eq!(body["winner_name"], "Alpha");
    assert_eq!(body["series"], "bo3");
    assert_eq!(body["maps"][0]["slot"], 1);
    assert_eq!(body["maps"][0]["map"], "Den");
    assert_eq!(body["maps"][0]["picked_by"], "A");
    assert_eq!(body["maps"][0]["score"], json!({"a": 6, "b": 3}));
    assert_eq!(body["maps"][2]["picked_by"], "DECIDER");
    assert_eq!(body["maps"][2]["winner"], json!(null));
    assert_eq!(body["bans"]["B"][0], "HP Colossus");

    server.stop(true).await;
}

#[actix_web::test]
async fn webhook_gives_up_on_client_errors() {
    let (sink, url, server) = start_sink(10, 422).await;
    let summary = finished_summary();

    let exporter = WebhookExporter::new(url).unwrap();
    assert!(!export_with_retry(&exporter, &summary, &fast_policy()).await);
    assert_eq!(sink.received.lock().len(), 1, "4xx is not retried");

    server.stop(true).await;
}

#[actix_web::test]
async fn queue_worker_delivers_in_the_background() {
    let (sink, url, server) = start_sink(0, 503).await;
    let summary = finished_summary();

    let queue = ExportQueue::spawn(
        Arc::new(WebhookExporter::new(url).unwrap()),
        fast_policy(),
    );
    queue.enqueue(summary.clone());

    let start = tokio::time::Instant::now();
    while sink.received.lock().is_empty() {
        assert!(start.elapsed() < Duration::from_secs(5), "worker never posted");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let received = sink.received.lock().clone();
    assert_eq!(received[0]["match_id"], summary.match_id.as_str());
    assert_eq!(summary.winner, Some(TeamSlot::A));

    server.stop(true).await;
}
