// WebSocket test utilities

use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use pickban::domain::match_id::MatchId;
use pickban::middleware::request_trace::RequestTrace;
use pickban::middleware::structured_logger::StructuredLogger;
use pickban::routes;
use pickban::state::app_state::AppState;
use pickban::ws::hub::MatchSessionRegistry;

pub type ServerParts = (
    actix_web::dev::ServerHandle,
    std::net::SocketAddr,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
);

/// Bind a real server on an ephemeral port with production routes.
pub async fn start_test_server(state: AppState) -> Result<ServerParts, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let server_handle = server.handle();
    let join = tokio::spawn(server);

    Ok((server_handle, addr, join))
}

pub fn ws_url(addr: std::net::SocketAddr, match_id: &MatchId) -> String {
    format!("ws://{addr}/ws/matches/{match_id}")
}

pub async fn wait_for_subscribers(
    registry: &MatchSessionRegistry,
    match_id: &MatchId,
    expected: usize,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = tokio::time::Instant::now();
    loop {
        if registry.subscriber_count(match_id) == expected {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!(
                "timeout waiting for subscriber_count == {expected} (got {})",
                registry.subscriber_count(match_id)
            )
            .into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
