use std::time::Duration;

use pickban::domain::SeriesLength;
use serde_json::json;

use crate::support::draft::{bo3_script, MatchSetup};
use crate::support::build_test_state;
use crate::support::websocket::{start_test_server, wait_for_subscribers, ws_url};
use crate::support::websocket_client::WebSocketClient;

const WAIT: Duration = Duration::from_secs(5);

#[actix_web::test]
async fn connect_sends_ack_then_current_state() -> Result<(), Box<dyn std::error::Error>> {
    let ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    setup.play(&ts.state, &bo3_script()[..3]);
    let (server, addr, join) = start_test_server(ts.state.clone()).await?;

    let mut client = WebSocketClient::connect(&ws_url(addr, &setup.match_id)).await?;
    let ack = client.expect_json(WAIT).await;
    assert_eq!(ack, json!({"type": "ack", "message": "connected"}));

    let state = client.expect_json(WAIT).await;
    let current = ts.state.flow().snapshot(&setup.match_id)?;
    assert_eq!(state["type"], "state");
    assert_eq!(state["version"], current.version);
    assert_eq!(state["state"], serde_json::to_value(&current)?);
    assert_eq!(state["state"]["current_step"]["action"], "pick_side");

    wait_for_subscribers(&ts.state.sessions, &setup.match_id, 1, WAIT).await?;

    client.close().await?;
    wait_for_subscribers(&ts.state.sessions, &setup.match_id, 0, WAIT).await?;

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn unknown_match_is_refused_before_upgrade() -> Result<(), Box<dyn std::error::Error>> {
    let ts = build_test_state();
    let (server, addr, join) = start_test_server(ts.state.clone()).await?;

    let missing = pickban::MatchId::parse("no-such-match")?;
    let result = WebSocketClient::connect(&ws_url(addr, &missing)).await;
    assert!(result.is_err(), "handshake should fail with 404");
    assert_eq!(ts.state.sessions.active_connections_count(), 0);

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn application_ping_gets_a_pong() -> Result<(), Box<dyn std::error::Error>> {
    let ts = build_test_state();
    let setup = MatchSetup::new();
    setup.create_and_start(&ts.state, SeriesLength::Bo3);
    let (server, addr, join) = start_test_server(ts.state.clone()).await?;

    let mut client = WebSocketClient::connect(&ws_url(addr, &setup.match_id)).await?;
    client.expect_json(WAIT).await; // ack
    client.expect_json(WAIT).await; // state

    // Anything that is not a ping is ignored; the feed stays open.
    client.send(r#"{"type":"ban","map":"Den"}"#).await?;
    client.send("not json").await?;
    client.send(r#"{"type":"ping"}"#).await?;
    assert_eq!(client.expect_json(WAIT).await, json!({"type": "pong"}));

    // Spectators cannot change the match.
    assert_eq!(ts.state.flow().snapshot(&setup.match_id)?.step, 0);

    client.close().await?;
    server.stop(true).await;
    join.await??;
    Ok(())
}
