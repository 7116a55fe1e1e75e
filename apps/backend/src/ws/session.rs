use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::match_id::MatchId;
use crate::domain::snapshot::MatchSnapshot;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::ws::hub::MatchEvent;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);
/// Events beyond this many unread ones are dropped for the slow session.
const MAILBOX_CAPACITY: usize = 64;

/// `GET /ws/matches/{match_id}`: read-only spectator feed.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // Reject unknown matches before the upgrade so overlays get a plain 404.
    app_state.matches.get(&match_id).map_err(AppError::from)?;

    let session = MatchWsSession::new(match_id, app_state);
    ws::start(session, &req, stream)
}

pub struct MatchWsSession {
    conn_id: Uuid,
    match_id: MatchId,
    app_state: web::Data<AppState>,
    /// Registry token, set once registered.
    token: Option<Uuid>,
    /// Version of the last snapshot written to the socket.
    last_version: Option<u64>,
    last_heartbeat: Instant,
}

impl MatchWsSession {
    fn new(match_id: MatchId, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            match_id,
            app_state,
            token: None,
            last_version: None,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg<'_>) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    /// Write `snapshot` unless an equal or newer one already went out.
    fn send_state(&mut self, ctx: &mut ws::WebsocketContext<Self>, snapshot: &MatchSnapshot) {
        if self.last_version.is_some_and(|seen| snapshot.version <= seen) {
            debug!(
                conn_id = %self.conn_id,
                match_id = %self.match_id,
                version = snapshot.version,
                "[WS SESSION] stale snapshot skipped"
            );
            return;
        }
        self.last_version = Some(snapshot.version);
        Self::send_json(
            ctx,
            &ServerMsg::State {
                version: snapshot.version,
                state: snapshot,
            },
        );
    }

    fn send_ended_and_close(&self, ctx: &mut ws::WebsocketContext<Self>) {
        Self::send_json(
            ctx,
            &ServerMsg::Ended {
                match_id: self.match_id.as_str(),
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    match_id = %actor.match_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }
}

impl Actor for MatchWsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(MAILBOX_CAPACITY);

        // Register before reading the snapshot: anything committed in between
        // arrives as an event and is filtered by version.
        let recipient = ctx.address().recipient::<MatchEvent>();
        self.token = Some(self.app_state.sessions.register(&self.match_id, recipient));

        info!(
            conn_id = %self.conn_id,
            match_id = %self.match_id,
            "[WS SESSION] started"
        );

        match self.app_state.flow().snapshot(&self.match_id) {
            Ok(snapshot) => {
                Self::send_json(
                    ctx,
                    &ServerMsg::Ack {
                        message: "connected",
                    },
                );
                self.send_state(ctx, &snapshot);
                self.start_heartbeat(ctx);
            }
            Err(err) => {
                debug!(
                    conn_id = %self.conn_id,
                    match_id = %self.match_id,
                    error = %err,
                    "[WS SESSION] match gone before first snapshot"
                );
                self.send_ended_and_close(ctx);
            }
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(token) = self.token.take() {
            self.app_state.sessions.unregister(&self.match_id, token);
        }
        info!(
            conn_id = %self.conn_id,
            match_id = %self.match_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for MatchWsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                // The feed is read-only; only keepalives are answered.
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Ping) => Self::send_json(ctx, &ServerMsg::Pong),
                    Err(_) => debug!(
                        conn_id = %self.conn_id,
                        "[WS SESSION] ignoring unrecognised client message"
                    ),
                }
            }
            Ok(ws::Message::Binary(_))
            | Ok(ws::Message::Continuation(_))
            | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    match_id = %self.match_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<MatchEvent> for MatchWsSession {
    type Result = ();

    fn handle(&mut self, msg: MatchEvent, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            MatchEvent::State(snapshot) => self.send_state(ctx, &snapshot),
            MatchEvent::Ended => {
                // The registry already forgot this session.
                self.token = None;
                self.send_ended_and_close(ctx);
            }
        }
    }
}
