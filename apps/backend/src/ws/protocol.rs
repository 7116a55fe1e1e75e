use serde::{Deserialize, Serialize};

use crate::domain::snapshot::MatchSnapshot;

/// Messages a spectator may send. Anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Application-level keepalive for clients that cannot send ws pings.
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg<'a> {
    Ack {
        message: &'static str,
    },

    State {
        version: u64,
        state: &'a MatchSnapshot,
    },

    Pong,

    Ended {
        match_id: &'a str,
    },
}
