use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::match_id::MatchId;
use crate::domain::snapshot::MatchSnapshot;

/// Pushed to every session watching a match.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub enum MatchEvent {
    /// A committed mutation.
    State(Arc<MatchSnapshot>),
    /// The match was ended by a referee; nothing further will follow.
    Ended,
}

/// In-process fan-out from a match to its spectator sessions.
#[derive(Default)]
pub struct MatchSessionRegistry {
    sessions: DashMap<MatchId, DashMap<Uuid, Recipient<MatchEvent>>>,
}

impl MatchSessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn register(&self, match_id: &MatchId, recipient: Recipient<MatchEvent>) -> Uuid {
        let token = Uuid::new_v4();
        let entry = self
            .sessions
            .entry(match_id.clone())
            .or_insert_with(DashMap::new);
        entry.insert(token, recipient);
        token
    }

    pub fn unregister(&self, match_id: &MatchId, token: Uuid) {
        if let Some(entry) = self.sessions.get(match_id) {
            entry.remove(&token);
        }
        self.sessions
            .remove_if(match_id, |_, sessions| sessions.is_empty());
    }

    /// Deliver `event` to every session of `match_id` without waiting.
    ///
    /// A full mailbox drops this event for that session only; a closed one
    /// is pruned.
    pub fn broadcast(&self, match_id: &MatchId, event: MatchEvent) {
        let mut closed = Vec::new();
        if let Some(entry) = self.sessions.get(match_id) {
            for recipient in entry.iter() {
                match recipient.value().try_send(event.clone()) {
                    Ok(()) => {}
                    Err(SendError::Full(_)) => {
                        debug!(match_id = %match_id, session = %recipient.key(), "Spectator mailbox full, event dropped");
                    }
                    Err(SendError::Closed(_)) => closed.push(*recipient.key()),
                }
            }
        }
        for token in closed {
            self.unregister(match_id, token);
        }
    }

    pub fn publish(&self, match_id: &MatchId, snapshot: MatchSnapshot) {
        self.broadcast(match_id, MatchEvent::State(Arc::new(snapshot)));
    }

    /// Tell every session the match is gone and forget them.
    pub fn close_match(&self, match_id: &MatchId) {
        self.broadcast(match_id, MatchEvent::Ended);
        self.sessions.remove(match_id);
    }

    pub fn subscriber_count(&self, match_id: &MatchId) -> usize {
        self.sessions
            .get(match_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    pub fn active_connections_count(&self) -> usize {
        self.sessions.iter().map(|entry| entry.len()).sum()
    }
}
