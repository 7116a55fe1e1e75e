//! Live matches keyed by id, each behind its own lock.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::match_id::MatchId;
use crate::domain::state::MatchState;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

pub type MatchHandle = Arc<Mutex<MatchState>>;

/// Concurrent map from match id to an exclusively locked [`MatchState`].
///
/// Lookups clone the handle and release the shard before the caller locks
/// the match, so one slow match never blocks another.
#[derive(Default)]
pub struct MatchRegistry {
    matches: DashMap<MatchId, MatchHandle>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, state: MatchState) -> Result<MatchHandle, DomainError> {
        match self.matches.entry(state.match_id.clone()) {
            Entry::Occupied(occupied) => Err(DomainError::conflict(
                ConflictKind::MatchExists,
                format!("Match {} is already active", occupied.key()),
            )),
            Entry::Vacant(vacant) => {
                let handle = Arc::new(Mutex::new(state));
                vacant.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    pub fn get(&self, match_id: &MatchId) -> Result<MatchHandle, DomainError> {
        self.matches
            .get(match_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| not_found(match_id))
    }

    pub fn remove(&self, match_id: &MatchId) -> Result<MatchHandle, DomainError> {
        self.matches
            .remove(match_id)
            .map(|(_, handle)| handle)
            .ok_or_else(|| not_found(match_id))
    }

    /// Every live handle, ordered by match id.
    pub fn all(&self) -> Vec<(MatchId, MatchHandle)> {
        let mut all: Vec<(MatchId, MatchHandle)> = self
            .matches
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

pub(crate) fn not_found(match_id: &MatchId) -> DomainError {
    DomainError::not_found(NotFoundKind::Match, format!("Match {match_id} not found"))
}
