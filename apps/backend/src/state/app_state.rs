use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::config::rules::MatchRules;
use crate::export::ExportQueue;
use crate::services::match_flow::MatchFlowService;
use crate::services::registry::MatchRegistry;
use crate::ws::hub::MatchSessionRegistry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    /// Map pool and series rules, fixed for the process lifetime
    pub rules: Arc<MatchRules>,
    /// Live matches
    pub matches: Arc<MatchRegistry>,
    /// Spectator websocket sessions per match
    pub sessions: Arc<MatchSessionRegistry>,
    /// Finished-series export queue
    pub exports: ExportQueue,
}

impl AppState {
    pub fn new(security: SecurityConfig, rules: MatchRules, exports: ExportQueue) -> Self {
        Self {
            security,
            rules: Arc::new(rules),
            matches: Arc::new(MatchRegistry::new()),
            sessions: Arc::new(MatchSessionRegistry::new()),
            exports,
        }
    }

    pub fn flow(&self) -> MatchFlowService<'_> {
        MatchFlowService::new(self)
    }
}
