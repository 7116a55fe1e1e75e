//! AppState for tests: built-in rules, a fixed secret and an export queue
//! whose receiving end the test keeps.

use pickban::config::MatchRules;
use pickban::domain::summary::MatchSummary;
use pickban::export::ExportQueue;
use pickban::state::app_state::AppState;
use pickban::state::security_config::SecurityConfig;
use tokio::sync::mpsc::UnboundedReceiver;

pub const TEST_SECRET: &[u8] = b"pickban-integration-secret-0123456789abcdef";
pub const REFEREE_ROLE: &str = "Arbitro";

pub struct TestState {
    pub state: AppState,
    /// Summaries the service handed to the exporter.
    pub exports: UnboundedReceiver<MatchSummary>,
}

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET).with_referee_role(REFEREE_ROLE)
}

pub fn build_test_state() -> TestState {
    build_test_state_with_rules(MatchRules::builtin().expect("built-in rules are valid"))
}

pub fn build_test_state_with_rules(rules: MatchRules) -> TestState {
    let (queue, exports) = ExportQueue::channel();
    TestState {
        state: AppState::new(test_security(), rules, queue),
        exports,
    }
}
