pub mod app;
pub mod rules;

pub use app::Config;
pub use rules::{MatchRules, RulesError};
