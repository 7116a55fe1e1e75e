//! Domain layer: pure pick/ban logic, no I/O.

pub mod authorization;
pub mod executor;
pub mod flow;
pub mod map_pool;
pub mod match_id;
pub mod series;
pub mod snapshot;
pub mod state;
pub mod summary;


// Re-exports for ergonomics
pub use authorization::{can_act, ActorCapabilities};
pub use executor::{apply_action, start_series, ActionOutcome, ActionRequest};
pub use flow::{build_flow, FlowStep, SeriesLength, StepAction};
pub use map_pool::{GameMode, MapPool};
pub use match_id::MatchId;
pub use series::{submit_result, ResultSubmission};
pub use snapshot::{snapshot, MatchSnapshot};
pub use state::{MatchState, MatchStatus, Owner, Side, TeamBinding, TeamSlot};
pub use summary::{summarize, MatchSummary};
