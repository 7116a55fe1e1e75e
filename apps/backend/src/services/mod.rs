//! Services bridge the pure domain with shared process state.

pub mod match_flow;
pub mod registry;

pub use match_flow::{ActionReport, MatchFlowService, MatchListing, ResultReport};
pub use registry::{MatchHandle, MatchRegistry};
