pub mod hub;
pub mod protocol;
pub mod session;

pub use hub::{MatchEvent, MatchSessionRegistry};
pub use session::upgrade;
