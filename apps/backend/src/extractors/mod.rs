pub mod current_actor;
pub mod match_id;
pub mod validated_json;

pub use current_actor::CurrentActor;
pub use validated_json::ValidatedJson;
