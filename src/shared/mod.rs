pub mod ids;
pub mod logging;

pub use ids::{allocate_id, FlowId, GoalId, IntentId, ResourceId, StepId};
