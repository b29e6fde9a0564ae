pub mod keyword;
pub mod template;

pub use keyword::{KeywordIntentSource, ObjectiveEntry};
pub use template::TemplateFlowPlanner;

use crate::model::flow::Flow;
use crate::model::goal::Intent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentExtractionError {
    #[error("cannot extract an intent from empty input")]
    EmptyInput,
    #[error("intent id allocation failed: {0}")]
    IdAllocation(String),
    #[error("intent extraction backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowGenerationError {
    #[error("flow id allocation failed: {0}")]
    IdAllocation(String),
    #[error("flow generation backend failed: {0}")]
    Backend(String),
}

/// Turns a raw user request into a structured intent. Implemented per
/// provider and injected into the session.
pub trait IntentSource {
    fn extract_intent(&self, raw_text: &str, now: i64) -> Result<Intent, IntentExtractionError>;
}

/// Proposes candidate flows for an intent. An empty result is not an
/// error; the session reports that no workflow was found.
pub trait FlowPlanner {
    fn generate_flows(&self, intent: &Intent, now: i64) -> Result<Vec<Flow>, FlowGenerationError>;
}
