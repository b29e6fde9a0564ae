use crate::model::step::{ProofToken, StepAction};
use serde_json::{Map, Value};

/// Output of one opaque side effect: whatever the service produced,
/// plus the token attesting that the action ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub output: Value,
    pub proof: ProofToken,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("action `{kind}` against service `{service}` failed: {reason}")]
    Failed {
        kind: String,
        service: String,
        reason: String,
    },
    #[error("service `{service}` returned malformed output: {reason}")]
    MalformedOutput { service: String, reason: String },
    #[error("no runner is registered for service `{service}`")]
    UnknownService { service: String },
}

/// External collaborator that performs a step's real-world side effect.
/// Implementations must be idempotent per invocation contract; the
/// engine passes the accumulated context of prior step outputs keyed
/// by step id.
pub trait ActionRunner {
    fn run_action(
        &self,
        action: &StepAction,
        context: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError>;
}
