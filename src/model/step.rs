use crate::shared::ids::StepId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque artifact attesting that a step executed. How it is produced
/// is the proof generator's concern; nothing in the core inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofToken(String);

impl ProofToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProofToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (StepStatus::Pending, StepStatus::InProgress)
                | (StepStatus::InProgress, StepStatus::Completed)
                | (StepStatus::InProgress, StepStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::InProgress => write!(f, "in_progress"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub service: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// One unit of work within a flow. `status` is mutated only by the
/// execution engine, monotonically pending -> in_progress -> terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub name: String,
    pub description: String,
    pub action: StepAction,
    #[serde(default)]
    pub dependencies: Vec<StepId>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub proof: Option<ProofToken>,
}

impl Step {
    pub fn new(
        id: StepId,
        name: impl Into<String>,
        description: impl Into<String>,
        action: StepAction,
        dependencies: Vec<StepId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            action,
            dependencies,
            status: StepStatus::Pending,
            result: None,
            proof: None,
        }
    }
}
