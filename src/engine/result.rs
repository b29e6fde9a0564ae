use crate::model::step::{ProofToken, Step};
use crate::shared::ids::FlowId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub flow_name: String,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub estimated_duration_seconds: u64,
    #[serde(default)]
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionError {
    pub message: String,
    #[serde(default)]
    pub step: Option<Step>,
}

/// Outcome of one execution attempt. Produced once, never mutated
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub flow_id: Option<FlowId>,
    #[serde(default)]
    pub completed_steps: Vec<Step>,
    #[serde(default)]
    pub proof_chain: Vec<ProofToken>,
    #[serde(default)]
    pub summary: Option<ExecutionSummary>,
    #[serde(default)]
    pub error: Option<ExecutionError>,
}
