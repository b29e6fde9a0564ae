use crate::model::goal::Goal;
use crate::model::step::{ProofToken, Step};
use crate::shared::ids::{FlowId, ResourceId, StepId};
use serde::{Deserialize, Serialize};

/// A concrete, executable plan proposed to satisfy an intent: a DAG of
/// steps plus the resources that must be present before it may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: FlowId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub required_resources: Vec<ResourceId>,
    pub estimated_duration_seconds: u64,
    #[serde(default)]
    pub proof_chain: Vec<ProofToken>,
}

impl Flow {
    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|step| &step.id == id)
    }
}
