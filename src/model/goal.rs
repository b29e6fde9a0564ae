use crate::shared::ids::{GoalId, IntentId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub objective: String,
    #[serde(default)]
    pub dependencies: Vec<GoalId>,
}

/// A structured goal extracted from free text. Immutable once created;
/// a session holds exactly one until execution completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub id: IntentId,
    pub raw_text: String,
    pub main_goal: Goal,
    #[serde(default)]
    pub sub_goals: Vec<Goal>,
}
