use crate::engine::result::{ExecutionError, ExecutionResult, ExecutionSummary};
use crate::engine::runner::ActionRunner;
use crate::model::dag::{topological_order, validate};
use crate::model::flow::Flow;
use crate::model::step::StepStatus;
use crate::shared::logging::append_session_log;
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub max_steps_per_run: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_steps_per_run: 128,
        }
    }
}

/// Runs a flow's steps in deterministic topological order, invoking the
/// action runner per step and accumulating the proof chain. Steps are
/// executed strictly in sequence even when the graph admits parallel
/// branches.
pub struct FlowExecutor {
    runner: Box<dyn ActionRunner>,
    limits: ExecutionLimits,
    state_root: Option<PathBuf>,
}

impl FlowExecutor {
    pub fn new(runner: Box<dyn ActionRunner>) -> Self {
        Self {
            runner,
            limits: ExecutionLimits::default(),
            state_root: None,
        }
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_state_root(mut self, state_root: impl Into<PathBuf>) -> Self {
        self.state_root = Some(state_root.into());
        self
    }

    /// Executes a freshly planned flow. The flow's DAG is validated
    /// before any step runs; validation failures abort with zero
    /// completed steps and no side effects.
    pub fn execute(&self, flow: &mut Flow, now: i64) -> ExecutionResult {
        if let Err(err) = validate(flow) {
            self.log(now, &format!("flow_id={} decision=reject reason={err}", flow.id));
            return self.rejected(flow, err.to_string());
        }
        let order = match topological_order(flow) {
            Ok(order) => order,
            Err(err) => return self.rejected(flow, err.to_string()),
        };
        if order.len() > self.limits.max_steps_per_run {
            return self.rejected(
                flow,
                format!(
                    "flow `{}` has {} steps, more than the limit of {}",
                    flow.id,
                    order.len(),
                    self.limits.max_steps_per_run
                ),
            );
        }

        let total_steps = flow.steps.len();
        let mut context: Map<String, Value> = Map::new();
        let mut completed = Vec::with_capacity(order.len());

        for step_id in order {
            let Some(idx) = flow.steps.iter().position(|step| step.id == step_id) else {
                continue;
            };
            flow.steps[idx].status = StepStatus::InProgress;
            self.log(
                now,
                &format!("flow_id={} step_id={step_id} transition=in_progress", flow.id),
            );

            let action = flow.steps[idx].action.clone();
            match self.runner.run_action(&action, &context) {
                Ok(outcome) => {
                    let step = &mut flow.steps[idx];
                    step.status = StepStatus::Completed;
                    step.result = Some(outcome.output.clone());
                    step.proof = Some(outcome.proof.clone());
                    completed.push(step.clone());
                    flow.proof_chain.push(outcome.proof);
                    context.insert(step_id.to_string(), outcome.output);
                    self.log(
                        now,
                        &format!("flow_id={} step_id={step_id} transition=completed", flow.id),
                    );
                }
                Err(err) => {
                    flow.steps[idx].status = StepStatus::Failed;
                    self.log(
                        now,
                        &format!("flow_id={} step_id={step_id} transition=failed error={err}", flow.id),
                    );
                    return ExecutionResult {
                        success: false,
                        flow_id: Some(flow.id.clone()),
                        completed_steps: completed,
                        proof_chain: flow.proof_chain.clone(),
                        summary: None,
                        error: Some(ExecutionError {
                            message: err.to_string(),
                            step: Some(flow.steps[idx].clone()),
                        }),
                    };
                }
            }
        }

        let summary = ExecutionSummary {
            flow_name: flow.name.clone(),
            completed_steps: completed.len(),
            total_steps,
            estimated_duration_seconds: flow.estimated_duration_seconds,
            context,
        };
        self.log(
            now,
            &format!("flow_id={} decision=complete steps={}", flow.id, completed.len()),
        );
        ExecutionResult {
            success: true,
            flow_id: Some(flow.id.clone()),
            completed_steps: completed,
            proof_chain: flow.proof_chain.clone(),
            summary: Some(summary),
            error: None,
        }
    }

    fn rejected(&self, flow: &Flow, message: String) -> ExecutionResult {
        ExecutionResult {
            success: false,
            flow_id: Some(flow.id.clone()),
            completed_steps: Vec::new(),
            proof_chain: Vec::new(),
            summary: None,
            error: Some(ExecutionError {
                message,
                step: None,
            }),
        }
    }

    fn log(&self, now: i64, line: &str) {
        if let Some(state_root) = self.state_root.as_deref() {
            append_session_log(state_root, &format!("ts={now} {line}"));
        }
    }
}
