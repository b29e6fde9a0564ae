use crate::model::flow::Flow;
use crate::model::step::Step;
use crate::shared::ids::{FlowId, StepId};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowValidationError {
    #[error("flow `{flow_id}` has a step dependency cycle: {}", join_step_ids(.step_ids))]
    Cycle {
        flow_id: FlowId,
        step_ids: Vec<StepId>,
    },
    #[error("step `{step_id}` in flow `{flow_id}` depends on unknown step `{missing_id}`")]
    DanglingDependency {
        flow_id: FlowId,
        step_id: StepId,
        missing_id: StepId,
    },
}

fn join_step_ids(step_ids: &[StepId]) -> String {
    step_ids
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Checks the step graph of a flow: every dependency must name a step
/// in the same flow, and the dependency relation must be acyclic.
/// Dangling references are reported in declared step order before any
/// cycle search runs.
pub fn validate(flow: &Flow) -> Result<(), FlowValidationError> {
    let index_by_id = step_indexes(&flow.steps);

    for step in &flow.steps {
        for dep in &step.dependencies {
            if !index_by_id.contains_key(dep.as_str()) {
                return Err(FlowValidationError::DanglingDependency {
                    flow_id: flow.id.clone(),
                    step_id: step.id.clone(),
                    missing_id: dep.clone(),
                });
            }
        }
    }

    let mut colors = vec![Color::White; flow.steps.len()];
    let mut path = Vec::new();
    for idx in 0..flow.steps.len() {
        if colors[idx] != Color::White {
            continue;
        }
        if let Some(cycle) = find_cycle(idx, &flow.steps, &index_by_id, &mut colors, &mut path) {
            return Err(FlowValidationError::Cycle {
                flow_id: flow.id.clone(),
                step_ids: cycle
                    .into_iter()
                    .map(|member| flow.steps[member].id.clone())
                    .collect(),
            });
        }
    }
    Ok(())
}

/// Deterministic topological order over a flow's steps: among steps
/// with no unmet dependency, the one declared first wins. Validates
/// the graph again before ordering.
pub fn topological_order(flow: &Flow) -> Result<Vec<StepId>, FlowValidationError> {
    validate(flow)?;

    let index_by_id = step_indexes(&flow.steps);
    let total = flow.steps.len();
    let mut emitted = vec![false; total];
    let mut order = Vec::with_capacity(total);

    while order.len() < total {
        let mut progressed = false;
        for idx in 0..total {
            if emitted[idx] {
                continue;
            }
            let ready = flow.steps[idx].dependencies.iter().all(|dep| {
                index_by_id
                    .get(dep.as_str())
                    .map(|&dep_idx| emitted[dep_idx])
                    .unwrap_or(false)
            });
            if ready {
                emitted[idx] = true;
                order.push(flow.steps[idx].id.clone());
                progressed = true;
                break;
            }
        }
        if !progressed {
            return Err(FlowValidationError::Cycle {
                flow_id: flow.id.clone(),
                step_ids: flow
                    .steps
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !emitted[*idx])
                    .map(|(_, step)| step.id.clone())
                    .collect(),
            });
        }
    }
    Ok(order)
}

/// Renders the step graph in DOT format, one node per step and one
/// edge per declared dependency.
pub fn render_dot(flow: &Flow) -> String {
    let mut out = String::from("digraph {\n");
    for step in &flow.steps {
        out.push_str(&format!("  \"{}\"\n", step.id));
    }
    for step in &flow.steps {
        for dep in &step.dependencies {
            out.push_str(&format!("  \"{dep}\" -> \"{}\"\n", step.id));
        }
    }
    out.push('}');
    out
}

fn step_indexes(steps: &[Step]) -> HashMap<&str, usize> {
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| (step.id.as_str(), idx))
        .collect()
}

fn find_cycle(
    current: usize,
    steps: &[Step],
    index_by_id: &HashMap<&str, usize>,
    colors: &mut [Color],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    colors[current] = Color::Gray;
    path.push(current);
    for dep in &steps[current].dependencies {
        let Some(&next) = index_by_id.get(dep.as_str()) else {
            continue;
        };
        match colors[next] {
            Color::Gray => {
                let start = path.iter().position(|&member| member == next).unwrap_or(0);
                return Some(path[start..].to_vec());
            }
            Color::White => {
                if let Some(cycle) = find_cycle(next, steps, index_by_id, colors, path) {
                    return Some(cycle);
                }
            }
            Color::Black => {}
        }
    }
    path.pop();
    colors[current] = Color::Black;
    None
}
