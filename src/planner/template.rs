use crate::config::builtin::builtin_flow_templates;
use crate::config::templates_file::{FlowTemplate, TemplateStep};
use crate::model::flow::Flow;
use crate::model::goal::Intent;
use crate::model::step::{Step, StepAction};
use crate::planner::keyword::tokenize;
use crate::planner::{FlowGenerationError, FlowPlanner};
use crate::shared::ids::{allocate_id, FlowId};

/// Proposes flows by instantiating declared templates. Templates whose
/// trigger tags intersect the intent's wording are preferred; when none
/// match, every template is proposed so the user always sees at least
/// one candidate while templates exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFlowPlanner {
    templates: Vec<FlowTemplate>,
}

impl TemplateFlowPlanner {
    pub fn new(templates: Vec<FlowTemplate>) -> Self {
        Self { templates }
    }
}

impl Default for TemplateFlowPlanner {
    fn default() -> Self {
        Self::new(builtin_flow_templates())
    }
}

impl FlowPlanner for TemplateFlowPlanner {
    fn generate_flows(&self, intent: &Intent, now: i64) -> Result<Vec<Flow>, FlowGenerationError> {
        let mut tokens = tokenize(&intent.raw_text);
        tokens.extend(tokenize(&intent.main_goal.objective));
        for goal in &intent.sub_goals {
            tokens.extend(tokenize(&goal.objective));
        }

        let mut matched: Vec<&FlowTemplate> = self
            .templates
            .iter()
            .filter(|template| {
                template.trigger_tags.iter().any(|tag| {
                    let tag = tag.to_ascii_lowercase();
                    tokens.iter().any(|token| token == &tag)
                })
            })
            .collect();
        if matched.is_empty() {
            matched = self.templates.iter().collect();
        }

        matched
            .into_iter()
            .map(|template| instantiate(template, intent, now))
            .collect()
    }
}

fn instantiate(
    template: &FlowTemplate,
    intent: &Intent,
    now: i64,
) -> Result<Flow, FlowGenerationError> {
    let id = allocate_id("flow", now)
        .and_then(FlowId::try_from)
        .map_err(FlowGenerationError::IdAllocation)?;

    let mut goals = Vec::with_capacity(1 + intent.sub_goals.len());
    goals.push(intent.main_goal.clone());
    goals.extend(intent.sub_goals.iter().cloned());

    Ok(Flow {
        id,
        name: template.name.clone(),
        description: template.description.clone(),
        goals,
        steps: template.steps.iter().map(instantiate_step).collect(),
        required_resources: template.required_resources.clone(),
        estimated_duration_seconds: template.estimated_duration_seconds,
        proof_chain: Vec::new(),
    })
}

fn instantiate_step(step: &TemplateStep) -> Step {
    Step::new(
        step.id.clone(),
        step.name.clone(),
        step.description.clone(),
        StepAction {
            kind: step.action.clone(),
            service: step.service.clone(),
            parameters: step.parameters.clone(),
        },
        step.depends_on.clone(),
    )
}
