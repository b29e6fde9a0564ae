use crate::engine::executor::FlowExecutor;
use crate::engine::result::ExecutionResult;
use crate::model::flow::Flow;
use crate::model::goal::Intent;
use crate::planner::{FlowPlanner, IntentSource};
use crate::session::message::OutboundMessage;
use crate::session::resources::ResourceStore;
use crate::session::state::{classify_input, SessionEvent, SessionState};
use crate::session::transcript::Transcript;
use crate::shared::ids::ResourceId;
use crate::shared::logging::append_session_log;
use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;

/// One conversational session: a single user working one intent from
/// free text to an executed flow. Inputs are processed strictly one at
/// a time; `&mut self` on the entry point enforces that within a
/// session. Sessions share nothing.
pub struct ChatSession {
    state: SessionState,
    intent: Option<Intent>,
    flows: Vec<Flow>,
    selected_flow: Option<Flow>,
    resources: ResourceStore,
    last_result: Option<ExecutionResult>,
    transcript: Transcript,
    intent_source: Box<dyn IntentSource>,
    planner: Box<dyn FlowPlanner>,
    executor: FlowExecutor,
    state_root: Option<PathBuf>,
}

impl ChatSession {
    pub fn new(
        intent_source: Box<dyn IntentSource>,
        planner: Box<dyn FlowPlanner>,
        executor: FlowExecutor,
    ) -> Self {
        Self {
            state: SessionState::AwaitingIntent,
            intent: None,
            flows: Vec::new(),
            selected_flow: None,
            resources: ResourceStore::new(),
            last_result: None,
            transcript: Transcript::new(),
            intent_source,
            planner,
            executor,
            state_root: None,
        }
    }

    pub fn with_state_root(mut self, state_root: impl Into<PathBuf>) -> Self {
        self.state_root = Some(state_root.into());
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn intent(&self) -> Option<&Intent> {
        self.intent.as_ref()
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn selected_flow(&self) -> Option<&Flow> {
        self.selected_flow.as_ref()
    }

    pub fn last_result(&self) -> Option<&ExecutionResult> {
        self.last_result.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Writes the conversation to `conversations/session.jsonl` under
    /// the state root. A session without a state root exports nothing.
    pub fn export_transcript(&self) -> std::io::Result<()> {
        let Some(state_root) = self.state_root.as_deref() else {
            return Ok(());
        };
        self.transcript
            .export_jsonl(&state_root.join("conversations/session.jsonl"))
    }

    /// The sole entry point: classify the input against the current
    /// state, run the transition, and hand back everything to display.
    /// User-input errors become messages; this never fails.
    pub fn submit_input(&mut self, text: &str) -> Vec<OutboundMessage> {
        self.submit_input_at(text, Utc::now().timestamp())
    }

    /// Deterministic variant taking the clock as a parameter.
    pub fn submit_input_at(&mut self, text: &str, now: i64) -> Vec<OutboundMessage> {
        self.transcript.record_inbound(now, text);
        let event = classify_input(self.state, text);
        let messages = self.apply(event, now);
        for message in &messages {
            self.transcript.record_outbound(now, message);
        }
        messages
    }

    /// Direct resource insertion for programmatic callers; equivalent
    /// to a `<id>: <value>` submission but takes an opaque value.
    pub fn add_resource(&mut self, id: ResourceId, value: Value) {
        self.resources.put(id, value);
    }

    pub fn resource(&self, id: &str) -> Option<&Value> {
        self.resources.get(id)
    }

    /// Resources the selected flow still needs, in its declared order.
    /// Empty before a flow is selected.
    pub fn missing_resources(&self) -> Vec<ResourceId> {
        self.selected_flow
            .as_ref()
            .map(|flow| self.resources.missing(flow))
            .unwrap_or_default()
    }

    /// Returns the session to `AwaitingIntent` for a new request. The
    /// finished flow's record is dropped; the transcript is kept.
    pub fn reset(&mut self) {
        self.state = SessionState::AwaitingIntent;
        self.intent = None;
        self.flows.clear();
        self.selected_flow = None;
        self.resources.clear();
        self.last_result = None;
    }

    fn apply(&mut self, event: SessionEvent, now: i64) -> Vec<OutboundMessage> {
        match (self.state, event) {
            (SessionState::AwaitingIntent, SessionEvent::GoalSubmitted { raw_text }) => {
                self.handle_goal(&raw_text, now)
            }
            (SessionState::AwaitingFlowSelection, SessionEvent::FlowChosen { choice }) => {
                self.handle_choice(choice, now)
            }
            (SessionState::AwaitingResources, SessionEvent::ResourceSubmitted { id, value }) => {
                self.handle_resource(&id, value, now)
            }
            (SessionState::ReadyToExecute, SessionEvent::ExecuteRequested) => {
                self.handle_execute(now)
            }
            (state, _) => guidance(state),
        }
    }

    fn handle_goal(&mut self, raw_text: &str, now: i64) -> Vec<OutboundMessage> {
        let intent = match self.intent_source.extract_intent(raw_text, now) {
            Ok(intent) => intent,
            Err(err) => {
                return vec![OutboundMessage::error(format!(
                    "Could not understand the request: {err}. Please try again."
                ))];
            }
        };

        let mut messages = vec![OutboundMessage::info(format!(
            "Understood your intent: {}",
            intent.main_goal.objective
        ))];

        let flows = match self.planner.generate_flows(&intent, now) {
            Ok(flows) => flows,
            Err(err) => {
                messages.push(OutboundMessage::error(format!(
                    "Flow generation failed: {err}. Please try again."
                )));
                return messages;
            }
        };
        if flows.is_empty() {
            messages.push(OutboundMessage::error(
                "No workflow found for this request. Try rephrasing.",
            ));
            return messages;
        }

        messages.push(OutboundMessage::info(format!(
            "Generated {} flows. Choose one.",
            flows.len()
        )));
        for (idx, flow) in flows.iter().enumerate() {
            messages.push(OutboundMessage::prompt(format!(
                "{}. {}: {}",
                idx + 1,
                flow.name,
                flow.description
            )));
        }

        self.intent = Some(intent);
        self.flows = flows;
        self.transition(SessionState::AwaitingFlowSelection, now);
        messages
    }

    fn handle_choice(&mut self, choice: usize, now: i64) -> Vec<OutboundMessage> {
        if choice == 0 || choice > self.flows.len() {
            return vec![OutboundMessage::error(
                "Invalid flow selection. Please try again.",
            )];
        }
        let flow = self.flows[choice - 1].clone();
        let mut messages = vec![OutboundMessage::info(format!("Selected flow: {}", flow.name))];

        let missing = self.resources.missing(&flow);
        self.selected_flow = Some(flow);
        if missing.is_empty() {
            messages.push(OutboundMessage::prompt(READY_TO_EXECUTE));
            self.transition(SessionState::ReadyToExecute, now);
        } else {
            messages.push(OutboundMessage::prompt(format!(
                "Missing resources: {}. Submit each as `<resource id>: <value>`.",
                join_resource_ids(&missing)
            )));
            self.transition(SessionState::AwaitingResources, now);
        }
        messages
    }

    fn handle_resource(&mut self, id: &str, value: String, now: i64) -> Vec<OutboundMessage> {
        let resource_id = match ResourceId::parse(id) {
            Ok(resource_id) => resource_id,
            Err(err) => {
                return vec![OutboundMessage::error(format!(
                    "Invalid resource id `{id}`: {err}"
                ))];
            }
        };
        self.resources.put(resource_id.clone(), Value::String(value));
        let mut messages = vec![OutboundMessage::info(format!(
            "Resource {resource_id} added."
        ))];

        let missing = self.missing_resources();
        if missing.is_empty() {
            messages.push(OutboundMessage::prompt(READY_TO_EXECUTE));
            self.transition(SessionState::ReadyToExecute, now);
        } else {
            messages.push(OutboundMessage::prompt(format!(
                "Still missing: {}",
                join_resource_ids(&missing)
            )));
        }
        messages
    }

    fn handle_execute(&mut self, now: i64) -> Vec<OutboundMessage> {
        let Some(mut flow) = self.selected_flow.take() else {
            return vec![OutboundMessage::error(
                "No flow selected. Start over by describing your goal.",
            )];
        };
        let result = self.executor.execute(&mut flow, now);

        let mut messages = Vec::new();
        if result.success {
            messages.push(OutboundMessage::result("Flow executed successfully!"));
            if let Some(summary) = result.summary.as_ref() {
                messages.push(OutboundMessage::info("Summary:"));
                messages.push(OutboundMessage::info(format!("flow: {}", summary.flow_name)));
                messages.push(OutboundMessage::info(format!(
                    "steps: {}/{} completed",
                    summary.completed_steps, summary.total_steps
                )));
                messages.push(OutboundMessage::info(format!(
                    "estimated duration: {}s",
                    summary.estimated_duration_seconds
                )));
                for (key, value) in &summary.context {
                    messages.push(OutboundMessage::info(format!("{key}: {value}")));
                }
            }
        } else {
            let detail = result
                .error
                .as_ref()
                .map(|error| error.message.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            messages.push(OutboundMessage::error(format!("Execution failed: {detail}")));
        }

        self.selected_flow = Some(flow);
        self.last_result = Some(result);
        self.transition(SessionState::Completed, now);
        messages
    }

    fn transition(&mut self, next: SessionState, now: i64) {
        debug_assert!(
            self.state.can_transition_to(next),
            "session transition {} -> {next} is not declared",
            self.state
        );
        if let Some(state_root) = self.state_root.as_deref() {
            append_session_log(
                state_root,
                &format!("ts={now} session transition {} -> {next}", self.state),
            );
        }
        self.state = next;
    }
}

const READY_TO_EXECUTE: &str = "All resources available. Type \"execute\" to start.";

fn join_resource_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn guidance(state: SessionState) -> Vec<OutboundMessage> {
    let body = match state {
        SessionState::AwaitingIntent => "Describe what you would like to accomplish.",
        SessionState::AwaitingFlowSelection => "Invalid flow selection. Please try again.",
        SessionState::AwaitingResources => {
            "Submit each missing resource as `<resource id>: <value>`."
        }
        SessionState::ReadyToExecute => READY_TO_EXECUTE,
        SessionState::Completed => "This session has completed. Reset it to start a new request.",
    };
    vec![OutboundMessage::prompt(body)]
}
