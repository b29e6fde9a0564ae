use deepflow::engine::executor::FlowExecutor;
use deepflow::engine::proof::{DigestProofGenerator, ProofGenerator};
use deepflow::engine::runner::{ActionError, ActionOutcome, ActionRunner};
use deepflow::model::goal::Intent;
use deepflow::model::step::{StepAction, StepStatus};
use deepflow::planner::keyword::KeywordIntentSource;
use deepflow::planner::template::TemplateFlowPlanner;
use deepflow::planner::{
    FlowGenerationError, FlowPlanner, IntentExtractionError, IntentSource,
};
use deepflow::session::chat::ChatSession;
use deepflow::session::message::{MessageKind, OutboundMessage};
use deepflow::session::state::SessionState;
use serde_json::{json, Map, Value};

struct ServiceRunner {
    proofs: DigestProofGenerator,
    fail_service: Option<String>,
}

impl ServiceRunner {
    fn succeeding() -> Self {
        Self {
            proofs: DigestProofGenerator,
            fail_service: None,
        }
    }

    fn failing_on(service: &str) -> Self {
        Self {
            proofs: DigestProofGenerator,
            fail_service: Some(service.to_string()),
        }
    }
}

impl ActionRunner for ServiceRunner {
    fn run_action(
        &self,
        action: &StepAction,
        _context: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        if self.fail_service.as_deref() == Some(action.service.as_str()) {
            return Err(ActionError::Failed {
                kind: action.kind.clone(),
                service: action.service.clone(),
                reason: "service unavailable".to_string(),
            });
        }
        let output = json!({"service": action.service, "status": "ok"});
        let proof = self.proofs.prove(action, &output, 0);
        Ok(ActionOutcome { output, proof })
    }
}

fn travel_session(runner: ServiceRunner) -> ChatSession {
    ChatSession::new(
        Box::new(KeywordIntentSource::default()),
        Box::new(TemplateFlowPlanner::default()),
        FlowExecutor::new(Box::new(runner)),
    )
}

fn bodies(messages: &[OutboundMessage]) -> Vec<&str> {
    messages.iter().map(|message| message.body.as_str()).collect()
}

fn contains_line(messages: &[OutboundMessage], needle: &str) -> bool {
    messages.iter().any(|message| message.body.contains(needle))
}

#[test]
fn chat_session_walks_goal_to_execution() {
    let mut session = travel_session(ServiceRunner::succeeding());

    // Free text in, candidate flows out.
    let messages = session.submit_input_at("Book flight and hotel", 100);
    assert!(contains_line(
        &messages,
        "Understood your intent: Book flight and hotel"
    ));
    assert!(contains_line(&messages, "Generated 2 flows. Choose one."));
    assert!(contains_line(&messages, "1. Standard Travel Booking"));
    assert_eq!(session.state(), SessionState::AwaitingFlowSelection);

    // Selecting flow 1 reveals what is missing, in declared order.
    let messages = session.submit_input_at("1", 101);
    assert!(contains_line(
        &messages,
        "Selected flow: Standard Travel Booking"
    ));
    assert!(contains_line(&messages, "Missing resources: flight-api, hotel-api"));
    assert_eq!(session.state(), SessionState::AwaitingResources);
    let missing: Vec<String> = session
        .missing_resources()
        .iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(
        missing,
        vec!["flight-api".to_string(), "hotel-api".to_string()]
    );

    // Resources arrive one at a time.
    let messages = session.submit_input_at("flight-api: KEY1", 102);
    assert!(contains_line(&messages, "Resource flight-api added."));
    assert!(contains_line(&messages, "Still missing: hotel-api"));
    assert_eq!(session.state(), SessionState::AwaitingResources);

    let messages = session.submit_input_at("hotel-api: KEY2", 103);
    assert!(contains_line(&messages, "All resources available"));
    assert_eq!(session.state(), SessionState::ReadyToExecute);
    assert!(session.missing_resources().is_empty());

    // Execution runs the whole flow and reports the summary.
    let messages = session.submit_input_at("execute", 104);
    assert!(contains_line(&messages, "Flow executed successfully!"));
    assert!(contains_line(&messages, "Summary:"));
    assert!(contains_line(&messages, "steps: 3/3 completed"));
    assert_eq!(session.state(), SessionState::Completed);

    let result = session.last_result().expect("execution recorded");
    assert!(result.success);
    assert_eq!(result.completed_steps.len(), 3);
    assert_eq!(result.proof_chain.len(), 3);

    let flow = session.selected_flow().expect("flow retained");
    assert!(flow
        .steps
        .iter()
        .all(|step| step.status == StepStatus::Completed));
    assert_eq!(flow.proof_chain.len(), 3);
}

#[test]
fn chat_session_rejects_out_of_range_and_non_numeric_selection() {
    let mut session = travel_session(ServiceRunner::succeeding());
    session.submit_input_at("Book flight and hotel", 100);

    let messages = session.submit_input_at("9", 101);
    assert_eq!(bodies(&messages), vec!["Invalid flow selection. Please try again."]);
    assert_eq!(session.state(), SessionState::AwaitingFlowSelection);

    let messages = session.submit_input_at("the first one", 102);
    assert_eq!(bodies(&messages), vec!["Invalid flow selection. Please try again."]);
    assert_eq!(session.state(), SessionState::AwaitingFlowSelection);

    // The session is still usable afterwards.
    let messages = session.submit_input_at("1", 103);
    assert!(contains_line(&messages, "Selected flow:"));
}

#[test]
fn chat_session_keeps_colons_inside_resource_values() {
    let mut session = travel_session(ServiceRunner::succeeding());
    session.submit_input_at("Book flight and hotel", 100);
    session.submit_input_at("1", 101);

    session.submit_input_at("flight-api: https://api.example:8443/v2?at=12:30:00", 102);
    assert_eq!(
        session.resource("flight-api"),
        Some(&Value::String(
            "https://api.example:8443/v2?at=12:30:00".to_string()
        ))
    );
}

#[test]
fn chat_session_ignores_resource_lines_without_a_colon() {
    let mut session = travel_session(ServiceRunner::succeeding());
    session.submit_input_at("Book flight and hotel", 100);
    session.submit_input_at("1", 101);

    let messages = session.submit_input_at("flight-api KEY1", 102);
    assert!(contains_line(&messages, "Submit each missing resource"));
    assert_eq!(session.state(), SessionState::AwaitingResources);
    assert_eq!(session.missing_resources().len(), 2);
}

#[test]
fn chat_session_surfaces_step_failure_and_preserves_progress() {
    // The hotel service fails; the flight steps before it complete.
    let mut session = travel_session(ServiceRunner::failing_on("hotel"));
    session.submit_input_at("Book flight and hotel", 100);
    session.submit_input_at("1", 101);
    session.submit_input_at("flight-api: KEY1", 102);
    session.submit_input_at("hotel-api: KEY2", 103);

    let messages = session.submit_input_at("execute", 104);
    assert!(contains_line(&messages, "Execution failed:"));
    assert!(contains_line(&messages, "service unavailable"));
    assert_eq!(session.state(), SessionState::Completed);

    let result = session.last_result().expect("execution recorded");
    assert!(!result.success);
    assert_eq!(result.completed_steps.len(), 2);
    let failed = result
        .error
        .as_ref()
        .and_then(|error| error.step.as_ref())
        .expect("failing step recorded");
    assert_eq!(failed.id.as_str(), "book-hotel");

    let flow = session.selected_flow().expect("flow retained");
    let statuses: Vec<StepStatus> = flow.steps.iter().map(|step| step.status).collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Completed,
            StepStatus::Completed,
            StepStatus::Failed
        ]
    );
}

struct FailingIntentSource;

impl IntentSource for FailingIntentSource {
    fn extract_intent(&self, _raw_text: &str, _now: i64) -> Result<Intent, IntentExtractionError> {
        Err(IntentExtractionError::Backend("model offline".to_string()))
    }
}

#[test]
fn chat_session_reports_intent_failure_and_allows_retry() {
    let mut session = ChatSession::new(
        Box::new(FailingIntentSource),
        Box::new(TemplateFlowPlanner::default()),
        FlowExecutor::new(Box::new(ServiceRunner::succeeding())),
    );
    let messages = session.submit_input_at("Book flight and hotel", 100);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Error);
    assert!(messages[0].body.contains("model offline"));
    assert_eq!(session.state(), SessionState::AwaitingIntent);
    assert!(session.intent().is_none());
}

struct FailingPlanner;

impl FlowPlanner for FailingPlanner {
    fn generate_flows(
        &self,
        _intent: &Intent,
        _now: i64,
    ) -> Result<Vec<deepflow::model::flow::Flow>, FlowGenerationError> {
        Err(FlowGenerationError::Backend("planner offline".to_string()))
    }
}

struct EmptyPlanner;

impl FlowPlanner for EmptyPlanner {
    fn generate_flows(
        &self,
        _intent: &Intent,
        _now: i64,
    ) -> Result<Vec<deepflow::model::flow::Flow>, FlowGenerationError> {
        Ok(Vec::new())
    }
}

#[test]
fn chat_session_reports_planner_failure_and_stays_put() {
    let mut session = ChatSession::new(
        Box::new(KeywordIntentSource::default()),
        Box::new(FailingPlanner),
        FlowExecutor::new(Box::new(ServiceRunner::succeeding())),
    );
    let messages = session.submit_input_at("Book flight and hotel", 100);
    assert!(contains_line(&messages, "Flow generation failed"));
    assert_eq!(session.state(), SessionState::AwaitingIntent);
    assert!(session.intent().is_none());
    assert!(session.flows().is_empty());
}

#[test]
fn chat_session_reports_when_no_workflow_matches() {
    let mut session = ChatSession::new(
        Box::new(KeywordIntentSource::default()),
        Box::new(EmptyPlanner),
        FlowExecutor::new(Box::new(ServiceRunner::succeeding())),
    );
    let messages = session.submit_input_at("Book flight and hotel", 100);
    assert!(contains_line(&messages, "No workflow found"));
    assert_eq!(session.state(), SessionState::AwaitingIntent);
}

#[test]
fn chat_session_completed_state_points_at_reset() {
    let mut session = travel_session(ServiceRunner::succeeding());
    session.submit_input_at("Book flight and hotel", 100);
    session.submit_input_at("1", 101);
    session.submit_input_at("flight-api: KEY1", 102);
    session.submit_input_at("hotel-api: KEY2", 103);
    session.submit_input_at("execute", 104);
    assert_eq!(session.state(), SessionState::Completed);

    let messages = session.submit_input_at("Book another trip", 105);
    assert!(contains_line(&messages, "Reset it to start a new request"));
    assert_eq!(session.state(), SessionState::Completed);

    session.reset();
    assert_eq!(session.state(), SessionState::AwaitingIntent);
    assert!(session.last_result().is_none());
    assert!(session.missing_resources().is_empty());
    assert!(session.selected_flow().is_none());

    // A fresh request goes around again.
    let messages = session.submit_input_at("schedule a meeting", 106);
    assert!(contains_line(&messages, "Understood your intent"));
    assert_eq!(session.state(), SessionState::AwaitingFlowSelection);
}

#[test]
fn chat_session_records_both_directions_in_the_transcript() {
    let mut session = travel_session(ServiceRunner::succeeding());
    session.submit_input_at("Book flight and hotel", 100);

    let transcript = session.transcript();
    assert!(!transcript.is_empty());
    let rendered = transcript
        .render_recent(deepflow::session::transcript::TranscriptLimits::default())
        .expect("rendered");
    assert!(rendered.contains("[user] Book flight and hotel"));
    assert!(rendered.contains("[assistant] Understood your intent"));
}

#[test]
fn chat_session_exports_transcript_under_its_state_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = travel_session(ServiceRunner::succeeding()).with_state_root(dir.path());
    session.submit_input_at("Book flight and hotel", 100);
    session.export_transcript().expect("export");

    let raw = std::fs::read_to_string(dir.path().join("conversations/session.jsonl"))
        .expect("exported transcript");
    assert!(raw.lines().count() >= 2);
    // Session transitions also land in the state-root log.
    let log = std::fs::read_to_string(dir.path().join("logs/session.log")).expect("log");
    assert!(log.contains("session transition awaiting_intent -> awaiting_flow_selection"));
}

#[test]
fn chat_session_skips_resource_collection_when_store_is_prefilled() {
    use deepflow::shared::ids::ResourceId;

    let mut session = travel_session(ServiceRunner::succeeding());
    session.add_resource(
        ResourceId::parse("flight-api").expect("resource id"),
        json!("KEY1"),
    );
    session.add_resource(
        ResourceId::parse("hotel-api").expect("resource id"),
        json!("KEY2"),
    );
    // Overwriting an id keeps a single entry rather than duplicating.
    session.add_resource(
        ResourceId::parse("hotel-api").expect("resource id"),
        json!("KEY2-ROTATED"),
    );

    session.submit_input_at("Book flight and hotel", 100);
    let messages = session.submit_input_at("1", 101);
    assert!(contains_line(&messages, "All resources available"));
    assert_eq!(session.state(), SessionState::ReadyToExecute);
    assert!(session.missing_resources().is_empty());
    assert_eq!(session.resource("hotel-api"), Some(&json!("KEY2-ROTATED")));
}

#[test]
fn chat_session_guides_on_blank_first_input() {
    let mut session = travel_session(ServiceRunner::succeeding());
    let messages = session.submit_input_at("   ", 100);
    assert_eq!(
        bodies(&messages),
        vec!["Describe what you would like to accomplish."]
    );
    assert_eq!(session.state(), SessionState::AwaitingIntent);
}
