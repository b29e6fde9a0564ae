use serde::{Deserialize, Serialize};

/// The phases a session persists between inputs. Intent parsing, flow
/// selection, and execution resolve within a single input cycle, so
/// only their surrounding wait-states are observable here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    AwaitingIntent,
    AwaitingFlowSelection,
    AwaitingResources,
    ReadyToExecute,
    Completed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (SessionState::AwaitingIntent, SessionState::AwaitingFlowSelection)
                | (SessionState::AwaitingFlowSelection, SessionState::AwaitingResources)
                | (SessionState::AwaitingFlowSelection, SessionState::ReadyToExecute)
                | (SessionState::AwaitingResources, SessionState::ReadyToExecute)
                | (SessionState::ReadyToExecute, SessionState::Completed)
                | (SessionState::Completed, SessionState::AwaitingIntent)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::AwaitingIntent => write!(f, "awaiting_intent"),
            SessionState::AwaitingFlowSelection => write!(f, "awaiting_flow_selection"),
            SessionState::AwaitingResources => write!(f, "awaiting_resources"),
            SessionState::ReadyToExecute => write!(f, "ready_to_execute"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// What one raw input means in the current state. Classification never
/// fails; input that matches nothing for the state becomes
/// `Unrecognized` and is answered with guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    GoalSubmitted { raw_text: String },
    /// 1-based choice as the user typed it; range-checked on apply.
    FlowChosen { choice: usize },
    ResourceSubmitted { id: String, value: String },
    ExecuteRequested,
    Unrecognized { raw_text: String },
}

/// Maps raw input to the event it means in `state`.
///
/// Resource lines split on the first colon: the id is trimmed, the
/// value is the trimmed remainder with any further colons preserved
/// (timestamps and urls may contain them). A line without a colon is
/// not a resource submission.
pub fn classify_input(state: SessionState, input: &str) -> SessionEvent {
    let trimmed = input.trim();
    match state {
        SessionState::AwaitingIntent => {
            if trimmed.is_empty() {
                SessionEvent::Unrecognized {
                    raw_text: input.to_string(),
                }
            } else {
                SessionEvent::GoalSubmitted {
                    raw_text: trimmed.to_string(),
                }
            }
        }
        SessionState::AwaitingFlowSelection => match trimmed.parse::<usize>() {
            Ok(choice) => SessionEvent::FlowChosen { choice },
            Err(_) => SessionEvent::Unrecognized {
                raw_text: input.to_string(),
            },
        },
        SessionState::AwaitingResources => match split_resource_line(trimmed) {
            Some((id, value)) => SessionEvent::ResourceSubmitted { id, value },
            None => SessionEvent::Unrecognized {
                raw_text: input.to_string(),
            },
        },
        SessionState::ReadyToExecute => {
            if trimmed.eq_ignore_ascii_case("execute") {
                SessionEvent::ExecuteRequested
            } else {
                SessionEvent::Unrecognized {
                    raw_text: input.to_string(),
                }
            }
        }
        SessionState::Completed => SessionEvent::Unrecognized {
            raw_text: input.to_string(),
        },
    }
}

fn split_resource_line(input: &str) -> Option<(String, String)> {
    let (id, value) = input.split_once(':')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some((id.to_string(), value.trim().to_string()))
}
