use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Info,
    Prompt,
    Error,
    Result,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Info => write!(f, "info"),
            MessageKind::Prompt => write!(f, "prompt"),
            MessageKind::Error => write!(f, "error"),
            MessageKind::Result => write!(f, "result"),
        }
    }
}

/// One human-readable line the session hands back to the caller for
/// display. `kind` tells the renderer how to present it; the body is
/// the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub kind: MessageKind,
    pub body: String,
}

impl OutboundMessage {
    pub fn info(body: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            body: body.into(),
        }
    }

    pub fn prompt(body: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Prompt,
            body: body.into(),
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            body: body.into(),
        }
    }

    pub fn result(body: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Result,
            body: body.into(),
        }
    }
}
