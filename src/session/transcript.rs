use crate::session::message::{MessageKind, OutboundMessage};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptLimits {
    pub max_turns: usize,
    pub max_chars: usize,
}

impl Default for TranscriptLimits {
    fn default() -> Self {
        Self {
            max_turns: 8,
            max_chars: 6000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TurnDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnRecord {
    timestamp: i64,
    direction: TurnDirection,
    body: String,
    #[serde(default)]
    kind: Option<MessageKind>,
}

/// In-memory record of a session's conversation, in arrival order.
/// Export is on request only; the session itself never persists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<TurnRecord>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_inbound(&mut self, timestamp: i64, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        self.turns.push(TurnRecord {
            timestamp,
            direction: TurnDirection::Inbound,
            body: body.to_string(),
            kind: None,
        });
    }

    pub fn record_outbound(&mut self, timestamp: i64, message: &OutboundMessage) {
        if message.body.trim().is_empty() {
            return;
        }
        self.turns.push(TurnRecord {
            timestamp,
            direction: TurnDirection::Outbound,
            body: message.body.clone(),
            kind: Some(message.kind),
        });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Renders the most recent turns oldest-first, newest-first when
    /// trimming to the char budget, like a chat log tail. Returns None
    /// when nothing fits.
    pub fn render_recent(&self, limits: TranscriptLimits) -> Option<String> {
        if limits.max_turns == 0 || limits.max_chars == 0 || self.turns.is_empty() {
            return None;
        }

        let keep_from = self.turns.len().saturating_sub(limits.max_turns);
        let recent = &self.turns[keep_from..];

        let mut selected_lines = Vec::<String>::new();
        let mut used = 0usize;
        for line in recent.iter().rev().map(render_turn) {
            let line_len = line.chars().count();
            let sep = if selected_lines.is_empty() { 0 } else { 1 };
            if used + sep + line_len > limits.max_chars {
                break;
            }
            used += sep + line_len;
            selected_lines.push(line);
        }
        if selected_lines.is_empty() {
            return None;
        }
        selected_lines.reverse();
        Some(selected_lines.join("\n"))
    }

    /// Appends every turn as one json object per line.
    pub fn export_jsonl(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for turn in &self.turns {
            let line = serde_json::to_string(turn).map_err(std::io::Error::other)?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }
}

fn render_turn(turn: &TurnRecord) -> String {
    let who = match turn.direction {
        TurnDirection::Inbound => "user",
        TurnDirection::Outbound => "assistant",
    };
    format!("[{who}] {}", turn.body.trim())
}
