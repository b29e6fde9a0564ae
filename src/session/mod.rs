pub mod chat;
pub mod message;
pub mod resources;
pub mod state;
pub mod transcript;

pub use chat::ChatSession;
pub use message::{MessageKind, OutboundMessage};
pub use resources::ResourceStore;
pub use state::{classify_input, SessionEvent, SessionState};
pub use transcript::{Transcript, TranscriptLimits};
