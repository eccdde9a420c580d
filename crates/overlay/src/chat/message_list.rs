use crate::chat::message::{Message, MessageKind, SessionId};
use crate::chat::session::ChatSession;

/// Tracks which messages of a session a line-oriented renderer has already
/// printed.
///
/// The log is append-only within a session, so a count is enough; a new
/// session id restarts the count.
#[derive(Debug, Clone, Default)]
pub struct MessageList {
    session_id: Option<SessionId>,
    rendered: usize,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// Returns the lines for messages appended since the previous call.
    pub fn sync(&mut self, session: &ChatSession) -> Vec<String> {
        if self.session_id != Some(session.session_id()) {
            self.session_id = Some(session.session_id());
            self.rendered = 0;
        }

        let messages = session.messages();
        // Clamp in case the log was cleared without a session change.
        let start = self.rendered.min(messages.len());
        let lines = messages[start..].iter().map(format_message).collect();
        self.rendered = messages.len();
        lines
    }
}

pub fn format_message(message: &Message) -> String {
    let speaker = match message.kind {
        MessageKind::User => "you",
        MessageKind::Response => "bot",
        MessageKind::Error => "error",
    };
    format!("[{}] {speaker}: {}", message.id, message.text)
}
