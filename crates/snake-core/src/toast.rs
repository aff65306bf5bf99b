use std::time::Duration;

/// Maximum number of simultaneously visible messages.
pub const MAX_VISIBLE_MESSAGES: usize = 3;

/// Default auto-dismiss delay in seconds.
pub const DEFAULT_MESSAGE_DURATION_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    age: Duration,
}

impl Message {
    pub fn age(&self) -> Duration {
        self.age
    }
}

/// Messages shown to the player, dismissed after a fixed delay.
///
/// At most [`MAX_VISIBLE_MESSAGES`] are visible; the rest wait in a pending
/// queue and start aging once promoted.
#[derive(Debug)]
pub struct MessageBoard {
    visible: Vec<Message>,
    pending: Vec<Message>,
    duration: Duration,
}

impl MessageBoard {
    pub fn new(duration: Duration) -> Self {
        Self {
            visible: Vec::new(),
            pending: Vec::new(),
            duration,
        }
    }

    pub fn push(&mut self, kind: MessageKind, text: impl Into<String>) {
        let message = Message {
            kind,
            text: text.into(),
            age: Duration::ZERO,
        };
        if self.visible.len() < MAX_VISIBLE_MESSAGES {
            self.visible.push(message);
        } else {
            self.pending.push(message);
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Error, text);
    }

    pub fn visible(&self) -> &[Message] {
        &self.visible
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.pending.is_empty()
    }

    /// Age visible messages by `elapsed`, drop expired ones and promote
    /// pending messages into the freed slots. Returns whether the visible
    /// set changed.
    pub fn prune(&mut self, elapsed: Duration) -> bool {
        for message in &mut self.visible {
            message.age += elapsed;
        }
        let before = self.visible.len();
        self.visible.retain(|m| m.age < self.duration);
        let mut changed = self.visible.len() != before;
        while self.visible.len() < MAX_VISIBLE_MESSAGES && !self.pending.is_empty() {
            self.visible.push(self.pending.remove(0));
            changed = true;
        }
        changed
    }
}

impl Default for MessageBoard {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_MESSAGE_DURATION_SECS))
    }
}
