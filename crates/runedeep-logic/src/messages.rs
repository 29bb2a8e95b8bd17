//! Channel-tagged player messages.

use serde::{Deserialize, Serialize};

/// Message channel, used by front ends for colouring and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Plain,
    Prompt,
    /// An effect is about to run out.
    Duration,
    /// An effect ended or the actor recovered.
    Recovery,
    Warning,
    Danger,
    Intrinsic,
    Pray,
    Monster,
    Sound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel: Channel,
    pub text: String,
}

/// Write-only destination for messages. The engine never reads back what it
/// emitted through a sink.
pub trait MessageSink {
    fn emit(&mut self, channel: Channel, text: &str);
}

impl MessageSink for Vec<Message> {
    fn emit(&mut self, channel: Channel, text: &str) {
        self.push(Message {
            channel,
            text: text.to_string(),
        });
    }
}

/// Messages produced during the current turn that the player has not
/// acknowledged yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    pending: Vec<Message>,
    unread: usize,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_unread(&self) -> bool {
        self.unread > 0
    }

    pub fn pending(&self) -> &[Message] {
        &self.pending
    }

    /// The player has seen everything so far ("--more--" was answered).
    pub fn mark_read(&mut self) {
        self.unread = 0;
    }

    /// Hand every pending message to `sink`, oldest first.
    pub fn flush_into(&mut self, sink: &mut dyn MessageSink) {
        for message in self.pending.drain(..) {
            sink.emit(message.channel, &message.text);
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.pending.iter().any(|m| m.text == text)
    }
}

impl MessageSink for MessageLog {
    fn emit(&mut self, channel: Channel, text: &str) {
        self.pending.push(Message {
            channel,
            text: text.to_string(),
        });
        self.unread += 1;
    }
}
