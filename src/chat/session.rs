// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A single connected chat session.

use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::message::{seed_messages, ChatMessage, Sender};
use crate::config::ChatConfig;
use crate::events::AppEvent;
use crate::scheduler::{Scheduler, TaskHandle};

/// Identifies one connect-to-disconnect session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The scripted peer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoReply {
    pub text: String,
    pub delay: Duration,
}

impl From<&ChatConfig> for AutoReply {
    fn from(config: &ChatConfig) -> Self {
        Self {
            text: config.auto_reply_text.clone(),
            delay: config.auto_reply_delay(),
        }
    }
}

/// Message list for a connected device.
///
/// Messages are only ever appended. Pending auto-replies are owned by the
/// session, so dropping it cancels them.
pub struct ChatSession {
    id: SessionId,
    device_name: String,
    messages: Vec<ChatMessage>,
    auto_reply: AutoReply,
    pending_replies: Vec<(u64, TaskHandle)>,
    next_reply: u64,
}

impl ChatSession {
    /// Start a session seeded with the canned conversation.
    pub fn new(
        id: SessionId,
        device_name: impl Into<String>,
        auto_reply: AutoReply,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            device_name: device_name.into(),
            messages: seed_messages(now),
            auto_reply,
            pending_replies: Vec::new(),
            next_reply: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending_reply_count(&self) -> usize {
        self.pending_replies.len()
    }

    /// Append `text` as a local message and schedule the peer reply.
    ///
    /// Blank or whitespace-only input is ignored and returns `false`.
    pub fn send(&mut self, text: &str, scheduler: &dyn Scheduler) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        self.messages
            .push(ChatMessage::new(text, Sender::Me, scheduler.now()));

        let reply = self.next_reply;
        self.next_reply += 1;
        let handle = scheduler.schedule(
            self.auto_reply.delay,
            AppEvent::AutoReplyDue {
                session: self.id,
                reply,
            },
        );
        self.pending_replies.push((reply, handle));
        debug!(
            "Session {}: sent message, reply {} due in {:?}",
            self.id, reply, self.auto_reply.delay
        );
        true
    }

    /// Append the peer reply for `reply` if it is still pending.
    pub fn deliver_reply(&mut self, reply: u64, now: DateTime<Local>) -> bool {
        let Some(pos) = self
            .pending_replies
            .iter()
            .position(|(pending, _)| *pending == reply)
        else {
            return false;
        };
        self.pending_replies.remove(pos);

        self.messages
            .push(ChatMessage::new(self.auto_reply.text.clone(), Sender::Peer, now));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    const REPLY: &str = "Got it! Thanks for the message.";

    fn session(scheduler: &ManualScheduler) -> ChatSession {
        ChatSession::new(
            SessionId::new(1),
            "Demo Device",
            AutoReply {
                text: REPLY.to_string(),
                delay: Duration::from_millis(2000),
            },
            scheduler.now(),
        )
    }

    fn deliver_due(session: &mut ChatSession, scheduler: &ManualScheduler, by: Duration) {
        for event in scheduler.advance(by) {
            if let AppEvent::AutoReplyDue { session: id, reply } = event {
                assert_eq!(id, session.id());
                session.deliver_reply(reply, scheduler.now());
            }
        }
    }

    #[test]
    fn test_new_session_is_seeded() {
        let scheduler = ManualScheduler::new();
        let session = session(&scheduler);
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.pending_reply_count(), 0);
    }

    #[test]
    fn test_send_appends_immediately_and_replies_later() {
        let scheduler = ManualScheduler::new();
        let mut session = session(&scheduler);

        assert!(session.send("hi", &scheduler));
        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.messages()[3].text, "hi");
        assert_eq!(session.messages()[3].sender, Sender::Me);
        assert_eq!(session.pending_reply_count(), 1);

        deliver_due(&mut session, &scheduler, Duration::from_millis(1999));
        assert_eq!(session.messages().len(), 4);

        deliver_due(&mut session, &scheduler, Duration::from_millis(1));
        assert_eq!(session.messages().len(), 5);
        assert_eq!(session.messages()[4].text, REPLY);
        assert_eq!(session.messages()[4].sender, Sender::Peer);
        assert_eq!(session.pending_reply_count(), 0);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let scheduler = ManualScheduler::new();
        let mut session = session(&scheduler);

        for blank in ["", " ", "\t\n", "   \u{3000}"] {
            assert!(!session.send(blank, &scheduler), "{:?} should be ignored", blank);
        }
        assert_eq!(session.messages().len(), 3);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_text_is_kept_as_entered() {
        let scheduler = ManualScheduler::new();
        let mut session = session(&scheduler);

        session.send("  padded  ", &scheduler);
        assert_eq!(session.messages()[3].text, "  padded  ");
    }

    #[test]
    fn test_each_send_gets_exactly_one_reply() {
        let scheduler = ManualScheduler::new();
        let mut session = session(&scheduler);

        session.send("one", &scheduler);
        scheduler.advance(Duration::from_millis(500));
        session.send("two", &scheduler);

        deliver_due(&mut session, &scheduler, Duration::from_millis(5000));

        let texts: Vec<_> = session.messages()[3..].iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", REPLY, REPLY]);
    }

    #[test]
    fn test_unknown_reply_is_ignored() {
        let scheduler = ManualScheduler::new();
        let mut session = session(&scheduler);

        assert!(!session.deliver_reply(42, scheduler.now()));
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_dropping_session_cancels_replies() {
        let scheduler = ManualScheduler::new();
        let mut session = session(&scheduler);
        session.send("hi", &scheduler);
        assert_eq!(scheduler.pending_count(), 1);

        drop(session);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
    }
}
