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

//! Chat message model and display helpers.

use chrono::{DateTime, Duration, Local};
use uuid::Uuid;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The local user.
    Me,
    /// The connected device.
    Peer,
}

/// A single chat message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: Sender, timestamp: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.sender == Sender::Me
    }
}

/// The canned conversation every session starts with.
pub fn seed_messages(now: DateTime<Local>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(
            "Hey! Are you here?",
            Sender::Peer,
            now - Duration::seconds(120),
        ),
        ChatMessage::new("Yeah...", Sender::Me, now - Duration::seconds(60)),
        ChatMessage::new(
            "Great work on the slides! Love it! Just one more thing...",
            Sender::Peer,
            now - Duration::seconds(30),
        ),
    ]
}

/// 24-hour `HH:MM`.
pub fn format_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%H:%M").to_string()
}

/// Uppercased first character of a device name, empty for an empty name.
pub fn avatar_initial(device_name: &str) -> String {
    device_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}
