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

//! Connection state and render snapshots.

use crate::chat::{avatar_initial, format_time, ChatMessage};

/// Connection status as seen by the root view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected { device_name: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn device_name(&self) -> Option<&str> {
        match self {
            ConnectionState::Connected { device_name } => Some(device_name),
            ConnectionState::Disconnected => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connected { .. } => "Connected",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "bluetooth-disabled-symbolic",
            ConnectionState::Connected { .. } => "bluetooth-active-symbolic",
        }
    }
}

/// Everything the UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppView {
    pub connection: ConnectionState,
    pub screen: ScreenView,
}

/// Per-screen render data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    Connect {
        /// Scan or demo in flight; both buttons are disabled.
        busy: bool,
        /// Label for the scan button.
        status: String,
    },
    Chat {
        device_name: String,
        avatar: String,
        messages: Vec<MessageView>,
    },
}

/// A single rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: String,
    pub text: String,
    pub time: String,
    pub mine: bool,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            text: message.text.clone(),
            time: format_time(&message.timestamp),
            mine: message.is_mine(),
        }
    }
}

impl ScreenView {
    pub fn chat(device_name: &str, messages: &[ChatMessage]) -> Self {
        ScreenView::Chat {
            device_name: device_name.to_string(),
            avatar: avatar_initial(device_name),
            messages: messages.iter().map(MessageView::from).collect(),
        }
    }
}
