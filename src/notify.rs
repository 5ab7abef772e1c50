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

//! User-visible toast notifications.

use parking_lot::Mutex;
use tracing::warn;

use crate::events::UiUpdate;

/// Visual weight of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// A transient, auto-dismissing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            ..Self::new(title, description)
        }
    }

    /// No usable Bluetooth stack on this machine.
    pub fn bluetooth_unsupported(detail: &str) -> Self {
        Self::destructive(
            "Bluetooth Not Supported",
            format!(
                "No usable Bluetooth adapter was found ({}). Try demo mode instead.",
                detail
            ),
        )
    }

    pub fn device_found(device_name: &str) -> Self {
        Self::new("Device Found", format!("Found {}", device_name))
    }

    pub fn connection_failed() -> Self {
        Self::destructive(
            "Connection Failed",
            "Could not connect to device. Please try again.",
        )
    }

    pub fn demo_mode() -> Self {
        Self::new("Demo Mode", "Connected in demo mode")
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

/// Sink for toasts. Fire-and-forget; never blocks.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Forwards toasts to the UI thread.
pub struct ChannelNotifier {
    ui: async_channel::Sender<UiUpdate>,
}

impl ChannelNotifier {
    pub fn new(ui: async_channel::Sender<UiUpdate>) -> Self {
        Self { ui }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, toast: Toast) {
        if let Err(e) = self.ui.try_send(UiUpdate::Toast(toast)) {
            warn!("Dropping toast, UI unavailable: {}", e);
        }
    }
}

/// Keeps every toast in memory. Used by tests and headless runs.
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all toasts so far.
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    /// Remove and return all toasts so far.
    pub fn take(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}
