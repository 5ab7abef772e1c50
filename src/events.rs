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

//! Event definitions and the main event loop.

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::app::{App, Flow};
use crate::bluetooth::{ChooserError, ChosenDevice, DeviceCandidate};
use crate::chat::SessionId;
use crate::notify::Toast;
use crate::state::AppView;

/// Events consumed by [`App::handle`].
#[derive(Debug)]
pub enum AppEvent {
    /// User asked to scan for a real device.
    ScanRequested,
    /// User asked for demo mode.
    DemoRequested,
    /// The device chooser returned.
    ChooserFinished(Result<ChosenDevice, ChooserError>),
    /// The simulated connect delay after a successful scan elapsed.
    ConnectDelayElapsed,
    /// The demo connect delay elapsed.
    DemoReady,
    /// User submitted the message input.
    SendRequested(String),
    /// A scheduled auto-reply came due.
    AutoReplyDue { session: SessionId, reply: u64 },
    /// User closed the chat.
    DisconnectRequested,
    /// Application is shutting down.
    Quit,
}

/// Updates pushed from the event loop to the UI thread.
#[derive(Debug)]
pub enum UiUpdate {
    /// Full snapshot of what to render.
    View(AppView),
    /// Show a transient notification.
    Toast(Toast),
    /// Ask the user to pick one of the discovered devices.
    PickDevice(PickRequest),
    /// Close the window.
    Close,
}

/// Request for the device picker dialog.
#[derive(Debug)]
pub struct PickRequest {
    pub candidates: Vec<DeviceCandidate>,
    pub reply: oneshot::Sender<Option<DeviceCandidate>>,
}

/// Run the application event loop until quit or Ctrl+C.
///
/// Every handled event is followed by a fresh view snapshot.
pub async fn run_event_loop(
    mut app: App,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
    ui: async_channel::Sender<UiUpdate>,
) -> Result<()> {
    publish(&ui, app.view()).await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    debug!("Event channel closed");
                    break;
                };
                if app.handle(event) == Flow::Quit {
                    info!("Quit requested");
                    break;
                }
                publish(&ui, app.view()).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if ui.send(UiUpdate::Close).await.is_err() {
        debug!("UI already gone");
    }
    Ok(())
}

async fn publish(ui: &async_channel::Sender<UiUpdate>, view: AppView) {
    if let Err(e) = ui.send(UiUpdate::View(view)).await {
        warn!("Failed to publish view: {}", e);
    }
}
