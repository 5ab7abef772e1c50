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

//! Root view: switches between the connect screen and the chat screen.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::bluetooth::{
    resolve_display_name, ChooserError, ChosenDevice, ConnectScreen, DeviceChooser, RequestOptions,
    DEMO_DEVICE_NAME,
};
use crate::chat::{AutoReply, ChatMessage, ChatSession, SessionId};
use crate::config::Config;
use crate::events::AppEvent;
use crate::notify::{Notifier, Toast};
use crate::scheduler::Scheduler;
use crate::state::{AppView, ConnectionState, ScreenView};

/// The two mutually exclusive screens.
pub enum Screen {
    Connect(ConnectScreen),
    Chat(ChatSession),
}

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Application root. Owned by the event loop; all mutation goes through
/// [`App::handle`].
pub struct App {
    config: Config,
    screen: Screen,
    scheduler: Arc<dyn Scheduler>,
    chooser: Arc<dyn DeviceChooser>,
    notifier: Arc<dyn Notifier>,
    events: mpsc::UnboundedSender<AppEvent>,
    next_session: u64,
}

impl App {
    pub fn new(
        config: Config,
        scheduler: Arc<dyn Scheduler>,
        chooser: Arc<dyn DeviceChooser>,
        notifier: Arc<dyn Notifier>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            config,
            screen: Screen::Connect(ConnectScreen::new()),
            scheduler,
            chooser,
            notifier,
            events,
            next_session: 1,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn connection_state(&self) -> ConnectionState {
        match &self.screen {
            Screen::Connect(_) => ConnectionState::Disconnected,
            Screen::Chat(session) => ConnectionState::Connected {
                device_name: session.device_name().to_string(),
            },
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.screen, Screen::Chat(_))
    }

    /// Messages of the live session, empty while disconnected.
    pub fn messages(&self) -> &[ChatMessage] {
        match &self.screen {
            Screen::Chat(session) => session.messages(),
            Screen::Connect(_) => &[],
        }
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> AppView {
        let screen = match &self.screen {
            Screen::Connect(screen) => ScreenView::Connect {
                busy: screen.is_busy(),
                status: screen.phase().status_text(),
            },
            Screen::Chat(session) => ScreenView::chat(session.device_name(), session.messages()),
        };
        AppView {
            connection: self.connection_state(),
            screen,
        }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::ScanRequested => self.on_scan_requested(),
            AppEvent::DemoRequested => self.on_demo_requested(),
            AppEvent::ChooserFinished(result) => self.on_chooser_finished(result),
            AppEvent::ConnectDelayElapsed => self.on_connect_delay_elapsed(),
            AppEvent::DemoReady => self.on_demo_ready(),
            AppEvent::SendRequested(text) => self.on_send_requested(&text),
            AppEvent::AutoReplyDue { session, reply } => self.on_auto_reply_due(session, reply),
            AppEvent::DisconnectRequested => self.on_disconnect_requested(),
            AppEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn on_scan_requested(&mut self) {
        let Screen::Connect(screen) = &mut self.screen else {
            debug!("Scan requested while connected, ignoring");
            return;
        };
        if !screen.start_scan() {
            debug!("Connect screen busy ({:?}), ignoring scan", screen.phase());
            return;
        }

        info!("Requesting device from {} chooser", self.chooser.backend_name());
        let chooser = self.chooser.clone();
        let options = RequestOptions::from_config(&self.config.bluetooth);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = chooser.request_device(options).await;
            if events.send(AppEvent::ChooserFinished(result)).is_err() {
                debug!("Event loop closed, dropping chooser result");
            }
        });
    }

    fn on_demo_requested(&mut self) {
        let Screen::Connect(screen) = &mut self.screen else {
            debug!("Demo requested while connected, ignoring");
            return;
        };
        if screen.start_demo(self.scheduler.as_ref(), self.config.demo.connect_delay()) {
            info!("Starting demo connection");
        } else {
            debug!("Connect screen busy ({:?}), ignoring demo", screen.phase());
        }
    }

    fn on_chooser_finished(&mut self, result: Result<ChosenDevice, ChooserError>) {
        let Screen::Connect(screen) = &mut self.screen else {
            debug!("Chooser finished after leaving the connect screen, ignoring");
            return;
        };

        match result {
            Ok(device) => {
                let device_name = resolve_display_name(device.name.as_deref());
                if !screen.scan_succeeded(
                    device_name.clone(),
                    self.scheduler.as_ref(),
                    self.config.bluetooth.connect_delay(),
                ) {
                    debug!("Stale chooser result for {}, ignoring", device_name);
                    return;
                }
                info!(
                    "Device chosen: {} ({})",
                    device_name,
                    device.address.as_deref().unwrap_or("no address")
                );
                self.notifier.notify(Toast::device_found(&device_name));
            }
            Err(err) => {
                if !screen.scan_failed() {
                    debug!("Stale chooser error, ignoring: {}", err);
                    return;
                }
                if err.is_unsupported() {
                    warn!("Bluetooth unavailable: {}", err);
                    self.notifier.notify(Toast::bluetooth_unsupported(err.detail()));
                } else {
                    error!("Bluetooth scan error: {}", err);
                    self.notifier.notify(Toast::connection_failed());
                }
            }
        }
    }

    fn on_connect_delay_elapsed(&mut self) {
        let Screen::Connect(screen) = &mut self.screen else {
            debug!("Connect delay elapsed while connected, ignoring");
            return;
        };
        match screen.take_connected_device() {
            Some(device_name) => self.enter_chat(device_name),
            None => debug!("No device pending connection, ignoring"),
        }
    }

    fn on_demo_ready(&mut self) {
        let Screen::Connect(screen) = &mut self.screen else {
            debug!("Demo timer fired while connected, ignoring");
            return;
        };
        if !screen.finish_demo() {
            debug!("Demo timer fired outside demo mode, ignoring");
            return;
        }
        self.enter_chat(DEMO_DEVICE_NAME.to_string());
        self.notifier.notify(Toast::demo_mode());
    }

    fn on_send_requested(&mut self, text: &str) {
        let Screen::Chat(session) = &mut self.screen else {
            debug!("Send requested while disconnected, ignoring");
            return;
        };
        if !session.send(text, self.scheduler.as_ref()) {
            debug!("Ignoring blank message");
        }
    }

    fn on_auto_reply_due(&mut self, session: SessionId, reply: u64) {
        let Screen::Chat(live) = &mut self.screen else {
            debug!("Dropping auto-reply for closed session {}", session);
            return;
        };
        if live.id() != session {
            debug!(
                "Dropping auto-reply for session {} (live session is {})",
                session,
                live.id()
            );
            return;
        }
        if !live.deliver_reply(reply, self.scheduler.now()) {
            debug!("Auto-reply {} no longer pending", reply);
        }
    }

    fn on_disconnect_requested(&mut self) {
        match &self.screen {
            Screen::Chat(session) => info!(
                "Disconnecting from {} (session {}, {} pending replies cancelled)",
                session.device_name(),
                session.id(),
                session.pending_reply_count()
            ),
            Screen::Connect(_) => {
                debug!("Disconnect requested while disconnected, ignoring");
                return;
            }
        }
        self.screen = Screen::Connect(ConnectScreen::new());
    }

    fn enter_chat(&mut self, device_name: String) {
        let id = SessionId::new(self.next_session);
        self.next_session += 1;
        info!("Connected to {} (session {})", device_name, id);

        let session = ChatSession::new(
            id,
            device_name,
            AutoReply::from(&self.config.chat),
            self.scheduler.now(),
        );
        self.screen = Screen::Chat(session);
    }
}
