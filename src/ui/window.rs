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

//! Main window: header, screen stack and toast overlay.

use gtk4::prelude::*;
use gtk4::{Box as GtkBox, Label, Orientation, Stack, StackTransitionType};
use libadwaita as adw;
use std::cell::Cell;
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use bluetooth_messenger::events::{AppEvent, UiUpdate};
use bluetooth_messenger::notify::{Toast, ToastVariant};
use bluetooth_messenger::state::{AppView, ScreenView};

use super::chat_page::ChatPage;
use super::connect_page::ConnectPage;
use super::device_picker::show_device_picker;
use super::emit;

const CONNECT_PAGE: &str = "connect";
const CHAT_PAGE: &str = "chat";

/// Build the main window and start consuming UI updates.
pub fn build_main_window(
    app: &adw::Application,
    events: mpsc::UnboundedSender<AppEvent>,
    updates: async_channel::Receiver<UiUpdate>,
    toast_timeout: u32,
) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Bluetooth Messenger")
        .default_width(560)
        .default_height(760)
        .build();

    let content = GtkBox::new(Orientation::Vertical, 0);
    content.append(&adw::HeaderBar::new());

    let body = GtkBox::new(Orientation::Vertical, 16);
    body.set_margin_top(24);
    body.set_margin_bottom(24);
    body.set_margin_start(24);
    body.set_margin_end(24);

    let title = Label::new(Some("Bluetooth Messenger"));
    title.add_css_class("title-1");
    body.append(&title);

    let subtitle = Label::new(Some("Connect and chat across devices wirelessly"));
    subtitle.add_css_class("dim-label");
    body.append(&subtitle);

    let connect_page = ConnectPage::new(events.clone());
    let chat_page = ChatPage::new(events.clone());

    let stack = Stack::new();
    stack.set_transition_type(StackTransitionType::Crossfade);
    stack.set_vexpand(true);
    stack.add_named(connect_page.widget(), Some(CONNECT_PAGE));
    stack.add_named(chat_page.widget(), Some(CHAT_PAGE));
    body.append(&stack);
    content.append(&body);

    let overlay = adw::ToastOverlay::new();
    overlay.set_child(Some(&content));
    window.set_content(Some(&overlay));

    let shutdown = CloseGuard::new(events);

    // Closing the window ends the session
    let shutdown_request = shutdown.clone();
    window.connect_close_request(move |_| {
        info!("Main window closing");
        shutdown_request.window_closed();
        glib::Propagation::Proceed
    });

    let window_updates = window.clone();
    glib::MainContext::default().spawn_local(async move {
        while let Ok(update) = updates.recv().await {
            match update {
                UiUpdate::View(view) => render(&view, &stack, &connect_page, &chat_page),
                UiUpdate::Toast(toast) => overlay.add_toast(build_toast(&toast, toast_timeout)),
                UiUpdate::PickDevice(request) => show_device_picker(&window_updates, request),
                UiUpdate::Close => {
                    shutdown.loop_stopped();
                    window_updates.close();
                    break;
                }
            }
        }
        debug!("UI update loop finished");
    });

    window.present();
}

/// Sends `Quit` when the window closes, unless the event loop stopped first.
#[derive(Clone)]
struct CloseGuard {
    events: mpsc::UnboundedSender<AppEvent>,
    loop_stopped: Rc<Cell<bool>>,
}

impl CloseGuard {
    fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            events,
            loop_stopped: Rc::new(Cell::new(false)),
        }
    }

    /// The event loop sent `Close`; nobody is listening any more.
    fn loop_stopped(&self) {
        self.loop_stopped.set(true);
    }

    fn window_closed(&self) {
        if self.loop_stopped.get() {
            debug!("Event loop already stopped, not sending quit");
            return;
        }
        emit(&self.events, AppEvent::Quit);
    }
}

fn render(view: &AppView, stack: &Stack, connect_page: &ConnectPage, chat_page: &ChatPage) {
    match &view.screen {
        ScreenView::Connect { busy, status } => {
            connect_page.render(*busy, status);
            stack.set_visible_child_name(CONNECT_PAGE);
        }
        ScreenView::Chat {
            device_name,
            avatar,
            messages,
        } => {
            chat_page.render(device_name, avatar, &view.connection, messages);
            stack.set_visible_child_name(CHAT_PAGE);
        }
    }
}

fn build_toast(toast: &Toast, timeout: u32) -> adw::Toast {
    let title = format!(
        "<b>{}</b>  {}",
        glib::markup_escape_text(&toast.title),
        glib::markup_escape_text(&toast.description)
    );
    let priority = match toast.variant {
        ToastVariant::Destructive => adw::ToastPriority::High,
        ToastVariant::Default => adw::ToastPriority::Normal,
    };
    adw::Toast::builder()
        .title(title)
        .timeout(timeout)
        .priority(priority)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_close_sends_quit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = CloseGuard::new(tx);

        guard.window_closed();
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Quit)));
    }

    #[test]
    fn test_close_after_loop_stopped_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = CloseGuard::new(tx);

        guard.clone().loop_stopped();
        guard.window_closed();
        assert!(rx.try_recv().is_err());
    }
}
