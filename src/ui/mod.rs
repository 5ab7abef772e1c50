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

//! UI module: main window, screens and the device picker.

mod chat_page;
mod connect_page;
mod device_picker;
mod window;

pub use device_picker::ChannelPicker;

use gtk4::prelude::*;
use libadwaita as adw;
use tokio::sync::mpsc;
use tracing::warn;

use bluetooth_messenger::config::Config;
use bluetooth_messenger::events::{AppEvent, UiUpdate};

const APP_ID: &str = "io.github.bluetooth_messenger.Desktop";

/// Run the GTK application on the current thread until the window closes.
pub fn run(
    config: &Config,
    events: mpsc::UnboundedSender<AppEvent>,
    updates: async_channel::Receiver<UiUpdate>,
) -> glib::ExitCode {
    let app = adw::Application::builder().application_id(APP_ID).build();
    let toast_timeout = config.ui.toast_timeout_secs;

    app.connect_activate(move |app| {
        if let Some(window) = app.active_window() {
            window.present();
            return;
        }
        window::build_main_window(app, events.clone(), updates.clone(), toast_timeout);
    });

    app.run_with_args::<&str>(&[])
}

/// Forward a user intent to the event loop.
fn emit(events: &mpsc::UnboundedSender<AppEvent>, event: AppEvent) {
    if let Err(e) = events.send(event) {
        warn!("Event loop not running, dropped {:?}", e.0);
    }
}
