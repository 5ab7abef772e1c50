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

//! Bluetooth Messenger Desktop Application

mod ui;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bluetooth_messenger::app::App;
use bluetooth_messenger::bluetooth;
use bluetooth_messenger::config::Config;
use bluetooth_messenger::events::{self, AppEvent, UiUpdate};
use bluetooth_messenger::notify::ChannelNotifier;
use bluetooth_messenger::scheduler::TokioScheduler;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bluetooth_messenger=info".parse()?),
        )
        .init();

    info!(
        "Starting Bluetooth Messenger v{}...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded");

    // GTK owns the main thread; the core runs on the tokio workers.
    let runtime = tokio::runtime::Runtime::new()?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (ui_tx, ui_rx) = async_channel::unbounded::<UiUpdate>();

    let picker = Arc::new(ui::ChannelPicker::new(ui_tx.clone()));
    let chooser = bluetooth::create_chooser(&config.bluetooth, picker);
    info!("Device chooser: {}", chooser.backend_name());

    let app = {
        let _guard = runtime.enter();
        App::new(
            config.clone(),
            Arc::new(TokioScheduler::new(event_tx.clone())),
            chooser,
            Arc::new(ChannelNotifier::new(ui_tx.clone())),
            event_tx.clone(),
        )
    };
    let event_loop = runtime.spawn(events::run_event_loop(app, event_rx, ui_tx));

    info!("Ready. Opening main window.");
    let exit_code = ui::run(&config, event_tx.clone(), ui_rx);
    info!("Main window closed ({:?})", exit_code);

    // The window sends Quit on close; this covers a UI that exited early.
    if event_tx.send(AppEvent::Quit).is_err() {
        debug!("Event loop already stopped");
    }
    match runtime.block_on(event_loop) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Event loop failed: {}", e),
        Err(e) => error!("Event loop panicked: {}", e),
    }

    info!("Bluetooth Messenger stopped");
    Ok(())
}
