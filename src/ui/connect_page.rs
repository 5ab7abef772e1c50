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

//! Connect screen: scan or demo mode.

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Label, Orientation, Spinner};
use tokio::sync::mpsc;

use bluetooth_messenger::events::AppEvent;

use super::emit;

const REQUIREMENTS: [&str; 3] = [
    "Bluetooth adapter present and powered on",
    "BlueZ (bluetoothd) running",
    "Access to the system D-Bus",
];

/// Widgets of the connect screen.
#[derive(Clone)]
pub struct ConnectPage {
    root: GtkBox,
    scan_button: Button,
    scan_label: Label,
    spinner: Spinner,
    demo_button: Button,
}

impl ConnectPage {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let root = GtkBox::new(Orientation::Vertical, 12);
        root.add_css_class("card");
        root.set_valign(Align::Start);

        let inner = GtkBox::new(Orientation::Vertical, 12);
        inner.set_margin_top(24);
        inner.set_margin_bottom(24);
        inner.set_margin_start(24);
        inner.set_margin_end(24);

        let heading = Label::new(Some("Connect Device"));
        heading.add_css_class("title-2");
        inner.append(&heading);

        let description = Label::new(Some("Scan for nearby Bluetooth devices to start messaging"));
        description.add_css_class("dim-label");
        description.set_wrap(true);
        inner.append(&description);

        // Scan button with inline spinner
        let spinner = Spinner::new();
        spinner.set_visible(false);
        let scan_label = Label::new(Some("Scan for Devices"));
        let scan_content = GtkBox::new(Orientation::Horizontal, 8);
        scan_content.set_halign(Align::Center);
        scan_content.append(&spinner);
        scan_content.append(&scan_label);

        let scan_button = Button::new();
        scan_button.set_child(Some(&scan_content));
        scan_button.add_css_class("suggested-action");
        scan_button.add_css_class("pill");
        inner.append(&scan_button);

        let or_label = Label::new(Some("OR"));
        or_label.add_css_class("caption");
        or_label.add_css_class("dim-label");
        inner.append(&or_label);

        let demo_button = Button::with_label("Try Demo Mode");
        demo_button.add_css_class("pill");
        inner.append(&demo_button);

        inner.append(&requirements_box());
        root.append(&inner);

        let events_scan = events.clone();
        scan_button.connect_clicked(move |_| emit(&events_scan, AppEvent::ScanRequested));
        demo_button.connect_clicked(move |_| emit(&events, AppEvent::DemoRequested));

        Self {
            root,
            scan_button,
            scan_label,
            spinner,
            demo_button,
        }
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    pub fn render(&self, busy: bool, status: &str) {
        self.scan_button.set_sensitive(!busy);
        self.demo_button.set_sensitive(!busy);
        self.spinner.set_visible(busy);
        self.spinner.set_spinning(busy);
        self.scan_label.set_text(status);
    }
}

fn requirements_box() -> GtkBox {
    let container = GtkBox::new(Orientation::Vertical, 4);
    container.set_margin_top(8);

    let title = Label::new(Some("Requirements:"));
    title.add_css_class("heading");
    title.set_halign(Align::Start);
    container.append(&title);

    for requirement in REQUIREMENTS {
        let label = Label::new(Some(&format!("•  {}", requirement)));
        label.add_css_class("dim-label");
        label.set_halign(Align::Start);
        container.append(&label);
    }
    container
}
