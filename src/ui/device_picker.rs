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

//! Device picker dialog shown during a Bluetooth scan.

use futures::future::BoxFuture;
use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Label, ListBox, Orientation, ScrolledWindow, Window};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use bluetooth_messenger::bluetooth::{DeviceCandidate, DevicePicker};
use bluetooth_messenger::events::{PickRequest, UiUpdate};

/// Seconds before an unanswered picker cancels itself.
const PICKER_TIMEOUT_SECS: u32 = 60;

type ReplySlot = Rc<RefCell<Option<oneshot::Sender<Option<DeviceCandidate>>>>>;

/// Asks the UI thread to show the picker and waits for the answer.
pub struct ChannelPicker {
    ui: async_channel::Sender<UiUpdate>,
}

impl ChannelPicker {
    pub fn new(ui: async_channel::Sender<UiUpdate>) -> Self {
        Self { ui }
    }
}

impl DevicePicker for ChannelPicker {
    fn pick(&self, candidates: Vec<DeviceCandidate>) -> BoxFuture<'static, Option<DeviceCandidate>> {
        let ui = self.ui.clone();
        Box::pin(async move {
            let (reply, response) = oneshot::channel();
            let request = PickRequest { candidates, reply };
            if let Err(e) = ui.send(UiUpdate::PickDevice(request)).await {
                warn!("Device picker unavailable: {}", e);
                return None;
            }
            response.await.unwrap_or_else(|_| {
                warn!("Device picker closed without answering");
                None
            })
        })
    }
}

/// Show the picker as a modal dialog over `parent`.
pub fn show_device_picker(parent: &impl IsA<Window>, request: PickRequest) {
    let PickRequest { candidates, reply } = request;
    info!("Showing device picker with {} candidate(s)", candidates.len());

    let reply: ReplySlot = Rc::new(RefCell::new(Some(reply)));
    let candidates = Rc::new(candidates);

    let window = Window::builder()
        .title("Bluetooth Messenger - Choose a Device")
        .transient_for(parent)
        .modal(true)
        .default_width(380)
        .default_height(360)
        .build();

    let main_box = GtkBox::new(Orientation::Vertical, 16);
    main_box.set_margin_top(24);
    main_box.set_margin_bottom(24);
    main_box.set_margin_start(24);
    main_box.set_margin_end(24);

    let title = Label::new(Some("Choose a Device"));
    title.add_css_class("title-2");
    main_box.append(&title);

    let note = Label::new(Some("Select the device to pair with."));
    note.add_css_class("dim-label");
    main_box.append(&note);

    let list_box = ListBox::new();
    list_box.add_css_class("boxed-list");
    for candidate in candidates.iter() {
        let label = Label::new(Some(&candidate.label()));
        label.set_halign(Align::Start);
        label.set_margin_top(8);
        label.set_margin_bottom(8);
        label.set_margin_start(12);
        label.set_margin_end(12);
        list_box.append(&label);
    }
    list_box.select_row(list_box.row_at_index(0).as_ref());

    let scrolled = ScrolledWindow::builder()
        .vexpand(true)
        .min_content_height(180)
        .child(&list_box)
        .build();
    main_box.append(&scrolled);

    let button_box = GtkBox::new(Orientation::Horizontal, 12);
    button_box.set_halign(Align::End);

    let cancel_button = Button::with_label("Cancel");
    let pair_button = Button::with_label("Pair");
    pair_button.add_css_class("suggested-action");
    button_box.append(&cancel_button);
    button_box.append(&pair_button);
    main_box.append(&button_box);

    window.set_child(Some(&main_box));

    // Pair with the selected row
    let window_pair = window.clone();
    let reply_pair = reply.clone();
    let candidates_pair = candidates.clone();
    let list_pair = list_box.clone();
    pair_button.connect_clicked(move |_| {
        let choice = list_pair
            .selected_row()
            .and_then(|row| candidate_at(&candidates_pair, row.index()));
        respond(&reply_pair, choice);
        window_pair.close();
    });

    // Double-click / Enter on a row
    let window_activate = window.clone();
    let reply_activate = reply.clone();
    list_box.connect_row_activated(move |_, row| {
        respond(&reply_activate, candidate_at(&candidates, row.index()));
        window_activate.close();
    });

    let window_cancel = window.clone();
    let reply_cancel = reply.clone();
    cancel_button.connect_clicked(move |_| {
        respond(&reply_cancel, None);
        window_cancel.close();
    });

    let reply_close = reply.clone();
    window.connect_close_request(move |_| {
        respond(&reply_close, None);
        glib::Propagation::Proceed
    });

    let window_timeout = window.clone();
    glib::timeout_add_seconds_local_once(PICKER_TIMEOUT_SECS, move || {
        if reply.borrow().is_some() {
            info!("Device picker timed out");
            respond(&reply, None);
            window_timeout.close();
        }
    });

    window.present();
}

fn candidate_at(candidates: &[DeviceCandidate], index: i32) -> Option<DeviceCandidate> {
    usize::try_from(index)
        .ok()
        .and_then(|i| candidates.get(i))
        .cloned()
}

/// Answer the chooser once; later calls are no-ops.
fn respond(reply: &ReplySlot, choice: Option<DeviceCandidate>) {
    if let Some(sender) = reply.borrow_mut().take() {
        if sender.send(choice).is_err() {
            debug!("Chooser stopped waiting for the picker");
        }
    }
}
