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

//! Chat screen: header, message list and input row.

use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, Entry, Image, Label, ListBox, ListBoxRow, Orientation,
    ScrolledWindow, SelectionMode,
};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;

use bluetooth_messenger::events::AppEvent;
use bluetooth_messenger::state::{ConnectionState, MessageView};

use super::emit;

/// Widgets of the chat screen.
#[derive(Clone)]
pub struct ChatPage {
    root: GtkBox,
    avatar: Label,
    device_label: Label,
    status_icon: Image,
    status_label: Label,
    list_box: ListBox,
    scrolled: ScrolledWindow,
    entry: Entry,
    /// Ids currently shown, to skip redundant rebuilds.
    rendered: Rc<RefCell<Vec<String>>>,
}

impl ChatPage {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let root = GtkBox::new(Orientation::Vertical, 0);
        root.add_css_class("card");

        // Header
        let header = GtkBox::new(Orientation::Horizontal, 12);
        header.set_margin_top(12);
        header.set_margin_bottom(12);
        header.set_margin_start(16);
        header.set_margin_end(12);

        let avatar = Label::new(None);
        avatar.add_css_class("title-3");
        avatar.add_css_class("accent");
        avatar.set_width_chars(2);
        header.append(&avatar);

        let name_box = GtkBox::new(Orientation::Vertical, 2);
        name_box.set_hexpand(true);
        let device_label = Label::new(None);
        device_label.add_css_class("heading");
        device_label.set_halign(Align::Start);
        name_box.append(&device_label);

        let badge = GtkBox::new(Orientation::Horizontal, 4);
        let status_icon = Image::new();
        let status_label = Label::new(None);
        status_label.add_css_class("caption");
        badge.append(&status_icon);
        badge.append(&status_label);
        name_box.append(&badge);
        header.append(&name_box);

        let disconnect_button = Button::from_icon_name("window-close-symbolic");
        disconnect_button.add_css_class("flat");
        disconnect_button.set_tooltip_text(Some("Disconnect"));
        disconnect_button.set_valign(Align::Center);
        header.append(&disconnect_button);
        root.append(&header);

        // Messages
        let list_box = ListBox::new();
        list_box.set_selection_mode(SelectionMode::None);
        let scrolled = ScrolledWindow::builder()
            .hexpand(true)
            .vexpand(true)
            .min_content_height(400)
            .build();
        scrolled.set_child(Some(&list_box));
        root.append(&scrolled);

        // Input row
        let input_row = GtkBox::new(Orientation::Horizontal, 8);
        input_row.set_margin_top(12);
        input_row.set_margin_bottom(12);
        input_row.set_margin_start(12);
        input_row.set_margin_end(12);

        let entry = Entry::builder()
            .placeholder_text("Enter Message")
            .hexpand(true)
            .build();
        let send_button = Button::from_icon_name("mail-send-symbolic");
        send_button.add_css_class("suggested-action");
        send_button.set_tooltip_text(Some("Send"));
        input_row.append(&entry);
        input_row.append(&send_button);
        root.append(&input_row);

        let submit = {
            let entry = entry.clone();
            let events = events.clone();
            Rc::new(move || {
                let text = entry.text().to_string();
                // Blank input stays in the field, like a rejected submit.
                if !text.trim().is_empty() {
                    entry.set_text("");
                }
                emit(&events, AppEvent::SendRequested(text));
            })
        };
        let submit_click = submit.clone();
        send_button.connect_clicked(move |_| submit_click());
        entry.connect_activate(move |_| submit());

        disconnect_button.connect_clicked(move |_| emit(&events, AppEvent::DisconnectRequested));

        Self {
            root,
            avatar,
            device_label,
            status_icon,
            status_label,
            list_box,
            scrolled,
            entry,
            rendered: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    pub fn render(
        &self,
        device_name: &str,
        avatar: &str,
        connection: &ConnectionState,
        messages: &[MessageView],
    ) {
        self.avatar.set_text(avatar);
        self.device_label.set_text(device_name);
        self.status_icon.set_icon_name(Some(connection.icon_name()));
        self.status_label.set_text(connection.as_str());

        let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
        if *self.rendered.borrow() == ids {
            return;
        }
        let fresh_session = self.rendered.borrow().is_empty()
            || ids.first() != self.rendered.borrow().first();

        while let Some(child) = self.list_box.first_child() {
            self.list_box.remove(&child);
        }
        for message in messages {
            self.list_box.append(&message_row(message));
        }
        *self.rendered.borrow_mut() = ids;

        if fresh_session {
            self.entry.set_text("");
            self.entry.grab_focus();
        }
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&self) {
        let adjustment = self.scrolled.vadjustment();
        // Wait for the new rows to be measured.
        glib::idle_add_local_once(move || {
            adjustment.set_value(adjustment.upper() - adjustment.page_size());
        });
    }
}

/// Create a list row for one message bubble.
fn message_row(message: &MessageView) -> ListBoxRow {
    let row = ListBoxRow::new();
    row.set_activatable(false);
    row.set_selectable(false);

    let side = if message.mine { Align::End } else { Align::Start };

    let bubble = GtkBox::new(Orientation::Vertical, 2);
    bubble.set_halign(side);
    bubble.set_margin_top(6);
    bubble.set_margin_bottom(6);
    bubble.set_margin_start(12);
    bubble.set_margin_end(12);

    let time_label = Label::new(Some(&message.time));
    time_label.add_css_class("caption");
    time_label.add_css_class("dim-label");
    time_label.set_halign(side);
    bubble.append(&time_label);

    let text_label = Label::new(Some(&message.text));
    text_label.set_wrap(true);
    text_label.set_wrap_mode(gtk4::pango::WrapMode::WordChar);
    text_label.set_max_width_chars(40);
    text_label.set_xalign(0.0);
    text_label.set_selectable(true);
    text_label.add_css_class("card");
    if message.mine {
        text_label.add_css_class("accent");
    }
    bubble.append(&text_label);

    row.set_child(Some(&bubble));
    row
}
