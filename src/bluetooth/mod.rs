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

//! Bluetooth device selection.
//!
//! The connect screen asks a [`DeviceChooser`] for one nearby device and only
//! ever uses its advertised name. No data channel is opened.

pub mod ble_constants;
mod chooser;
mod connection;

#[cfg(feature = "bluez")]
mod bluez;

pub use chooser::{
    create_chooser, ChooserError, ChosenDevice, DeviceCandidate, DeviceChooser, DevicePicker,
    RequestOptions, UnsupportedChooser,
};
pub use connection::{
    resolve_display_name, ConnectPhase, ConnectScreen, DEMO_DEVICE_NAME, UNKNOWN_DEVICE_NAME,
};

#[cfg(feature = "bluez")]
pub use bluez::BluezChooser;
