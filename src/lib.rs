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

//! Bluetooth Messenger core.
//!
//! Pairs with a nearby device (or a simulated one) and runs a local chat
//! session with scripted replies. The GTK front end lives in the binary.

pub mod app;
pub mod bluetooth;
pub mod chat;
pub mod config;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod state;
