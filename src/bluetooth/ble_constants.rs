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

//! Well-known GATT service UUIDs.

use uuid::Uuid;

/// Bluetooth base UUID (`0000xxxx-0000-1000-8000-00805f9b34fb`).
pub const BLUETOOTH_BASE_UUID: u128 = 0x00000000_0000_1000_8000_00805f9b34fb;

/// Battery Service (0x180F).
pub const BATTERY_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000180f_0000_1000_8000_00805f9b34fb);

/// Generic Access (0x1800).
pub const GENERIC_ACCESS_UUID: Uuid = Uuid::from_u128(0x00001800_0000_1000_8000_00805f9b34fb);

/// Services probed on a picked device unless configured otherwise.
pub const DEFAULT_OPTIONAL_SERVICES: [&str; 2] = ["battery_service", "generic_access"];

/// Expand a 16-bit assigned number into a full UUID.
pub fn uuid_from_u16(short: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID | ((short as u128) << 96))
}

/// Resolve a service identifier.
///
/// Accepts a well-known name, a `0x`-prefixed 16-bit assigned number, or a
/// full UUID string.
pub fn service_uuid(name: &str) -> Option<Uuid> {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "battery_service" => Some(BATTERY_SERVICE_UUID),
        "generic_access" => Some(GENERIC_ACCESS_UUID),
        other => match other.strip_prefix("0x") {
            Some(hex) => u16::from_str_radix(hex, 16).ok().map(uuid_from_u16),
            None => Uuid::parse_str(other).ok(),
        },
    }
}
