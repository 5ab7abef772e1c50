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

//! Device chooser abstraction and factory.

use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::ble_constants::service_uuid;
use crate::config::BluetoothConfig;

/// What the caller asks the chooser for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Only offer devices advertising one of these services.
    /// Empty means every device is acceptable.
    pub filters: Vec<Uuid>,

    /// Services to probe on the picked device. Never used for filtering.
    pub optional_services: Vec<Uuid>,
}

impl RequestOptions {
    /// Accept any device and probe `optional_services` afterwards.
    pub fn accept_all(optional_services: Vec<Uuid>) -> Self {
        Self {
            filters: Vec::new(),
            optional_services,
        }
    }

    pub fn accepts_all_devices(&self) -> bool {
        self.filters.is_empty()
    }

    /// Build options from configuration, skipping unknown service names.
    pub fn from_config(config: &BluetoothConfig) -> Self {
        let optional_services = config
            .optional_services
            .iter()
            .filter_map(|name| {
                let uuid = service_uuid(name);
                if uuid.is_none() {
                    warn!("Ignoring unknown optional service '{}'", name);
                }
                uuid
            })
            .collect();
        Self::accept_all(optional_services)
    }
}

/// A device seen during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    pub address: String,
    pub name: Option<String>,
    pub rssi: Option<i16>,
    pub services: Vec<Uuid>,
}

impl DeviceCandidate {
    /// One-line description for the picker.
    pub fn label(&self) -> String {
        let name = self.name.as_deref().unwrap_or("Unnamed device");
        match self.rssi {
            Some(rssi) => format!("{} ({}, {} dBm)", name, self.address, rssi),
            None => format!("{} ({})", name, self.address),
        }
    }
}

/// The device the user settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenDevice {
    pub address: Option<String>,
    pub name: Option<String>,
    /// Optional services the device advertises.
    pub services: Vec<Uuid>,
}

impl ChosenDevice {
    /// Keep only the advertised services the caller asked to probe.
    pub fn from_candidate(candidate: DeviceCandidate, options: &RequestOptions) -> Self {
        let services = options
            .optional_services
            .iter()
            .filter(|uuid| candidate.services.contains(uuid))
            .copied()
            .collect();
        Self {
            address: Some(candidate.address),
            name: candidate.name,
            services,
        }
    }
}

/// Why a chooser request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChooserError {
    /// The host has no usable Bluetooth stack.
    #[error("Bluetooth is not supported: {0}")]
    Unsupported(String),

    /// The user dismissed the picker.
    #[error("device selection was cancelled")]
    Cancelled,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no devices found")]
    NoDevicesFound,

    #[error("device chooser failed: {0}")]
    Failed(String),
}

impl ChooserError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ChooserError::Unsupported(_))
    }

    /// Backend detail, empty for user-driven outcomes.
    pub fn detail(&self) -> &str {
        match self {
            ChooserError::Unsupported(detail)
            | ChooserError::PermissionDenied(detail)
            | ChooserError::Failed(detail) => detail,
            ChooserError::Cancelled | ChooserError::NoDevicesFound => "",
        }
    }
}

/// Backend that lets the user select one nearby device.
pub trait DeviceChooser: Send + Sync {
    /// Get the backend name (e.g., "BlueZ").
    fn backend_name(&self) -> &'static str;

    /// Discover devices and let the user pick one.
    fn request_device(
        &self,
        options: RequestOptions,
    ) -> BoxFuture<'static, Result<ChosenDevice, ChooserError>>;
}

/// Presents discovered devices to the user.
pub trait DevicePicker: Send + Sync {
    /// Resolve to the chosen candidate, or `None` if the user cancelled.
    fn pick(&self, candidates: Vec<DeviceCandidate>) -> BoxFuture<'static, Option<DeviceCandidate>>;
}

/// Chooser for builds or hosts without Bluetooth support.
pub struct UnsupportedChooser {
    reason: String,
}

impl UnsupportedChooser {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl DeviceChooser for UnsupportedChooser {
    fn backend_name(&self) -> &'static str {
        "Unsupported"
    }

    fn request_device(
        &self,
        _options: RequestOptions,
    ) -> BoxFuture<'static, Result<ChosenDevice, ChooserError>> {
        let reason = self.reason.clone();
        Box::pin(async move { Err(ChooserError::Unsupported(reason)) })
    }
}

/// Create the chooser for this build.
#[cfg(feature = "bluez")]
pub fn create_chooser(
    config: &BluetoothConfig,
    picker: Arc<dyn DevicePicker>,
) -> Arc<dyn DeviceChooser> {
    info!("Using BlueZ device chooser");
    Arc::new(super::BluezChooser::new(config.scan_window(), picker))
}

/// Create the chooser for this build.
#[cfg(not(feature = "bluez"))]
pub fn create_chooser(
    _config: &BluetoothConfig,
    _picker: Arc<dyn DevicePicker>,
) -> Arc<dyn DeviceChooser> {
    info!("Bluetooth support not compiled in");
    Arc::new(UnsupportedChooser::new("built without BlueZ support"))
}
