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

//! BlueZ-backed device chooser.

use bluer::{Adapter, AdapterEvent, Address, DiscoveryFilter, DiscoveryTransport, ErrorKind};
use futures::future::BoxFuture;
use futures::{pin_mut, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::chooser::{
    ChooserError, ChosenDevice, DeviceCandidate, DeviceChooser, DevicePicker, RequestOptions,
};

/// Scans with the default BlueZ adapter and lets the user pick a result.
pub struct BluezChooser {
    scan_window: Duration,
    picker: Arc<dyn DevicePicker>,
}

impl BluezChooser {
    pub fn new(scan_window: Duration, picker: Arc<dyn DevicePicker>) -> Self {
        Self {
            scan_window,
            picker,
        }
    }
}

impl DeviceChooser for BluezChooser {
    fn backend_name(&self) -> &'static str {
        "BlueZ"
    }

    fn request_device(
        &self,
        options: RequestOptions,
    ) -> BoxFuture<'static, Result<ChosenDevice, ChooserError>> {
        let scan_window = self.scan_window;
        let picker = self.picker.clone();
        Box::pin(async move { choose(scan_window, picker, options).await })
    }
}

async fn choose(
    scan_window: Duration,
    picker: Arc<dyn DevicePicker>,
    options: RequestOptions,
) -> Result<ChosenDevice, ChooserError> {
    let adapter = open_adapter().await?;
    info!(
        "Scanning with adapter {} for {:?}",
        adapter.name(),
        scan_window
    );

    let candidates = scan(&adapter, scan_window, &options).await?;
    pick_device(candidates, picker.as_ref(), &options).await
}

/// Hand the discovered devices to the picker and narrow the chosen one down
/// to the requested optional services.
async fn pick_device(
    candidates: Vec<DeviceCandidate>,
    picker: &dyn DevicePicker,
    options: &RequestOptions,
) -> Result<ChosenDevice, ChooserError> {
    if candidates.is_empty() {
        return Err(ChooserError::NoDevicesFound);
    }
    info!("Discovered {} device(s)", candidates.len());

    let picked = picker.pick(candidates).await.ok_or(ChooserError::Cancelled)?;
    let chosen = ChosenDevice::from_candidate(picked, options);
    if chosen.services.is_empty() {
        debug!("Picked device advertises none of the optional services");
    } else {
        info!("Picked device advertises optional services: {:?}", chosen.services);
    }
    Ok(chosen)
}

async fn open_adapter() -> Result<Adapter, ChooserError> {
    let session = bluer::Session::new()
        .await
        .map_err(|e| ChooserError::Unsupported(format!("BlueZ unavailable: {}", e)))?;
    let adapter = session
        .default_adapter()
        .await
        .map_err(|e| ChooserError::Unsupported(format!("no Bluetooth adapter: {}", e)))?;

    if !adapter.is_powered().await.map_err(map_bluer_error)? {
        return Err(ChooserError::Unsupported(
            "Bluetooth adapter is powered off".to_string(),
        ));
    }
    Ok(adapter)
}

async fn scan(
    adapter: &Adapter,
    window: Duration,
    options: &RequestOptions,
) -> Result<Vec<DeviceCandidate>, ChooserError> {
    let mut filter = DiscoveryFilter::default();
    filter.transport = DiscoveryTransport::Auto;
    filter.uuids = options.filters.iter().copied().collect();
    adapter
        .set_discovery_filter(filter)
        .await
        .map_err(map_bluer_error)?;

    // Discovery runs for as long as the stream is alive.
    let events = adapter.discover_devices().await.map_err(map_bluer_error)?;
    pin_mut!(events);

    let deadline = tokio::time::sleep(window);
    pin_mut!(deadline);

    let mut seen: Vec<Address> = Vec::new();
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.next() => match event {
                Some(AdapterEvent::DeviceAdded(addr)) => {
                    if !seen.contains(&addr) {
                        debug!("Discovered {}", addr);
                        seen.push(addr);
                    }
                }
                Some(AdapterEvent::DeviceRemoved(addr)) => seen.retain(|a| *a != addr),
                Some(_) => {}
                None => break,
            }
        }
    }

    let mut candidates = Vec::with_capacity(seen.len());
    for addr in seen {
        match describe(adapter, addr).await {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => warn!("Skipping {}: {}", addr, e),
        }
    }
    sort_by_signal(&mut candidates);
    Ok(candidates)
}

/// Strongest signal first; devices without RSSI go last.
fn sort_by_signal(candidates: &mut [DeviceCandidate]) {
    candidates.sort_by(|a, b| b.rssi.cmp(&a.rssi));
}

async fn describe(adapter: &Adapter, address: Address) -> bluer::Result<DeviceCandidate> {
    let device = adapter.device(address)?;
    let name = device.name().await?;
    let rssi = device.rssi().await?;
    let mut services: Vec<_> = device.uuids().await?.unwrap_or_default().into_iter().collect();
    services.sort();

    Ok(DeviceCandidate {
        address: address.to_string(),
        name,
        rssi,
        services,
    })
}

fn map_bluer_error(err: bluer::Error) -> ChooserError {
    match err.kind {
        ErrorKind::NotAuthorized | ErrorKind::NotPermitted => {
            ChooserError::PermissionDenied(err.to_string())
        }
        ErrorKind::NotSupported | ErrorKind::NotAvailable => {
            ChooserError::Unsupported(err.to_string())
        }
        _ => ChooserError::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::ble_constants::{
        uuid_from_u16, BATTERY_SERVICE_UUID, GENERIC_ACCESS_UUID,
    };
    use parking_lot::Mutex;

    /// Picks the candidate at `index`, or cancels when `None`.
    struct FixedPicker {
        index: Option<usize>,
        offered: Mutex<Vec<DeviceCandidate>>,
    }

    impl FixedPicker {
        fn new(index: Option<usize>) -> Self {
            Self {
                index,
                offered: Mutex::new(Vec::new()),
            }
        }
    }

    impl DevicePicker for FixedPicker {
        fn pick(&self, candidates: Vec<DeviceCandidate>) -> BoxFuture<'static, Option<DeviceCandidate>> {
            let choice = self.index.and_then(|i| candidates.get(i).cloned());
            *self.offered.lock() = candidates;
            Box::pin(async move { choice })
        }
    }

    fn candidate(address: &str, name: &str, rssi: Option<i16>) -> DeviceCandidate {
        DeviceCandidate {
            address: address.to_string(),
            name: Some(name.to_string()),
            rssi,
            services: Vec::new(),
        }
    }

    fn bluer_error(kind: ErrorKind) -> bluer::Error {
        bluer::Error {
            kind,
            message: "from bluetoothd".to_string(),
        }
    }

    #[test]
    fn test_permission_errors_map_to_permission_denied() {
        for kind in [ErrorKind::NotAuthorized, ErrorKind::NotPermitted] {
            assert!(matches!(
                map_bluer_error(bluer_error(kind)),
                ChooserError::PermissionDenied(_)
            ));
        }
    }

    #[test]
    fn test_missing_support_maps_to_unsupported() {
        for kind in [ErrorKind::NotSupported, ErrorKind::NotAvailable] {
            assert!(map_bluer_error(bluer_error(kind)).is_unsupported());
        }
    }

    #[test]
    fn test_other_errors_map_to_failed() {
        for kind in [ErrorKind::Failed, ErrorKind::InProgress, ErrorKind::NotReady] {
            assert!(matches!(
                map_bluer_error(bluer_error(kind)),
                ChooserError::Failed(_)
            ));
        }
    }

    #[test]
    fn test_sort_by_signal_puts_strongest_first() {
        let mut candidates = vec![
            candidate("00:00:00:00:00:01", "quiet", None),
            candidate("00:00:00:00:00:02", "far", Some(-90)),
            candidate("00:00:00:00:00:03", "near", Some(-40)),
        ];
        sort_by_signal(&mut candidates);

        let names: Vec<_> = candidates.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["near", "far", "quiet"]);
    }

    #[tokio::test]
    async fn test_no_candidates_is_no_devices_found() {
        let picker = FixedPicker::new(Some(0));
        let result = pick_device(Vec::new(), &picker, &RequestOptions::accept_all(Vec::new())).await;

        assert_eq!(result, Err(ChooserError::NoDevicesFound));
        assert!(picker.offered.lock().is_empty());
    }

    #[tokio::test]
    async fn test_picker_dismissed_is_cancelled() {
        let picker = FixedPicker::new(None);
        let candidates = vec![candidate("00:00:00:00:00:01", "Pixel", Some(-50))];
        let result = pick_device(candidates, &picker, &RequestOptions::accept_all(Vec::new())).await;

        assert_eq!(result, Err(ChooserError::Cancelled));
        assert_eq!(picker.offered.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_picked_device_keeps_requested_services() {
        let picker = FixedPicker::new(Some(1));
        let mut headset = candidate("00:00:00:00:00:02", "Headset", Some(-60));
        headset.services = vec![BATTERY_SERVICE_UUID, uuid_from_u16(0x110b)];
        let candidates = vec![candidate("00:00:00:00:00:01", "Pixel", Some(-50)), headset];
        let options = RequestOptions::accept_all(vec![BATTERY_SERVICE_UUID, GENERIC_ACCESS_UUID]);

        let chosen = pick_device(candidates, &picker, &options).await.unwrap();

        assert_eq!(chosen.address.as_deref(), Some("00:00:00:00:00:02"));
        assert_eq!(chosen.name.as_deref(), Some("Headset"));
        assert_eq!(chosen.services, vec![BATTERY_SERVICE_UUID]);
    }
}
