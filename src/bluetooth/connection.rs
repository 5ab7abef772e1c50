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

//! Connect screen state.

use std::time::Duration;

use crate::events::AppEvent;
use crate::scheduler::{Scheduler, TaskHandle};

/// Shown when a device does not advertise a usable name.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Name of the simulated device in demo mode.
pub const DEMO_DEVICE_NAME: &str = "Demo Device";

/// Display name for a device, shared by the real and demo paths.
pub fn resolve_display_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN_DEVICE_NAME.to_string(),
    }
}

/// What the connect screen is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectPhase {
    /// Waiting for the user.
    Idle,
    /// The device chooser is open.
    Scanning,
    /// Demo connect timer running.
    Demo,
    /// Device picked; simulated connect timer running.
    Connecting { device_name: String },
}

impl ConnectPhase {
    /// Whether an attempt is in flight. Both buttons are disabled while busy.
    pub fn is_busy(&self) -> bool {
        !matches!(self, ConnectPhase::Idle)
    }

    /// Label for the scan button.
    pub fn status_text(&self) -> String {
        match self {
            ConnectPhase::Idle => "Scan for Devices".to_string(),
            ConnectPhase::Scanning => "Scanning for devices...".to_string(),
            ConnectPhase::Demo => "Starting demo...".to_string(),
            ConnectPhase::Connecting { device_name } => format!("Connecting to {}...", device_name),
        }
    }
}

/// The device discovery screen.
///
/// Holds at most one timer; leaving the phase that owns it (or dropping the
/// screen) cancels it.
#[derive(Debug)]
pub struct ConnectScreen {
    phase: ConnectPhase,
    timer: Option<TaskHandle>,
}

impl Default for ConnectScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectScreen {
    pub fn new() -> Self {
        Self {
            phase: ConnectPhase::Idle,
            timer: None,
        }
    }

    pub fn phase(&self) -> &ConnectPhase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Idle -> Scanning.
    pub fn start_scan(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.phase = ConnectPhase::Scanning;
        true
    }

    /// Idle -> Demo, with [`AppEvent::DemoReady`] due after `delay`.
    pub fn start_demo(&mut self, scheduler: &dyn Scheduler, delay: Duration) -> bool {
        if self.is_busy() {
            return false;
        }
        self.phase = ConnectPhase::Demo;
        self.timer = Some(scheduler.schedule(delay, AppEvent::DemoReady));
        true
    }

    /// Scanning -> Connecting, with [`AppEvent::ConnectDelayElapsed`] due after `delay`.
    pub fn scan_succeeded(
        &mut self,
        device_name: String,
        scheduler: &dyn Scheduler,
        delay: Duration,
    ) -> bool {
        if self.phase != ConnectPhase::Scanning {
            return false;
        }
        self.phase = ConnectPhase::Connecting { device_name };
        self.timer = Some(scheduler.schedule(delay, AppEvent::ConnectDelayElapsed));
        true
    }

    /// Scanning -> Idle.
    pub fn scan_failed(&mut self) -> bool {
        if self.phase != ConnectPhase::Scanning {
            return false;
        }
        self.phase = ConnectPhase::Idle;
        true
    }

    /// Connecting -> Idle, yielding the device name to connect with.
    pub fn take_connected_device(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.phase, ConnectPhase::Idle) {
            ConnectPhase::Connecting { device_name } => {
                self.timer = None;
                Some(device_name)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Demo -> Idle.
    pub fn finish_demo(&mut self) -> bool {
        if self.phase != ConnectPhase::Demo {
            return false;
        }
        self.phase = ConnectPhase::Idle;
        self.timer = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_resolve_display_name() {
        assert_eq!(resolve_display_name(Some("Pixel 8")), "Pixel 8");
        assert_eq!(resolve_display_name(Some("  Pixel 8 ")), "Pixel 8");
        assert_eq!(resolve_display_name(Some("   ")), UNKNOWN_DEVICE_NAME);
        assert_eq!(resolve_display_name(Some("")), UNKNOWN_DEVICE_NAME);
        assert_eq!(resolve_display_name(None), UNKNOWN_DEVICE_NAME);
    }

    #[test]
    fn test_busy_screen_rejects_new_attempts() {
        let scheduler = ManualScheduler::new();
        let mut screen = ConnectScreen::new();

        assert!(screen.start_scan());
        assert!(!screen.start_scan());
        assert!(!screen.start_demo(&scheduler, MS));
        assert_eq!(screen.phase(), &ConnectPhase::Scanning);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_scan_success_then_connect() {
        let scheduler = ManualScheduler::new();
        let mut screen = ConnectScreen::new();
        screen.start_scan();

        assert!(screen.scan_succeeded("Pixel".into(), &scheduler, 1000 * MS));
        assert_eq!(screen.phase().status_text(), "Connecting to Pixel...");
        assert!(screen.is_busy());

        let fired = scheduler.advance(1000 * MS);
        assert!(matches!(fired.as_slice(), [AppEvent::ConnectDelayElapsed]));
        assert_eq!(screen.take_connected_device().as_deref(), Some("Pixel"));
        assert_eq!(screen.phase(), &ConnectPhase::Idle);
    }

    #[test]
    fn test_scan_failure_returns_to_idle() {
        let mut screen = ConnectScreen::new();
        assert!(!screen.scan_failed());

        screen.start_scan();
        assert!(screen.scan_failed());
        assert!(!screen.is_busy());
    }

    #[test]
    fn test_take_connected_device_outside_connecting_is_noop() {
        let scheduler = ManualScheduler::new();
        let mut screen = ConnectScreen::new();
        screen.start_demo(&scheduler, MS);

        assert_eq!(screen.take_connected_device(), None);
        assert_eq!(screen.phase(), &ConnectPhase::Demo);
    }

    #[test]
    fn test_demo_flow() {
        let scheduler = ManualScheduler::new();
        let mut screen = ConnectScreen::new();

        assert!(screen.start_demo(&scheduler, 1500 * MS));
        assert!(scheduler.advance(1499 * MS).is_empty());
        assert!(matches!(scheduler.advance(MS).as_slice(), [AppEvent::DemoReady]));

        assert!(screen.finish_demo());
        assert!(!screen.finish_demo());
    }

    #[test]
    fn test_dropping_screen_cancels_timer() {
        let scheduler = ManualScheduler::new();
        let mut screen = ConnectScreen::new();
        screen.start_demo(&scheduler, MS);

        drop(screen);
        assert!(scheduler.advance(10 * MS).is_empty());
    }
}
