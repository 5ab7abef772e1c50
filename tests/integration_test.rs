//! Integration tests for the connect and chat flow.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use bluetooth_messenger::app::App;
use bluetooth_messenger::bluetooth::{
    ChooserError, ChosenDevice, DeviceChooser, RequestOptions, UnsupportedChooser,
};
use bluetooth_messenger::chat::Sender;
use bluetooth_messenger::config::Config;
use bluetooth_messenger::events::AppEvent;
use bluetooth_messenger::notify::{RecordingNotifier, Toast};
use bluetooth_messenger::scheduler::ManualScheduler;
use bluetooth_messenger::state::{ConnectionState, ScreenView};

/// Chooser that always returns the same result.
struct ScriptedChooser {
    result: Result<ChosenDevice, ChooserError>,
}

impl DeviceChooser for ScriptedChooser {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    fn request_device(
        &self,
        _options: RequestOptions,
    ) -> BoxFuture<'static, Result<ChosenDevice, ChooserError>> {
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

struct TestApp {
    app: App,
    scheduler: Arc<ManualScheduler>,
    notifier: Arc<RecordingNotifier>,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl TestApp {
    fn with_chooser(chooser: Arc<dyn DeviceChooser>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(ManualScheduler::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let app = App::new(
            Config::default(),
            scheduler.clone(),
            chooser,
            notifier.clone(),
            tx,
        );
        Self {
            app,
            scheduler,
            notifier,
            events: rx,
        }
    }

    fn demo() -> Self {
        Self::with_chooser(Arc::new(UnsupportedChooser::new("not used")))
    }

    fn advance(&mut self, ms: u64) {
        for event in self.scheduler.advance(Duration::from_millis(ms)) {
            self.app.handle(event);
        }
    }

    /// Press scan and feed the chooser's answer back into the app.
    async fn scan(&mut self) {
        self.app.handle(AppEvent::ScanRequested);
        let event = self.events.recv().await.expect("chooser result");
        assert!(matches!(event, AppEvent::ChooserFinished(_)));
        self.app.handle(event);
    }

    fn connect_demo(&mut self) {
        self.app.handle(AppEvent::DemoRequested);
        self.advance(1500);
        assert!(self.app.is_connected());
    }

    fn texts(&self) -> Vec<(Sender, String)> {
        self.app
            .messages()
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect()
    }
}

fn device(name: Option<&str>) -> ChosenDevice {
    ChosenDevice {
        address: Some("AA:BB:CC:DD:EE:FF".into()),
        name: name.map(str::to_string),
        services: Vec::new(),
    }
}

#[tokio::test]
async fn test_unsupported_bluetooth_shows_single_toast() {
    let mut t = TestApp::with_chooser(Arc::new(UnsupportedChooser::new("no adapter")));
    t.scan().await;

    let toasts = t.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Bluetooth Not Supported");
    assert!(toasts[0].is_destructive());
    assert_eq!(t.app.connection_state(), ConnectionState::Disconnected);
    assert!(matches!(
        t.app.view().screen,
        ScreenView::Connect { busy: false, .. }
    ));
}

#[tokio::test]
async fn test_scan_failure_shows_connection_failed() {
    for error in [
        ChooserError::Cancelled,
        ChooserError::NoDevicesFound,
        ChooserError::PermissionDenied("org.bluez.Error.NotAuthorized".into()),
        ChooserError::Failed("adapter went away".into()),
    ] {
        let mut t = TestApp::with_chooser(Arc::new(ScriptedChooser { result: Err(error) }));
        t.scan().await;

        assert_eq!(t.notifier.toasts(), vec![Toast::connection_failed()]);
        assert!(!t.app.is_connected());

        // No timer was armed; nothing connects later either.
        t.advance(10_000);
        assert!(!t.app.is_connected());
    }
}

#[tokio::test]
async fn test_scan_success_connects_after_delay() {
    let chooser = ScriptedChooser {
        result: Ok(device(Some("Pixel 8"))),
    };
    let mut t = TestApp::with_chooser(Arc::new(chooser));
    t.scan().await;

    assert_eq!(t.notifier.toasts(), vec![Toast::device_found("Pixel 8")]);
    match t.app.view().screen {
        ScreenView::Connect { busy, status } => {
            assert!(busy);
            assert_eq!(status, "Connecting to Pixel 8...");
        }
        other => panic!("unexpected screen: {:?}", other),
    }

    t.advance(999);
    assert!(!t.app.is_connected());
    t.advance(1);
    assert_eq!(
        t.app.connection_state(),
        ConnectionState::Connected {
            device_name: "Pixel 8".into()
        }
    );
    assert_eq!(t.app.messages().len(), 3);
}

#[tokio::test]
async fn test_nameless_device_is_unknown() {
    for name in [None, Some(""), Some("   ")] {
        let chooser = ScriptedChooser {
            result: Ok(device(name)),
        };
        let mut t = TestApp::with_chooser(Arc::new(chooser));
        t.scan().await;
        t.advance(1000);

        assert_eq!(
            t.app.connection_state().device_name(),
            Some("Unknown Device")
        );
    }
}

#[test]
fn test_demo_always_uses_demo_device() {
    let mut t = TestApp::demo();
    t.connect_demo();

    assert_eq!(t.app.connection_state().device_name(), Some("Demo Device"));
    assert_eq!(t.notifier.toasts(), vec![Toast::demo_mode()]);
    match t.app.view().screen {
        ScreenView::Chat { avatar, .. } => assert_eq!(avatar, "D"),
        other => panic!("unexpected screen: {:?}", other),
    }
}

#[test]
fn test_hi_gets_auto_reply_after_two_seconds() {
    let mut t = TestApp::demo();
    t.connect_demo();

    t.app.handle(AppEvent::SendRequested("hi".into()));
    let texts = t.texts();
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[3], (Sender::Me, "hi".to_string()));

    t.advance(1999);
    assert_eq!(t.texts().len(), 4);

    t.advance(1);
    let texts = t.texts();
    assert_eq!(texts.len(), 5);
    assert_eq!(
        texts[4],
        (Sender::Peer, "Got it! Thanks for the message.".to_string())
    );
}

#[test]
fn test_quick_sends_each_get_a_reply_in_order() {
    let mut t = TestApp::demo();
    t.connect_demo();

    t.app.handle(AppEvent::SendRequested("one".into()));
    t.advance(500);
    t.app.handle(AppEvent::SendRequested("two".into()));
    t.advance(5000);

    let senders: Vec<Sender> = t.texts().into_iter().skip(3).map(|(s, _)| s).collect();
    assert_eq!(senders, vec![Sender::Me, Sender::Me, Sender::Peer, Sender::Peer]);
}

#[test]
fn test_reconnect_starts_from_seed_messages() {
    let mut t = TestApp::demo();
    t.connect_demo();
    let seed = t.texts();

    t.app.handle(AppEvent::SendRequested("hello".into()));
    t.app.handle(AppEvent::DisconnectRequested);
    assert_eq!(t.app.connection_state(), ConnectionState::Disconnected);
    assert!(t.app.messages().is_empty());

    t.connect_demo();
    assert_eq!(t.texts(), seed);

    // The reply scheduled in the first session never lands in the second.
    t.advance(10_000);
    assert_eq!(t.texts(), seed);
}
