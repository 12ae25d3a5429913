use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use faultline::protocol::{Event, Level};
use faultline::test::{
    with_captured_events, with_captured_events_options, TestDebugSink, TestTransport,
};
use faultline::{Client, ClientError, ClientOptions, Integration, Scope};

struct CountingIntegration {
    name: &'static str,
    setups: Arc<AtomicUsize>,
}

impl Integration for CountingIntegration {
    fn name(&self) -> &str {
        self.name
    }

    fn setup_once(&self) {
        self.setups.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_integration(
    name: &'static str,
    setups: &Arc<AtomicUsize>,
) -> Arc<dyn Integration> {
    Arc::new(CountingIntegration {
        name,
        setups: setups.clone(),
    })
}

#[test]
fn test_invalid_dsn_fails_construction() {
    let result = Client::new(ClientOptions {
        dsn: Some("not a url at all".into()),
        ..Default::default()
    });
    assert!(matches!(result, Err(ClientError::InvalidDsn(_))));
}

#[test]
fn test_empty_dsn_is_not_fatal() {
    let sink = TestDebugSink::new();
    let client = Client::new(ClientOptions {
        dsn: Some(String::new()),
        debug: true,
        debug_sink: Some(sink.clone()),
        ..Default::default()
    })
    .unwrap();

    assert!(client.dsn().is_none());
    let lines = sink.fetch_and_clear_lines();
    assert!(lines.iter().any(|line| line.contains("empty DSN")));
}

#[test]
fn test_duplicate_integration_names() {
    let setups = Arc::new(AtomicUsize::new(0));
    let client = Client::new(ClientOptions {
        dsn: Some("https://public@example.com/1".into()),
        transport: Some(TestTransport::new()),
        integrations: vec![
            counting_integration("dup", &setups),
            counting_integration("dup", &setups),
        ],
        ..Default::default()
    })
    .unwrap();

    // both registrations were set up, but only one entry survives
    assert_eq!(setups.load(Ordering::SeqCst), 2);
    assert_eq!(client.list_integrations(), vec!["dup".to_string()]);
}

#[test]
fn test_integration_listing_is_sorted() {
    let setups = Arc::new(AtomicUsize::new(0));
    let options = ClientOptions {
        integrations: vec![
            counting_integration("b", &setups),
            counting_integration("a", &setups),
            counting_integration("c", &setups),
        ],
        ..Default::default()
    };

    let events = with_captured_events_options(
        || {
            faultline::capture_message("check metadata");
        },
        options,
    );

    assert_eq!(events.len(), 1);
    let sdk = events[0].sdk.as_ref().unwrap();
    assert_eq!(
        sdk.integrations,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn test_event_defaults_applied() {
    let events = with_captured_events(|| {
        faultline::capture_message("Hello World!");
    });

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert!(!event.event_id.is_nil());
    assert!(event.timestamp.is_some());
    assert_eq!(event.level, Some(Level::Info));
    assert_eq!(event.message.as_deref(), Some("Hello World!"));
    assert_eq!(event.platform, "rust");
    assert!(event.transaction.is_some());
    let sdk = event.sdk.as_ref().unwrap();
    assert_eq!(sdk.name, "faultline.rust");
    assert_eq!(sdk.packages.len(), 1);
}

#[test]
fn test_supplied_fields_are_kept() {
    let event_id = uuid::Uuid::new_v4();
    let timestamp = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
    let events = with_captured_events(|| {
        faultline::capture_event(Event {
            event_id,
            timestamp: Some(timestamp),
            level: Some(Level::Warning),
            message: Some("already filled in".into()),
            ..Default::default()
        });
    });

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, event_id);
    assert_eq!(events[0].timestamp, Some(timestamp));
    assert_eq!(events[0].level, Some(Level::Warning));
}

#[test]
fn test_sample_rate_zero_disables_sampling() {
    let events = with_captured_events_options(
        || {
            for _ in 0..100 {
                faultline::capture_message("zero rate");
            }
        },
        ClientOptions {
            sample_rate: 0.0,
            ..Default::default()
        },
    );
    assert_eq!(events.len(), 100);
}

#[test]
fn test_sample_rate_one_sends_everything() {
    let events = with_captured_events_options(
        || {
            for _ in 0..100 {
                faultline::capture_message("full rate");
            }
        },
        ClientOptions {
            sample_rate: 1.0,
            ..Default::default()
        },
    );
    assert_eq!(events.len(), 100);
}

#[test]
fn test_sample_rate_half_converges() {
    let events = with_captured_events_options(
        || {
            for _ in 0..1000 {
                faultline::capture_message("coin flip");
            }
        },
        ClientOptions {
            sample_rate: 0.5,
            ..Default::default()
        },
    );
    // ~6 sigma around the expectation of 500
    assert!(
        events.len() > 350 && events.len() < 650,
        "unexpected pass count: {}",
        events.len()
    );
}

#[test]
fn test_before_send_can_veto() {
    let events = with_captured_events_options(
        || {
            faultline::capture_message("should be dropped");
        },
        ClientOptions {
            before_send: Some(Arc::new(|_, _| None)),
            ..Default::default()
        },
    );
    assert!(events.is_empty());
}

#[test]
fn test_before_send_can_mutate() {
    let events = with_captured_events_options(
        || {
            faultline::capture_message("original");
        },
        ClientOptions {
            before_send: Some(Arc::new(|mut event, _| {
                event.message = Some("rewritten".into());
                Some(event)
            })),
            ..Default::default()
        },
    );
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message.as_deref(), Some("rewritten"));
}

#[test]
fn test_scope_veto_skips_before_send() {
    let before_send_ran = Arc::new(AtomicBool::new(false));
    let flag = before_send_ran.clone();

    let transport = TestTransport::new();
    let client = Client::new(ClientOptions {
        dsn: Some("https://public@example.com/1".into()),
        transport: Some(transport.clone()),
        before_send: Some(Arc::new(move |event, _| {
            flag.store(true, Ordering::SeqCst);
            Some(event)
        })),
        ..Default::default()
    })
    .unwrap();

    let mut scope = Scope::default();
    scope.add_event_processor(|_, _| None);

    client.capture_event(Event::default(), None, &scope);

    assert!(transport.fetch_and_clear_events().is_empty());
    assert!(!before_send_ran.load(Ordering::SeqCst));
}

#[test]
fn test_drop_reason_goes_to_debug_channel() {
    let sink = TestDebugSink::new();
    let transport = TestTransport::new();
    let client = Client::new(ClientOptions {
        dsn: Some("https://public@example.com/1".into()),
        debug: true,
        debug_sink: Some(sink.clone()),
        transport: Some(transport.clone()),
        before_send: Some(Arc::new(|_, _| None)),
        ..Default::default()
    })
    .unwrap();

    client.capture_event(Event::default(), None, &Scope::default());

    assert!(transport.fetch_and_clear_events().is_empty());
    let lines = sink.fetch_and_clear_lines();
    assert!(lines.iter().any(|line| line.contains("before_send")));
}

#[test]
fn test_transport_failure_is_swallowed() {
    use faultline::{Response, Transport, TransportError};

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send_event(&self, _event: &Event) -> Result<Response, TransportError> {
            Err(TransportError::Rejected("service unavailable".into()))
        }
    }

    let sink = TestDebugSink::new();
    let client = Client::new(ClientOptions {
        dsn: Some("https://public@example.com/1".into()),
        debug: true,
        debug_sink: Some(sink.clone()),
        transport: Some(Arc::new(FailingTransport)),
        ..Default::default()
    })
    .unwrap();

    // must not panic or surface an error
    client.capture_event(Event::default(), None, &Scope::default());

    let lines = sink.fetch_and_clear_lines();
    assert!(lines.iter().any(|line| line.contains("service unavailable")));
}

#[test]
fn test_environment_fallbacks() {
    std::env::set_var("FAULTLINE_RELEASE", "app@9.9.9");
    std::env::set_var("FAULTLINE_ENVIRONMENT", "staging");

    let client = Client::new(ClientOptions {
        dsn: Some("https://public@example.com/1".into()),
        transport: Some(TestTransport::new()),
        environment: Some("production".into()),
        ..Default::default()
    })
    .unwrap();

    // unset fields fall back to the environment, set fields win
    assert_eq!(client.options().release.as_deref(), Some("app@9.9.9"));
    assert_eq!(client.options().environment.as_deref(), Some("production"));

    std::env::remove_var("FAULTLINE_RELEASE");
    std::env::remove_var("FAULTLINE_ENVIRONMENT");
}
