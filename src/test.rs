//! Support for testing instrumented code.
//!
//! This module provides a transport that captures events instead of
//! sending them, a debug sink that collects diagnostic lines, and helpers
//! that run a block of code against a throwaway hub.
//!
//! # Example usage
//!
//! ```
//! use faultline::test::with_captured_events;
//!
//! let events = with_captured_events(|| {
//!     faultline::capture_message("Hello World!");
//! });
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].message.as_deref(), Some("Hello World!"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::logger::DebugSink;
use crate::protocol::Event;
use crate::scope::Scope;
use crate::transport::{Response, Transport, TransportError};
use crate::{Client, ClientOptions, Hub};

const TEST_DSN: &str = "https://public@example.com/1";

/// Collects events instead of sending them.
#[derive(Default)]
pub struct TestTransport {
    collected: Mutex<Vec<Event>>,
}

impl TestTransport {
    /// Creates a new test transport.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<TestTransport> {
        Arc::new(TestTransport::default())
    }

    /// Fetches and clears the contained events.
    pub fn fetch_and_clear_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.collected.lock().unwrap())
    }
}

impl Transport for TestTransport {
    fn send_event(&self, event: &Event) -> Result<Response, TransportError> {
        self.collected.lock().unwrap().push(event.clone());
        Ok(Response::default())
    }
}

/// Collects debug channel output instead of printing it.
#[derive(Default)]
pub struct TestDebugSink {
    lines: Mutex<Vec<String>>,
}

impl TestDebugSink {
    /// Creates a new collecting sink.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<TestDebugSink> {
        Arc::new(TestDebugSink::default())
    }

    /// Fetches and clears the collected diagnostic lines.
    pub fn fetch_and_clear_lines(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap())
    }
}

impl DebugSink for TestDebugSink {
    fn write_line(&self, message: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

/// Runs some code against a throwaway hub with default options and
/// returns the captured events.
pub fn with_captured_events<F: FnOnce()>(f: F) -> Vec<Event> {
    with_captured_events_options(f, ClientOptions::default())
}

/// Runs some code against a throwaway hub with the given options and
/// returns the captured events.
///
/// If no DSN is set on the options a default test DSN is inserted.  The
/// transport on the options is overridden with a [`TestTransport`].
pub fn with_captured_events_options<F: FnOnce()>(f: F, options: ClientOptions) -> Vec<Event> {
    let transport = TestTransport::new();
    let mut options = options;
    if options.dsn.is_none() {
        options.dsn = Some(TEST_DSN.into());
    }
    options.transport = Some(transport.clone());
    let client = Client::new(options).expect("failed to create test client");
    Hub::run(
        Arc::new(Hub::new(Some(Arc::new(client)), Scope::default())),
        f,
    );
    transport.fetch_and_clear_events()
}
