//! Transports deliver prepared events to the collection service.

use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::constants::USER_AGENT;
use crate::dsn::Dsn;
use crate::protocol::Event;
use crate::ClientOptions;

/// Raised when a transport fails to deliver an event.
///
/// A delivery failure is distinct from a pipeline drop: it reaches the
/// internal pipeline caller but is only logged by the fire-and-forget
/// capture entry points.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP request could not be performed.
    #[error("failed to send event: {0}")]
    Http(#[from] reqwest::Error),
    /// The service or a custom transport refused the event.
    #[error("event rejected: {0}")]
    Rejected(String),
}

/// The outcome of a delivery attempt.
#[derive(Debug, Default, Clone)]
pub struct Response {
    /// The HTTP status returned by the service, if a request was made.
    ///
    /// A transport operating in degraded (no-op) mode reports no status.
    pub status_code: Option<u16>,
}

/// A transport delivers one prepared event at a time to the service.
///
/// The send operation is synchronous and may block on network I/O; its
/// duration and backpressure behavior are the transport's responsibility.
/// Retry, backoff and queuing are likewise transport concerns, not part of
/// the capture pipeline.
pub trait Transport: Send + Sync {
    /// Prepares internal state from the finalized options.
    ///
    /// Called once during client construction, before any send.
    fn configure(&self, options: &ClientOptions) {
        let _ = options;
    }

    /// Delivers one event.
    fn send_event(&self, event: &Event) -> Result<Response, TransportError>;
}

struct HttpTransportInner {
    client: reqwest::blocking::Client,
    url: String,
    auth: String,
}

/// The default transport: a blocking HTTP client posting JSON events.
///
/// When configured without a (valid) DSN the transport stays in a degraded
/// mode where every send is a successful no-op.
#[derive(Default)]
pub struct HttpTransport {
    inner: RwLock<Option<HttpTransportInner>>,
}

impl HttpTransport {
    /// Creates a new, not yet configured transport.
    pub fn new() -> HttpTransport {
        HttpTransport::default()
    }
}

impl Transport for HttpTransport {
    fn configure(&self, options: &ClientOptions) {
        let dsn = match options.dsn.as_deref().filter(|dsn| !dsn.is_empty()) {
            Some(raw) => match Dsn::from_str(raw) {
                Ok(dsn) => dsn,
                Err(_) => return,
            },
            None => return,
        };
        let client = match reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(client) => client,
            Err(_) => return,
        };
        let inner = HttpTransportInner {
            client,
            url: dsn.store_api_url(),
            auth: dsn.to_auth(USER_AGENT),
        };
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(inner);
    }

    fn send_event(&self, event: &Event) -> Result<Response, TransportError> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let inner = match guard.as_ref() {
            Some(inner) => inner,
            // degraded mode: nothing to deliver to
            None => return Ok(Response::default()),
        };
        let response = inner
            .client
            .post(&inner.url)
            .header("X-Faultline-Auth", &inner.auth)
            .json(event)
            .send()?;
        Ok(Response {
            status_code: Some(response.status().as_u16()),
        })
    }
}
