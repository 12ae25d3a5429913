use std::fmt;
use std::sync::Arc;

use crate::integration::Integration;
use crate::logger::DebugSink;
use crate::protocol::{Breadcrumb, Event, EventHint};
use crate::transport::Transport;

/// Type alias for the `before_send` event filter.
pub type BeforeSendCallback = Arc<dyn Fn(Event, &EventHint) -> Option<Event> + Send + Sync>;

/// Type alias for the `before_breadcrumb` filter.
pub type BeforeBreadcrumbCallback = Arc<dyn Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync>;

/// Configuration settings for the client.
///
/// Options are immutable once a client has been constructed from them.
///
/// # Examples
///
/// ```
/// let _options = faultline::ClientOptions {
///     debug: true,
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct ClientOptions {
    /// The DSN to use.  If not set, the `FAULTLINE_DSN` environment
    /// variable is consulted at construction time; if that is empty too,
    /// the client delivers nothing.
    pub dsn: Option<String>,
    /// Enables debug mode.
    ///
    /// In debug mode diagnostic information is written to the configured
    /// [`debug_sink`](Self::debug_sink), or to stderr if none is set.
    pub debug: bool,
    /// The sink diagnostic output is written to when debug mode is on.
    pub debug_sink: Option<Arc<dyn DebugSink>>,
    /// The sample rate for event submission in the range 0.0 to 1.0.
    ///
    /// A rate of exactly 0.0 disables sampling entirely; no event is
    /// dropped by the sampling stage.
    pub sample_rate: f32,
    /// Callback that is executed before event sending and can mutate or
    /// veto the event.
    pub before_send: Option<BeforeSendCallback>,
    /// Callback that is executed for each breadcrumb being recorded and
    /// can mutate or reject it.
    pub before_breadcrumb: Option<BeforeBreadcrumbCallback>,
    /// The integrations to register at construction time, in order.
    ///
    /// On duplicate names the last registration wins.
    pub integrations: Vec<Arc<dyn Integration>>,
    /// The transport to use.  Defaults to the blocking HTTP transport.
    pub transport: Option<Arc<dyn Transport>>,
    /// The server name reported with events.  Defaults to the local
    /// hostname during event preparation.
    pub server_name: Option<String>,
    /// The release to be sent with events.  Falls back to the
    /// `FAULTLINE_RELEASE` environment variable.
    pub release: Option<String>,
    /// The distribution to be sent with events.
    pub dist: Option<String>,
    /// The environment to be sent with events.  Falls back to the
    /// `FAULTLINE_ENVIRONMENT` environment variable.
    pub environment: Option<String>,
    /// Maximum number of breadcrumbs a scope retains. (defaults to 100)
    pub max_breadcrumbs: usize,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct BeforeSend;
        let before_send = self.before_send.as_ref().map(|_| BeforeSend);
        #[derive(Debug)]
        struct BeforeBreadcrumb;
        let before_breadcrumb = self.before_breadcrumb.as_ref().map(|_| BeforeBreadcrumb);
        #[derive(Debug)]
        struct TransportImpl;
        let transport = self.transport.as_ref().map(|_| TransportImpl);

        let integrations: Vec<_> = self.integrations.iter().map(|i| i.name()).collect();

        f.debug_struct("ClientOptions")
            .field("dsn", &self.dsn)
            .field("debug", &self.debug)
            .field("sample_rate", &self.sample_rate)
            .field("before_send", &before_send)
            .field("before_breadcrumb", &before_breadcrumb)
            .field("integrations", &integrations)
            .field("transport", &transport)
            .field("server_name", &self.server_name)
            .field("release", &self.release)
            .field("dist", &self.dist)
            .field("environment", &self.environment)
            .field("max_breadcrumbs", &self.max_breadcrumbs)
            .finish()
    }
}

impl Default for ClientOptions {
    fn default() -> ClientOptions {
        ClientOptions {
            dsn: None,
            debug: false,
            debug_sink: None,
            sample_rate: 1.0,
            before_send: None,
            before_breadcrumb: None,
            integrations: vec![],
            transport: None,
            server_name: None,
            release: None,
            dist: None,
            environment: None,
            max_breadcrumbs: 100,
        }
    }
}

impl ClientOptions {
    /// Creates new options with all defaults.
    pub fn new() -> ClientOptions {
        ClientOptions::default()
    }

    /// Adds a configured integration to the options.
    pub fn add_integration<I: Integration + 'static>(mut self, integration: I) -> Self {
        self.integrations.push(Arc::new(integration));
        self
    }
}

impl From<&str> for ClientOptions {
    fn from(dsn: &str) -> ClientOptions {
        ClientOptions {
            dsn: Some(dsn.into()),
            ..ClientOptions::default()
        }
    }
}

impl From<String> for ClientOptions {
    fn from(dsn: String) -> ClientOptions {
        ClientOptions {
            dsn: Some(dsn),
            ..ClientOptions::default()
        }
    }
}
