//! The capture client and its event submission pipeline.

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

use rand::random;
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::constants::{PACKAGE_NAME, PLATFORM, SDK_NAME, TRANSACTION_LABEL, VERSION};
use crate::dsn::{Dsn, DsnParseError};
use crate::integration::Integration;
use crate::logger::{DebugLogger, StderrSink};
use crate::protocol::{Event, EventHint, Level, SdkInfo, SdkPackage};
use crate::scope::EventModifier;
use crate::transport::{HttpTransport, Response, Transport, TransportError};
use crate::ClientOptions;

/// Environment variable consulted when no DSN is configured.
pub const DSN_ENV: &str = "FAULTLINE_DSN";
/// Environment variable consulted when no release is configured.
pub const RELEASE_ENV: &str = "FAULTLINE_RELEASE";
/// Environment variable consulted when no environment label is configured.
pub const ENVIRONMENT_ENV: &str = "FAULTLINE_ENVIRONMENT";

/// Raised when a client cannot be constructed.
#[derive(Debug, ThisError)]
pub enum ClientError {
    /// The configured DSN could not be parsed.  No client is produced.
    #[error("invalid DSN: {0}")]
    InvalidDsn(#[from] DsnParseError),
}

/// The reason the pipeline did not hand an event to the transport, or the
/// transport failure it ran into doing so.
///
/// None of these are fatal to the caller: the fire-and-forget capture
/// entry points report them to the debug channel and swallow them.
#[derive(Debug, ThisError)]
pub enum CaptureError {
    /// The event was dropped by the configured sample rate.
    #[error("event dropped due to sample rate")]
    SampledOut,
    /// The scope stage (an event processor) vetoed the event.
    #[error("event dropped by an event processor")]
    DroppedByProcessor,
    /// The user-supplied `before_send` callback vetoed the event.
    #[error("event dropped by the before_send callback")]
    DroppedByBeforeSend,
    /// The transport failed to deliver the event.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The capture client.
///
/// A client owns its immutable [`ClientOptions`], the resolved transport
/// and the integration registry, and orchestrates the event submission
/// pipeline: sampling, preparation, scope application, the user filter and
/// dispatch.  It is safe to capture from many threads against one client;
/// nothing in the pipeline is mutable after construction.
pub struct Client {
    options: ClientOptions,
    dsn: Option<Dsn>,
    transport: Arc<dyn Transport>,
    integrations: BTreeMap<String, Arc<dyn Integration>>,
    logger: DebugLogger,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("dsn", &self.dsn)
            .field("options", &self.options)
            .finish()
    }
}

impl Client {
    /// Creates a new client from the given options.
    ///
    /// Unset DSN, release and environment fields fall back to the
    /// `FAULTLINE_DSN`, `FAULTLINE_RELEASE` and `FAULTLINE_ENVIRONMENT`
    /// environment variables.  An unparsable DSN aborts construction; an
    /// empty or absent one does not — the client stays usable and the
    /// transport operates in its degraded no-op mode.
    pub fn new(mut options: ClientOptions) -> Result<Client, ClientError> {
        let logger = if options.debug {
            match options.debug_sink {
                Some(ref sink) => DebugLogger::new(sink.clone()),
                None => DebugLogger::new(Arc::new(StderrSink)),
            }
        } else {
            DebugLogger::disabled()
        };

        if options.dsn.is_none() {
            options.dsn = env::var(DSN_ENV).ok();
        }
        if options.release.is_none() {
            options.release = env::var(RELEASE_ENV).ok();
        }
        if options.environment.is_none() {
            options.environment = env::var(ENVIRONMENT_ENV).ok();
        }

        let dsn = match options.dsn.as_deref().filter(|dsn| !dsn.is_empty()) {
            Some(raw) => Some(Dsn::from_str(raw)?),
            None => {
                logger.log(format_args!("client initialized with an empty DSN"));
                None
            }
        };

        let transport = options
            .transport
            .clone()
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        transport.configure(&options);

        let mut integrations = BTreeMap::new();
        for integration in &options.integrations {
            integrations.insert(integration.name().to_string(), integration.clone());
            integration.setup_once();
            logger.log(format_args!("integration installed: {}", integration.name()));
        }

        Ok(Client {
            options,
            dsn,
            transport,
            integrations,
            logger,
        })
    }

    /// Returns the options of this client.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Returns the DSN this client was constructed with, if any.
    pub fn dsn(&self) -> Option<&Dsn> {
        self.dsn.as_ref()
    }

    /// Captures a message.
    ///
    /// Like all capture entry points this is fire-and-forget: drop reasons
    /// and delivery failures go to the debug channel only.
    pub fn capture_message(
        &self,
        message: &str,
        hint: Option<&EventHint>,
        scope: &dyn EventModifier,
    ) {
        self.capture_event(Event::from_message(message), hint, scope);
    }

    /// Captures an error, reporting its textual description.
    ///
    /// Structured stack information is not extracted here.
    pub fn capture_error<E: Error + ?Sized>(
        &self,
        error: &E,
        hint: Option<&EventHint>,
        scope: &dyn EventModifier,
    ) {
        self.capture_event(Event::from_message(error.to_string()), hint, scope);
    }

    /// Captures an already assembled event.
    pub fn capture_event(&self, event: Event, hint: Option<&EventHint>, scope: &dyn EventModifier) {
        if let Err(err) = self.process_event(event, hint, scope) {
            self.logger.log(format_args!("{}", err));
        }
    }

    /// Runs one event through the pipeline.
    ///
    /// Stages, in order, each of which can short-circuit with its own
    /// [`CaptureError`]: sampling, preparation (defaulting plus scope
    /// application), the `before_send` user filter, and dispatch to the
    /// transport.  The transport's result is returned unmodified.
    fn process_event(
        &self,
        event: Event,
        hint: Option<&EventHint>,
        scope: &dyn EventModifier,
    ) -> Result<Response, CaptureError> {
        // A sample rate of exactly 0.0 means sampling is disabled, not
        // that every event is dropped.
        if self.options.sample_rate != 0.0 && random::<f32>() > self.options.sample_rate {
            return Err(CaptureError::SampledOut);
        }

        let event = self
            .prepare_event(event, hint, scope)
            .ok_or(CaptureError::DroppedByProcessor)?;

        let event = match self.options.before_send {
            Some(ref before_send) => {
                let default_hint = EventHint::default();
                let hint = hint.unwrap_or(&default_hint);
                before_send(event, hint).ok_or(CaptureError::DroppedByBeforeSend)?
            }
            None => event,
        };

        Ok(self.transport.send_event(&event)?)
    }

    /// Applies field defaults and the scope mutation to an event.
    ///
    /// Identifier, timestamp, level and server name are only filled in
    /// when unset; SDK metadata, the platform tag and the transaction
    /// label are always overwritten with client-computed values.
    fn prepare_event(
        &self,
        mut event: Event,
        hint: Option<&EventHint>,
        scope: &dyn EventModifier,
    ) -> Option<Event> {
        if event.event_id.is_nil() {
            event.event_id = Uuid::new_v4();
        }
        if event.timestamp.is_none() {
            event.timestamp = Some(SystemTime::now());
        }
        if event.level.is_none() {
            event.level = Some(Level::Info);
        }
        if event.server_name.is_none() {
            event.server_name = self
                .options
                .server_name
                .clone()
                .or_else(crate::utils::server_name);
        }
        if event.release.is_none() {
            event.release.clone_from(&self.options.release);
        }
        if event.dist.is_none() {
            event.dist.clone_from(&self.options.dist);
        }
        if event.environment.is_none() {
            event.environment.clone_from(&self.options.environment);
        }

        event.sdk = Some(SdkInfo {
            name: SDK_NAME.into(),
            version: VERSION.into(),
            integrations: self.list_integrations(),
            packages: vec![SdkPackage {
                name: PACKAGE_NAME.into(),
                version: VERSION.into(),
            }],
        });
        event.platform = PLATFORM.into();
        // TODO: stop clobbering caller-provided transaction labels once
        // the intended behavior is confirmed
        event.transaction = Some(TRANSACTION_LABEL.into());

        scope.apply_to_event(event, hint)
    }

    /// Returns the names of the registered integrations, sorted
    /// lexicographically.
    ///
    /// Used for display and event metadata, not for lookup.
    pub fn list_integrations(&self) -> Vec<String> {
        self.integrations.keys().cloned().collect()
    }
}
