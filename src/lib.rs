//! This crate implements a client for capturing and reporting errors,
//! messages and recovered panics to a remote collection service.
//!
//! # Quickstart
//!
//! The most convenient way to use this library is the [`init`] function,
//! which creates a [`Client`] from a set of [`ClientOptions`] and binds
//! it to the current [`Hub`].  From that point on messages and errors can
//! be captured through the free functions or the hub.
//!
//! ```no_run
//! let _guard = faultline::init(faultline::ClientOptions {
//!     dsn: Some("https://public@example.com/1".into()),
//!     release: Some("my-app@1.0.0".into()),
//!     ..Default::default()
//! })
//! .expect("invalid DSN");
//!
//! faultline::capture_message("something happened");
//! ```
//!
//! # The pipeline
//!
//! Every capture call converges on one internal pipeline with a fixed,
//! short-circuiting stage order:
//!
//! 1. **sampling** against the configured sample rate (a rate of exactly
//!    0.0 disables sampling),
//! 2. **preparation**: unset fields are defaulted (identifier, timestamp,
//!    level, server name) and SDK metadata is stamped on, then the scope
//!    is applied and may veto the event,
//! 3. the user-supplied **`before_send`** filter, which may also veto,
//! 4. **dispatch** to the configured [`Transport`].
//!
//! Capture entry points are fire-and-forget: an application never
//! receives an error from a capture call.  Drop reasons and delivery
//! failures are visible on the debug channel when
//! [`ClientOptions::debug`] is enabled.
//!
//! # Panic recovery
//!
//! [`recover`] and [`recover_with_context`] wrap a closure in a recovery
//! boundary that converts a panic into a capture call; see [`recover`]
//! for the payload classification rules.

#![warn(missing_docs)]

mod api;
mod client;
mod clientoptions;
mod constants;
mod dsn;
mod hub;
mod integration;
mod logger;
mod project_id;
pub mod protocol;
mod recovery;
mod scope;
pub mod test;
mod transport;
mod utils;

pub use crate::api::{
    add_breadcrumb, capture_error, capture_event, capture_message, configure_scope, init,
    with_scope, ClientInitGuard,
};
pub use crate::client::{
    CaptureError, Client, ClientError, DSN_ENV, ENVIRONMENT_ENV, RELEASE_ENV,
};
pub use crate::clientoptions::{BeforeBreadcrumbCallback, BeforeSendCallback, ClientOptions};
pub use crate::dsn::{Dsn, DsnParseError, Scheme};
pub use crate::hub::{CaptureContext, Hub, ScopeGuard};
pub use crate::integration::Integration;
pub use crate::logger::{DebugSink, StderrSink, WriterSink};
pub use crate::project_id::{ParseProjectIdError, ProjectId};
pub use crate::protocol::{Breadcrumb, Event, EventHint, Level, User};
pub use crate::recovery::{capture_recovered, recover, recover_with_context};
pub use crate::scope::{EventModifier, EventProcessor, Scope};
pub use crate::transport::{HttpTransport, Response, Transport, TransportError};
