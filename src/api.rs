use std::error::Error;
use std::sync::Arc;

use crate::client::ClientError;
use crate::hub::Hub;
use crate::protocol::{Breadcrumb, Event};
use crate::scope::Scope;
use crate::{Client, ClientOptions};

/// Captures an already assembled event on the currently active client, if
/// any.
///
/// Like every capture entry point this is fire-and-forget: the caller
/// receives nothing, and drop reasons or delivery failures are reported
/// to the debug channel only.
///
/// # Examples
///
/// ```
/// use faultline::protocol::{Event, Level};
///
/// faultline::capture_event(Event {
///     message: Some("Hello World!".into()),
///     level: Some(Level::Warning),
///     ..Default::default()
/// });
/// ```
pub fn capture_event(event: Event) {
    Hub::with_active(|hub| hub.capture_event(event, None))
}

/// Captures an arbitrary message on the currently active client, if any.
pub fn capture_message(message: &str) {
    Hub::with_active(|hub| hub.capture_message(message, None))
}

/// Captures an error on the currently active client, if any.
///
/// The event carries the error's textual description; structured stack
/// information is not extracted.
pub fn capture_error<E: Error + ?Sized>(error: &E) {
    Hub::with_active(|hub| hub.capture_error(error, None))
}

/// Records a breadcrumb on the current scope.
///
/// The total number of breadcrumbs that are recorded is limited by the
/// `max_breadcrumbs` configuration on the client; the configured
/// `before_breadcrumb` callback may reject or replace each one.
///
/// # Examples
///
/// ```
/// use faultline::protocol::Breadcrumb;
///
/// faultline::add_breadcrumb(Breadcrumb {
///     category: Some("request".into()),
///     message: Some("GET /".into()),
///     ..Default::default()
/// });
/// ```
pub fn add_breadcrumb(breadcrumb: Breadcrumb) {
    Hub::with_active(|hub| hub.add_breadcrumb(breadcrumb))
}

/// Invokes a function that can modify the current scope.
///
/// Because there might not be a client active the callback might not be
/// called at all, in which case the default of the return type is
/// returned.
///
/// # Examples
///
/// ```
/// faultline::configure_scope(|scope| {
///     scope.set_tag("component", "ingest");
/// });
/// ```
pub fn configure_scope<F, R>(f: F) -> R
where
    R: Default,
    F: FnOnce(&mut Scope) -> R,
{
    Hub::with_active(|hub| hub.configure_scope(f))
}

/// Temporarily pushes a scope for a single call, optionally reconfiguring
/// it.
///
/// ```
/// use faultline::protocol::Level;
///
/// faultline::with_scope(
///     |scope| scope.set_level(Some(Level::Warning)),
///     || faultline::capture_message("some warning"),
/// );
/// ```
pub fn with_scope<C, F, R>(scope_config: C, callback: F) -> R
where
    C: FnOnce(&mut Scope),
    F: FnOnce() -> R,
{
    Hub::with(|hub| {
        if hub.is_active_and_usage_safe() {
            hub.with_scope(scope_config, callback)
        } else {
            callback()
        }
    })
}

/// Helper struct that is returned from [`init`].
///
/// While this guard is kept alive the constructed client stays bound to
/// the current hub; dropping it unbinds the client again.
#[must_use = "when the init guard is dropped the client is unbound and no further events can be sent"]
pub struct ClientInitGuard(Arc<Client>);

impl ClientInitGuard {
    /// Quick check whether the bound client has a DSN to deliver to.
    pub fn is_enabled(&self) -> bool {
        self.0.dsn().is_some()
    }

    /// Returns the client this guard keeps bound.
    pub fn client(&self) -> Arc<Client> {
        self.0.clone()
    }
}

impl Drop for ClientInitGuard {
    fn drop(&mut self) {
        Hub::with(|hub| hub.bind_client(None));
    }
}

/// Creates a client from the given options and binds it to the current
/// hub.
///
/// Construction fails if the configured DSN cannot be parsed.  An empty
/// DSN is not an error: the client is created but delivers nothing.
///
/// # Examples
///
/// ```
/// let _guard = faultline::init(faultline::ClientOptions {
///     dsn: Some("https://public@example.com/1".into()),
///     ..Default::default()
/// })
/// .expect("failed to initialize");
/// ```
pub fn init<O: Into<ClientOptions>>(options: O) -> Result<ClientInitGuard, ClientError> {
    let client = Arc::new(Client::new(options.into())?);
    Hub::with(|hub| hub.bind_client(Some(client.clone())));
    Ok(ClientInitGuard(client))
}
