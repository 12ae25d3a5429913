//! Converting recovered panics into capture calls.
//!
//! A panic that propagates out of a unit of work can be turned into a
//! regular capture at a designated recovery boundary.  [`recover`] and
//! [`recover_with_context`] wrap such a boundary around a closure; the
//! payload of a caught panic is classified and reported through the
//! resolved hub.  Recovery runs on the thread that panicked, before any
//! further unwinding.
//!
//! Only two payload shapes are reportable: boxed errors
//! (`Box<dyn Error + Send + Sync>`, as produced by
//! `panic::panic_any(Box::new(err) as Box<dyn Error + Send + Sync>)`)
//! become capture-by-error calls, and plain string payloads (what
//! `panic!` produces) become capture-by-message calls.  Payloads of any
//! other type are intentionally not captured.

use std::any::Any;
use std::error::Error;
use std::panic::{self, UnwindSafe};

use crate::hub::{CaptureContext, Hub};
use crate::protocol::EventHint;

/// Runs `f`, converting a panic at this boundary into a capture call on
/// the current hub.
///
/// Returns `None` when `f` panicked.  The panic does not propagate.
///
/// # Examples
///
/// ```
/// let result = faultline::recover(|| 1 + 1);
/// assert_eq!(result, Some(2));
///
/// let result: Option<i32> = faultline::recover(|| panic!("broken"));
/// assert_eq!(result, None);
/// ```
pub fn recover<F, R>(f: F) -> Option<R>
where
    F: FnOnce() -> R + UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(rv) => Some(rv),
        Err(payload) => {
            capture_recovered(payload.as_ref(), None);
            None
        }
    }
}

/// Like [`recover`], but prefers the client+scope pair attached to the
/// given context over the ambient current one.
pub fn recover_with_context<F, R>(context: &CaptureContext, f: F) -> Option<R>
where
    F: FnOnce() -> R + UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(rv) => Some(rv),
        Err(payload) => {
            capture_recovered(payload.as_ref(), Some(context));
            None
        }
    }
}

/// Classifies an already recovered panic payload and dispatches it as a
/// capture call.
///
/// The hub is resolved from the context when one with an attached hub is
/// given, and from [`Hub::current`] otherwise.  Payloads that are neither
/// error-typed nor string-typed are silently dropped.
pub fn capture_recovered(recovered: &(dyn Any + Send), context: Option<&CaptureContext>) {
    let hub = match context {
        Some(context) => context.resolve(),
        None => Hub::current(),
    };
    let hint = EventHint {
        context: context.cloned(),
        ..EventHint::default()
    };

    if let Some(error) = recovered.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        hub.capture_error(&**error, Some(&hint));
    } else if let Some(message) = recovered.downcast_ref::<&'static str>() {
        hub.capture_message(message, Some(&hint));
    } else if let Some(message) = recovered.downcast_ref::<String>() {
        hub.capture_message(message, Some(&hint));
    }
}
