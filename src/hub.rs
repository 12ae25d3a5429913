//! The ambient client+scope registry.

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock, PoisonError, RwLock, TryLockError};
use std::thread;

use crate::protocol::{Breadcrumb, Event, EventHint};
use crate::scope::Scope;
use crate::Client;

static PROCESS_HUB: LazyLock<(Arc<Hub>, thread::ThreadId)> = LazyLock::new(|| {
    (
        Arc::new(Hub::new(None, Scope::default())),
        thread::current().id(),
    )
});

thread_local! {
    static THREAD_HUB: RefCell<Arc<Hub>> = RefCell::new(
        if PROCESS_HUB.1 == thread::current().id() {
            PROCESS_HUB.0.clone()
        } else {
            Arc::new(Hub::new_from_top(&PROCESS_HUB.0))
        }
    );
}

#[derive(Debug, Clone)]
pub(crate) struct StackLayer {
    pub client: Option<Arc<Client>>,
    pub scope: Scope,
}

#[derive(Debug)]
pub(crate) struct Stack {
    top: StackLayer,
    layers: Vec<StackLayer>,
}

impl Stack {
    fn from_client_and_scope(client: Option<Arc<Client>>, scope: Scope) -> Stack {
        Stack {
            top: StackLayer { client, scope },
            layers: vec![],
        }
    }

    fn push(&mut self) {
        self.layers.push(self.top.clone());
    }

    fn pop(&mut self) {
        self.top = self.layers.pop().expect("pop from empty stack");
    }

    fn top(&self) -> &StackLayer {
        &self.top
    }

    fn top_mut(&mut self) -> &mut StackLayer {
        &mut self.top
    }

    fn depth(&self) -> usize {
        self.layers.len()
    }
}

/// A guard returned from [`Hub::push_scope`].
///
/// Dropping it pops the pushed scope again.
pub struct ScopeGuard(Option<(Arc<Hub>, usize)>);

impl fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeGuard")
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some((hub, depth)) = self.0.take() {
            hub.with_stack_mut(|stack| {
                if stack.depth() != depth {
                    panic!("tried to pop guards out of order");
                }
                stack.pop();
            })
        }
    }
}

/// The central object that manages an active client and scope pair.
///
/// A hub can be used to capture events against whatever client is
/// currently bound to it.  It is internally synchronized so it can be
/// used from multiple threads.  The hub that is available automatically
/// through [`Hub::current`] is thread local; the process-wide one is
/// reachable through [`Hub::main`].
pub struct Hub {
    stack: RwLock<Stack>,
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hub")
    }
}

impl Hub {
    fn with_stack<F: FnOnce(&Stack) -> R, R>(&self, f: F) -> R {
        let guard = self.stack.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn with_stack_mut<F: FnOnce(&mut Stack) -> R, R>(&self, f: F) -> R {
        let mut guard = self.stack.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn is_active_and_usage_safe(&self) -> bool {
        let guard = match self.stack.try_read() {
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
            Ok(guard) => guard,
        };
        guard.top().client.is_some()
    }

    /// Creates a new hub from the given client and scope.
    pub fn new(client: Option<Arc<Client>>, scope: Scope) -> Hub {
        Hub {
            stack: RwLock::new(Stack::from_client_and_scope(client, scope)),
        }
    }

    /// Creates a new hub based on the top scope of the given hub.
    pub fn new_from_top(other: &Hub) -> Hub {
        other.with_stack(|stack| {
            let top = stack.top();
            Hub::new(top.client.clone(), top.scope.clone())
        })
    }

    /// Returns the current, thread-local hub.
    pub fn current() -> Arc<Hub> {
        Hub::with(Arc::clone)
    }

    /// Returns the main (process-wide) hub.
    pub fn main() -> Arc<Hub> {
        PROCESS_HUB.0.clone()
    }

    /// Invokes the callback with the current hub.
    ///
    /// This is a slightly more efficient version of [`Hub::current`] as it
    /// avoids a clone.
    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&Arc<Hub>) -> R,
    {
        THREAD_HUB.with(|hub| f(&hub.borrow()))
    }

    /// Like [`Hub::with`] but only calls the function if a client is
    /// bound.
    ///
    /// This is useful for integrations that want to do efficiently nothing
    /// if there is no client bound.
    pub fn with_active<F, R>(f: F) -> R
    where
        F: FnOnce(&Arc<Hub>) -> R,
        R: Default,
    {
        Hub::with(|hub| {
            if hub.is_active_and_usage_safe() {
                f(hub)
            } else {
                Default::default()
            }
        })
    }

    /// Binds the hub to the current thread for the duration of the call.
    ///
    /// Once the function is finished executing, including after it
    /// panicked, the original hub is re-installed.
    pub fn run<F: FnOnce() -> R, R>(hub: Arc<Hub>, f: F) -> R {
        let old = THREAD_HUB.with(|thread_hub| std::mem::replace(&mut *thread_hub.borrow_mut(), hub));
        let rv = panic::catch_unwind(AssertUnwindSafe(f));
        THREAD_HUB.with(|thread_hub| *thread_hub.borrow_mut() = old);
        match rv {
            Err(err) => panic::resume_unwind(err),
            Ok(rv) => rv,
        }
    }

    /// Captures an already assembled event on the bound client, if any.
    ///
    /// The capture is fire-and-forget: drop reasons and delivery failures
    /// are reported to the client's debug channel only.
    pub fn capture_event(&self, event: Event, hint: Option<&EventHint>) {
        // the stack lock is released before the pipeline runs so that
        // user callbacks may reach back into this hub
        if let Some((client, scope)) = self.top_layer() {
            client.capture_event(event, hint, &scope);
        }
    }

    /// Captures an arbitrary message.
    pub fn capture_message(&self, message: &str, hint: Option<&EventHint>) {
        if let Some((client, scope)) = self.top_layer() {
            client.capture_message(message, hint, &scope);
        }
    }

    /// Captures an error, reporting its textual description.
    pub fn capture_error<E: Error + ?Sized>(&self, error: &E, hint: Option<&EventHint>) {
        if let Some((client, scope)) = self.top_layer() {
            client.capture_error(error, hint, &scope);
        }
    }

    fn top_layer(&self) -> Option<(Arc<Client>, Scope)> {
        self.with_stack(|stack| {
            let top = stack.top();
            top.client
                .clone()
                .map(|client| (client, top.scope.clone()))
        })
    }

    /// Invokes a function that can modify the current scope.
    pub fn configure_scope<F, R>(&self, f: F) -> R
    where
        R: Default,
        F: FnOnce(&mut Scope) -> R,
    {
        self.with_stack_mut(|stack| {
            let top = stack.top_mut();
            if top.client.is_none() {
                return Default::default();
            }
            f(&mut top.scope)
        })
    }

    /// Pushes a new scope.
    ///
    /// This returns a guard that when dropped will pop the scope again.
    pub fn push_scope(self: &Arc<Hub>) -> ScopeGuard {
        self.with_stack_mut(|stack| {
            stack.push();
            ScopeGuard(Some((self.clone(), stack.depth())))
        })
    }

    /// Temporarily pushes a scope for a single call, optionally
    /// reconfiguring it.
    pub fn with_scope<C, F, R>(self: &Arc<Hub>, scope_config: C, callback: F) -> R
    where
        C: FnOnce(&mut Scope),
        F: FnOnce() -> R,
    {
        let _guard = self.push_scope();
        self.configure_scope(scope_config);
        callback()
    }

    /// Records a breadcrumb on the current scope.
    ///
    /// The configured `before_breadcrumb` callback is consulted first and
    /// may reject or replace the breadcrumb; the total number of recorded
    /// breadcrumbs is capped at the client's `max_breadcrumbs`.
    pub fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        self.with_stack_mut(|stack| {
            let top = stack.top_mut();
            if let Some(ref client) = top.client {
                let options = client.options();
                let breadcrumb = match options.before_breadcrumb {
                    Some(ref callback) => callback(breadcrumb),
                    None => Some(breadcrumb),
                };
                if let Some(breadcrumb) = breadcrumb {
                    top.scope.breadcrumbs.push_back(breadcrumb);
                }
                while top.scope.breadcrumbs.len() > options.max_breadcrumbs {
                    top.scope.breadcrumbs.pop_front();
                }
            }
        })
    }

    /// Returns the currently bound client.
    pub fn client(&self) -> Option<Arc<Client>> {
        self.with_stack(|stack| stack.top().client.clone())
    }

    /// Binds a new client to the hub.
    pub fn bind_client(&self, client: Option<Arc<Client>>) {
        self.with_stack_mut(|stack| {
            stack.top_mut().client = client;
        })
    }
}

/// An explicit propagation context for capture calls.
///
/// Callers that need "current" semantics across threads or tasks attach
/// the hub they want to capture against and thread the context through
/// their own call graph; the recovery helpers prefer a context-attached
/// hub over the ambient thread-local one.
#[derive(Clone, Default)]
pub struct CaptureContext {
    hub: Option<Arc<Hub>>,
}

impl CaptureContext {
    /// Creates an empty context with no hub attached.
    pub fn new() -> CaptureContext {
        CaptureContext::default()
    }

    /// Creates a context with the given hub attached.
    pub fn with_hub(hub: Arc<Hub>) -> CaptureContext {
        CaptureContext { hub: Some(hub) }
    }

    /// Whether an active client+scope pair is attached to this context.
    pub fn has_hub(&self) -> bool {
        self.hub.is_some()
    }

    /// Returns the attached hub, if any.
    pub fn hub(&self) -> Option<Arc<Hub>> {
        self.hub.clone()
    }

    /// The attached hub, or the ambient current one.
    pub(crate) fn resolve(&self) -> Arc<Hub> {
        self.hub.clone().unwrap_or_else(Hub::current)
    }
}

impl fmt::Debug for CaptureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureContext")
            .field("has_hub", &self.has_hub())
            .finish()
    }
}
