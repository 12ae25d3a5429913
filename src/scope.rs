//! Scopes mutate or veto events before dispatch.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::protocol::{Breadcrumb, Event, EventHint, Level, Map, User, Value};

/// A capability that mutates or vetoes an event given optional per-call
/// hints.
///
/// The capability is invoked exactly once per capture, after field
/// defaulting and before the user-supplied `before_send` filter.
/// Returning `None` vetoes the event; the pipeline reports it as dropped
/// by a processor.
pub trait EventModifier: Send + Sync {
    /// Applies this modifier to the given event.
    fn apply_to_event(&self, event: Event, hint: Option<&EventHint>) -> Option<Event>;
}

/// A function that can process, or drop, an event flowing through a scope.
pub type EventProcessor = Arc<dyn Fn(Event, Option<&EventHint>) -> Option<Event> + Send + Sync>;

/// Holds contextual data for the current scope.
///
/// The scope stores data that is locally relevant to an event, such as
/// recorded breadcrumbs, tags and the current user.  It can be cloned
/// cheaply enough to be layered in a [`Hub`](crate::Hub) stack.
#[derive(Clone, Default)]
pub struct Scope {
    pub(crate) level: Option<Level>,
    pub(crate) user: Option<User>,
    pub(crate) tags: Map<String, String>,
    pub(crate) extra: Map<String, Value>,
    pub(crate) breadcrumbs: VecDeque<Breadcrumb>,
    pub(crate) event_processors: Vec<EventProcessor>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("level", &self.level)
            .field("user", &self.user)
            .field("tags", &self.tags)
            .field("extra", &self.extra)
            .field("breadcrumbs", &self.breadcrumbs)
            .field("event_processors", &self.event_processors.len())
            .finish()
    }
}

impl Scope {
    /// Clears the scope, removing all recorded data.
    pub fn clear(&mut self) {
        *self = Scope::default();
    }

    /// Sets a level override for all events of this scope.
    pub fn set_level(&mut self, level: Option<Level>) {
        self.level = level;
    }

    /// Sets the user for the current scope.
    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Sets a tag to a specific value.
    pub fn set_tag<V: ToString>(&mut self, key: &str, value: V) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    /// Removes a tag.
    pub fn remove_tag(&mut self, key: &str) {
        self.tags.remove(key);
    }

    /// Sets an extra to a specific value.
    pub fn set_extra(&mut self, key: &str, value: Value) {
        self.extra.insert(key.to_string(), value);
    }

    /// Removes an extra.
    pub fn remove_extra(&mut self, key: &str) {
        self.extra.remove(key);
    }

    /// Adds an event processor to the scope.
    ///
    /// Processors run, in registration order, as the last step of the
    /// scope application; any of them can drop the event by returning
    /// `None`.
    pub fn add_event_processor<F>(&mut self, f: F)
    where
        F: Fn(Event, Option<&EventHint>) -> Option<Event> + Send + Sync + 'static,
    {
        self.event_processors.push(Arc::new(f));
    }
}

impl EventModifier for Scope {
    fn apply_to_event(&self, mut event: Event, hint: Option<&EventHint>) -> Option<Event> {
        if let Some(level) = self.level {
            event.level = Some(level);
        }
        if event.user.is_none() {
            event.user.clone_from(&self.user);
        }
        event.breadcrumbs.extend(self.breadcrumbs.iter().cloned());
        for (key, value) in &self.tags {
            event
                .tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        for (key, value) in &self.extra {
            event
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        for processor in &self.event_processors {
            event = processor(event, hint)?;
        }

        Some(event)
    }
}
