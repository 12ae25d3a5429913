//! The reportable data model.
//!
//! Most constructs map directly to what the collection service accepts on
//! the wire.  Everything here serializes with `serde`; fields that were
//! never set are skipped.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;
use uuid::Uuid;

use crate::hub::CaptureContext;
use crate::utils::ts_seconds_float;

/// An arbitrary (JSON) value.
pub use serde_json::Value;

/// The internally used map type.
pub type Map<K, V> = std::collections::BTreeMap<K, V>;

/// Severity level of an event or breadcrumb.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Indicates very spammy debug information.
    Debug,
    /// Informational messages.
    Info,
    /// A warning.
    Warning,
    /// An error.
    Error,
    /// Similar to an error but indicates a critical event that usually
    /// causes a shutdown.
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single package of the SDK, reported in [`SdkInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkPackage {
    /// The name of the package.
    pub name: String,
    /// The version of the package.
    pub version: String,
}

/// Metadata about the SDK that produced an event.
///
/// Preparation always stamps this onto an event with client-computed
/// values; it is not user-overridable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkInfo {
    /// The name of the SDK.
    pub name: String,
    /// The version of the SDK.
    pub version: String,
    /// The names of the integrations active on the capturing client,
    /// sorted lexicographically.
    pub integrations: Vec<String>,
    /// The packages that make up the SDK.
    pub packages: Vec<SdkPackage>,
}

/// Information about the user who triggered an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    /// The ID of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The email address of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The remote IP address of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// A human readable username of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A breadcrumb: a recorded step that led up to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breadcrumb {
    /// The timestamp of the breadcrumb.
    #[serde(with = "ts_seconds_float", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<SystemTime>,
    /// The type of the breadcrumb.
    #[serde(rename = "type")]
    pub ty: String,
    /// The optional category of the breadcrumb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The non-default level of the breadcrumb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// An optional human readable message for the breadcrumb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arbitrary breadcrumb data that should be sent along.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl Default for Breadcrumb {
    fn default() -> Breadcrumb {
        Breadcrumb {
            timestamp: Some(SystemTime::now()),
            ty: "default".into(),
            category: None,
            level: None,
            message: None,
            data: Map::new(),
        }
    }
}

/// The unit of reportable data.
///
/// An event is created fresh per capture call and never reused.  Fields
/// left unset are defaulted during preparation; see the crate docs for the
/// pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Event {
    /// The ID of the event.  A nil UUID counts as unset and is replaced
    /// during preparation.
    #[serde(skip_serializing_if = "Uuid::is_nil")]
    pub event_id: Uuid,
    /// The severity level of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// The timestamp of when the event was created.
    #[serde(with = "ts_seconds_float", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<SystemTime>,
    /// A human readable message for the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The transaction label of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    /// The server (or device) name reporting this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// A platform identifier for this event.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub platform: String,
    /// The release identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// The distribution identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    /// The environment label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// The user that triggered this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Tags attached to the event.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, String>,
    /// Arbitrary extra information attached to the event.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
    /// The breadcrumbs that led up to the event.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    /// SDK metadata, stamped by the client during preparation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkInfo>,
}

impl Event {
    /// Creates a new event carrying only a message.
    pub fn from_message(message: impl Into<String>) -> Event {
        Event {
            message: Some(message.into()),
            ..Event::default()
        }
    }
}

/// Ephemeral, per-capture-call context.
///
/// A hint informs the scope and filter stages about the one call it
/// accompanies; it is never persisted with an event.
#[derive(Clone, Default)]
pub struct EventHint {
    /// The propagation context of the capture call, if the caller threads
    /// one through.
    pub context: Option<CaptureContext>,
    /// The original error this event was built from, if any.
    pub original_error: Option<Arc<dyn Error + Send + Sync>>,
}

impl fmt::Debug for EventHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHint")
            .field("context", &self.context.is_some())
            .field("original_error", &self.original_error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}
