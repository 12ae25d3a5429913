/// The version of the crate, reported in SDK metadata and the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The SDK name reported in event metadata.
pub const SDK_NAME: &str = "faultline.rust";

/// The package name reported in the SDK package list.
pub const PACKAGE_NAME: &str = "faultline";

/// The user agent the default transport reports.
pub const USER_AGENT: &str = concat!("faultline.rust/", env!("CARGO_PKG_VERSION"));

/// The platform tag stamped onto every prepared event.
pub const PLATFORM: &str = "rust";

/// The fixed transaction label stamped onto every prepared event.
///
/// Preparation always overwrites the transaction field with this value,
/// even when the caller supplied one.
pub const TRANSACTION_LABEL: &str = "unlabeled";
