/// A named, one-time-initialized plugin attached to a client.
///
/// Integrations are registered through
/// [`ClientOptions::integrations`](crate::ClientOptions) and set up once
/// during client construction.  They have no further lifecycle beyond that
/// one initialization call; their names appear, sorted, in the SDK
/// metadata of every event the client prepares.
pub trait Integration: Send + Sync {
    /// The unique name of this integration.
    ///
    /// Registering two integrations under the same name keeps only the
    /// last one.
    fn name(&self) -> &str;

    /// Called exactly once per registration when the integration is
    /// attached to a client.
    fn setup_once(&self);
}
