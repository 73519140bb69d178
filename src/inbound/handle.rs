//! Capabilities the registry consumes from concrete front-ends.
//!
//! A factory binds a socket and starts serving; the handle it returns is the
//! only way to stop that front-end again.

use futures_util::future::BoxFuture;

use crate::inbound::error::ListenerError;

/// A bound, running listener.
///
/// The address never changes for the lifetime of the handle.
pub trait ListenerHandle: Send + Sync {
    /// The `host:port` this handle was created for, exactly as requested.
    fn address(&self) -> &str;

    /// Stop accepting and release the bound port.
    ///
    /// Consumes the handle, so it runs at most once. Completes only after the
    /// socket is closed; it has no error channel, implementations log
    /// anything that goes wrong and finish.
    fn close(self: Box<Self>) -> BoxFuture<'static, ()>;
}

/// Binds and starts one kind of front-end.
pub trait ListenerFactory: Send + Sync {
    fn create<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn ListenerHandle>, ListenerError>>;
}
