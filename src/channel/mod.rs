//! RPC channel to the configuration service.
//!
//! The session core only needs one capability from the transport: invoke a
//! named method on an interface of a bound object and get a typed reply
//! back. [`RpcChannel`] captures that; [`DbusChannel`] implements it over
//! D-Bus and [`testing::MockChannel`] implements it in memory.

pub mod dbus;
pub mod testing;
pub mod types;

pub use dbus::DbusChannel;
pub use types::*;

use async_trait::async_trait;

/// Method invocation against a remote object
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Invoke `interface.method(args...)` on `object`.
    ///
    /// `reply` names the shape the caller expects back; implementations
    /// decode the reply accordingly and report a mismatch as
    /// [`ChannelError::UnexpectedReply`].
    async fn invoke(
        &self,
        object: &ObjectHandle,
        interface: &str,
        method: &str,
        args: &[Value],
        reply: ReplyKind,
    ) -> Result<Value, ChannelError>;

    /// Bus this channel talks to
    fn bus(&self) -> BusKind;
}
