use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// A connected, message-framed duplex transport.
///
/// Each `send` delivers exactly one message to the remote end and each `recv`
/// yields exactly one message, so no partial reads reach the caller.
pub trait Duplex: Send {
    /// Send one binary message.
    fn send(&mut self, message: Bytes) -> impl Future<Output = Result<()>> + Send;

    /// Receive the next binary message.
    ///
    /// Returns `Ok(None)` once the remote end has closed the connection.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Close the transport. Closing twice is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
