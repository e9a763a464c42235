use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::{Result, TransportError};
use crate::traits::Duplex;

/// One end of an in-process duplex channel.
///
/// Messages sent on one end are received on the other in order. Closing or
/// dropping an end makes the other end's `recv` return `Ok(None)`.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
    rx: mpsc::UnboundedReceiver<Bytes>,
    closed: Arc<AtomicBool>,
}

/// Observes whether a [`MemoryTransport`] end has been closed, even after the
/// end itself was moved or dropped.
#[derive(Debug, Clone)]
pub struct CloseProbe {
    closed: Arc<AtomicBool>,
}

impl CloseProbe {
    /// True once `close()` ran or the end was dropped.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl MemoryTransport {
    /// Create a connected pair of ends.
    pub fn pair() -> (Self, Self) {
        let (left_tx, right_rx) = mpsc::unbounded_channel();
        let (right_tx, left_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(left_tx),
                rx: left_rx,
                closed: Arc::new(AtomicBool::new(false)),
            },
            Self {
                tx: Some(right_tx),
                rx: right_rx,
                closed: Arc::new(AtomicBool::new(false)),
            },
        )
    }

    /// A probe reporting whether this end has been closed.
    pub fn probe(&self) -> CloseProbe {
        CloseProbe {
            closed: Arc::clone(&self.closed),
        }
    }

    fn shutdown(&mut self) {
        self.tx = None;
        self.rx.close();
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Duplex for MemoryTransport {
    async fn send(&mut self, message: Bytes) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(message).map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        if self.tx.is_none() {
            return Ok(None);
        }
        Ok(self.rx.recv().await)
    }

    async fn close(&mut self) -> Result<()> {
        self.shutdown();
        Ok(())
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_arrive_in_order() {
        let (mut left, mut right) = MemoryTransport::pair();
        for i in 0..16u8 {
            left.send(Bytes::from(vec![i])).await.unwrap();
        }
        for i in 0..16u8 {
            assert_eq!(right.recv().await.unwrap().unwrap().as_ref(), &[i]);
        }
    }

    #[tokio::test]
    async fn close_is_observed_by_peer_and_probe() {
        let (mut left, mut right) = MemoryTransport::pair();
        let probe = left.probe();
        assert!(!probe.is_closed());

        left.close().await.unwrap();
        assert!(probe.is_closed());
        assert!(right.recv().await.unwrap().is_none());
        assert!(matches!(
            right.send(Bytes::from_static(b"late")).await,
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            left.send(Bytes::from_static(b"late")).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn drop_closes_end() {
        let (left, mut right) = MemoryTransport::pair();
        let probe = left.probe();
        drop(left);

        assert!(probe.is_closed());
        assert!(right.recv().await.unwrap().is_none());
    }
}
