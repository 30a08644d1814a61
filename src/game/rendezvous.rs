//! Unbuffered hand-off channel
//!
//! A send completes only once the receiver has taken the value. Each value
//! travels with a oneshot acknowledgement that the receiving side fires as it
//! takes the value out of the channel.

use std::fmt;
use tokio::sync::{mpsc, oneshot};

/// Sending half of a rendezvous lane
#[derive(Debug)]
pub struct RendezvousSender<T> {
    inner: mpsc::Sender<(T, oneshot::Sender<()>)>,
}

/// Receiving half of a rendezvous lane
#[derive(Debug)]
pub struct RendezvousReceiver<T> {
    inner: mpsc::Receiver<(T, oneshot::Sender<()>)>,
}

/// The value could not be handed off because the receiver is gone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed<T>(pub T);

impl<T> fmt::Display for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rendezvous receiver dropped")
    }
}

impl<T: fmt::Debug> std::error::Error for Closed<T> {}

/// Create a rendezvous lane
pub fn channel<T>() -> (RendezvousSender<T>, RendezvousReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (RendezvousSender { inner: tx }, RendezvousReceiver { inner: rx })
}

impl<T> RendezvousSender<T> {
    /// Hand `value` over, waiting until the receiver has taken it
    pub async fn send(&self, value: T) -> Result<(), Closed<T>> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if let Err(mpsc::error::SendError((value, _))) = self.inner.send((value, ack_tx)).await {
            return Err(Closed(value));
        }
        // A dropped ack means the receiver went away holding the value
        let _ = ack_rx.await;
        Ok(())
    }
}

impl<T> Clone for RendezvousSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> RendezvousReceiver<T> {
    /// Take the next value; `None` once every sender has been dropped
    pub async fn recv(&mut self) -> Option<T> {
        let (value, ack) = self.inner.recv().await?;
        let _ = ack.send(());
        Some(value)
    }
}
