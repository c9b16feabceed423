//! # kiln-sync
//!
//! A single-value handoff channel for coordinating build stages.
//!
//! The client compiler publishes its assets manifest exactly once; the
//! server compiler (and anything else holding a [`ReadChannel`]) awaits
//! that publication. Readers that arrive before the value is published
//! suspend cooperatively; readers that arrive after get the stored value
//! immediately. The value is retained for the lifetime of the channel, so
//! a re-run of the server build against an already-finished client build
//! never blocks.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = kiln_sync::channel::<u32>();
//!
//! let reader = tokio::spawn({
//!     let rx = rx.clone();
//!     async move { *rx.read().await.unwrap() }
//! });
//!
//! tx.publish(42);
//! assert_eq!(reader.await.unwrap(), 42);
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::watch;

/// Error returned when the writer was dropped without ever publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel closed before a value was published")]
pub struct ChannelClosed;

/// Create a connected write/read channel pair.
///
/// The [`WriteChannel`] is single-use: publishing consumes it, so at most
/// one value ever flows through the channel. The [`ReadChannel`] is
/// cheaply cloneable; every clone observes the same published value.
pub fn channel<T>() -> (WriteChannel<T>, ReadChannel<T>) {
    let (tx, rx) = watch::channel(None);
    (WriteChannel { tx }, ReadChannel { rx })
}

/// Writing half of a write-once channel.
#[derive(Debug)]
pub struct WriteChannel<T> {
    tx: watch::Sender<Option<Arc<T>>>,
}

impl<T> WriteChannel<T> {
    /// Publish the value, waking every pending reader.
    ///
    /// Consumes the writer so a second publication is impossible. The
    /// value is stored behind an `Arc` and handed out by reference count,
    /// never cloned.
    pub fn publish(self, value: T) {
        // Send only fails when every reader is gone, in which case the
        // value is simply dropped.
        let _ = self.tx.send(Some(Arc::new(value)));
    }
}

/// Reading half of a write-once channel.
#[derive(Debug)]
pub struct ReadChannel<T> {
    rx: watch::Receiver<Option<Arc<T>>>,
}

impl<T> Clone for ReadChannel<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> ReadChannel<T> {
    /// Wait for the published value.
    ///
    /// Suspends until [`WriteChannel::publish`] runs; afterwards every
    /// call returns the same `Arc` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelClosed`] when the writer was dropped without
    /// publishing, which means the producing build stage died.
    pub async fn read(&self) -> Result<Arc<T>, ChannelClosed> {
        let mut rx = self.rx.clone();
        let guard = rx
            .wait_for(|value| value.is_some())
            .await
            .map_err(|_| ChannelClosed)?;
        guard.as_ref().cloned().ok_or(ChannelClosed)
    }

    /// Return the value if it has already been published.
    pub fn try_read(&self) -> Option<Arc<T>> {
        self.rx.borrow().as_ref().cloned()
    }

    /// Whether a value has been published yet.
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
