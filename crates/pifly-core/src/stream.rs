// ── Reactive status stream ──
//
// Subscription handle over the coordinator's snapshot cell.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::error::CoreError;
use crate::model::Status;

/// The coordinator's view after a poll cycle.
///
/// `status` is the last good snapshot and survives failed cycles;
/// `error` is set only while the most recent cycle failed.
#[derive(Debug, Clone, Default)]
pub struct PollSnapshot {
    pub status: Option<Arc<Status>>,
    pub error: Option<CoreError>,
}

impl PollSnapshot {
    /// `true` when there is data and the last cycle succeeded.
    pub fn is_fresh(&self) -> bool {
        self.status.is_some() && self.error.is_none()
    }
}

/// A subscription to poll results.
///
/// Offers both point-in-time access and change notification through
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct StatusStream {
    current: Arc<PollSnapshot>,
    receiver: watch::Receiver<Arc<PollSnapshot>>,
}

impl StatusStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<PollSnapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<PollSnapshot> {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<PollSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next poll result.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<PollSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    ///
    /// The stream yields the current snapshot first, then every update.
    pub fn into_stream(self) -> StatusWatchStream {
        StatusWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StatusWatchStream {
    inner: WatchStream<Arc<PollSnapshot>>,
}

impl Stream for StatusWatchStream {
    type Item = Arc<PollSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
