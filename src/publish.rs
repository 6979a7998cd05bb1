use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use log::warn;

use crate::session::TripSnapshot;

/// Receives every snapshot produced by an accepted fix.
///
/// Delivery is best-effort; observers only need to converge on the latest
/// snapshot, so implementations may drop.
pub trait SnapshotPublisher: Send + Sync {
    fn publish(&self, snapshot: &TripSnapshot);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl SnapshotPublisher for NullPublisher {
    fn publish(&self, _snapshot: &TripSnapshot) {}
}

/// Pushes snapshots into a bounded channel, dropping when the consumer lags.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: Sender<TripSnapshot>,
}

impl ChannelPublisher {
    /// Returns the publisher and the receiving end for the observer (e.g. UI thread).
    pub fn bounded(capacity: usize) -> (Self, Receiver<TripSnapshot>) {
        let (tx, rx) = channel::bounded(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl SnapshotPublisher for ChannelPublisher {
    fn publish(&self, snapshot: &TripSnapshot) {
        match self.tx.try_send(snapshot.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Snapshot channel full, dropping update");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Snapshot observer disconnected");
            }
        }
    }
}
