use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::error::{TripError, TripResult};
use crate::fix::RawFix;
use crate::publish::{NullPublisher, SnapshotPublisher};
use crate::session::{FinalizedTrip, FixOutcome, TripIdentity, TripSession, TripSnapshot, TripState};

/// Shareable handle around one [`TripSession`].
///
/// Writers (the location callback) are serialized by the session mutex.
/// Readers get the last published snapshot through `latest()`, which is an
/// `Arc` swapped whole after each accepted fix, so they never see a torn view.
#[derive(Clone)]
pub struct TripTracker {
    session: Arc<Mutex<TripSession>>,
    latest: Arc<RwLock<Arc<TripSnapshot>>>,
    publisher: Arc<dyn SnapshotPublisher>,
}

impl TripTracker {
    pub fn start(identity: TripIdentity, now: DateTime<Utc>) -> Self {
        Self::wrap(TripSession::start(identity, now), Arc::new(NullPublisher), now)
    }

    pub fn start_with(
        identity: TripIdentity,
        config: EngineConfig,
        publisher: Arc<dyn SnapshotPublisher>,
        now: DateTime<Utc>,
    ) -> TripResult<Self> {
        let session = TripSession::start_with_config(identity, config, now)?;
        Ok(Self::wrap(session, publisher, now))
    }

    fn wrap(session: TripSession, publisher: Arc<dyn SnapshotPublisher>, now: DateTime<Utc>) -> Self {
        let initial = Arc::new(session.snapshot(now));
        TripTracker {
            session: Arc::new(Mutex::new(session)),
            latest: Arc::new(RwLock::new(initial)),
            publisher,
        }
    }

    fn lock_session(&self) -> TripResult<MutexGuard<'_, TripSession>> {
        self.session
            .lock()
            .map_err(|_| TripError::Internal("Failed to acquire session lock".to_string()))
    }

    fn swap_latest(&self, snapshot: TripSnapshot) -> TripResult<()> {
        let mut latest = self
            .latest
            .write()
            .map_err(|_| TripError::Internal("Failed to acquire snapshot lock".to_string()))?;
        *latest = Arc::new(snapshot);
        Ok(())
    }

    /// Feed one fix. Accepted fixes update the published snapshot and notify the publisher.
    pub fn update(&self, fix: RawFix) -> TripResult<FixOutcome> {
        let mut session = self.lock_session()?;
        let outcome = session.update(fix)?;
        if outcome.is_accepted() {
            self.swap_latest(outcome.snapshot.clone())?;
            self.publisher.publish(&outcome.snapshot);
        }
        Ok(outcome)
    }

    /// Last published snapshot, without touching the session lock.
    pub fn latest(&self) -> TripResult<Arc<TripSnapshot>> {
        let latest = self
            .latest
            .read()
            .map_err(|_| TripError::Internal("Failed to acquire snapshot lock".to_string()))?;
        Ok(Arc::clone(&latest))
    }

    /// Fresh snapshot with elapsed time measured at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> TripResult<TripSnapshot> {
        Ok(self.lock_session()?.snapshot(now))
    }

    /// Finalize the trip. Unsubscribe from the location source before calling.
    pub fn stop(&self, now: DateTime<Utc>) -> TripResult<FinalizedTrip> {
        let mut session = self.lock_session()?;
        let trip = session.stop(now)?;
        self.swap_latest(session.snapshot(now))?;
        Ok(trip)
    }

    pub fn state(&self) -> TripResult<TripState> {
        Ok(self.lock_session()?.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::ChannelPublisher;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 19, 8, 30, 0).unwrap()
    }

    fn identity() -> TripIdentity {
        TripIdentity::new("car-1", "user-1", "res-1")
    }

    #[test]
    fn test_latest_only_moves_on_accepted_fix() {
        let tracker = TripTracker::start(identity(), t0());
        tracker
            .update(RawFix::new(52.0, 4.0, Some(10.0), t0()))
            .unwrap();
        let after_first = tracker.latest().unwrap();
        assert_eq!(after_first.accepted_fixes, 1);

        tracker
            .update(RawFix::new(53.0, 4.0, Some(10.0), t0() + Duration::seconds(1)))
            .unwrap();
        let after_jump = tracker.latest().unwrap();
        assert_eq!(after_jump.accepted_fixes, 1);
        assert_eq!(after_jump.rejected_fixes, 0);
        assert_eq!(tracker.snapshot(t0()).unwrap().rejected_fixes, 1);
    }

    #[test]
    fn test_publisher_sees_accepted_updates() {
        let (publisher, rx) = ChannelPublisher::bounded(8);
        let tracker =
            TripTracker::start_with(identity(), EngineConfig::default(), Arc::new(publisher), t0())
                .unwrap();
        tracker
            .update(RawFix::new(52.0, 4.0, Some(10.0), t0()))
            .unwrap();
        tracker
            .update(RawFix::new(f64::NAN, 4.0, Some(10.0), t0()))
            .unwrap();
        tracker
            .update(RawFix::new(52.0002, 4.0, Some(12.0), t0() + Duration::seconds(1)))
            .unwrap();
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_stop_is_terminal_for_all_clones() {
        let tracker = TripTracker::start(identity(), t0());
        let writer = tracker.clone();
        let trip = tracker.stop(t0() + Duration::minutes(3)).unwrap();
        assert_eq!(trip.duration_minutes, 3);
        assert_eq!(writer.state().unwrap(), TripState::Finalized);
        assert!(matches!(
            writer.update(RawFix::new(52.0, 4.0, None, t0())),
            Err(TripError::InvalidState(_))
        ));
        assert_eq!(tracker.latest().unwrap().elapsed_minutes, 3);
    }
}
