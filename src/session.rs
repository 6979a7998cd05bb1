use chrono::{DateTime, Utc};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::distance::DistanceAccumulator;
use crate::error::{TripError, TripResult};
use crate::events::{EventDetector, HarshEvent};
use crate::filter::{FixFilter, FixVerdict};
use crate::fix::{AcceptedFix, RawFix};
use crate::score::eco_score;
use crate::speed::SpeedStats;

/// Trip state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripState {
    /// Started, no fix accepted yet
    Created,
    /// At least one fix accepted
    Active,
    /// Stopped; terminal
    Finalized,
}

/// Opaque trip identity, echoed unchanged into the finalized record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripIdentity {
    pub car_id: String,
    pub user_id: String,
    pub reservation_id: String,
}

impl TripIdentity {
    pub fn new(
        car_id: impl Into<String>,
        user_id: impl Into<String>,
        reservation_id: impl Into<String>,
    ) -> Self {
        Self {
            car_id: car_id.into(),
            user_id: user_id.into(),
            reservation_id: reservation_id.into(),
        }
    }
}

/// Point-in-time view of the trip so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub distance_km: f64,
    pub current_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub avg_speed_kmh: f64,
    pub elapsed_minutes: u64,
    pub harsh_brake_count: u32,
    pub harsh_accel_count: u32,
    pub accepted_fixes: u64,
    pub rejected_fixes: u64,
}

/// Immutable record produced once when the trip stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedTrip {
    #[serde(flatten)]
    pub identity: TripIdentity,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub distance_km: f64,
    pub duration_minutes: u64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub harsh_brake_count: u32,
    pub harsh_accel_count: u32,
    pub cornering_score: u8,
    pub eco_score: u8,
    pub accepted_fixes: u64,
    pub rejected_fixes: u64,
}

/// Result of feeding one fix into the session
#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    pub verdict: FixVerdict,
    /// Unchanged from before the call when the fix was rejected
    pub snapshot: TripSnapshot,
    pub event: Option<HarshEvent>,
}

impl FixOutcome {
    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }
}

/// One active trip: the accumulators plus the lifecycle around them.
#[derive(Debug, Clone)]
pub struct TripSession {
    identity: TripIdentity,
    config: EngineConfig,
    state: TripState,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    filter: FixFilter,
    distance: DistanceAccumulator,
    speed: SpeedStats,
    events: EventDetector,
    last_fix: Option<AcceptedFix>,
    accepted_fixes: u64,
    rejected_fixes: u64,
}

impl TripSession {
    /// Start a trip with the default thresholds.
    pub fn start(identity: TripIdentity, now: DateTime<Utc>) -> Self {
        Self::build(identity, EngineConfig::default(), now)
    }

    pub fn start_with_config(
        identity: TripIdentity,
        config: EngineConfig,
        now: DateTime<Utc>,
    ) -> TripResult<Self> {
        config.validate()?;
        Ok(Self::build(identity, config, now))
    }

    fn build(identity: TripIdentity, config: EngineConfig, now: DateTime<Utc>) -> Self {
        info!(
            "Trip started: car={} user={} reservation={}",
            identity.car_id, identity.user_id, identity.reservation_id
        );
        TripSession {
            filter: FixFilter::new(config.jump_threshold_m),
            events: EventDetector::new(
                config.harsh_brake_mps2,
                config.harsh_accel_mps2,
                config.nominal_fix_interval_s,
            ),
            identity,
            config,
            state: TripState::Created,
            started_at: now,
            ended_at: None,
            distance: DistanceAccumulator::new(),
            speed: SpeedStats::new(),
            last_fix: None,
            accepted_fixes: 0,
            rejected_fixes: 0,
        }
    }

    /// Feed one raw fix. Rejected fixes leave every accumulator untouched.
    pub fn update(&mut self, raw: RawFix) -> TripResult<FixOutcome> {
        if self.state == TripState::Finalized {
            return Err(TripError::InvalidState(
                "cannot update a finalized trip".to_string(),
            ));
        }

        let verdict = self.filter.evaluate(self.last_fix.as_ref(), &raw);
        let now = raw.timestamp;

        if let FixVerdict::Rejected(reason) = verdict {
            self.rejected_fixes += 1;
            debug!(
                "Fix rejected ({:?}) at ({:.6}, {:.6}), {} rejected so far",
                reason, raw.latitude, raw.longitude, self.rejected_fixes
            );
            return Ok(FixOutcome {
                verdict,
                snapshot: self.snapshot(now),
                event: None,
            });
        }

        let fix = AcceptedFix::from_raw(raw);
        let added_m = self.distance.add_segment(self.last_fix.as_ref(), &fix);
        self.speed.observe(fix.speed_kmh());
        let event = self.events.observe(&fix);
        if let Some(ev) = event.as_ref() {
            debug!("{:?} detected: {:.1} m/s² at {:.1} km/h", ev.kind, ev.accel_mps2, ev.speed_kmh);
        }
        trace!(
            "Fix accepted: +{:.1} m, speed {:.1} km/h",
            added_m,
            fix.speed_kmh()
        );

        self.last_fix = Some(fix);
        self.accepted_fixes += 1;
        self.state = TripState::Active;

        Ok(FixOutcome {
            verdict,
            snapshot: self.snapshot(now),
            event,
        })
    }

    /// Read-only view. Elapsed time is frozen once the trip is finalized.
    pub fn snapshot(&self, now: DateTime<Utc>) -> TripSnapshot {
        let until = self.ended_at.unwrap_or(now);
        TripSnapshot {
            distance_km: self.distance.total_km(),
            current_speed_kmh: self.events.last_speed_kmh(),
            max_speed_kmh: self.speed.max_kmh(),
            avg_speed_kmh: self.speed.average_kmh(),
            elapsed_minutes: whole_minutes(self.started_at, until),
            harsh_brake_count: self.events.harsh_brake_count(),
            harsh_accel_count: self.events.harsh_accel_count(),
            accepted_fixes: self.accepted_fixes,
            rejected_fixes: self.rejected_fixes,
        }
    }

    /// End the trip and produce its record. Only succeeds once.
    pub fn stop(&mut self, now: DateTime<Utc>) -> TripResult<FinalizedTrip> {
        if self.state == TripState::Finalized {
            return Err(TripError::InvalidState(
                "trip already finalized".to_string(),
            ));
        }

        let ended_at = now.max(self.started_at);
        self.state = TripState::Finalized;
        self.ended_at = Some(ended_at);

        let snap = self.snapshot(ended_at);
        let trip = FinalizedTrip {
            identity: self.identity.clone(),
            started_at: self.started_at,
            ended_at,
            distance_km: snap.distance_km,
            duration_minutes: snap.elapsed_minutes,
            avg_speed_kmh: snap.avg_speed_kmh,
            max_speed_kmh: snap.max_speed_kmh,
            harsh_brake_count: snap.harsh_brake_count,
            harsh_accel_count: snap.harsh_accel_count,
            cornering_score: self.config.cornering_score_placeholder,
            eco_score: eco_score(snap.avg_speed_kmh, snap.max_speed_kmh),
            accepted_fixes: snap.accepted_fixes,
            rejected_fixes: snap.rejected_fixes,
        };

        info!(
            "Trip finalized: reservation={} {:.2} km in {} min, avg {:.1} km/h, max {:.1} km/h, eco {}",
            trip.identity.reservation_id,
            trip.distance_km,
            trip.duration_minutes,
            trip.avg_speed_kmh,
            trip.max_speed_kmh,
            trip.eco_score
        );

        Ok(trip)
    }

    pub fn state(&self) -> TripState {
        self.state
    }

    pub fn identity(&self) -> &TripIdentity {
        &self.identity
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_fix(&self) -> Option<&AcceptedFix> {
        self.last_fix.as_ref()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.distance.total_m()
    }

    pub fn max_speed_kmh(&self) -> f64 {
        self.speed.max_kmh()
    }

    pub fn average_speed_kmh(&self) -> f64 {
        self.speed.average_kmh()
    }

    pub fn harsh_brake_count(&self) -> u32 {
        self.events.harsh_brake_count()
    }

    pub fn harsh_accel_count(&self) -> u32 {
        self.events.harsh_accel_count()
    }
}

fn whole_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    to.signed_duration_since(from).num_minutes().max(0) as u64
}
