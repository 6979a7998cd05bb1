use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fix::{AcceptedFix, MPS_TO_KMH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrivingEvent {
    None,
    HarshBrake,
    HarshAccel,
}

/// A detected harsh event, handed to observers with the update that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarshEvent {
    pub kind: DrivingEvent,
    pub accel_mps2: f64,
    pub speed_kmh: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// Classifies harsh braking/acceleration from consecutive speed samples.
///
/// Acceleration is estimated against a fixed nominal interval between fixes,
/// not the measured time between them, so irregular sampling biases it.
#[derive(Debug, Clone)]
pub struct EventDetector {
    brake_threshold_mps2: f64,
    accel_threshold_mps2: f64,
    nominal_interval_s: f64,
    last_speed_kmh: f64,
    harsh_brake_count: u32,
    harsh_accel_count: u32,
}

impl EventDetector {
    pub fn new(brake_threshold_mps2: f64, accel_threshold_mps2: f64, nominal_interval_s: f64) -> Self {
        Self {
            brake_threshold_mps2,
            accel_threshold_mps2,
            nominal_interval_s,
            last_speed_kmh: 0.0,
            harsh_brake_count: 0,
            harsh_accel_count: 0,
        }
    }

    /// Pure classification, no counters touched.
    pub fn classify(&self, previous_kmh: f64, current_kmh: f64, elapsed_s: f64) -> DrivingEvent {
        if previous_kmh <= 0.0 {
            return DrivingEvent::None;
        }
        let accel = acceleration_mps2(previous_kmh, current_kmh, elapsed_s);
        if accel < self.brake_threshold_mps2 {
            DrivingEvent::HarshBrake
        } else if accel > self.accel_threshold_mps2 {
            DrivingEvent::HarshAccel
        } else {
            DrivingEvent::None
        }
    }

    /// Feed the speed of a newly accepted fix. Updates counters and the
    /// previous-speed reference, which moves on even when nothing fires.
    pub fn observe(&mut self, fix: &AcceptedFix) -> Option<HarshEvent> {
        let previous = self.last_speed_kmh;
        let current = fix.speed_kmh();
        let kind = self.classify(previous, current, self.nominal_interval_s);
        self.last_speed_kmh = current;

        match kind {
            DrivingEvent::None => return None,
            DrivingEvent::HarshBrake => self.harsh_brake_count += 1,
            DrivingEvent::HarshAccel => self.harsh_accel_count += 1,
        }

        Some(HarshEvent {
            kind,
            accel_mps2: acceleration_mps2(previous, current, self.nominal_interval_s),
            speed_kmh: current,
            latitude: fix.latitude(),
            longitude: fix.longitude(),
            timestamp: fix.timestamp(),
        })
    }

    pub fn last_speed_kmh(&self) -> f64 {
        self.last_speed_kmh
    }

    pub fn harsh_brake_count(&self) -> u32 {
        self.harsh_brake_count
    }

    pub fn harsh_accel_count(&self) -> u32 {
        self.harsh_accel_count
    }
}

impl Default for EventDetector {
    fn default() -> Self {
        Self::new(-3.0, 3.0, 1.0)
    }
}

fn acceleration_mps2(previous_kmh: f64, current_kmh: f64, elapsed_s: f64) -> f64 {
    (current_kmh - previous_kmh) / MPS_TO_KMH / elapsed_s
}
