use chrono::{DateTime, Utc};
use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// m/s → km/h
pub const MPS_TO_KMH: f64 = 3.6;

/// One location sample as delivered by the location source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Instantaneous speed in m/s; `None` when the receiver did not report one
    pub speed_mps: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl RawFix {
    pub fn new(latitude: f64, longitude: f64, speed_mps: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps,
            timestamp,
        }
    }

    /// Speed in km/h, 0 when absent
    pub fn speed_kmh(&self) -> f64 {
        self.speed_mps.unwrap_or(0.0) * MPS_TO_KMH
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Finite, in-range coordinates and a non-negative finite speed (if any).
    pub fn is_well_formed(&self) -> bool {
        let coords_ok = self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);
        let speed_ok = self
            .speed_mps
            .map_or(true, |s| s.is_finite() && s >= 0.0);
        coords_ok && speed_ok
    }
}

/// A fix that passed the fix filter. Only the filter can build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedFix {
    fix: RawFix,
}

impl AcceptedFix {
    pub(crate) fn from_raw(fix: RawFix) -> Self {
        Self { fix }
    }

    pub fn raw(&self) -> &RawFix {
        &self.fix
    }

    pub fn latitude(&self) -> f64 {
        self.fix.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.fix.longitude
    }

    pub fn speed_kmh(&self) -> f64 {
        self.fix.speed_kmh()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.fix.timestamp
    }

    pub fn point(&self) -> Point<f64> {
        self.fix.point()
    }
}

/// Great-circle distance in meters between two (lon, lat) points
pub fn distance_m(from: Point<f64>, to: Point<f64>) -> f64 {
    from.haversine_distance(&to)
}
