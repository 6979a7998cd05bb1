use crate::fix::{distance_m, AcceptedFix};

/// Sums great-circle segments between consecutive accepted fixes.
#[derive(Debug, Clone, Default)]
pub struct DistanceAccumulator {
    total_m: f64,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the meters added. Zero for the first fix of a trip.
    pub fn add_segment(&mut self, previous: Option<&AcceptedFix>, current: &AcceptedFix) -> f64 {
        let added = previous.map_or(0.0, |prev| distance_m(prev.point(), current.point()));
        self.total_m += added;
        added
    }

    pub fn total_m(&self) -> f64 {
        self.total_m
    }

    pub fn total_km(&self) -> f64 {
        self.total_m / 1000.0
    }
}
