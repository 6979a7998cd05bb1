use serde::Serialize;

use crate::fix::{distance_m, AcceptedFix, RawFix};

/// Why a fix was kept out of the accumulators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RejectReason {
    /// NaN / out-of-range coordinates or a negative speed
    Malformed,
    /// Too far from the last accepted fix for ~1 Hz sampling
    Jump { meters: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FixVerdict {
    /// `segment_m` is the distance from the previous accepted fix (0 for the first fix)
    Accepted { segment_m: f64 },
    Rejected(RejectReason),
}

impl FixVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FixVerdict::Accepted { .. })
    }
}

/// Rejects discontinuous or implausible samples (GPS jumps).
#[derive(Debug, Clone, Copy)]
pub struct FixFilter {
    jump_threshold_m: f64,
}

impl FixFilter {
    pub fn new(jump_threshold_m: f64) -> Self {
        Self { jump_threshold_m }
    }

    pub fn jump_threshold_m(&self) -> f64 {
        self.jump_threshold_m
    }

    pub fn accept(&self, previous: Option<&AcceptedFix>, candidate: &RawFix) -> bool {
        self.evaluate(previous, candidate).is_accepted()
    }

    pub fn evaluate(&self, previous: Option<&AcceptedFix>, candidate: &RawFix) -> FixVerdict {
        if !candidate.is_well_formed() {
            return FixVerdict::Rejected(RejectReason::Malformed);
        }

        let Some(prev) = previous else {
            return FixVerdict::Accepted { segment_m: 0.0 };
        };

        let meters = distance_m(prev.point(), candidate.point());
        if meters > self.jump_threshold_m {
            FixVerdict::Rejected(RejectReason::Jump { meters })
        } else {
            FixVerdict::Accepted { segment_m: meters }
        }
    }
}

impl Default for FixFilter {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn raw(lat: f64, lon: f64) -> RawFix {
        RawFix::new(lat, lon, Some(10.0), Utc::now())
    }

    #[test]
    fn test_first_fix_always_accepted() {
        let filter = FixFilter::default();
        assert_eq!(
            filter.evaluate(None, &raw(0.0, 0.0)),
            FixVerdict::Accepted { segment_m: 0.0 }
        );
    }

    #[test]
    fn test_jump_rejected() {
        let filter = FixFilter::default();
        let prev = AcceptedFix::from_raw(raw(0.0, 0.0));
        // ~111 m north of the equator origin
        let far = raw(0.001, 0.0);
        match filter.evaluate(Some(&prev), &far) {
            FixVerdict::Rejected(RejectReason::Jump { meters }) => assert!(meters > 100.0),
            other => panic!("expected jump rejection, got {other:?}"),
        }
        assert!(!filter.accept(Some(&prev), &far));
    }

    #[test]
    fn test_short_hop_accepted() {
        let filter = FixFilter::default();
        let prev = AcceptedFix::from_raw(raw(0.0, 0.0));
        let near = raw(0.0005, 0.0);
        match filter.evaluate(Some(&prev), &near) {
            FixVerdict::Accepted { segment_m } => assert!(segment_m > 50.0 && segment_m < 60.0),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_rejected_even_first() {
        let filter = FixFilter::default();
        let bad = RawFix::new(f64::NAN, 0.0, None, Utc::now());
        assert_eq!(
            filter.evaluate(None, &bad),
            FixVerdict::Rejected(RejectReason::Malformed)
        );
        let negative = RawFix::new(0.0, 0.0, Some(-2.0), Utc::now());
        assert!(!filter.accept(None, &negative));
    }
}
