//! Delivery delay buckets.
//!
//! A uniform draw in [0, 1) is matched against an ordered table of cumulative
//! upper bounds; the first bucket whose bound exceeds the draw wins. The
//! buckets partition [0, 1) into widths 0.2, 0.4, 0.3 and 0.1.

use rand::Rng;
use std::fmt;

/// Named latency class of a simulated delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Quick,
    Normal,
    Slow,
    VerySlow,
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKind::Quick => write!(f, "quick"),
            BucketKind::Normal => write!(f, "normal"),
            BucketKind::Slow => write!(f, "slow"),
            BucketKind::VerySlow => write!(f, "very slow"),
        }
    }
}

/// One row of the bucket table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayBucket {
    pub kind: BucketKind,
    /// Cumulative upper bound (exclusive) of the selecting draw
    pub upper: f64,
    pub min_secs: f64,
    pub max_secs: f64,
}

pub const DELAY_BUCKETS: [DelayBucket; 4] = [
    DelayBucket {
        kind: BucketKind::Quick,
        upper: 0.20,
        min_secs: 0.5,
        max_secs: 2.0,
    },
    DelayBucket {
        kind: BucketKind::Normal,
        upper: 0.60,
        min_secs: 2.0,
        max_secs: 5.0,
    },
    DelayBucket {
        kind: BucketKind::Slow,
        upper: 0.90,
        min_secs: 5.0,
        max_secs: 10.0,
    },
    DelayBucket {
        kind: BucketKind::VerySlow,
        upper: 1.0,
        min_secs: 10.0,
        max_secs: 15.0,
    },
];

impl DelayBucket {
    /// Lower bound (inclusive) of the selecting draw.
    pub fn lower(&self) -> f64 {
        DELAY_BUCKETS
            .iter()
            .take_while(|b| b.kind != self.kind)
            .last()
            .map_or(0.0, |prev| prev.upper)
    }

    /// Probability mass of this bucket.
    pub fn width(&self) -> f64 {
        self.upper - self.lower()
    }

    /// Draw a delay uniformly in `[min_secs, max_secs)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min_secs..self.max_secs)
    }
}

/// Pick the bucket for a uniform draw `r` in [0, 1).
///
/// Anything at or past the last bound (only reachable with out-of-range
/// input) falls into the last bucket.
pub fn select_bucket(r: f64) -> &'static DelayBucket {
    DELAY_BUCKETS
        .iter()
        .find(|bucket| r < bucket.upper)
        .unwrap_or(&DELAY_BUCKETS[DELAY_BUCKETS.len() - 1])
}
