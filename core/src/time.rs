use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A point in simulated time, in seconds.
///
/// Always finite and non-negative, which makes the `f64` totally ordered;
/// that is what lets the event queue key on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct VirtualTime(f64);

impl VirtualTime {
    pub const ZERO: VirtualTime = VirtualTime(0.0);

    pub fn new(secs: f64) -> SimResult<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(SimError::InvalidTime(secs));
        }
        // Folds -0.0 into 0.0 so `total_cmp` agrees with `==`.
        Ok(VirtualTime(secs + 0.0))
    }

    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// The instant `delay` seconds after `self`.
    pub fn after(self, delay: f64) -> SimResult<Self> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimError::InvalidTime(delay));
        }
        VirtualTime::new(self.0 + delay)
    }

    /// Seconds elapsed since `earlier`; zero if `earlier` is in the future.
    pub fn since(self, earlier: VirtualTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    #[inline]
    pub fn is_before(self, other: VirtualTime) -> bool {
        self.0 < other.0
    }
}

impl Eq for VirtualTime {}

impl PartialOrd for VirtualTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VirtualTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for VirtualTime {
    type Error = SimError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        VirtualTime::new(secs)
    }
}

impl From<VirtualTime> for f64 {
    fn from(t: VirtualTime) -> f64 {
        t.0
    }
}

impl Default for VirtualTime {
    fn default() -> Self {
        VirtualTime::ZERO
    }
}

impl std::fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}s", self.0)
    }
}
