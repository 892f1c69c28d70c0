/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn millis(self) -> f64 {
        self.0 * 1000.0
    }

    /// Seconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn add_secs(self, secs: f64) -> Self {
        Time(self.0 + secs)
    }
}

/// Convert a millisecond tuning knob to seconds.
#[inline]
pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::{Time, ms_to_secs};

    #[test]
    fn since_clamps_to_zero() {
        assert_eq!(Time(2.0).since(Time(1.5)), 0.5);
        assert_eq!(Time(1.0).since(Time(3.0)), 0.0);
    }

    #[test]
    fn millis_round_trip_for_knobs() {
        assert_eq!(ms_to_secs(300), 0.3);
        assert_eq!(Time::from_millis(1500), Time(1.5));
        assert_eq!(Time(0.25).millis(), 250.0);
    }
}
