use foundation::time::Time;

/// Fires at most once per interval.
///
/// Used for work that should track the camera but not run every frame:
/// visible-tile recomputation and camera-changed notifications.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Throttle {
    interval_s: f64,
    last: Option<Time>,
}

impl Throttle {
    pub fn new(interval_s: f64) -> Self {
        Self {
            interval_s: interval_s.max(0.0),
            last: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(foundation::time::ms_to_secs(ms))
    }

    /// Returns `true` (and arms the next interval) if `now` is due.
    pub fn ready(&mut self, now: Time) -> bool {
        match self.last {
            Some(last) if now.since(last) < self.interval_s => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Makes the next [`Throttle::ready`] call fire regardless of timing.
    pub fn force(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::Throttle;
    use foundation::time::Time;

    #[test]
    fn fires_once_per_interval() {
        let mut t = Throttle::from_millis(100);
        assert!(t.ready(Time(0.0)));
        assert!(!t.ready(Time(0.05)));
        assert!(t.ready(Time(0.1)));
        assert!(!t.ready(Time(0.15)));
    }

    #[test]
    fn force_rearms_immediately() {
        let mut t = Throttle::from_millis(100);
        assert!(t.ready(Time(0.0)));
        t.force();
        assert!(t.ready(Time(0.01)));
    }
}
