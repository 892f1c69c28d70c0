use foundation::time::Time;

/// Longest step handed to the camera in one tick (s). A stalled host still
/// advances the clock by the full gap, but inertia and autoplay only see
/// this much of it.
pub const MAX_STEP_S: f64 = 0.25;

/// One tick of the viewer clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub index: u64,
    /// Seconds since the previous tick, capped at [`MAX_STEP_S`].
    pub dt_s: f64,
    /// Clock reading for this tick; throttles and transitions key off it.
    pub time: Time,
}

impl Frame {
    /// Tick `index` of a fixed-rate run.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s: dt_s.clamp(0.0, MAX_STEP_S),
            time: Time(index as f64 * dt_s),
        }
    }

    /// First tick of a run driven by a wall clock.
    pub fn start(time: Time) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
        }
    }

    /// The tick after this one, read at `time`. A clock that went backwards
    /// holds the current time.
    pub fn advance_to(self, time: Time) -> Self {
        let time = if time < self.time { self.time } else { time };
        Self {
            index: self.index + 1,
            dt_s: time.since(self.time).min(MAX_STEP_S),
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, MAX_STEP_S};
    use foundation::time::Time;

    #[test]
    fn fixed_rate_time_follows_index() {
        let f = Frame::new(90, 1.0 / 60.0);
        assert!((f.time.0 - 1.5).abs() < 1e-12);
        assert_eq!(f.dt_s, 1.0 / 60.0);
    }

    #[test]
    fn wall_clock_steps_are_capped() {
        let f = Frame::start(Time(10.0)).advance_to(Time(10.02));
        assert_eq!(f.index, 1);
        assert!((f.dt_s - 0.02).abs() < 1e-12);

        let stalled = f.advance_to(Time(13.0));
        assert_eq!(stalled.index, 2);
        assert_eq!(stalled.time, Time(13.0));
        assert_eq!(stalled.dt_s, MAX_STEP_S);
    }

    #[test]
    fn backwards_clock_holds_time() {
        let f = Frame::start(Time(5.0)).advance_to(Time(4.0));
        assert_eq!(f.time, Time(5.0));
        assert_eq!(f.dt_s, 0.0);
    }
}
