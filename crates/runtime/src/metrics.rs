use std::collections::BTreeMap;

/// Named counters and gauges for the tile pipeline.
///
/// Names sort, so snapshots print in the same order every time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(String, u64)>,
    pub gauges: Vec<(String, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero for counters never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: &str, by: u64) {
        match self.counters.get_mut(name) {
            Some(v) => *v += by,
            None => {
                self.counters.insert(name.to_string(), by);
            }
        }
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: &str, value: i64) {
        match self.gauges.get_mut(name) {
            Some(v) => *v = value,
            None => {
                self.gauges.insert(name.to_string(), value);
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Metrics;

    #[test]
    fn counters_start_at_zero() {
        let mut m = Metrics::new();
        assert_eq!(m.counter("tiles.failed"), 0);
        m.inc_counter("tiles.loaded", 1);
        m.inc_counter("tiles.loaded", 2);
        assert_eq!(m.counter("tiles.loaded"), 3);
    }

    #[test]
    fn gauges_hold_last_value() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge("tiles.in_flight"), None);
        m.set_gauge("tiles.in_flight", 4);
        m.set_gauge("tiles.in_flight", 3);
        assert_eq!(m.gauge("tiles.in_flight"), Some(3));
    }

    #[test]
    fn snapshot_is_sorted_by_name() {
        let mut m = Metrics::new();
        m.inc_counter("tiles.loaded", 1);
        m.inc_counter("tiles.evicted", 5);
        m.set_gauge("tiles.in_flight", 2);
        m.set_gauge("tiles.cached", 40);

        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![("tiles.evicted".to_string(), 5), ("tiles.loaded".to_string(), 1)]
        );
        assert_eq!(
            snap.gauges,
            vec![("tiles.cached".to_string(), 40), ("tiles.in_flight".to_string(), 2)]
        );
    }
}
