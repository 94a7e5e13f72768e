use crate::ContainerPolicy;

/// Measurement-only policy: counts operations and never rejects or evicts anything
#[derive(Debug, Default, Clone)]
pub struct AggregateStatsPolicy {
    updates: u64,
    inserts: u64,
    lookups: u64,
    erases: u64,
}

impl AggregateStatsPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    pub fn erases(&self) -> u64 {
        self.erases
    }

    pub fn reset_stats(&mut self) {
        self.updates = 0;
        self.inserts = 0;
        self.lookups = 0;
        self.erases = 0;
    }
}

impl<K: ?Sized> ContainerPolicy<K> for AggregateStatsPolicy {
    fn name(&self) -> &'static str {
        "AggregateStats"
    }

    fn on_update(&mut self, _: &K) {
        self.updates += 1;
    }

    fn on_insert(&mut self, _: &K) -> bool {
        self.inserts += 1;
        true
    }

    fn on_lookup(&mut self, _: &K) {
        self.lookups += 1;
    }

    fn on_erase(&mut self, _: &K) {
        self.erases += 1;
    }

    fn set_max_size(&mut self, _: usize) {}

    fn max_size(&self) -> usize {
        0
    }

    fn clear(&mut self) {
        // Counters describe activity, not contents, so they survive a clear
    }

    fn reset_stats(&mut self) {
        AggregateStatsPolicy::reset_stats(self)
    }
}
