use crate::event::{Category, TrafficEvent};
use crate::stats::{FaceStats, PacketStats};
use crate::topology::{Face, FaceId};
use container_policy::{AggregateStatsPolicy, PolicyMap};

struct FaceEntry {
    face: Face,
    stats: FaceStats,
}

/// One counter of one face, as captured by [`StatsTable::snapshot`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsSample {
    pub face: Face,
    pub category: Category,
    pub stats: PacketStats,
}

/// Per-face counters of a single node
///
/// A face gets an entry the first time traffic is recorded for it and keeps it until the table
/// is dropped, so a face that went quiet keeps being reported with zero rates.
pub struct StatsTable {
    entries: PolicyMap<FaceId, FaceEntry, AggregateStatsPolicy>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self {
            entries: PolicyMap::new(AggregateStatsPolicy::new()),
        }
    }

    /// Adds `packets` and `bytes` to one counter of `face`
    pub fn update(&mut self, face: &Face, category: Category, packets: u64, bytes: u64) {
        let Some(entry) = self.entry(face) else {
            return;
        };

        entry.stats.get_mut(category).track(packets, bytes);
    }

    /// Counts one packet of `size_bytes` for every category the event advances
    pub fn record(&mut self, face: &Face, event: TrafficEvent, size_bytes: u64) {
        let Some(entry) = self.entry(face) else {
            return;
        };

        for category in event.categories() {
            entry.stats.get_mut(category).track_one(size_bytes);
        }
    }

    fn entry(&mut self, face: &Face) -> Option<&mut FaceEntry> {
        self.entries
            .get_or_insert_with(face.id(), || FaceEntry {
                face: face.clone(),
                stats: FaceStats::default(),
            })
    }

    /// Every counter of every face, ordered by face id and then by category
    pub fn snapshot(&self) -> Vec<StatsSample> {
        let mut samples = Vec::with_capacity(self.entries.len() * Category::ALL.len());
        for (_, entry) in self.entries.iter() {
            for (category, stats) in entry.stats.iter() {
                samples.push(StatsSample {
                    face: entry.face.clone(),
                    category,
                    stats,
                });
            }
        }

        samples
    }

    /// Zeroes every counter, keeping the faces
    pub fn reset(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stats.reset();
        }
    }

    pub fn face_stats(&self, id: FaceId) -> Option<&FaceStats> {
        self.entries.peek(&id).map(|e| &e.stats)
    }

    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.entries.iter().map(|(_, e)| &e.face)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How often the table was touched since the last [`StatsTable::reset_activity`]
    pub fn activity(&self) -> &AggregateStatsPolicy {
        self.entries.policy()
    }

    pub fn reset_activity(&mut self) {
        self.entries.policy_mut().reset_stats();
    }
}

impl Default for StatsTable {
    fn default() -> Self {
        Self::new()
    }
}
