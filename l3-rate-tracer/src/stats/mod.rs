pub mod table;

pub use table::{StatsSample, StatsTable};

use crate::event::Category;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketStats {
    pub packets: u64,
    pub bytes: u64,
}

impl PacketStats {
    pub fn track(&mut self, packets: u64, bytes: u64) {
        self.packets = self.packets.saturating_add(packets);
        self.bytes = self.bytes.saturating_add(bytes);
    }

    pub fn track_one(&mut self, size_bytes: u64) {
        self.track(1, size_bytes);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectionalStats {
    pub outgoing: PacketStats,
    pub incoming: PacketStats,
    pub dropped: PacketStats,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataStats {
    pub outgoing: PacketStats,
    pub incoming: PacketStats,
    pub dropped: PacketStats,
    /// Subset of `outgoing` answered from the content store
    pub outgoing_from_cache: PacketStats,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionStats {
    pub satisfied: PacketStats,
    pub timed_out: PacketStats,
}

/// Every counter kept for a single face
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceStats {
    pub interests: DirectionalStats,
    pub nacks: DirectionalStats,
    pub data: DataStats,
    pub completions: CompletionStats,
}

impl FaceStats {
    pub fn get(&self, category: Category) -> &PacketStats {
        match category {
            Category::OutInterest => &self.interests.outgoing,
            Category::InInterest => &self.interests.incoming,
            Category::DropInterest => &self.interests.dropped,
            Category::OutNack => &self.nacks.outgoing,
            Category::InNack => &self.nacks.incoming,
            Category::DropNack => &self.nacks.dropped,
            Category::OutData => &self.data.outgoing,
            Category::InData => &self.data.incoming,
            Category::DropData => &self.data.dropped,
            Category::OutDataFromCache => &self.data.outgoing_from_cache,
            Category::SatisfiedInterest => &self.completions.satisfied,
            Category::TimedOutInterest => &self.completions.timed_out,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut PacketStats {
        match category {
            Category::OutInterest => &mut self.interests.outgoing,
            Category::InInterest => &mut self.interests.incoming,
            Category::DropInterest => &mut self.interests.dropped,
            Category::OutNack => &mut self.nacks.outgoing,
            Category::InNack => &mut self.nacks.incoming,
            Category::DropNack => &mut self.nacks.dropped,
            Category::OutData => &mut self.data.outgoing,
            Category::InData => &mut self.data.incoming,
            Category::DropData => &mut self.data.dropped,
            Category::OutDataFromCache => &mut self.data.outgoing_from_cache,
            Category::SatisfiedInterest => &mut self.completions.satisfied,
            Category::TimedOutInterest => &mut self.completions.timed_out,
        }
    }

    /// All counters, in report order
    pub fn iter(&self) -> impl Iterator<Item = (Category, PacketStats)> + '_ {
        Category::ALL.into_iter().map(|c| (c, *self.get(c)))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
