use crate::topology::Face;
use std::fmt::{Display, Formatter};

/// A counter kept for every face, in report order
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    OutInterest,
    InInterest,
    DropInterest,
    OutNack,
    InNack,
    DropNack,
    OutData,
    InData,
    DropData,
    OutDataFromCache,
    SatisfiedInterest,
    TimedOutInterest,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::OutInterest,
        Category::InInterest,
        Category::DropInterest,
        Category::OutNack,
        Category::InNack,
        Category::DropNack,
        Category::OutData,
        Category::InData,
        Category::DropData,
        Category::OutDataFromCache,
        Category::SatisfiedInterest,
        Category::TimedOutInterest,
    ];

    /// The token written in the `Type` column of the report
    pub fn as_str(self) -> &'static str {
        match self {
            Category::OutInterest => "OutInterests",
            Category::InInterest => "InInterests",
            Category::DropInterest => "DropInterests",
            Category::OutNack => "OutNacks",
            Category::InNack => "InNacks",
            Category::DropNack => "DropNacks",
            Category::OutData => "OutData",
            Category::InData => "InData",
            Category::DropData => "DropData",
            Category::OutDataFromCache => "OutDataFromCache",
            Category::SatisfiedInterest => "SatisfiedInterests",
            Category::TimedOutInterest => "TimedOutInterests",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the forwarding engine observed on a face
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrafficEvent {
    OutInterest,
    InInterest,
    DropInterest,
    OutNack,
    InNack,
    DropNack,
    /// Data sent on a face; `from_cache` is set when it was answered from the content store
    OutData {
        from_cache: bool,
    },
    InData,
    DropData,
    SatisfiedInterest,
    TimedOutInterest,
}

impl TrafficEvent {
    /// The categories this event advances by one packet
    pub fn categories(self) -> impl Iterator<Item = Category> {
        let (primary, secondary) = match self {
            TrafficEvent::OutInterest => (Category::OutInterest, None),
            TrafficEvent::InInterest => (Category::InInterest, None),
            TrafficEvent::DropInterest => (Category::DropInterest, None),
            TrafficEvent::OutNack => (Category::OutNack, None),
            TrafficEvent::InNack => (Category::InNack, None),
            TrafficEvent::DropNack => (Category::DropNack, None),
            TrafficEvent::OutData { from_cache } => (
                Category::OutData,
                from_cache.then_some(Category::OutDataFromCache),
            ),
            TrafficEvent::InData => (Category::InData, None),
            TrafficEvent::DropData => (Category::DropData, None),
            TrafficEvent::SatisfiedInterest => (Category::SatisfiedInterest, None),
            TrafficEvent::TimedOutInterest => (Category::TimedOutInterest, None),
        };

        std::iter::once(primary).chain(secondary)
    }
}

/// Receives traffic notifications from a node's forwarding engine
pub trait TrafficSink: Send + Sync {
    fn on_traffic(&self, face: &Face, event: TrafficEvent, size_bytes: u64);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report_tokens_follow_report_order() {
        let tokens: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            tokens,
            [
                "OutInterests",
                "InInterests",
                "DropInterests",
                "OutNacks",
                "InNacks",
                "DropNacks",
                "OutData",
                "InData",
                "DropData",
                "OutDataFromCache",
                "SatisfiedInterests",
                "TimedOutInterests",
            ]
        );

        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn test_cached_data_advances_two_categories() {
        let cached: Vec<_> = TrafficEvent::OutData { from_cache: true }
            .categories()
            .collect();
        assert_eq!(cached, [Category::OutData, Category::OutDataFromCache]);

        let fresh: Vec<_> = TrafficEvent::OutData { from_cache: false }
            .categories()
            .collect();
        assert_eq!(fresh, [Category::OutData]);
    }
}
