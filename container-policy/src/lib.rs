//! Pluggable policies for keyed containers
//!
//! A policy observes every operation performed on its host container and may veto insertions. The
//! container keeps its own algorithm; the policy only gets to count, bound or evict. All policies
//! expose the same capability set, so a container can be instrumented or bounded by swapping the
//! policy it is built with.

mod aggregate_stats;
mod map;
mod persistent;

pub use aggregate_stats::AggregateStatsPolicy;
pub use map::PolicyMap;
pub use persistent::PersistentPolicy;

/// The capability set every container policy must provide
///
/// `K` is the key type of the host container, and each hook receives the key of the item being
/// operated on.
pub trait ContainerPolicy<K: ?Sized> {
    /// A name identifying the policy in logs
    fn name(&self) -> &'static str;

    /// An existing item was updated in place
    fn on_update(&mut self, item: &K);

    /// A new item is about to be inserted; returning `false` rejects it
    fn on_insert(&mut self, item: &K) -> bool;

    /// An existing item was looked up
    fn on_lookup(&mut self, item: &K);

    /// An existing item is about to be removed
    fn on_erase(&mut self, item: &K);

    /// Bounds the number of items the policy will accept (0 means unbounded)
    fn set_max_size(&mut self, max_size: usize);

    fn max_size(&self) -> usize;

    /// Called when the host container is cleared or torn down
    fn clear(&mut self);

    /// Zeroes whatever statistics the policy keeps
    fn reset_stats(&mut self) {}
}

impl<K: ?Sized, P: ContainerPolicy<K> + ?Sized> ContainerPolicy<K> for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_update(&mut self, item: &K) {
        (**self).on_update(item)
    }

    fn on_insert(&mut self, item: &K) -> bool {
        (**self).on_insert(item)
    }

    fn on_lookup(&mut self, item: &K) {
        (**self).on_lookup(item)
    }

    fn on_erase(&mut self, item: &K) {
        (**self).on_erase(item)
    }

    fn set_max_size(&mut self, max_size: usize) {
        (**self).set_max_size(max_size)
    }

    fn max_size(&self) -> usize {
        (**self).max_size()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn reset_stats(&mut self) {
        (**self).reset_stats()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_boxed_policy_is_a_policy() {
        let policies: Vec<Box<dyn ContainerPolicy<u32>>> = vec![
            Box::new(AggregateStatsPolicy::new()),
            Box::new(PersistentPolicy::with_max_size(1)),
        ];

        let names: Vec<_> = policies.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["AggregateStats", "Persistent"]);

        let mut map = PolicyMap::new(policies.into_iter().nth(1).unwrap());
        assert!(map.insert(1u32, "one"));
        assert!(!map.insert(2, "two"));
        assert_eq!(map.len(), 1);
    }
}
