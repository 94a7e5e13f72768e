use crate::ContainerPolicy;

/// Keeps every item it accepts and refuses new ones once `max_size` items are held
///
/// Nothing is ever evicted: space is only released when the container erases an item.
#[derive(Debug, Default, Clone)]
pub struct PersistentPolicy {
    max_size: usize,
    held: usize,
}

impl PersistentPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size, held: 0 }
    }

    pub fn held(&self) -> usize {
        self.held
    }
}

impl<K: ?Sized> ContainerPolicy<K> for PersistentPolicy {
    fn name(&self) -> &'static str {
        "Persistent"
    }

    fn on_update(&mut self, _: &K) {}

    fn on_insert(&mut self, _: &K) -> bool {
        if self.max_size != 0 && self.held >= self.max_size {
            return false;
        }

        self.held += 1;
        true
    }

    fn on_lookup(&mut self, _: &K) {}

    fn on_erase(&mut self, _: &K) {
        self.held = self.held.saturating_sub(1);
    }

    fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn clear(&mut self) {
        self.held = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_when_full() {
        let mut policy = PersistentPolicy::with_max_size(2);
        assert!(policy.on_insert(&"a"));
        assert!(policy.on_insert(&"b"));
        assert!(!policy.on_insert(&"c"));
        assert_eq!(policy.held(), 2);

        policy.on_erase(&"a");
        assert!(policy.on_insert(&"c"));
    }

    #[test]
    fn test_zero_means_unbounded() {
        let mut policy = PersistentPolicy::new();
        for key in 0..1000u32 {
            assert!(policy.on_insert(&key));
        }

        ContainerPolicy::<u32>::set_max_size(&mut policy, 1000);
        assert!(!policy.on_insert(&1000u32));

        ContainerPolicy::<u32>::clear(&mut policy);
        assert_eq!(policy.held(), 0);
    }
}
