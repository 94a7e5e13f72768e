use crate::ContainerPolicy;
use std::collections::BTreeMap;

/// An ordered map whose operations are reported to a [`ContainerPolicy`]
///
/// Iteration follows ascending key order. Iterating does not count as a lookup.
pub struct PolicyMap<K, V, P: ContainerPolicy<K>> {
    items: BTreeMap<K, V>,
    policy: P,
}

impl<K: Ord + Clone, V, P: ContainerPolicy<K>> PolicyMap<K, V, P> {
    pub fn new(policy: P) -> Self {
        Self {
            items: BTreeMap::new(),
            policy,
        }
    }

    pub fn with_max_size(mut policy: P, max_size: usize) -> Self {
        policy.set_max_size(max_size);
        Self::new(policy)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Reads the value under `key` without reporting a lookup
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.items.get(key)
    }

    /// Stores `value` under `key`, returning whether it was stored
    ///
    /// Replacing an existing value counts as an update and is never rejected.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if let Some(existing) = self.items.get_mut(&key) {
            *existing = value;
            self.policy.on_update(&key);
            return true;
        }

        if !self.policy.on_insert(&key) {
            return false;
        }

        self.items.insert(key, value);
        true
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let value = self.items.get(key)?;
        self.policy.on_lookup(key);
        Some(value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let value = self.items.get_mut(key)?;
        self.policy.on_lookup(key);
        Some(value)
    }

    /// Looks up `key`, inserting the value produced by `make` if it is missing
    ///
    /// Returns `None` only when the policy rejects the insertion.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> Option<&mut V> {
        if self.items.contains_key(&key) {
            self.policy.on_lookup(&key);
        } else if self.policy.on_insert(&key) {
            self.items.insert(key.clone(), make());
        } else {
            return None;
        }

        self.items.get_mut(&key)
    }

    /// Modifies the value under `key` in place, returning whether it existed
    pub fn update(&mut self, key: &K, f: impl FnOnce(&mut V)) -> bool {
        match self.items.get_mut(key) {
            Some(value) => {
                f(value);
                self.policy.on_update(key);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        if !self.items.contains_key(key) {
            return None;
        }

        self.policy.on_erase(key);
        self.items.remove(key)
    }

    /// Erases every item, then lets the policy drop whatever it tracks
    pub fn clear(&mut self) {
        for key in self.items.keys() {
            self.policy.on_erase(key);
        }

        self.items.clear();
        self.policy.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.items.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.items.keys()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.items.values_mut()
    }
}

impl<K, V, P: ContainerPolicy<K>> Drop for PolicyMap<K, V, P> {
    fn drop(&mut self) {
        self.policy.clear();
    }
}
