//! Map with a primary key and a redirecting secondary index.
//!
//! Orchestrators often need to find the same record by two names: the name
//! the upstream configuration uses and the name of some external resource
//! the record depends on. Storing the record twice invites the two copies to
//! drift apart. `IndexedSyncMap` stores every value exactly once under its
//! primary key; the secondary index only maps a secondary key to a primary
//! key and every lookup through it is redirected through the primary table.
//!
//! Like a plain `SyncMap`, it never creates entries implicitly: lookups
//! return `Option` and only [`IndexedSyncMap::insert`] adds entries.
//!
//! # Invariants
//!
//! - Each primary entry records the secondary key it was inserted with.
//! - A secondary key maps to exactly one primary key, and every primary
//!   entry is reachable through its secondary key.
//! - Inserting under a secondary key owned by another primary key evicts
//!   that entry from both indices and hands it back to the caller.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Slot<S, V> {
    secondary: S,
    value: V,
}

/// Outcome of [`IndexedSyncMap::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted<K, V> {
    /// Previous value stored under the same primary key.
    pub replaced: Option<V>,
    /// Entry evicted because it was indexed under the same secondary key.
    pub displaced: Option<(K, V)>,
}

/// A map keyed by `K` whose values are also reachable through a secondary
/// key `S`.
///
/// # Example
///
/// ```
/// use ifagent_orch_common::IndexedSyncMap;
///
/// let mut map: IndexedSyncMap<String, String, u32> = IndexedSyncMap::new();
/// map.insert("afpkt0".to_string(), "veth0".to_string(), 7);
///
/// // Mutation through either key is visible through the other.
/// *map.get_mut_by_secondary("veth0").unwrap().1 = 8;
/// assert_eq!(map.get("afpkt0"), Some(&8));
///
/// map.remove("afpkt0");
/// assert!(map.get_by_secondary("veth0").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct IndexedSyncMap<K, S, V> {
    primary: HashMap<K, Slot<S, V>>,
    secondary: HashMap<S, K>,
}

impl<K, S, V> IndexedSyncMap<K, S, V>
where
    K: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self {
            primary: HashMap::new(),
            secondary: HashMap::new(),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Returns true if an entry exists under the primary key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.primary.contains_key(key)
    }

    /// Returns the value for a primary key. **This never creates entries.**
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.primary.get(key).map(|slot| &slot.value)
    }

    /// Returns a mutable reference to the value for a primary key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.primary.get_mut(key).map(|slot| &mut slot.value)
    }

    /// Returns the secondary key an entry was inserted with.
    pub fn secondary_key<Q>(&self, key: &Q) -> Option<&S>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.primary.get(key).map(|slot| &slot.secondary)
    }

    /// Returns the primary key currently indexed under a secondary key.
    pub fn primary_key<R>(&self, secondary: &R) -> Option<&K>
    where
        S: Borrow<R>,
        R: Hash + Eq + ?Sized,
    {
        self.secondary.get(secondary)
    }

    /// Looks up an entry through the secondary index.
    pub fn get_by_secondary<R>(&self, secondary: &R) -> Option<(&K, &V)>
    where
        S: Borrow<R>,
        R: Hash + Eq + ?Sized,
    {
        let key = self.secondary.get(secondary)?;
        self.primary
            .get_key_value(key)
            .map(|(key, slot)| (key, &slot.value))
    }

    /// Looks up an entry through the secondary index for mutation.
    pub fn get_mut_by_secondary<R>(&mut self, secondary: &R) -> Option<(&K, &mut V)>
    where
        S: Borrow<R>,
        R: Hash + Eq + ?Sized,
    {
        let key = self.secondary.get(secondary)?;
        self.primary
            .get_mut(key)
            .map(|slot| &mut slot.value)
            .map(|value| (key, value))
    }

    /// Inserts or overwrites the entry for `key`, indexing it under
    /// `secondary`.
    ///
    /// If the previous entry for `key` used a different secondary key, that
    /// stale mapping is dropped. If `secondary` belonged to another primary
    /// key, that entry is removed from both indices and returned as
    /// [`Inserted::displaced`].
    pub fn insert(&mut self, key: K, secondary: S, value: V) -> Inserted<K, V> {
        let displaced = match self.secondary.get(&secondary) {
            Some(owner) if *owner != key => {
                let owner = owner.clone();
                self.primary
                    .remove(&owner)
                    .map(|slot| (owner, slot.value))
            }
            _ => None,
        };

        let previous = self.primary.insert(
            key.clone(),
            Slot {
                secondary: secondary.clone(),
                value,
            },
        );

        if let Some(old) = &previous {
            if old.secondary != secondary {
                self.drop_secondary_if_owned(&old.secondary, &key);
            }
        }
        self.secondary.insert(secondary, key);

        Inserted {
            replaced: previous.map(|slot| slot.value),
            displaced,
        }
    }

    /// Removes the entry for `key` from both indices.
    ///
    /// Returns the secondary key and value if the entry was present.
    /// Removing a missing key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(S, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (key, slot) = self.primary.remove_entry(key)?;
        self.drop_secondary_if_owned(&slot.secondary, &key);
        Some((slot.secondary, slot.value))
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.primary.clear();
        self.secondary.clear();
    }

    /// Returns an iterator over `(primary, secondary, value)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &S, &V)> {
        self.primary
            .iter()
            .map(|(key, slot)| (key, &slot.secondary, &slot.value))
    }

    /// Returns an iterator over values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.primary.values().map(|slot| &slot.value)
    }

    fn drop_secondary_if_owned(&mut self, secondary: &S, owner: &K) {
        if self.secondary.get(secondary) == Some(owner) {
            self.secondary.remove(secondary);
        }
    }
}

impl<K, S, V> Default for IndexedSyncMap<K, S, V>
where
    K: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_basic_operations() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        assert!(map.is_empty());

        assert_eq!(
            map.insert(key("a"), key("x"), 1),
            Inserted {
                replaced: None,
                displaced: None
            }
        );
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&key("a")));
        assert_eq!(map.get(&key("a")), Some(&1));
        assert_eq!(map.get_by_secondary(&key("x")), Some((&key("a"), &1)));
        assert_eq!(map.secondary_key(&key("a")), Some(&key("x")));
        assert_eq!(map.primary_key(&key("x")), Some(&key("a")));

        assert_eq!(map.remove(&key("a")), Some((key("x"), 1)));
        assert!(map.is_empty());
        assert!(map.get_by_secondary(&key("x")).is_none());
    }

    #[test]
    fn test_lookups_never_create() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();

        assert!(map.get(&key("missing")).is_none());
        assert!(map.get_mut(&key("missing")).is_none());
        assert!(map.get_by_secondary(&key("missing")).is_none());
        assert!(map.get_mut_by_secondary(&key("missing")).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_mutation_visible_through_both_keys() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        map.insert(key("a"), key("x"), 1);

        *map.get_mut(&key("a")).unwrap() = 2;
        assert_eq!(map.get_by_secondary(&key("x")), Some((&key("a"), &2)));

        *map.get_mut_by_secondary(&key("x")).unwrap().1 = 3;
        assert_eq!(map.get(&key("a")), Some(&3));
    }

    #[test]
    fn test_overwrite_moves_secondary() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        map.insert(key("a"), key("x"), 1);

        assert_eq!(map.insert(key("a"), key("y"), 2).replaced, Some(1));
        assert_eq!(map.len(), 1);
        assert!(map.get_by_secondary(&key("x")).is_none());
        assert_eq!(map.get_by_secondary(&key("y")), Some((&key("a"), &2)));
    }

    #[test]
    fn test_shared_secondary_evicts_previous_owner() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        map.insert(key("a"), key("x"), 1);

        let inserted = map.insert(key("b"), key("x"), 2);
        assert_eq!(inserted.replaced, None);
        assert_eq!(inserted.displaced, Some((key("a"), 1)));

        // Every remaining entry is reachable through its secondary key.
        assert_eq!(map.len(), 1);
        assert!(map.get(&key("a")).is_none());
        assert_eq!(map.get_by_secondary(&key("x")), Some((&key("b"), &2)));
        for (k, s, _) in map.iter() {
            assert_eq!(map.primary_key(s), Some(k));
        }

        map.remove(&key("b"));
        assert!(map.get_by_secondary(&key("x")).is_none());
    }

    #[test]
    fn test_reinsert_same_key_does_not_displace() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        map.insert(key("a"), key("x"), 1);

        let inserted = map.insert(key("a"), key("x"), 2);
        assert_eq!(inserted.replaced, Some(1));
        assert_eq!(inserted.displaced, None);
        assert_eq!(map.get_by_secondary(&key("x")), Some((&key("a"), &2)));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        map.insert(key("a"), key("x"), 1);

        assert_eq!(map.remove(&key("b")), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&key("a")), Some((key("x"), 1)));
        assert_eq!(map.remove(&key("a")), None);
    }

    #[test]
    fn test_iter_and_clear() {
        let mut map: IndexedSyncMap<String, String, i32> = IndexedSyncMap::new();
        map.insert(key("a"), key("x"), 1);
        map.insert(key("b"), key("y"), 2);

        let mut seen: Vec<_> = map
            .iter()
            .map(|(k, s, v)| (k.clone(), s.clone(), *v))
            .collect();
        seen.sort();
        assert_eq!(seen, vec![(key("a"), key("x"), 1), (key("b"), key("y"), 2)]);
        assert_eq!(map.values().sum::<i32>(), 3);

        map.clear();
        assert!(map.is_empty());
        assert!(map.get_by_secondary(&key("x")).is_none());
    }
}
