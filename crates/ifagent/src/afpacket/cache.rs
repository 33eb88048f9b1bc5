//! Dual-indexed cache of AF_PACKET interface configurations.

use ifagent_orch_common::IndexedSyncMap;
use log::{debug, warn};

use super::types::{AfPacketEntry, InterfaceDescriptor};

/// AF_PACKET configurations reachable by interface name and by host
/// interface name.
///
/// Entries live once, keyed by interface name; the host interface index
/// redirects into that table, so a change made through one key is always
/// visible through the other. The cache has no lock of its own.
#[derive(Debug, Default)]
pub struct AfPacketCache {
    entries: IndexedSyncMap<String, String, AfPacketEntry>,
}

impl AfPacketCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or overwrites the entry for `config.name`.
    ///
    /// The descriptor is indexed under its AF_PACKET host interface name
    /// (empty if it has no AF_PACKET section). A host interface binds to at
    /// most one entry: if another interface held it, that entry is evicted
    /// from both indices and returned.
    pub fn put(&mut self, config: InterfaceDescriptor, pending: bool) -> Option<AfPacketEntry> {
        let name = config.name.clone();
        let host_if_name = config.host_if_name().unwrap_or_default().to_string();

        let inserted = self.entries.insert(
            name.clone(),
            host_if_name.clone(),
            AfPacketEntry::new(config, pending),
        );
        debug!(
            "AF_PACKET interface {} added to cache (hostIf: {}, pending: {})",
            name, host_if_name, pending
        );

        let (owner, displaced) = inserted.displaced?;
        warn!(
            "Host interface {} rebound from AF_PACKET {} to {}, evicted {}",
            host_if_name, owner, name, displaced
        );
        Some(displaced)
    }

    /// Returns the name of the interface bound to a host interface.
    pub fn owner_of_host_if(&self, host_if_name: &str) -> Option<&str> {
        self.entries.primary_key(host_if_name).map(String::as_str)
    }

    /// Removes the entry for `config.name` from both indices.
    ///
    /// Returns the removed entry. Removing an unknown interface is a no-op.
    pub fn remove(&mut self, config: &InterfaceDescriptor) -> Option<AfPacketEntry> {
        let (_, entry) = self.entries.remove(config.name.as_str())?;
        debug!("AF_PACKET interface {} removed from cache", config.name);
        Some(entry)
    }

    /// Looks up an entry by interface name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&AfPacketEntry> {
        self.entries.get(name)
    }

    /// Looks up an entry by the host interface it binds to.
    pub fn lookup_by_host_if(&self, host_if_name: &str) -> Option<&AfPacketEntry> {
        self.entries
            .get_by_secondary(host_if_name)
            .map(|(_, entry)| entry)
    }

    /// Returns the number of cached interfaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the pending entries sorted by interface name.
    pub fn pending(&self) -> Vec<&AfPacketEntry> {
        let mut pending: Vec<_> = self.entries.values().filter(|e| e.is_pending()).collect();
        pending.sort_by(|a, b| a.config.name.cmp(&b.config.name));
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::afpacket::types::AfPacketState;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_put_indexes_both_keys() {
        let mut cache = AfPacketCache::new();
        let desc = InterfaceDescriptor::af_packet("afpkt0", "veth0");
        cache.put(desc.clone(), true);

        let by_name = cache.lookup_by_name("afpkt0").unwrap();
        let by_host = cache.lookup_by_host_if("veth0").unwrap();
        assert_eq!(by_name, by_host);
        assert_eq!(by_name.config, desc);
        assert_eq!(by_name.state, AfPacketState::Pending);
    }

    #[test]
    fn test_put_overwrites_same_name() {
        let mut cache = AfPacketCache::new();
        cache.put(InterfaceDescriptor::af_packet("afpkt0", "veth0"), true);
        cache.put(InterfaceDescriptor::af_packet("afpkt0", "veth0"), false);

        assert_eq!(cache.len(), 1);
        assert!(!cache.lookup_by_host_if("veth0").unwrap().is_pending());
    }

    #[test]
    fn test_put_with_new_host_drops_stale_index() {
        let mut cache = AfPacketCache::new();
        cache.put(InterfaceDescriptor::af_packet("afpkt0", "veth0"), false);
        cache.put(InterfaceDescriptor::af_packet("afpkt0", "veth1"), false);

        assert_eq!(cache.len(), 1);
        assert!(cache.lookup_by_host_if("veth0").is_none());
        assert_eq!(
            cache.lookup_by_host_if("veth1").unwrap().config.name,
            "afpkt0"
        );
    }

    #[test]
    fn test_shared_host_if_evicts_previous_entry() {
        let mut cache = AfPacketCache::new();
        let a = InterfaceDescriptor::af_packet("a", "veth0");
        let b = InterfaceDescriptor::af_packet("b", "veth0");
        assert_eq!(cache.put(a.clone(), true), None);

        let evicted = cache.put(b.clone(), true).unwrap();
        assert_eq!(evicted.config, a);
        assert!(evicted.is_pending());

        // Both indices agree: only "b" remains.
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup_by_name("a").is_none());
        assert_eq!(cache.lookup_by_host_if("veth0").unwrap().config, b);
        assert_eq!(cache.owner_of_host_if("veth0"), Some("b"));
        assert!(cache.pending().iter().all(|e| e.config.name == "b"));
    }

    #[test]
    fn test_remove_clears_both_keys() {
        let mut cache = AfPacketCache::new();
        let desc = InterfaceDescriptor::af_packet("afpkt0", "veth0");
        cache.put(desc.clone(), false);

        let removed = cache.remove(&desc).unwrap();
        assert_eq!(removed.config, desc);
        assert!(cache.lookup_by_name("afpkt0").is_none());
        assert!(cache.lookup_by_host_if("veth0").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_uses_cached_host_binding() {
        let mut cache = AfPacketCache::new();
        cache.put(InterfaceDescriptor::af_packet("afpkt0", "veth0"), false);

        // Caller passes a descriptor that disagrees about the host interface.
        cache.remove(&InterfaceDescriptor::af_packet("afpkt0", "veth9"));
        assert!(cache.lookup_by_host_if("veth0").is_none());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cache = AfPacketCache::new();
        cache.put(InterfaceDescriptor::af_packet("afpkt0", "veth0"), false);

        assert!(cache
            .remove(&InterfaceDescriptor::af_packet("afpkt1", "veth1"))
            .is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_pending_sorted() {
        let mut cache = AfPacketCache::new();
        cache.put(InterfaceDescriptor::af_packet("b", "veth1"), true);
        cache.put(InterfaceDescriptor::af_packet("c", "veth2"), false);
        cache.put(InterfaceDescriptor::af_packet("a", "veth0"), true);

        let names: Vec<_> = cache
            .pending()
            .iter()
            .map(|e| e.config.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
