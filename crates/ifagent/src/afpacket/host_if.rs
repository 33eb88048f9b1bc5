//! Host interface tracking.
//!
//! The host notifier reports kernel interfaces as they appear and vanish.
//! [`HostInterfaceSet`] mirrors the names currently present, and
//! [`HostIfEvent`] is the queued form of a notification.

use ifagent_orch_common::ConsumerTask;
use std::collections::HashSet;

/// Names of host interfaces currently known to exist.
#[derive(Debug, Clone, Default)]
pub struct HostInterfaceSet {
    names: HashSet<String>,
}

impl HostInterfaceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a host interface; returns false if it was already known.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    /// Forgets a host interface; returns false if it was not known.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    /// Returns true if the host interface exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the number of known host interfaces.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no host interface is known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Host interface lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostIfEvent {
    /// A host interface was created.
    Appeared { name: String, index: u32 },
    /// A host interface was removed.
    Vanished { name: String },
}

impl HostIfEvent {
    /// Creates an appearance notification.
    pub fn appeared(name: impl Into<String>, index: u32) -> Self {
        HostIfEvent::Appeared {
            name: name.into(),
            index,
        }
    }

    /// Creates a removal notification.
    pub fn vanished(name: impl Into<String>) -> Self {
        HostIfEvent::Vanished { name: name.into() }
    }

    /// Returns the host interface name.
    pub fn name(&self) -> &str {
        match self {
            HostIfEvent::Appeared { name, .. } | HostIfEvent::Vanished { name } => name,
        }
    }
}

impl ConsumerTask for HostIfEvent {
    fn key(&self) -> &str {
        self.name()
    }

    fn is_removal(&self) -> bool {
        matches!(self, HostIfEvent::Vanished { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_interface_set() {
        let mut set = HostInterfaceSet::new();
        assert!(set.is_empty());

        assert!(set.insert("veth0"));
        assert!(!set.insert("veth0"));
        assert!(set.contains("veth0"));
        assert_eq!(set.len(), 1);

        assert!(set.remove("veth0"));
        assert!(!set.remove("veth0"));
        assert!(!set.contains("veth0"));
    }

    #[test]
    fn test_event_keys() {
        let appeared = HostIfEvent::appeared("veth0", 12);
        let vanished = HostIfEvent::vanished("veth0");

        assert_eq!(appeared.key(), "veth0");
        assert_eq!(vanished.name(), "veth0");
        assert!(!appeared.is_removal());
        assert!(vanished.is_removal());
    }
}
