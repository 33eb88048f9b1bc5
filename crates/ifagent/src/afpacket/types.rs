//! AF_PACKET interface descriptors and cache entries.

use ifagent_dataplane::api::AfPacketParams;
use ifagent_dataplane::{MacAddress, SwIfIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface type discriminator of an [`InterfaceDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    SoftwareLoopback,
    Ethernet,
    MemoryInterface,
    TapInterface,
    AfPacket,
    VxlanTunnel,
}

impl InterfaceType {
    /// Returns the configuration name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceType::SoftwareLoopback => "software_loopback",
            InterfaceType::Ethernet => "ethernet",
            InterfaceType::MemoryInterface => "memory_interface",
            InterfaceType::TapInterface => "tap_interface",
            InterfaceType::AfPacket => "af_packet",
            InterfaceType::VxlanTunnel => "vxlan_tunnel",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AF_PACKET specific part of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AfPacketLink {
    /// Host interface the AF_PACKET interface binds to.
    pub host_if_name: String,
}

/// Desired configuration of one interface, as supplied by the upstream
/// interface configurator.
///
/// Only descriptors with `if_type == AfPacket` and an `afpacket` section are
/// accepted by the AF_PACKET orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// Unique interface name.
    pub name: String,
    /// Interface type discriminator.
    #[serde(rename = "type")]
    pub if_type: InterfaceType,
    /// Administrative state. Applied by the caller, not by this orchestrator.
    #[serde(default)]
    pub enabled: bool,
    /// Link-layer address requested for the interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phys_address: Option<MacAddress>,
    /// AF_PACKET binding; required for `AfPacket` descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afpacket: Option<AfPacketLink>,
}

impl InterfaceDescriptor {
    /// Creates an enabled AF_PACKET descriptor bound to `host_if_name`.
    pub fn af_packet(name: impl Into<String>, host_if_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_type: InterfaceType::AfPacket,
            enabled: true,
            phys_address: None,
            afpacket: Some(AfPacketLink {
                host_if_name: host_if_name.into(),
            }),
        }
    }

    /// Sets the requested link-layer address.
    pub fn with_phys_address(mut self, mac: MacAddress) -> Self {
        self.phys_address = Some(mac);
        self
    }

    /// Returns the bound host interface name, if this descriptor has one.
    pub fn host_if_name(&self) -> Option<&str> {
        self.afpacket.as_ref().map(|link| link.host_if_name.as_str())
    }
}

/// Builds the device request for an AF_PACKET descriptor.
pub(crate) fn af_packet_params(link: &AfPacketLink, desc: &InterfaceDescriptor) -> AfPacketParams {
    AfPacketParams {
        host_if_name: link.host_if_name.clone(),
        hw_addr: desc.phys_address,
    }
}

/// Lifecycle state of a cached AF_PACKET interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AfPacketState {
    /// Accepted, but not created in the device because its host interface
    /// was missing.
    Pending,
    /// Created in the device.
    Active,
}

impl AfPacketState {
    /// Maps the boolean pending flag to a state.
    pub fn from_pending(pending: bool) -> Self {
        if pending {
            AfPacketState::Pending
        } else {
            AfPacketState::Active
        }
    }
}

/// Cached AF_PACKET interface configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfPacketEntry {
    /// Descriptor as last accepted.
    pub config: InterfaceDescriptor,
    /// Whether the device object exists.
    pub state: AfPacketState,
}

impl AfPacketEntry {
    /// Creates a new entry.
    pub fn new(config: InterfaceDescriptor, pending: bool) -> Self {
        Self {
            config,
            state: AfPacketState::from_pending(pending),
        }
    }

    /// Returns true if the entry is waiting for its host interface.
    pub fn is_pending(&self) -> bool {
        self.state == AfPacketState::Pending
    }
}

impl fmt::Display for AfPacketEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AfPacketEntry(name={}, host_if={}, state={:?})",
            self.config.name,
            self.config.host_if_name().unwrap_or(""),
            self.state
        )
    }
}

/// Result of a successful configure request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// The device object was created.
    Created(SwIfIndex),
    /// The host interface is missing; creation is deferred until it appears.
    Pending,
}

impl ConfigureOutcome {
    /// Returns true if creation was deferred.
    pub fn is_pending(&self) -> bool {
        matches!(self, ConfigureOutcome::Pending)
    }

    /// Returns the device handle of a created interface.
    pub fn sw_if_index(&self) -> Option<SwIfIndex> {
        match self {
            ConfigureOutcome::Created(idx) => Some(*idx),
            ConfigureOutcome::Pending => None,
        }
    }
}
