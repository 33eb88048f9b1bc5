//! AF_PACKET interface orchestration.
//!
//! An AF_PACKET interface attaches the dataplane to an existing host
//! interface. Requests for interfaces whose host interface does not exist yet
//! are accepted and parked as pending; host interface notifications then
//! move interfaces between the pending and active states.

mod cache;
mod host_if;
mod orch;
mod types;

pub use cache::AfPacketCache;
pub use host_if::{HostIfEvent, HostInterfaceSet};
pub use orch::{
    AfPacketOrch, AfPacketOrchCallbacks, AfPacketOrchConfig, AfPacketOrchError,
    AfPacketOrchStats, Result,
};
pub use types::{
    AfPacketEntry, AfPacketLink, AfPacketState, ConfigureOutcome, InterfaceDescriptor,
    InterfaceType,
};
