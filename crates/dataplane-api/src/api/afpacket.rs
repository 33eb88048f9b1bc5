//! AF_PACKET interface requests.
//!
//! An AF_PACKET interface is a device-side interface that sends and receives
//! frames through a raw socket bound to an existing host (kernel) interface.
//! Create and delete both identify the object by that host interface name.

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, DeviceResult};
use crate::mac::MacAddress;

/// Longest host interface name the kernel accepts (IFNAMSIZ minus the NUL).
pub const MAX_HOST_IF_NAME_LEN: usize = 15;

/// Parameters of an AF_PACKET create or delete request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AfPacketParams {
    /// Host interface the raw socket binds to.
    pub host_if_name: String,
    /// Link-layer address for the new interface; the device picks one when
    /// absent. Ignored on delete.
    pub hw_addr: Option<MacAddress>,
}

impl AfPacketParams {
    /// Creates parameters for the given host interface.
    pub fn new(host_if_name: impl Into<String>) -> Self {
        Self {
            host_if_name: host_if_name.into(),
            hw_addr: None,
        }
    }

    /// Sets the link-layer address.
    pub fn with_hw_addr(mut self, hw_addr: MacAddress) -> Self {
        self.hw_addr = Some(hw_addr);
        self
    }

    /// Checks the request against what the kernel and device accept.
    pub fn validate(&self) -> DeviceResult<()> {
        let name = &self.host_if_name;
        if name.is_empty() {
            return Err(DeviceError::invalid_parameter(
                "host interface name cannot be empty",
            ));
        }
        if name.len() > MAX_HOST_IF_NAME_LEN {
            return Err(DeviceError::invalid_parameter(format!(
                "host interface name {} exceeds {} bytes",
                name, MAX_HOST_IF_NAME_LEN
            )));
        }
        if name.contains('/') || name.chars().any(char::is_whitespace) {
            return Err(DeviceError::invalid_parameter(format!(
                "host interface name {:?} contains '/' or whitespace",
                name
            )));
        }
        if let Some(mac) = self.hw_addr {
            if !mac.is_assignable() {
                return Err(DeviceError::invalid_parameter(format!(
                    "{} cannot be assigned to an interface",
                    mac
                )));
            }
        }
        Ok(())
    }
}
