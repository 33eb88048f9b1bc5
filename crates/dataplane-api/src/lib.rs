//! Typed vocabulary for talking to a packet-processing dataplane.
//!
//! The dataplane owns live interface objects and is driven through a
//! synchronous request/response channel. This crate does not implement that
//! channel; it defines what travels over it so that orchestration code cannot
//! confuse raw integers, strings and status codes:
//!
//! - [`types`]: device handles ([`SwIfIndex`])
//! - [`MacAddress`]: link-layer addresses
//! - [`error`]: device status codes and the [`DeviceError`] type
//! - [`api`]: request payloads for individual device operations
//!
//! # Example
//!
//! ```
//! use ifagent_dataplane::api::AfPacketParams;
//! use ifagent_dataplane::{DeviceResult, SwIfIndex};
//!
//! fn create(params: &AfPacketParams) -> DeviceResult<SwIfIndex> {
//!     params.validate()?;
//!     Ok(SwIfIndex::from_raw(1))
//! }
//!
//! let params = AfPacketParams::new("veth0");
//! assert_eq!(create(&params).unwrap(), SwIfIndex::from_raw(1));
//! ```

pub mod api;
pub mod error;
mod mac;
pub mod types;

pub use error::{DeviceError, DeviceResult, DeviceStatus};
pub use mac::{MacAddress, ParseMacError};
pub use types::SwIfIndex;
