//! Request payloads for dataplane operations.
//!
//! Each submodule describes the parameters of one family of device calls.
//! Payloads validate themselves so malformed requests are rejected before
//! they reach the device channel.
//!
//! - [`afpacket`]: AF_PACKET interface create/delete

pub mod afpacket;

pub use afpacket::{AfPacketParams, MAX_HOST_IF_NAME_LEN};
