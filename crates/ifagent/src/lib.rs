//! Interface agent.
//!
//! Reconciles AF_PACKET interfaces requested by the upstream interface
//! configurator against the dataplane and the set of host interfaces that
//! currently exist.
//!
//! # Architecture
//!
//! ```text
//! interface configurator ──► AfPacketOrch ──► AfPacketOrchCallbacks (dataplane)
//!                               ▲
//! host notifier ── HostIfEvent ─┘  (drained by OrchDaemon)
//! ```
//!
//! [`afpacket::AfPacketOrch`] owns the dual-indexed cache and the host
//! interface set. [`daemon::OrchDaemon`] drives it (and any other
//! [`ifagent_orch_common::Orch`]) from a single loop, with each
//! orchestrator behind an async mutex so that upstream requests and event
//! handling never interleave.

pub mod afpacket;
pub mod config;
pub mod daemon;

pub use config::{AgentConfig, ConfigError};
