//! Common orchestration abstractions.
//!
//! This crate provides the building blocks shared by every orchestrator in
//! the agent:
//!
//! - [`Orch`]: Base trait for orchestration agents driven by the daemon loop
//! - [`Consumer`]: Per-key, de-duplicating queue of inbound tasks
//! - [`IndexedSyncMap`]: Map with a secondary index that never auto-creates
//!   entries
//!
//! # Architecture
//!
//! 1. Upstream configuration requests and host notifications arrive
//! 2. Notifications are queued on an orchestrator's [`Consumer`]
//! 3. The daemon loop calls [`Orch::do_task`] while holding the
//!    orchestrator's lock, so every orchestrator sees serialized calls
//! 4. Orchestrators translate desired state into dataplane calls
//!
//! # Example
//!
//! ```ignore
//! use ifagent_orch_common::{Consumer, ConsumerConfig, Orch};
//!
//! struct MyOrch {
//!     events: Consumer<MyEvent>,
//! }
//!
//! #[async_trait]
//! impl Orch for MyOrch {
//!     fn name(&self) -> &str { "MyOrch" }
//!
//!     async fn do_task(&mut self) {
//!         for event in self.events.drain() {
//!             self.process(event);
//!         }
//!     }
//! }
//! ```

mod consumer;
mod indexed_map;
mod orch;

pub use consumer::{Consumer, ConsumerConfig, ConsumerTask};
pub use indexed_map::{IndexedSyncMap, Inserted};
pub use orch::Orch;
