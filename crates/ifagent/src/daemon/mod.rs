//! Orchestration daemon.

mod orchdaemon;

pub use orchdaemon::{OrchDaemon, OrchDaemonConfig, SharedOrch, StopHandle};
