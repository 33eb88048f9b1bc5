//! OrchDaemon implementation.
//!
//! The OrchDaemon drives every registered Orch from one loop:
//! - Orch registration and priority ordering
//! - Task dispatch to Orchs with pending work
//! - Heartbeat pacing and shutdown

use ifagent_orch_common::Orch;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// An Orch shared between the daemon loop and request handlers.
///
/// The mutex serialises event processing with upstream requests.
pub type SharedOrch = Arc<Mutex<dyn Orch>>;

/// Configuration for the OrchDaemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchDaemonConfig {
    /// Heartbeat interval in milliseconds
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
}

impl Default for OrchDaemonConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    1000
}

/// Requests the daemon loop to stop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop_requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the loop to exit after the current iteration.
    pub fn stop(&self) {
        info!("Stopping OrchDaemon");
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Returns true once a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

/// The main orchestration daemon.
pub struct OrchDaemon {
    /// Configuration
    config: OrchDaemonConfig,
    /// Registered Orchs sorted by priority
    orchs: BTreeMap<i32, Vec<SharedOrch>>,
    /// Shutdown flag shared with stop handles
    stop_requested: Arc<AtomicBool>,
}

impl OrchDaemon {
    /// Creates a new OrchDaemon with the given configuration.
    pub fn new(config: OrchDaemonConfig) -> Self {
        Self {
            config,
            orchs: BTreeMap::new(),
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OrchDaemonConfig {
        &self.config
    }

    /// Registers an Orch with the daemon.
    ///
    /// Orchs are ordered by priority (lower = higher priority).
    pub async fn register_orch(&mut self, orch: SharedOrch) {
        let priority = {
            let guard = orch.lock().await;
            info!("Registering {} with priority {}", guard.name(), guard.priority());
            guard.priority()
        };
        self.orchs.entry(priority).or_default().push(orch);
    }

    /// Returns the number of registered Orchs.
    pub fn orch_count(&self) -> usize {
        self.orchs.values().map(Vec::len).sum()
    }

    /// Returns a handle that stops [`OrchDaemon::run`].
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_requested: Arc::clone(&self.stop_requested),
        }
    }

    /// Stops the event loop.
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    /// Runs one pass over all Orchs in priority order.
    ///
    /// Returns the number of Orchs that had pending work.
    pub async fn run_once(&self) -> usize {
        let mut processed = 0;
        for orchs in self.orchs.values() {
            for orch in orchs {
                let mut guard = orch.lock().await;
                if guard.has_pending_tasks() {
                    debug!("Processing tasks for {}", guard.name());
                    guard.do_task().await;
                    processed += 1;
                }
            }
        }
        processed
    }

    /// Runs the main event loop.
    ///
    /// This method returns once a stop is requested.
    pub async fn run(&self) {
        info!(
            "Starting OrchDaemon event loop with {} orchs",
            self.orch_count()
        );
        let heartbeat = Duration::from_millis(self.config.heartbeat_interval_ms);

        while !self.stop_requested.load(Ordering::SeqCst) {
            self.run_once().await;
            tokio::time::sleep(heartbeat).await;
        }

        info!("OrchDaemon event loop stopped");
    }

    /// Dumps Orch state for debugging.
    pub async fn dump(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (priority, orchs) in &self.orchs {
            for orch in orchs {
                let guard = orch.lock().await;
                lines.push(format!("{} (priority {})", guard.name(), priority));
                lines.extend(
                    guard
                        .dump_pending_tasks()
                        .into_iter()
                        .map(|task| format!("  {}", task)),
                );
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct CountingOrch {
        name: &'static str,
        priority: i32,
        queued: usize,
        runs: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Orch for CountingOrch {
        fn name(&self) -> &str {
            self.name
        }

        async fn do_task(&mut self) {
            self.queued = 0;
            self.runs.lock().unwrap().push(self.name);
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn has_pending_tasks(&self) -> bool {
            self.queued > 0
        }

        fn dump_pending_tasks(&self) -> Vec<String> {
            (0..self.queued).map(|i| format!("task {}", i)).collect()
        }
    }

    fn counting(
        name: &'static str,
        priority: i32,
        queued: usize,
        runs: &Arc<std::sync::Mutex<Vec<&'static str>>>,
    ) -> SharedOrch {
        Arc::new(Mutex::new(CountingOrch {
            name,
            priority,
            queued,
            runs: Arc::clone(runs),
        }))
    }

    #[test]
    fn test_default_config() {
        assert_eq!(OrchDaemonConfig::default().heartbeat_interval_ms, 1000);
    }

    #[tokio::test]
    async fn test_run_once_in_priority_order() {
        let runs = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut daemon = OrchDaemon::new(OrchDaemonConfig::default());
        daemon.register_orch(counting("late", 10, 1, &runs)).await;
        daemon.register_orch(counting("idle", 0, 0, &runs)).await;
        daemon.register_orch(counting("early", 1, 2, &runs)).await;
        assert_eq!(daemon.orch_count(), 3);

        assert_eq!(daemon.run_once().await, 2);
        assert_eq!(*runs.lock().unwrap(), vec!["early", "late"]);

        assert_eq!(daemon.run_once().await, 0);
    }

    #[tokio::test]
    async fn test_dump() {
        let runs = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut daemon = OrchDaemon::new(OrchDaemonConfig::default());
        daemon.register_orch(counting("a", 2, 1, &runs)).await;

        assert_eq!(
            daemon.dump().await,
            vec!["a (priority 2)".to_string(), "  task 0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_until_stopped() {
        let runs = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut daemon = OrchDaemon::new(OrchDaemonConfig {
            heartbeat_interval_ms: 5,
        });
        daemon.register_orch(counting("a", 0, 1, &runs)).await;

        let daemon = Arc::new(daemon);
        let handle = daemon.stop_handle();
        let task = tokio::spawn({
            let daemon = Arc::clone(&daemon);
            async move { daemon.run().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.stop();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();

        assert!(handle.is_stopped());
        assert_eq!(*runs.lock().unwrap(), vec!["a"]);
    }
}
