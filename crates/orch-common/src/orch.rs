//! Base Orch trait.

use async_trait::async_trait;

/// Base trait for all orchestration agents.
///
/// Each orchestrator implements this trait to participate in the daemon
/// event loop. The daemon holds the orchestrator behind a mutex and calls
/// these methods with that lock held.
///
/// # Thread Safety
///
/// Orch implementations must be `Send + Sync` so they can be shared between
/// the daemon loop and the upstream request path. Implementations keep their
/// state in plain collections and rely on the caller's lock for exclusion;
/// they never lock internally.
#[async_trait]
pub trait Orch: Send + Sync {
    /// Returns the name of this Orch (for logging and debugging).
    fn name(&self) -> &str;

    /// Processes queued work.
    ///
    /// Called by the daemon when [`Orch::has_pending_tasks`] returns true.
    /// Implementations drain their consumers and apply each entry; failures
    /// are logged, not retried.
    async fn do_task(&mut self);

    /// Returns the priority of this Orch (lower = processed first).
    fn priority(&self) -> i32 {
        0
    }

    /// Returns true if this Orch has queued work for `do_task`.
    fn has_pending_tasks(&self) -> bool {
        false
    }

    /// Describes outstanding work for debugging.
    ///
    /// This covers both queued tasks and accepted requests that are waiting
    /// on an external precondition.
    fn dump_pending_tasks(&self) -> Vec<String> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingOrch {
        name: String,
        queued: usize,
        processed: usize,
    }

    #[async_trait]
    impl Orch for CountingOrch {
        fn name(&self) -> &str {
            &self.name
        }

        async fn do_task(&mut self) {
            self.processed += self.queued;
            self.queued = 0;
        }

        fn has_pending_tasks(&self) -> bool {
            self.queued > 0
        }
    }

    #[tokio::test]
    async fn test_orch_trait() {
        let mut orch = CountingOrch {
            name: "test".to_string(),
            queued: 3,
            processed: 0,
        };

        assert_eq!(orch.name(), "test");
        assert_eq!(orch.priority(), 0);
        assert!(orch.has_pending_tasks());
        assert!(orch.dump_pending_tasks().is_empty());

        orch.do_task().await;
        assert_eq!(orch.processed, 3);
        assert!(!orch.has_pending_tasks());
    }
}
