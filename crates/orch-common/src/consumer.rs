//! Per-key task queue for inbound notifications.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;

/// A task that can be queued on a [`Consumer`].
pub trait ConsumerTask: Debug {
    /// Key used for per-key ordering and de-duplication.
    fn key(&self) -> &str;

    /// Returns true if this task removes the keyed object.
    ///
    /// A removal supersedes everything queued before it for the same key.
    fn is_removal(&self) -> bool;
}

/// Configuration for a Consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Name of the notification source (for logging).
    pub source: String,
    /// Maximum number of tasks returned by one [`Consumer::drain`].
    pub batch_size: usize,
}

impl ConsumerConfig {
    /// Creates a new consumer config.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            batch_size: 128,
        }
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Queue of tasks waiting for an orchestrator.
///
/// Tasks are kept in per-key FIFO queues, so ordering is preserved for a
/// given key but not across keys.
///
/// # Deduplication Logic
///
/// When several tasks arrive for the same key before they are drained:
/// - A removal clears everything queued for the key and is queued alone
/// - A non-removal following another non-removal replaces it (newest wins)
/// - A non-removal following a removal is appended (both are kept in order)
#[derive(Debug)]
pub struct Consumer<T> {
    config: ConsumerConfig,
    to_sync: BTreeMap<String, VecDeque<T>>,
    pending_count: usize,
}

impl<T: ConsumerTask> Consumer<T> {
    /// Creates a new consumer with the given configuration.
    pub fn new(config: ConsumerConfig) -> Self {
        Self {
            config,
            to_sync: BTreeMap::new(),
            pending_count: 0,
        }
    }

    /// Returns the notification source name.
    pub fn source(&self) -> &str {
        &self.config.source
    }

    /// Returns true if there are queued tasks.
    pub fn has_pending(&self) -> bool {
        self.pending_count > 0
    }

    /// Returns the number of queued tasks.
    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    /// Queues several tasks in arrival order.
    pub fn add_to_sync(&mut self, tasks: impl IntoIterator<Item = T>) {
        for task in tasks {
            self.add(task);
        }
    }

    /// Queues a single task.
    pub fn add(&mut self, task: T) {
        let queue = self.to_sync.entry(task.key().to_string()).or_default();

        if task.is_removal() {
            self.pending_count -= queue.len();
            queue.clear();
        } else if let Some(last) = queue.back_mut() {
            if !last.is_removal() {
                *last = task;
                return;
            }
        }

        queue.push_back(task);
        self.pending_count += 1;
    }

    /// Drains up to `batch_size` tasks.
    ///
    /// Keys are visited in order and each key's queue is taken whole, so a
    /// batch never splits a key's tasks unless that queue alone exceeds the
    /// batch size.
    pub fn drain(&mut self) -> Vec<T> {
        let limit = self.config.batch_size.max(1);
        let mut result = Vec::with_capacity(self.pending_count.min(limit));

        while result.len() < limit {
            let Some(mut entry) = self.to_sync.first_entry() else {
                break;
            };
            let queue = entry.get_mut();
            while result.len() < limit {
                match queue.pop_front() {
                    Some(task) => result.push(task),
                    None => break,
                }
            }
            if queue.is_empty() {
                entry.remove();
            }
        }

        self.pending_count -= result.len();
        result
    }

    /// Peeks at queued tasks without removing them.
    pub fn peek(&self) -> impl Iterator<Item = &T> {
        self.to_sync.values().flat_map(|q| q.iter())
    }

    /// Clears all queued tasks.
    pub fn clear(&mut self) {
        self.to_sync.clear();
        self.pending_count = 0;
    }

    /// Dumps queued tasks for debugging.
    pub fn dump(&self) -> Vec<String> {
        self.peek()
            .map(|task| format!("{}: {:?}", self.config.source, task))
            .collect()
    }
}
