//! External collaborators
//!
//! The engine consumes these through narrow traits: a shell command
//! executor, a content reader, a tamper heuristic, a developer-mode probe
//! and a progress sink. Default implementations live in the submodules.

mod content;
mod shell;
mod tamper;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use content::{is_content_uri, StaticContentReader};
pub use shell::ShellCommandExecutor;
pub use tamper::{RootHeuristics, StaticDeveloperMode, StaticTamperCheck};

/// Failure reported by a collaborator
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A command ran but did not succeed
    #[error("Command '{command}' failed: {reason}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Exit status or signal
        reason: String,
    },

    /// The resource is not available on this host
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// One row of a content query: column name and optional value, in column order
pub type ContentRow = Vec<(String, Option<String>)>;

/// Runs a shell command and returns its output lines
pub trait CommandExecutor: Send + Sync {
    /// Execute `command` and capture stdout line by line
    fn execute(&self, command: &str) -> Result<Vec<String>, CollaboratorError>;
}

/// Row-oriented key/value queries by URI
pub trait ContentReader: Send + Sync {
    /// Query every row behind `uri`
    fn query(&self, uri: &str) -> Result<Vec<ContentRow>, CollaboratorError>;
}

/// Root/tamper heuristic
pub trait TamperCheck: Send + Sync {
    /// Whether the host looks tampered with
    fn is_tampered(&self) -> Result<bool, CollaboratorError>;
}

/// Developer-mode heuristic
pub trait DeveloperModeProbe: Send + Sync {
    /// Integer developer-mode flag (0 when disabled)
    fn developer_mode(&self) -> Result<i64, CollaboratorError>;
}

/// Receives `(count, description)` progress updates
pub trait ProgressSink: Send + Sync {
    /// Report progress. Counts only ever increase, but updates from
    /// different threads may arrive out of order.
    fn report(&self, count: usize, description: &str);
}

/// Progress sink that discards updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _count: usize, _description: &str) {}
}

/// Shared monotonically increasing progress counter
pub struct Progress {
    count: AtomicUsize,
    sink: Arc<dyn ProgressSink>,
}

impl Progress {
    /// Create a counter starting at zero
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            count: AtomicUsize::new(0),
            sink,
        }
    }

    /// Advance the counter and report the new value
    pub fn step(&self, description: &str) -> usize {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        self.sink.report(count, description);
        count
    }

    /// Current count
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<(usize, String)>>);

    impl ProgressSink for Recording {
        fn report(&self, count: usize, description: &str) {
            self.0.lock().push((count, description.to_string()));
        }
    }

    #[test]
    fn test_progress_counts_up() {
        let sink = Arc::new(Recording::default());
        let progress = Progress::new(sink.clone());
        assert_eq!(progress.step("Exploring pkg.A"), 1);
        assert_eq!(progress.step("Exploring pkg.B"), 2);
        assert_eq!(progress.count(), 2);

        let seen = sink.0.lock();
        assert_eq!(seen[1], (2, "Exploring pkg.B".to_string()));
    }

    #[test]
    fn test_progress_is_shared_across_threads() {
        let progress = Arc::new(Progress::new(Arc::new(NoopProgress)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let progress = progress.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        progress.step("tick");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(progress.count(), 100);
    }
}
