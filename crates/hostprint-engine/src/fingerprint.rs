//! Fingerprint orchestration
//!
//! One pass merges, in order: command records, catalog type records,
//! content records, the developer-mode flag, the tamper flag, and finally
//! the elapsed pass time. A failing source is logged and left out; the
//! pass itself always produces a report.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::collab::{
    CollaboratorError, CommandExecutor, ContentReader, ContentRow, DeveloperModeProbe,
    NoopProgress, Progress, ProgressSink, RootHeuristics, ShellCommandExecutor,
    StaticContentReader, StaticDeveloperMode, TamperCheck,
};
use crate::config::ScanConfig;
use crate::error::SourceError;
use crate::factory::InstanceFactory;
use crate::report::{record, Report, Sentinel, DEVELOPER_MODE_KEY, EXECUTION_TIME_KEY, ROOTED_KEY};
use crate::scan::{TypeScan, TypeScanner};
use crate::scheduler::{AffinityThread, JobError, JobHandle, WorkerPool};

/// A queued command and the attribute its output is recorded under
type CommandJob = (String, JobHandle<Result<Vec<String>, CollaboratorError>>);

/// External collaborators consumed by a pass
#[derive(Clone)]
pub struct Collaborators {
    /// Shell command executor
    pub commands: Arc<dyn CommandExecutor>,
    /// Content reader for discovered URIs
    pub content: Arc<dyn ContentReader>,
    /// Tamper/root heuristic
    pub tamper: Arc<dyn TamperCheck>,
    /// Developer-mode heuristic
    pub developer_mode: Arc<dyn DeveloperModeProbe>,
    /// Progress sink
    pub progress: Arc<dyn ProgressSink>,
}

impl Default for Collaborators {
    fn default() -> Self {
        let shell: Arc<dyn CommandExecutor> = Arc::new(ShellCommandExecutor::new());
        Self {
            tamper: Arc::new(RootHeuristics::new(shell.clone())),
            commands: shell,
            content: Arc::new(StaticContentReader::new()),
            developer_mode: Arc::new(StaticDeveloperMode(0)),
            progress: Arc::new(NoopProgress),
        }
    }
}

impl Collaborators {
    /// Replace the command executor
    pub fn with_commands(mut self, commands: Arc<dyn CommandExecutor>) -> Self {
        self.commands = commands;
        self
    }

    /// Replace the content reader
    pub fn with_content(mut self, content: Arc<dyn ContentReader>) -> Self {
        self.content = content;
        self
    }

    /// Replace the tamper heuristic
    pub fn with_tamper(mut self, tamper: Arc<dyn TamperCheck>) -> Self {
        self.tamper = tamper;
        self
    }

    /// Replace the developer-mode probe
    pub fn with_developer_mode(mut self, probe: Arc<dyn DeveloperModeProbe>) -> Self {
        self.developer_mode = probe;
        self
    }

    /// Replace the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }
}

/// Runs fingerprinting passes
pub struct FingerprintExtractor {
    config: Arc<ScanConfig>,
    collaborators: Collaborators,
    pool: WorkerPool,
    affinity: Arc<AffinityThread>,
}

impl FingerprintExtractor {
    /// Start the worker pool and the affinity thread
    pub fn new(config: ScanConfig, collaborators: Collaborators) -> Result<Self, JobError> {
        let pool = WorkerPool::new(config.workers)?;
        let affinity = Arc::new(AffinityThread::new()?);
        Ok(Self {
            config: Arc::new(config),
            collaborators,
            pool,
            affinity,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run one pass over `catalog` with a fresh (or pre-seeded) factory.
    /// The factory and its cache are dropped when the pass ends.
    pub fn extract(&self, factory: InstanceFactory, catalog: Vec<String>) -> Report {
        let start = Instant::now();
        let progress = Arc::new(Progress::new(self.collaborators.progress.clone()));

        let pending_commands = if self.config.run_commands {
            self.spawn_commands(&progress)
        } else {
            Vec::new()
        };

        let scan = match self.scan_types(factory, catalog, &progress) {
            Ok(scan) => scan,
            Err(e) => {
                tracing::error!(error = %e, "type scan failed, omitting its records");
                TypeScan::default()
            }
        };

        let mut report: Report = pending_commands
            .into_iter()
            .map(|(name, handle)| {
                let lines = handle.join().map_err(SourceError::from).and_then(|r| r.map_err(SourceError::from));
                command_record(name, lines)
            })
            .collect();
        report.extend(scan.records);

        if self.config.query_content {
            report.extend(self.content_records(&scan.content_uris, &progress));
        }

        match self.developer_mode() {
            Ok(flag) => report.push(record(DEVELOPER_MODE_KEY, flag)),
            Err(e) => tracing::error!(error = %e, "developer-mode probe failed"),
        }
        match self.tamper() {
            Ok(rooted) => report.push(record(ROOTED_KEY, rooted)),
            Err(e) => tracing::error!(error = %e, "tamper check failed"),
        }

        let elapsed = start.elapsed().as_millis() as u64;
        tracing::debug!(elapsed_ms = elapsed, records = report.len(), "fingerprinting finished");
        report.push(record(EXECUTION_TIME_KEY, elapsed));
        report
    }

    /// Queue every configured command on the pool
    fn spawn_commands(&self, progress: &Arc<Progress>) -> Vec<CommandJob> {
        self.config
            .commands
            .iter()
            .map(|spec| {
                let executor = self.collaborators.commands.clone();
                let progress = progress.clone();
                let command = spec.command.clone();
                let name = spec.name.clone();
                let handle = self.pool.spawn(move || {
                    progress.step(&format!("Executing {}", name));
                    executor.execute(&command)
                });
                (spec.name.clone(), handle)
            })
            .collect()
    }

    /// Scan the catalog as one pool job owning the factory
    fn scan_types(
        &self,
        factory: InstanceFactory,
        catalog: Vec<String>,
        progress: &Arc<Progress>,
    ) -> Result<TypeScan, SourceError> {
        let scanner = TypeScanner::new(self.config.clone());
        let affinity = self.affinity.clone();
        let progress = progress.clone();
        let factory = Arc::new(Mutex::new(factory));
        let handle = self
            .pool
            .spawn(move || scanner.scan_catalog(&factory, &catalog, &affinity, &progress));
        Ok(handle.join()?)
    }

    /// Query each discovered URI in sorted order
    fn content_records(&self, uris: &BTreeSet<String>, progress: &Progress) -> Vec<Value> {
        uris.iter()
            .map(|uri| {
                progress.step(&format!("Exploring {}", uri));
                match self.collaborators.content.query(uri) {
                    Ok(rows) => record(uri.clone(), Value::Array(rows.into_iter().map(row_object).collect())),
                    Err(e) => {
                        tracing::warn!(uri = %uri, error = %e, "content query failed");
                        record(uri.clone(), vec![Value::from(Sentinel::Err)])
                    }
                }
            })
            .collect()
    }

    fn developer_mode(&self) -> Result<i64, SourceError> {
        Ok(self.collaborators.developer_mode.developer_mode()?)
    }

    fn tamper(&self) -> Result<bool, SourceError> {
        Ok(self.collaborators.tamper.is_tampered()?)
    }
}

fn command_record(name: String, lines: Result<Vec<String>, SourceError>) -> Value {
    match lines {
        Ok(lines) => record(name, lines),
        Err(e) => {
            tracing::warn!(command = %name, error = %e, "command failed");
            record(name, vec![Value::from(Sentinel::Err)])
        }
    }
}

fn row_object(row: ContentRow) -> Value {
    let mut out = Map::new();
    for (column, value) in row {
        out.insert(column, value.map(Value::String).unwrap_or(Value::Null));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_object_keeps_column_order() {
        let row = vec![
            ("name".to_string(), Some("adb_enabled".to_string())),
            ("value".to_string(), None),
        ];
        let obj = row_object(row);
        assert_eq!(obj, json!({"name": "adb_enabled", "value": null}));
        let keys: Vec<&String> = obj.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "value"]);
    }

    #[test]
    fn test_command_record_failure_is_err_list() {
        let failed = command_record(
            "kernel".to_string(),
            Err(SourceError::Job(JobError::Disconnected)),
        );
        assert_eq!(failed, json!({"kernel": ["ERR"]}));
        let ok = command_record("kernel".to_string(), Ok(vec!["Linux".to_string()]));
        assert_eq!(ok, json!({"kernel": ["Linux"]}));
    }
}
