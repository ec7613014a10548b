//! Tamper and developer-mode heuristics

use std::path::PathBuf;
use std::sync::Arc;

use super::{CollaboratorError, CommandExecutor, DeveloperModeProbe, TamperCheck};

/// Known su binary and root-manager paths
const ROOT_PATHS: &[&str] = &[
    "/system/app/Superuser.apk",
    "/sbin/su",
    "/system/bin/su",
    "/system/xbin/su",
    "/data/local/xbin/su",
    "/data/local/bin/su",
    "/system/sd/xbin/su",
    "/system/bin/failsafe/su",
    "/data/local/su",
    "/sbin/.magisk",
    "/sbin/.core/mirror",
];

/// Binaries whose presence on `PATH` suggests a rooted host
const ROOT_BINARIES: &[&str] = &["su", "busybox"];

/// File and `which` based root detection
pub struct RootHeuristics {
    paths: Vec<PathBuf>,
    executor: Arc<dyn CommandExecutor>,
}

impl RootHeuristics {
    /// Check the well-known paths, probing binaries through `executor`
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self::with_paths(executor, ROOT_PATHS.iter().map(PathBuf::from).collect())
    }

    /// Check a custom set of paths
    pub fn with_paths(executor: Arc<dyn CommandExecutor>, paths: Vec<PathBuf>) -> Self {
        Self { paths, executor }
    }

    fn any_path_exists(&self) -> bool {
        self.paths.iter().any(|p| p.exists())
    }

    fn binary_on_path(&self, binary: &str) -> bool {
        match self.executor.execute(&format!("which {}", binary)) {
            Ok(lines) => lines.iter().any(|l| !l.trim().is_empty()),
            Err(e) => {
                tracing::debug!(binary, error = %e, "which failed");
                false
            }
        }
    }
}

impl TamperCheck for RootHeuristics {
    fn is_tampered(&self) -> Result<bool, CollaboratorError> {
        Ok(self.any_path_exists() || ROOT_BINARIES.iter().any(|b| self.binary_on_path(b)))
    }
}

/// Tamper check with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct StaticTamperCheck(pub bool);

impl TamperCheck for StaticTamperCheck {
    fn is_tampered(&self) -> Result<bool, CollaboratorError> {
        Ok(self.0)
    }
}

/// Developer-mode probe with a fixed flag
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDeveloperMode(pub i64);

impl DeveloperModeProbe for StaticDeveloperMode {
    fn developer_mode(&self) -> Result<i64, CollaboratorError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeWhich(Vec<&'static str>);

    impl CommandExecutor for FakeWhich {
        fn execute(&self, command: &str) -> Result<Vec<String>, CollaboratorError> {
            let binary = command.trim_start_matches("which ");
            if self.0.contains(&binary) {
                Ok(vec![format!("/usr/bin/{}", binary)])
            } else {
                Err(CollaboratorError::CommandFailed {
                    command: command.to_string(),
                    reason: "exit status: 1".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_clean_host() {
        let check = RootHeuristics::with_paths(Arc::new(FakeWhich(vec![])), vec![]);
        assert!(!check.is_tampered().unwrap());
    }

    #[test]
    fn test_binary_on_path() {
        let check = RootHeuristics::with_paths(Arc::new(FakeWhich(vec!["busybox"])), vec![]);
        assert!(check.is_tampered().unwrap());
    }

    #[test]
    fn test_marker_file() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("su");
        std::fs::write(&marker, b"").unwrap();
        let check = RootHeuristics::with_paths(Arc::new(FakeWhich(vec![])), vec![marker]);
        assert!(check.is_tampered().unwrap());
    }

    #[test]
    fn test_static_probes() {
        assert!(StaticTamperCheck(true).is_tampered().unwrap());
        assert_eq!(StaticDeveloperMode(1).developer_mode().unwrap(), 1);
    }
}
