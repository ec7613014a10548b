//! `hostprint scan`: fingerprint the local machine

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use hostprint_engine::{catalog, Collaborators, FingerprintExtractor, InstanceFactory, ProgressSink, Report};
use serde_json::Value;

use super::config::effective_config;
use crate::settings::SettingsStore;
use crate::system;

/// Options of one scan
#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    /// JSON array of type names; the whole system host when absent
    pub catalog: Option<PathBuf>,
    /// TOML configuration file
    pub config: Option<PathBuf>,
    /// Report destination; stdout when absent
    pub output: Option<PathBuf>,
    /// Pretty-print the report
    pub pretty: bool,
    /// Skip the shell command table
    pub no_commands: bool,
}

/// Forwards progress updates to the log
struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, count: usize, description: &str) {
        tracing::info!(count, description, "progress");
    }
}

pub fn execute(options: &ScanOptions) -> anyhow::Result<()> {
    let report = run(options)?;
    let rendered = render(report, options.pretty)?;
    match &options.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Run one fingerprinting pass against the system host
pub fn run(options: &ScanOptions) -> anyhow::Result<Report> {
    let mut config = effective_config(options.config.as_deref())?;
    if options.no_commands {
        config.run_commands = false;
    }

    let settings = Arc::new(SettingsStore::from_environment());
    let host = system::system_host(settings.clone());

    let catalog = match &options.catalog {
        Some(path) => catalog::try_load_from_file(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => host.type_names(),
    };
    tracing::debug!(types = catalog.len(), "catalog loaded");

    let mut factory = InstanceFactory::from_config(host.clone(), &config);
    let seeded = system::seed_services(&mut factory, &host)?;
    tracing::debug!(seeded, "services seeded");

    let collaborators = Collaborators::default()
        .with_content(settings.clone())
        .with_developer_mode(settings)
        .with_progress(Arc::new(LogProgress));
    let extractor = FingerprintExtractor::new(config, collaborators)?;
    Ok(extractor.extract(factory, catalog))
}

fn render(report: Report, pretty: bool) -> serde_json::Result<String> {
    let report = Value::Array(report);
    if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprint_engine::report::{find, DEVELOPER_MODE_KEY, EXECUTION_TIME_KEY, ROOTED_KEY};
    use serde_json::json;
    use std::io::Write;

    fn catalog_file(types: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(types).unwrap()).unwrap();
        file
    }

    fn options(catalog: &tempfile::NamedTempFile) -> ScanOptions {
        ScanOptions {
            catalog: Some(catalog.path().to_path_buf()),
            no_commands: true,
            ..ScanOptions::default()
        }
    }

    #[test]
    fn test_scan_settings_provider() {
        let catalog = catalog_file(&["host.provider.Settings$Global"]);
        let report = run(&options(&catalog)).unwrap();

        assert_eq!(
            find(&report, "host.provider.Settings.Global.CONTENT_URI"),
            Some(&json!("content://settings/global"))
        );
        // constant names that match their value resolve through getString
        assert_eq!(find(&report, "host.provider.Settings.Global.ADB_ENABLED"), Some(&json!("0")));
        // invoked with a synthesized key that is not set
        assert_eq!(
            find(&report, "host.provider.Settings.Global.getString"),
            Some(&json!("null"))
        );

        let rows = find(&report, "content://settings/global").unwrap().as_array().unwrap();
        assert!(rows.contains(&json!({"name": "adb_enabled", "value": "0"})));
        assert!(find(&report, DEVELOPER_MODE_KEY).is_some());
    }

    #[test]
    fn test_scan_runtime_and_ui() {
        let catalog = catalog_file(&["host.Runtime", "host.ui.WebView", "host.NoSuchType"]);
        let report = run(&options(&catalog)).unwrap();

        assert_eq!(
            find(&report, "host.Runtime.getAvailableProcessors"),
            Some(&json!(num_cpus::get()))
        );
        assert_eq!(find(&report, "host.Runtime.gc"), Some(&json!("MNC")));
        assert_eq!(
            find(&report, "host.ui.WebView.getThreadName"),
            Some(&json!("hostprint-affinity"))
        );
        assert_eq!(find(&report, "host.ui.WebView.loadUrl"), Some(&json!("MNC")));
        assert!(find(&report, ROOTED_KEY).is_some());
        assert!(report.last().unwrap().get(EXECUTION_TIME_KEY).is_some());
    }

    #[test]
    fn test_missing_catalog_file_fails() {
        let options = ScanOptions {
            catalog: Some(PathBuf::from("/nonexistent/catalog.json")),
            no_commands: true,
            ..ScanOptions::default()
        };
        assert!(run(&options).is_err());
    }

    #[test]
    fn test_report_written_to_output() {
        let catalog = catalog_file(&["host.os.Build"]);
        let out = tempfile::NamedTempFile::new().unwrap();
        let options = ScanOptions {
            output: Some(out.path().to_path_buf()),
            pretty: true,
            ..options(&catalog)
        };
        execute(&options).unwrap();

        let written = fs::read_to_string(out.path()).unwrap();
        assert!(written.starts_with("[\n"));
        let parsed: Vec<Value> = serde_json::from_str(&written).unwrap();
        assert_eq!(find(&parsed, "host.os.Build.OS"), Some(&json!(std::env::consts::OS)));
        assert_eq!(find(&parsed, "host.os.Build.getSerial"), Some(&json!("ERR")));
    }
}
