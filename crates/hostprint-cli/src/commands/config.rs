//! `hostprint config`: print the effective configuration as TOML

use std::path::Path;

use anyhow::Context;
use hostprint_engine::ScanConfig;

/// Default configuration, or the one in `path` once validated
pub fn effective_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

pub fn execute(path: Option<&Path>) -> anyhow::Result<()> {
    let config = effective_config(path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_round_trips() {
        let config = effective_config(None).unwrap();
        let rendered = config.to_toml_string().unwrap();
        let reparsed = ScanConfig::from_str(&rendered).unwrap();
        assert_eq!(reparsed.max_depth, config.max_depth);
        assert_eq!(reparsed.commands.len(), config.commands.len());
    }

    #[test]
    fn test_invalid_config_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 0").unwrap();
        let err = effective_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
