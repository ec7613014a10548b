//! Type catalog loading
//!
//! A catalog is a JSON array of fully qualified type names, scanned in
//! order. The lenient loaders log and return an empty catalog on any
//! failure; the `try_` variants report why.

use std::path::Path;

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The document is not a JSON array of strings
    #[error("Invalid catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Parse a catalog, reporting failures
pub fn try_load_from_str(json: &str) -> Result<Vec<String>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a catalog file, reporting failures
pub fn try_load_from_file(path: &Path) -> Result<Vec<String>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    try_load_from_str(&content)
}

/// Parse a catalog; empty on failure
pub fn load_from_str(json: &str) -> Vec<String> {
    try_load_from_str(json).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to parse type catalog");
        Vec::new()
    })
}

/// Read and parse a catalog file; empty on failure
pub fn load_from_file(path: &Path) -> Vec<String> {
    try_load_from_file(path).unwrap_or_else(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to load type catalog");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_preserves_order() {
        let catalog = load_from_str(r#"["pkg.B", "pkg.A", "pkg.B"]"#);
        assert_eq!(catalog, vec!["pkg.B", "pkg.A", "pkg.B"]);
    }

    #[test]
    fn test_malformed_is_empty() {
        assert!(load_from_str("{\"not\": \"an array\"}").is_empty());
        assert!(load_from_str("[1, 2]").is_empty());
        assert!(matches!(try_load_from_str("[1]"), Err(CatalogError::ParseError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, r#"["host.Runtime"]"#).unwrap();
        assert_eq!(load_from_file(&path), vec!["host.Runtime"]);

        let missing = dir.path().join("missing.json");
        assert!(load_from_file(&missing).is_empty());
        assert!(matches!(try_load_from_file(&missing), Err(CatalogError::IoError(_))));
    }
}
