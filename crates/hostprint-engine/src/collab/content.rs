//! Content URIs and an in-memory content reader

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use super::{CollaboratorError, ContentReader, ContentRow};

static CONTENT_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^content://[a-zA-Z\d._-]+(/[a-zA-Z\d._-]+)*$").expect("valid regex")
});

/// Whether a string is a content URI (`content://authority/path`)
pub fn is_content_uri(s: &str) -> bool {
    CONTENT_URI.is_match(s)
}

/// Content reader backed by a fixed table of URI → rows
#[derive(Debug, Default, Clone)]
pub struct StaticContentReader {
    tables: FxHashMap<String, Vec<ContentRow>>,
}

impl StaticContentReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rows behind a URI
    pub fn with_table(mut self, uri: impl Into<String>, rows: Vec<ContentRow>) -> Self {
        self.tables.insert(uri.into(), rows);
        self
    }
}

impl ContentReader for StaticContentReader {
    fn query(&self, uri: &str) -> Result<Vec<ContentRow>, CollaboratorError> {
        self.tables
            .get(uri)
            .cloned()
            .ok_or_else(|| CollaboratorError::Unavailable(uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_uri_pattern() {
        assert!(is_content_uri("content://settings"));
        assert!(is_content_uri("content://settings/global"));
        assert!(is_content_uri("content://com.android.contacts/raw_contacts/1"));
        assert!(!is_content_uri("content://"));
        assert!(!is_content_uri("content://settings/"));
        assert!(!is_content_uri("http://settings/global"));
        assert!(!is_content_uri("content://settings/global?x=1"));
    }

    #[test]
    fn test_static_reader() {
        let reader = StaticContentReader::new().with_table(
            "content://settings/global",
            vec![vec![
                ("name".to_string(), Some("adb_enabled".to_string())),
                ("value".to_string(), Some("1".to_string())),
            ]],
        );
        assert_eq!(reader.query("content://settings/global").unwrap().len(), 1);
        assert!(matches!(
            reader.query("content://settings/secure"),
            Err(CollaboratorError::Unavailable(_))
        ));
    }
}
