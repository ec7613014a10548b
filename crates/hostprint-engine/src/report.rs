//! Report records and sentinel tokens
//!
//! A report is an ordered list of single-key JSON objects. Values that could
//! not be computed are replaced by a fixed sentinel token; the failure detail
//! goes to the log, never into the record.

use serde_json::{Map, Value};

/// Fixed tokens substituted for values that could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// Exploration or invocation failed
    Err,
    /// Member not considered or not callable
    NotConsidered,
    /// Field value not computable (null)
    FieldNotComputable,
    /// Explicit null return
    Null,
}

impl Sentinel {
    /// Token string
    pub fn as_str(self) -> &'static str {
        match self {
            Sentinel::Err => "ERR",
            Sentinel::NotConsidered => "MNC",
            Sentinel::FieldNotComputable => "FNC",
            Sentinel::Null => "null",
        }
    }
}

impl From<Sentinel> for Value {
    fn from(s: Sentinel) -> Self {
        Value::String(s.as_str().to_string())
    }
}

/// Key of the timing record appended to every report
pub const EXECUTION_TIME_KEY: &str = "execution_time";
/// Key of the developer-mode record
pub const DEVELOPER_MODE_KEY: &str = "isDeveloperModeEnabled";
/// Key of the tamper/root record
pub const ROOTED_KEY: &str = "isDeviceRooted";

/// Merged fingerprint: one single-key object per attribute
pub type Report = Vec<Value>;

/// Build a single-key record
pub fn record(key: impl Into<String>, value: impl Into<Value>) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value.into());
    Value::Object(map)
}

/// Attribute name of a member: `TypeName.memberName`
pub fn attribute_name(type_name: &str, member: &str) -> String {
    format!("{}.{}", type_name, member)
}

/// Look up the value of the first record carrying `key`
pub fn find<'a>(report: &'a [Value], key: &str) -> Option<&'a Value> {
    report.iter().find_map(|r| r.as_object().and_then(|m| m.get(key)))
}

/// Count records whose value is the given sentinel
pub fn count_sentinel(report: &[Value], sentinel: Sentinel) -> usize {
    report
        .iter()
        .filter_map(|r| r.as_object())
        .flat_map(|m| m.values())
        .filter(|v| v.as_str() == Some(sentinel.as_str()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_tokens() {
        assert_eq!(Sentinel::Err.as_str(), "ERR");
        assert_eq!(Sentinel::NotConsidered.as_str(), "MNC");
        assert_eq!(Sentinel::FieldNotComputable.as_str(), "FNC");
        assert_eq!(Value::from(Sentinel::Null), json!("null"));
    }

    #[test]
    fn test_record_and_find() {
        let report = vec![
            record("pkg.Simple.count", 10),
            record("pkg.Simple.getName", Sentinel::Err),
            record(EXECUTION_TIME_KEY, 12u64),
        ];
        assert_eq!(report[0], json!({"pkg.Simple.count": 10}));
        assert_eq!(find(&report, "pkg.Simple.count"), Some(&json!(10)));
        assert_eq!(find(&report, "missing"), None);
        assert_eq!(count_sentinel(&report, Sentinel::Err), 1);
        assert_eq!(count_sentinel(&report, Sentinel::NotConsidered), 0);
    }

    #[test]
    fn test_attribute_name() {
        assert_eq!(attribute_name("pkg.Simple", "getCount"), "pkg.Simple.getCount");
    }
}
