//! Catalog type scan
//!
//! For every catalog type: resolve it, obtain an instance, then record each
//! public field and each public method as `{"Type.member": value}`. Field
//! values that look like content URIs are collected for the content source.

use std::collections::BTreeSet;
use std::sync::Arc;

use hostprint_sdk::{FieldInfo, HostValue, TypeDescriptor};
use parking_lot::Mutex;
use serde_json::Value;

use crate::collab::{is_content_uri, Progress};
use crate::config::ScanConfig;
use crate::error::ExplorationResult;
use crate::explorer::ObjectExplorer;
use crate::factory::InstanceFactory;
use crate::report::{attribute_name, record, Sentinel};
use crate::scheduler::AffinityThread;
use crate::selector::{is_constant, is_harvestable_method, is_key_value_access_pattern, is_void_returning};

/// Accessor tried when a field holds its own settings key
const KEY_VALUE_ACCESSOR: &str = "getString";

/// Records and discovered content URIs from scanning one or more types
#[derive(Debug, Default)]
pub struct TypeScan {
    /// `{"Type.member": value}` records in scan order
    pub records: Vec<Value>,
    /// Content URIs seen in field values
    pub content_uris: BTreeSet<String>,
}

impl TypeScan {
    fn merge(&mut self, other: TypeScan) {
        self.records.extend(other.records);
        self.content_uris.extend(other.content_uris);
    }
}

/// Scans catalog types into report records
#[derive(Clone)]
pub struct TypeScanner {
    config: Arc<ScanConfig>,
}

impl TypeScanner {
    /// Create a scanner
    pub fn new(config: Arc<ScanConfig>) -> Self {
        Self { config }
    }

    /// Scan every catalog entry in order.
    ///
    /// The factory lock is taken per type. Types matching the affinity list
    /// are scanned on `affinity` while this thread waits.
    pub fn scan_catalog(
        &self,
        factory: &Arc<Mutex<InstanceFactory>>,
        catalog: &[String],
        affinity: &AffinityThread,
        progress: &Progress,
    ) -> TypeScan {
        let mut scan = TypeScan::default();
        for type_name in catalog {
            progress.step(&format!("Exploring {}", type_name));
            if self.config.requires_affinity(type_name) {
                let scanner = self.clone();
                let factory = factory.clone();
                let name = type_name.clone();
                match affinity.run_blocking(move || scanner.scan_type(&mut factory.lock(), &name)) {
                    Ok(result) => scan.merge(result),
                    Err(e) => tracing::error!(type_name = %type_name, error = %e, "affinity scan failed"),
                }
            } else {
                scan.merge(self.scan_type(&mut factory.lock(), type_name));
            }
        }
        scan
    }

    /// Scan one type: fields first, then methods. An unresolvable type
    /// contributes nothing.
    pub fn scan_type(&self, factory: &mut InstanceFactory, type_name: &str) -> TypeScan {
        let mut scan = TypeScan::default();
        let desc = match factory.introspector().resolve(type_name) {
            Ok(desc) => desc,
            Err(e) => {
                tracing::warn!(type_name, error = %e, "cannot resolve catalog type");
                return scan;
            }
        };
        let instance = factory.get_instance(&desc);
        if instance.is_none() {
            tracing::debug!(type_name, "no instance, instance members are not callable");
        }
        scan.records = self.harvest_fields(factory, &desc, instance.as_ref(), &mut scan.content_uris);
        scan.records.extend(self.harvest_methods(factory, &desc, instance.as_ref()));
        scan
    }

    fn harvest_fields(
        &self,
        factory: &mut InstanceFactory,
        desc: &TypeDescriptor,
        instance: Option<&HostValue>,
        content_uris: &mut BTreeSet<String>,
    ) -> Vec<Value> {
        let host = factory.introspector().clone();
        let owner = canonical_name(&desc.name);
        let mut records = Vec::new();
        for field in desc.public_fields() {
            let attribute = attribute_name(&owner, &field.name);
            let receiver = if field.is_static() { None } else { instance };
            let value = match host.read_field(field, receiver) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(attribute = %attribute, error = %e, "field read failed");
                    records.push(record(attribute, Sentinel::Err));
                    continue;
                }
            };

            let shown = host.display(&value);
            if is_content_uri(&shown) {
                content_uris.insert(shown.clone());
            }
            if value.is_null() {
                records.push(record(attribute, Sentinel::FieldNotComputable));
                continue;
            }
            if is_constant(field, &shown) {
                tracing::debug!(attribute = %attribute, value = %shown, "constant field");
            }

            match self.attribute_value(factory, desc, field, &value, &shown, instance) {
                Ok(rendered) => {
                    let rendered_str = match &rendered {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    if is_content_uri(&rendered_str) {
                        content_uris.insert(rendered_str);
                    }
                    records.push(record(attribute, rendered));
                }
                Err(e) => {
                    tracing::warn!(attribute = %attribute, error = %e, "key lookup failed");
                    records.push(record(attribute, Sentinel::Err));
                }
            }
        }
        records
    }

    /// Value recorded for a non-null field.
    ///
    /// When the field's display string equals its own name (ignoring case)
    /// and the type declares a `getString(provider, key)` accessor, the
    /// field names a settings key: record the looked-up value instead.
    fn attribute_value(
        &self,
        factory: &mut InstanceFactory,
        desc: &TypeDescriptor,
        field: &FieldInfo,
        value: &HostValue,
        shown: &str,
        instance: Option<&HostValue>,
    ) -> ExplorationResult<Value> {
        let accessor = desc
            .declared_method(KEY_VALUE_ACCESSOR)
            .filter(|m| is_key_value_access_pattern(m));
        if let (true, Some(accessor)) = (names_own_value(&field.name, shown), accessor) {
            let provider = factory.default_value(&accessor.parameters[0]);
            let receiver = if accessor.is_static() { None } else { instance };
            let looked_up = factory
                .introspector()
                .invoke_method(accessor, receiver, &[provider, HostValue::str(shown)])?;
            return Ok(ObjectExplorer::new(factory).explore(&looked_up, self.config.max_depth));
        }
        Ok(ObjectExplorer::new(factory).explore(value, self.config.max_depth))
    }

    fn harvest_methods(
        &self,
        factory: &mut InstanceFactory,
        desc: &TypeDescriptor,
        instance: Option<&HostValue>,
    ) -> Vec<Value> {
        let host = factory.introspector().clone();
        let owner = canonical_name(&desc.name);
        let mut records = Vec::new();
        for method in desc.public_methods() {
            let attribute = attribute_name(&owner, &method.name);
            let rendered = if !is_harvestable_method(method) || is_void_returning(method) {
                Sentinel::NotConsidered.into()
            } else if self.config.is_denied_method(&owner, &method.name) {
                Sentinel::NotConsidered.into()
            } else if !method.is_static() && instance.is_none() {
                Sentinel::NotConsidered.into()
            } else {
                let args = factory.default_parameters(&method.parameters);
                let receiver = if method.is_static() { None } else { instance };
                match host.invoke_method(method, receiver, &args) {
                    Ok(result) => ObjectExplorer::new(factory).explore(&result, self.config.max_depth),
                    Err(e) => {
                        tracing::warn!(attribute = %attribute, error = %e, "method invocation failed");
                        Sentinel::Err.into()
                    }
                }
            };
            records.push(record(attribute, rendered));
        }
        records
    }
}

/// Dotted name used in attribute keys (`pkg.Outer$Inner` → `pkg.Outer.Inner`)
/// Whether a field's name equals its displayed value, ignoring case
fn names_own_value(field_name: &str, shown: &str) -> bool {
    field_name.to_lowercase() == shown.to_lowercase()
}

fn canonical_name(type_name: &str) -> String {
    type_name.replace('$', ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprint_sdk::{TypeBuilder, TypeRef, TypeRegistry};
    use serde_json::json;

    fn settings_registry() -> Arc<TypeRegistry> {
        let registry = TypeRegistry::new();
        registry.register(
            TypeBuilder::class("host.ContentResolver")
                .constructor(vec![], |_| Ok(()))
                .build(),
        );
        registry.register(
            TypeBuilder::class("host.Settings$Global")
                .constant("CONTENT_URI", TypeRef::Str, "content://settings/global")
                .constant("ADB_ENABLED", TypeRef::Str, "adb_enabled")
                .constant("NAME", TypeRef::Str, "label")
                .static_field("MISSING", TypeRef::Str, HostValue::Null)
                .static_method(
                    "getString",
                    vec![TypeRef::named("host.ContentResolver"), TypeRef::Str],
                    TypeRef::Str,
                    |inv| {
                        inv.arg(0)?.expect_object("host.ContentResolver")?;
                        Ok(HostValue::str(format!("value-of-{}", inv.arg_str(1)?)))
                    },
                )
                .build(),
        );
        Arc::new(registry)
    }

    #[test]
    fn test_key_value_fields_are_looked_up() {
        let scanner = TypeScanner::new(Arc::new(ScanConfig::default()));
        let mut factory = InstanceFactory::new(settings_registry());
        let scan = scanner.scan_type(&mut factory, "host.Settings$Global");

        assert_eq!(
            scan.records,
            vec![
                json!({"host.Settings.Global.CONTENT_URI": "content://settings/global"}),
                json!({"host.Settings.Global.ADB_ENABLED": "value-of-adb_enabled"}),
                json!({"host.Settings.Global.NAME": "label"}),
                json!({"host.Settings.Global.MISSING": "FNC"}),
                json!({"host.Settings.Global.getString": "value-of-default"}),
            ]
        );
        assert!(scan.content_uris.contains("content://settings/global"));
    }

    #[test]
    fn test_key_match_folds_non_ascii_case() {
        assert!(names_own_value("ADB_ENABLED", "adb_enabled"));
        assert!(names_own_value("ÉTAT_RÉSEAU", "état_réseau"));
        assert!(!names_own_value("NAME", "label"));

        let registry = TypeRegistry::new();
        registry.register(
            TypeBuilder::class("host.ContentResolver")
                .constructor(vec![], |_| Ok(()))
                .build(),
        );
        registry.register(
            TypeBuilder::class("host.Réglages")
                .constant("ÉTAT", TypeRef::Str, "état")
                .static_method(
                    "getString",
                    vec![TypeRef::named("host.ContentResolver"), TypeRef::Str],
                    TypeRef::Str,
                    |inv| Ok(HostValue::str(format!("value-of-{}", inv.arg_str(1)?))),
                )
                .build(),
        );
        let scanner = TypeScanner::new(Arc::new(ScanConfig::default()));
        let mut factory = InstanceFactory::new(Arc::new(registry));
        let scan = scanner.scan_type(&mut factory, "host.Réglages");
        assert_eq!(scan.records[0], json!({"host.Réglages.ÉTAT": "value-of-état"}));
    }

    #[test]
    fn test_unknown_type_contributes_nothing() {
        let scanner = TypeScanner::new(Arc::new(ScanConfig::default()));
        let mut factory = InstanceFactory::new(settings_registry());
        let scan = scanner.scan_type(&mut factory, "pkg.Missing");
        assert!(scan.records.is_empty());
    }

    #[test]
    fn test_denied_methods_not_invoked() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeBuilder::class("android.content.ClipboardManager")
                .constructor(vec![], |_| Ok(()))
                .method("getText", vec![], TypeRef::Str, |_| panic!("clipboard read"))
                .method("getMode", vec![], TypeRef::int(), |_| Ok(HostValue::Int(2)))
                .build(),
        );
        let scanner = TypeScanner::new(Arc::new(ScanConfig::default()));
        let mut factory = InstanceFactory::new(Arc::new(registry));
        let scan = scanner.scan_type(&mut factory, "android.content.ClipboardManager");

        assert_eq!(
            scan.records,
            vec![
                json!({"android.content.ClipboardManager.getText": "MNC"}),
                json!({"android.content.ClipboardManager.getMode": 2}),
            ]
        );
    }
}
