//! Member selection heuristics
//!
//! Stateless predicates deciding which fields and methods are worth
//! harvesting. The method filter is a name-based allowlist: it misses some
//! real accessors and admits some methods that are not pure accessors.

use hostprint_sdk::{FieldInfo, MethodInfo, Primitive, TypeRef};
use once_cell::sync::Lazy;
use regex::Regex;

/// Identity and lifecycle methods that are never harvested
const EXCLUDED_METHODS: &[&str] = &[
    "getClass",
    "hashCode",
    "toString",
    "notify",
    "notifyAll",
    "wait",
    "equals",
    "finalize",
];

/// Lowercase name prefixes of accessors, queries, predicates and converters
const ACCESSOR_PREFIXES: &[&str] = &[
    "get", "is", "has", "can", "should", "must", "are", "contain", "count", "to", "as", "fetch",
    "retrieve", "query", "find", "size", "length", "state", "type", "status", "flag", "id",
    "index", "name", "title", "level", "describe",
    // vendor accessors
    "semget", "vivoget",
];

/// Accessor names that take a (provider, key) pair
const KEY_VALUE_ACCESSORS: &[&str] = &["getString", "getInt", "getFloat", "getLong"];

/// Simple names of key/value providers
const PROVIDER_TYPES: &[&str] = &["ContentResolver", "SharedPreferences", "Bundle"];

/// Simple-name fragment shared by manager-style providers
const MANAGER_FRAGMENT: &str = "Manager";

static LOWER_SNAKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_]+$").expect("valid regex"));

/// Whether a method name marks it as a side-effect-free accessor
pub fn is_harvestable_name(name: &str) -> bool {
    if EXCLUDED_METHODS.contains(&name) {
        return false;
    }
    let lower = name.to_lowercase();
    ACCESSOR_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Whether a method is worth invoking
pub fn is_harvestable_method(method: &MethodInfo) -> bool {
    is_harvestable_name(&method.name)
}

/// Whether a method returns nothing
pub fn is_void_returning(method: &MethodInfo) -> bool {
    method.return_type.is_void()
}

/// Whether a method is a `(provider, key)` lookup such as
/// `getString(ContentResolver, String)`
pub fn is_key_value_access_pattern(method: &MethodInfo) -> bool {
    if !KEY_VALUE_ACCESSORS.contains(&method.name.as_str()) || method.parameters.len() != 2 {
        return false;
    }
    let provider = method.parameters[0].simple_name();
    let is_provider =
        PROVIDER_TYPES.contains(&provider.as_str()) || provider.contains(MANAGER_FRAGMENT);
    let is_key = matches!(
        method.parameters[1],
        TypeRef::Str | TypeRef::Primitive(Primitive::Int)
    );
    is_provider && is_key
}

/// Whether a field looks like a compile-time constant: static final, and
/// its value either contains its own name or is a lower_snake token
pub fn is_constant(field: &FieldInfo, value: &str) -> bool {
    field.modifiers.is_static
        && field.modifiers.is_final
        && (value.contains(field.name.as_str()) || LOWER_SNAKE.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprint_sdk::MemberModifiers;

    fn method(name: &str, params: Vec<TypeRef>, returns: TypeRef) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            declaring_type: "pkg.Settings".to_string(),
            return_type: returns,
            parameters: params,
            modifiers: MemberModifiers::public_static(),
            index: 0,
        }
    }

    fn field(name: &str, modifiers: MemberModifiers) -> FieldInfo {
        FieldInfo {
            name: name.to_string(),
            declaring_type: "pkg.Settings".to_string(),
            field_type: TypeRef::Str,
            modifiers,
            index: 0,
        }
    }

    #[test]
    fn test_accessor_prefixes() {
        assert!(is_harvestable_name("getCount"));
        assert!(is_harvestable_name("isEnabled"));
        assert!(is_harvestable_name("SIZE"));
        assert!(is_harvestable_name("toByteArray"));
        assert!(is_harvestable_name("semgetVersion"));
        assert!(!is_harvestable_name("reset"));
        assert!(!is_harvestable_name("close"));
    }

    #[test]
    fn test_identity_methods_excluded() {
        for name in EXCLUDED_METHODS {
            assert!(!is_harvestable_name(name), "{} should be excluded", name);
        }
        // excluded by exact name only
        assert!(is_harvestable_name("toStringList"));
    }

    #[test]
    fn test_void_returning() {
        assert!(is_void_returning(&method("getNothing", vec![], TypeRef::Void)));
        assert!(!is_void_returning(&method("getCount", vec![], TypeRef::int())));
    }

    #[test]
    fn test_key_value_access_pattern() {
        let resolver = TypeRef::named("host.content.ContentResolver");
        assert!(is_key_value_access_pattern(&method(
            "getString",
            vec![resolver.clone(), TypeRef::Str],
            TypeRef::Str
        )));
        assert!(is_key_value_access_pattern(&method(
            "getInt",
            vec![TypeRef::named("host.os.PowerManager"), TypeRef::int()],
            TypeRef::int()
        )));
        // wrong name
        assert!(!is_key_value_access_pattern(&method(
            "getValue",
            vec![resolver.clone(), TypeRef::Str],
            TypeRef::Str
        )));
        // wrong arity
        assert!(!is_key_value_access_pattern(&method(
            "getString",
            vec![resolver.clone(), TypeRef::Str, TypeRef::Str],
            TypeRef::Str
        )));
        // wrong provider
        assert!(!is_key_value_access_pattern(&method(
            "getString",
            vec![TypeRef::named("pkg.Random"), TypeRef::Str],
            TypeRef::Str
        )));
        // wrong key type
        assert!(!is_key_value_access_pattern(&method(
            "getString",
            vec![resolver, TypeRef::long()],
            TypeRef::Str
        )));
    }

    #[test]
    fn test_is_constant() {
        let constant = field("ADB_ENABLED", MemberModifiers::constant());
        assert!(is_constant(&constant, "adb_enabled"));
        assert!(is_constant(&constant, "prefix.ADB_ENABLED"));
        assert!(!is_constant(&constant, "content://settings/global"));

        let mutable = field("ADB_ENABLED", MemberModifiers::public_static());
        assert!(!is_constant(&mutable, "adb_enabled"));
    }
}
