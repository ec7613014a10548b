//! Object graph exploration
//!
//! Converts a live host value into a JSON record to a bounded depth.
//! Every traversed edge (field value, element, method result) costs one
//! unit of depth; an allocation already expanded in the same call is
//! rendered by its display string instead of being expanded again.
//!
//! Each node is described through `ExplorationResult`; a failing field,
//! method, element or map value collapses to `"ERR"` on its own while its
//! siblings carry on.

use std::sync::Arc;

use hostprint_sdk::{HostValue, Introspector};
use serde_json::{Map, Number, Value};

use crate::context::VisitedSet;
use crate::error::ExplorationResult;
use crate::factory::InstanceFactory;
use crate::report::Sentinel;
use crate::selector::{is_harvestable_method, is_void_returning};

/// Depth-bounded object explorer
pub struct ObjectExplorer<'f> {
    factory: &'f mut InstanceFactory,
    host: Arc<dyn Introspector>,
}

impl<'f> ObjectExplorer<'f> {
    /// Create an explorer that synthesizes method arguments through `factory`
    pub fn new(factory: &'f mut InstanceFactory) -> Self {
        let host = factory.introspector().clone();
        Self { factory, host }
    }

    /// Describe `value` to `depth` levels. Never fails: an error at the
    /// top level yields the `"ERR"` sentinel.
    pub fn explore(&mut self, value: &HostValue, depth: usize) -> Value {
        let mut visited = VisitedSet::new();
        self.explore_node(value, depth, &mut visited).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "exploration failed");
            Sentinel::Err.into()
        })
    }

    fn explore_node(
        &mut self,
        value: &HostValue,
        depth: usize,
        visited: &mut VisitedSet,
    ) -> ExplorationResult<Value> {
        if depth == 0 || value.is_null() || visited.contains(value) {
            return Ok(Value::String(self.host.display(value)));
        }
        if value.is_primitive() || matches!(value, HostValue::Str(_)) {
            return Ok(leaf(value));
        }

        visited.insert(value);
        let next = depth - 1;
        match value {
            HostValue::Array(array) => self.explore_items(array.snapshot(), next, visited),
            HostValue::List(list) => self.explore_items(list.snapshot(), next, visited),
            HostValue::Map(map) => {
                let mut out = Map::new();
                for (key, item) in map.snapshot() {
                    let key = self.host.display(&key);
                    let rendered = self.explore_child(&item, next, visited, &key);
                    out.insert(key, rendered);
                }
                Ok(Value::Object(out))
            }
            _ => self.explore_object(value, next, visited),
        }
    }

    fn explore_items(
        &mut self,
        items: Vec<HostValue>,
        depth: usize,
        visited: &mut VisitedSet,
    ) -> ExplorationResult<Value> {
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            out.push(self.explore_child(item, depth, visited, &index.to_string()));
        }
        Ok(Value::Array(out))
    }

    /// Explore a container element; a failure stays local to it
    fn explore_child(
        &mut self,
        item: &HostValue,
        depth: usize,
        visited: &mut VisitedSet,
        position: &str,
    ) -> Value {
        self.explore_node(item, depth, visited).unwrap_or_else(|e| {
            tracing::debug!(position, error = %e, "element failed");
            Sentinel::Err.into()
        })
    }

    /// `{"fields": [{name: value}...], "methods": [{name: value}...]}`
    fn explore_object(
        &mut self,
        value: &HostValue,
        depth: usize,
        visited: &mut VisitedSet,
    ) -> ExplorationResult<Value> {
        let desc = self.host.type_of(value)?;

        let mut fields = Vec::new();
        for field in desc.public_fields() {
            let receiver = if field.is_static() { None } else { Some(value) };
            let rendered = self
                .host
                .read_field(field, receiver)
                .map_err(Into::into)
                .and_then(|v| self.explore_node(&v, depth, visited))
                .unwrap_or_else(|e| {
                    tracing::debug!(type_name = %desc.name, field = %field.name, error = %e, "field failed");
                    Sentinel::Err.into()
                });
            fields.push(crate::report::record(field.name.clone(), rendered));
        }

        let mut methods = Vec::new();
        for method in desc.public_methods() {
            if !is_harvestable_method(method) || is_void_returning(method) {
                continue;
            }
            let args = self.factory.default_parameters(&method.parameters);
            let receiver = if method.is_static() { None } else { Some(value) };
            let rendered = match self.host.invoke_method(method, receiver, &args) {
                Ok(result) if result.is_null() => Sentinel::Null.into(),
                Ok(result) => self.explore_node(&result, depth, visited).unwrap_or_else(|e| {
                    tracing::debug!(type_name = %desc.name, method = %method.name, error = %e, "method result failed");
                    Sentinel::Err.into()
                }),
                Err(e) => {
                    tracing::debug!(type_name = %desc.name, method = %method.name, error = %e, "method failed");
                    Sentinel::Err.into()
                }
            };
            methods.push(crate::report::record(method.name.clone(), rendered));
        }

        let mut out = Map::new();
        out.insert("fields".to_string(), Value::Array(fields));
        out.insert("methods".to_string(), Value::Array(methods));
        Ok(Value::Object(out))
    }
}

/// JSON literal for a primitive or string. Characters and non-finite
/// floats become strings.
fn leaf(value: &HostValue) -> Value {
    match value {
        HostValue::Bool(b) => Value::Bool(*b),
        HostValue::Byte(n) => Value::from(*n),
        HostValue::Short(n) => Value::from(*n),
        HostValue::Int(n) => Value::from(*n),
        HostValue::Long(n) => Value::from(*n),
        HostValue::Float(x) => Number::from_f64(f64::from(*x))
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        HostValue::Double(x) => Number::from_f64(*x)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        HostValue::Str(s) => Value::String(s.to_string()),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprint_sdk::{TypeBuilder, TypeRef, TypeRegistry};
    use serde_json::json;

    fn node_registry() -> Arc<TypeRegistry> {
        let registry = TypeRegistry::new();
        registry.register(
            TypeBuilder::class("pkg.Node")
                .field_with("label", TypeRef::Str, "n")
                .field("next", TypeRef::named("pkg.Node"))
                .constructor(vec![], |_| Ok(()))
                .method("getLabel", vec![], TypeRef::Str, |inv| inv.this()?.get("label"))
                .method("getNext", vec![], TypeRef::named("pkg.Node"), |inv| inv.this()?.get("next"))
                .method("getMissing", vec![], TypeRef::Str, |_| Ok(HostValue::Null))
                .method("getBroken", vec![], TypeRef::int(), |_| Err("broken".into()))
                .method("reset", vec![], TypeRef::int(), |_| panic!("never harvested"))
                .method("getNothing", vec![], TypeRef::Void, |_| panic!("never invoked"))
                .build(),
        );
        Arc::new(registry)
    }

    #[test]
    fn test_depth_zero_is_display_string() {
        let registry = node_registry();
        let node = HostValue::Object(registry.allocate("pkg.Node").unwrap());
        let mut factory = InstanceFactory::new(registry);
        let mut explorer = ObjectExplorer::new(&mut factory);

        assert_eq!(explorer.explore(&node, 0), json!(node.to_string()));
        assert_eq!(explorer.explore(&HostValue::Int(7), 0), json!("7"));
        let list = HostValue::list(vec![HostValue::Int(1)]);
        assert_eq!(explorer.explore(&list, 0), json!("[1]"));
        assert_eq!(explorer.explore(&HostValue::Null, 3), json!("null"));
    }

    #[test]
    fn test_leaves_and_containers() {
        let mut factory = InstanceFactory::new(node_registry());
        let mut explorer = ObjectExplorer::new(&mut factory);

        assert_eq!(explorer.explore(&HostValue::Int(7), 1), json!(7));
        assert_eq!(explorer.explore(&HostValue::str("x"), 1), json!("x"));
        assert_eq!(explorer.explore(&HostValue::Double(f64::NAN), 1), json!("NaN"));

        let list = HostValue::list(vec![HostValue::Int(1), HostValue::str("a")]);
        assert_eq!(explorer.explore(&list, 2), json!([1, "a"]));
        // elements sit one edge deeper
        assert_eq!(explorer.explore(&list, 1), json!(["1", "a"]));

        let map = HostValue::map(vec![(HostValue::Int(1), HostValue::Bool(true))]);
        assert_eq!(explorer.explore(&map, 2), json!({"1": true}));
    }

    #[test]
    fn test_failing_element_keeps_siblings() {
        let registry = Arc::new(TypeRegistry::new());
        let stranger = HostValue::Object(hostprint_sdk::HostObject::new(
            "pkg.Unregistered",
            Vec::<String>::new().into(),
            Vec::new(),
        ));
        let mut factory = InstanceFactory::new(registry);
        let mut explorer = ObjectExplorer::new(&mut factory);

        let list = HostValue::list(vec![HostValue::Int(1), stranger.clone()]);
        assert_eq!(explorer.explore(&list, 3), json!([1, "ERR"]));

        let map = HostValue::map(vec![
            (HostValue::str("a"), HostValue::Int(1)),
            (HostValue::str("b"), stranger),
        ]);
        assert_eq!(explorer.explore(&map, 3), json!({"a": 1, "b": "ERR"}));
    }

    #[test]
    fn test_object_fields_and_methods() {
        let registry = node_registry();
        let node = HostValue::Object(registry.allocate("pkg.Node").unwrap());
        let mut factory = InstanceFactory::new(registry);
        let mut explorer = ObjectExplorer::new(&mut factory);

        let record = explorer.explore(&node, 2);
        assert_eq!(
            record,
            json!({
                "fields": [{"label": "n"}, {"next": "null"}],
                "methods": [
                    {"getLabel": "n"},
                    {"getNext": "null"},
                    {"getMissing": "null"},
                    {"getBroken": "ERR"}
                ]
            })
        );
    }

    #[test]
    fn test_self_cycle_terminates() {
        let registry = node_registry();
        let node = registry.allocate("pkg.Node").unwrap();
        node.set("next", node.clone()).unwrap();
        let node = HostValue::Object(node);
        let mut factory = InstanceFactory::new(registry);
        let mut explorer = ObjectExplorer::new(&mut factory);

        let record = explorer.explore(&node, 50);
        assert_eq!(record["fields"][1]["next"], json!(node.to_string()));
        assert_eq!(record["methods"][1]["getNext"], json!(node.to_string()));
    }

    #[test]
    fn test_cyclic_list_terminates() {
        let list = hostprint_sdk::HostList::new(vec![HostValue::Int(1)]);
        list.push(HostValue::List(list.clone()));
        let value = HostValue::List(list);
        let mut factory = InstanceFactory::new(node_registry());
        let mut explorer = ObjectExplorer::new(&mut factory);

        let record = explorer.explore(&value, 10);
        assert_eq!(record[0], json!(1));
        assert_eq!(record[1], json!(value.to_string()));
    }
}
