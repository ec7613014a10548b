//! In-memory type registry
//!
//! A concrete [`Introspector`] whose types are defined at runtime with
//! [`TypeBuilder`](crate::TypeBuilder). Constructor and method closures run
//! behind an unwind guard so a panicking member surfaces as
//! [`HostError::Panicked`] instead of tearing down the caller.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builder::{Invocation, TypeDefinition};
use crate::descriptor::{ConstructorInfo, FieldInfo, MethodInfo, TypeDescriptor};
use crate::error::{HostError, HostResult};
use crate::introspect::Introspector;
use crate::value::{HostObject, HostValue};

struct TypeEntry {
    descriptor: Arc<TypeDescriptor>,
    layout: Arc<[String]>,
    definition: TypeDefinition,
    statics: RwLock<Vec<HostValue>>,
}

impl TypeEntry {
    fn new(definition: TypeDefinition) -> Self {
        let descriptor = Arc::new(definition.descriptor.clone());
        let layout: Arc<[String]> = descriptor.field_names().into();
        let statics = descriptor
            .fields
            .iter()
            .zip(&definition.initial)
            .map(|(field, initial)| {
                if field.is_static() {
                    initial.clone()
                } else {
                    HostValue::Null
                }
            })
            .collect();
        Self {
            descriptor,
            layout,
            definition,
            statics: RwLock::new(statics),
        }
    }

    fn blank_instance(&self) -> HostObject {
        let fields = self
            .descriptor
            .fields
            .iter()
            .zip(&self.definition.initial)
            .map(|(field, initial)| {
                if field.is_static() {
                    HostValue::Null
                } else {
                    initial.clone()
                }
            })
            .collect();
        HostObject::new(self.descriptor.name.clone(), self.layout.clone(), fields)
    }
}

/// Registry of runtime-defined host types
#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<FxHashMap<String, Arc<TypeEntry>>>,
    order: RwLock<Vec<String>>,
}

impl TypeRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous definition with the same name
    pub fn register(&self, definition: TypeDefinition) -> Arc<TypeDescriptor> {
        let entry = Arc::new(TypeEntry::new(definition));
        let descriptor = entry.descriptor.clone();
        let name = descriptor.name.clone();
        if self.types.write().insert(name.clone(), entry).is_none() {
            self.order.write().push(name);
        }
        descriptor
    }

    /// Check if a type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Registered type names in registration order
    pub fn type_names(&self) -> Vec<String> {
        self.order.read().clone()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Allocate a blank instance (field initialisers only, no constructor)
    pub fn allocate(&self, type_name: &str) -> HostResult<HostObject> {
        Ok(self.entry(type_name)?.blank_instance())
    }

    /// Overwrite a static field
    pub fn set_static(&self, type_name: &str, field: &str, value: HostValue) -> HostResult<()> {
        let entry = self.entry(type_name)?;
        let info = entry
            .descriptor
            .field(field)
            .filter(|f| f.is_static())
            .ok_or_else(|| HostError::NoSuchMember {
                type_name: type_name.to_string(),
                member: field.to_string(),
            })?;
        entry.statics.write()[info.index] = value;
        Ok(())
    }

    fn entry(&self, name: &str) -> HostResult<Arc<TypeEntry>> {
        self.types
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::UnknownType(name.to_string()))
    }

    fn check_receiver<'v>(
        &self,
        declaring_type: &str,
        member: &str,
        receiver: Option<&'v HostValue>,
    ) -> HostResult<&'v HostObject> {
        match receiver {
            None | Some(HostValue::Null) => Err(HostError::NullReceiver(format!("{}.{}", declaring_type, member))),
            Some(HostValue::Object(obj)) if obj.type_name() == declaring_type => Ok(obj),
            Some(HostValue::Object(obj)) => Err(HostError::ReceiverMismatch {
                expected: declaring_type.to_string(),
                got: obj.type_name().to_string(),
            }),
            Some(other) => Err(HostError::ReceiverMismatch {
                expected: declaring_type.to_string(),
                got: other.kind().to_string(),
            }),
        }
    }
}

fn check_arity(expected: usize, args: &[HostValue]) -> HostResult<()> {
    if expected != args.len() {
        return Err(HostError::ArgumentMismatch {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Run a member body, converting a panic into `HostError::Panicked`
fn guarded<T>(f: impl FnOnce() -> HostResult<T>) -> HostResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(HostError::Panicked(msg))
        }
    }
}

impl Introspector for TypeRegistry {
    fn resolve(&self, name: &str) -> HostResult<Arc<TypeDescriptor>> {
        Ok(self.entry(name)?.descriptor.clone())
    }

    fn type_of(&self, value: &HostValue) -> HostResult<Arc<TypeDescriptor>> {
        match value {
            HostValue::Object(obj) => self.resolve(obj.type_name()),
            other => Err(HostError::NoDescriptor(other.kind())),
        }
    }

    fn read_field(&self, field: &FieldInfo, receiver: Option<&HostValue>) -> HostResult<HostValue> {
        let entry = self.entry(&field.declaring_type)?;
        if field.is_static() {
            return entry
                .statics
                .read()
                .get(field.index)
                .cloned()
                .ok_or_else(|| HostError::NoSuchMember {
                    type_name: field.declaring_type.clone(),
                    member: field.name.clone(),
                });
        }
        let obj = self.check_receiver(&field.declaring_type, &field.name, receiver)?;
        obj.get_index(field.index)
    }

    fn invoke_method(
        &self,
        method: &MethodInfo,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> HostResult<HostValue> {
        let entry = self.entry(&method.declaring_type)?;
        let body = entry
            .definition
            .methods
            .get(method.index)
            .cloned()
            .ok_or_else(|| HostError::NoSuchMember {
                type_name: method.declaring_type.clone(),
                member: method.name.clone(),
            })?;
        check_arity(method.parameters.len(), args)?;
        let receiver = if method.is_static() {
            None
        } else {
            self.check_receiver(&method.declaring_type, &method.name, receiver)?;
            receiver
        };
        let invocation = Invocation {
            registry: self,
            member: &method.name,
            receiver,
            args,
        };
        guarded(|| body(&invocation))
    }

    fn invoke_constructor(&self, ctor: &ConstructorInfo, args: &[HostValue]) -> HostResult<HostValue> {
        let entry = self.entry(&ctor.declaring_type)?;
        let modifiers = entry.descriptor.modifiers;
        if modifiers.is_abstract || modifiers.is_interface {
            return Err(HostError::NotInstantiable(ctor.declaring_type.clone()));
        }
        let body = entry
            .definition
            .constructors
            .get(ctor.index)
            .cloned()
            .ok_or_else(|| HostError::NotInstantiable(ctor.declaring_type.clone()))?;
        check_arity(ctor.parameters.len(), args)?;

        let instance = HostValue::Object(entry.blank_instance());
        let invocation = Invocation {
            registry: self,
            member: "<init>",
            receiver: Some(&instance),
            args,
        };
        guarded(|| body(&invocation))?;
        Ok(instance)
    }

    fn display(&self, value: &HostValue) -> String {
        if let HostValue::Object(obj) = value {
            let custom = self
                .entry(obj.type_name())
                .ok()
                .and_then(|entry| entry.definition.display.clone());
            if let Some(display) = custom {
                if let Ok(s) = guarded(|| Ok(display(obj))) {
                    return s;
                }
            }
        }
        value.to_string()
    }
}
