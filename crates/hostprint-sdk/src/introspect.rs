//! Abstract host reflection
//!
//! Defines the interface a host type system implements. The fingerprinting
//! engine programs against this trait only; it never sees how types are
//! actually stored, constructed or invoked.

use std::sync::Arc;

use crate::descriptor::{ConstructorInfo, FieldInfo, MethodInfo, TypeDescriptor};
use crate::error::HostResult;
use crate::value::HostValue;

/// Abstract host type-introspection facility.
///
/// Implementations must be shareable across threads: the engine hands the
/// same introspector to its worker pool and to the affinity thread.
pub trait Introspector: Send + Sync {
    /// Resolve a type descriptor by fully qualified name
    fn resolve(&self, name: &str) -> HostResult<Arc<TypeDescriptor>>;

    /// Descriptor for the runtime type of `value`.
    ///
    /// Only objects have descriptors; primitives, strings and containers
    /// return [`HostError::NoDescriptor`](crate::HostError::NoDescriptor).
    fn type_of(&self, value: &HostValue) -> HostResult<Arc<TypeDescriptor>>;

    /// Read a field. `receiver` is `None` for static fields.
    fn read_field(&self, field: &FieldInfo, receiver: Option<&HostValue>) -> HostResult<HostValue>;

    /// Invoke a method. `receiver` is `None` for static methods.
    fn invoke_method(
        &self,
        method: &MethodInfo,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> HostResult<HostValue>;

    /// Invoke a constructor, returning the new instance
    fn invoke_constructor(&self, ctor: &ConstructorInfo, args: &[HostValue]) -> HostResult<HostValue>;

    /// Display string of a value (the host's `toString`)
    fn display(&self, value: &HostValue) -> String {
        value.to_string()
    }
}
