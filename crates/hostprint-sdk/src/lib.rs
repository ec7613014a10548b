//! Hostprint SDK - host introspection interface
//!
//! This crate provides the types and traits a host type system implements so
//! the fingerprinting engine can reflect over it without depending on the
//! host's own vocabulary:
//!
//! - [`HostValue`]: live values (primitives, strings, arrays, collections,
//!   maps, objects) with identity for shared allocations
//! - [`TypeRef`]: declared types of fields, parameters and return values
//! - [`TypeDescriptor`]: immutable shape of a runtime type
//! - [`Introspector`]: resolve, read, invoke and construct
//!
//! It also ships [`TypeRegistry`], an in-memory introspector whose types are
//! defined with [`TypeBuilder`] and backed by Rust closures.
//!
//! # Example
//!
//! ```ignore
//! use hostprint_sdk::{HostValue, Introspector, TypeBuilder, TypeRef, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! registry.register(
//!     TypeBuilder::class("pkg.Simple")
//!         .field("count", TypeRef::int())
//!         .constructor(vec![], |_| Ok(()))
//!         .method("getCount", vec![], TypeRef::int(), |inv| inv.this()?.get("count"))
//!         .build(),
//! );
//! let desc = registry.resolve("pkg.Simple")?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::derivable_impls)]

mod builder;
mod descriptor;
mod error;
mod introspect;
mod registry;
mod types;
mod value;

pub use builder::{zero_value, ConstructorFn, DisplayFn, Invocation, MethodFn, TypeBuilder, TypeDefinition};
pub use descriptor::{
    ConstructorInfo, FieldInfo, MemberModifiers, MethodInfo, TypeDescriptor, TypeModifiers,
};
pub use error::{HostError, HostResult};
pub use introspect::Introspector;
pub use registry::TypeRegistry;
pub use types::{simple_name_of, Primitive, TypeRef};
pub use value::{HostArray, HostList, HostMap, HostObject, HostValue};
