//! Fluent builder for in-memory host types
//!
//! Defines a type's shape together with its behaviour: constructors and
//! methods are Rust closures receiving an [`Invocation`]. The resulting
//! [`TypeDefinition`] is registered in a [`TypeRegistry`].
//!
//! ```rust,ignore
//! let simple = TypeBuilder::class("pkg.Simple")
//!     .field("count", TypeRef::int())
//!     .constructor(vec![], |_| Ok(()))
//!     .method("getCount", vec![], TypeRef::int(), |inv| inv.this()?.get("count"))
//!     .build();
//! registry.register(simple);
//! ```

use std::sync::Arc;

use crate::descriptor::{
    ConstructorInfo, FieldInfo, MemberModifiers, MethodInfo, TypeDescriptor, TypeModifiers,
};
use crate::error::{HostError, HostResult};
use crate::registry::TypeRegistry;
use crate::types::{Primitive, TypeRef};
use crate::value::{HostObject, HostValue};

/// Constructor body: initialises the freshly allocated receiver
pub type ConstructorFn = Arc<dyn Fn(&Invocation<'_>) -> HostResult<()> + Send + Sync>;

/// Method body
pub type MethodFn = Arc<dyn Fn(&Invocation<'_>) -> HostResult<HostValue> + Send + Sync>;

/// Custom display (`toString`) for instances
pub type DisplayFn = Arc<dyn Fn(&HostObject) -> String + Send + Sync>;

/// Call frame handed to constructor and method closures
pub struct Invocation<'a> {
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) member: &'a str,
    pub(crate) receiver: Option<&'a HostValue>,
    pub(crate) args: &'a [HostValue],
}

impl<'a> Invocation<'a> {
    /// The registry the call runs in
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Receiver, `None` for static calls
    pub fn receiver(&self) -> Option<&'a HostValue> {
        self.receiver
    }

    /// Receiver as an object
    pub fn this(&self) -> HostResult<&'a HostObject> {
        match self.receiver {
            Some(HostValue::Object(obj)) => Ok(obj),
            Some(other) => Err(HostError::ReceiverMismatch {
                expected: "object".to_string(),
                got: other.kind().to_string(),
            }),
            None => Err(HostError::NullReceiver(self.member.to_string())),
        }
    }

    /// All arguments
    pub fn args(&self) -> &'a [HostValue] {
        self.args
    }

    /// Argument at `index`
    pub fn arg(&self, index: usize) -> HostResult<&'a HostValue> {
        self.args.get(index).ok_or(HostError::ArgumentMismatch {
            expected: index + 1,
            got: self.args.len(),
        })
    }

    /// String argument at `index`; null and non-strings fail
    pub fn arg_str(&self, index: usize) -> HostResult<&'a str> {
        let arg = self.arg(index)?;
        arg.as_str().ok_or_else(|| {
            HostError::InvocationFailed(format!(
                "{}: argument {} is {}, expected string",
                self.member,
                index,
                arg.kind()
            ))
        })
    }

    /// Allocate a blank instance of a registered type without running a constructor
    pub fn allocate(&self, type_name: &str) -> HostResult<HostObject> {
        self.registry.allocate(type_name)
    }
}

/// Zero value for a declared type: primitives get their zero, everything else null
pub fn zero_value(ty: &TypeRef) -> HostValue {
    match ty {
        TypeRef::Primitive(p) => match p {
            Primitive::Bool => HostValue::Bool(false),
            Primitive::Char => HostValue::Char('\0'),
            Primitive::Byte => HostValue::Byte(0),
            Primitive::Short => HostValue::Short(0),
            Primitive::Int => HostValue::Int(0),
            Primitive::Long => HostValue::Long(0),
            Primitive::Float => HostValue::Float(0.0),
            Primitive::Double => HostValue::Double(0.0),
        },
        _ => HostValue::Null,
    }
}

/// Complete type definition ready for registration
pub struct TypeDefinition {
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) initial: Vec<HostValue>,
    pub(crate) constructors: Vec<ConstructorFn>,
    pub(crate) methods: Vec<MethodFn>,
    pub(crate) display: Option<DisplayFn>,
}

impl TypeDefinition {
    /// The descriptor this definition registers
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

/// Fluent builder for a [`TypeDefinition`]
pub struct TypeBuilder {
    descriptor: TypeDescriptor,
    initial: Vec<HostValue>,
    constructors: Vec<ConstructorFn>,
    methods: Vec<MethodFn>,
    display: Option<DisplayFn>,
}

impl TypeBuilder {
    /// Start a public concrete type
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            descriptor: TypeDescriptor::new(name),
            initial: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            display: None,
        }
    }

    /// Replace the type modifiers
    pub fn modifiers(mut self, modifiers: TypeModifiers) -> Self {
        self.descriptor.modifiers = modifiers;
        self
    }

    /// Mark as abstract
    pub fn as_abstract(mut self) -> Self {
        self.descriptor.modifiers.is_abstract = true;
        self
    }

    /// Mark as interface
    pub fn as_interface(mut self) -> Self {
        self.descriptor.modifiers.is_interface = true;
        self
    }

    /// Mark as enumeration
    pub fn as_enum(mut self) -> Self {
        self.descriptor.modifiers.is_enum = true;
        self
    }

    /// Mark as static-only holder type
    pub fn as_static(mut self) -> Self {
        self.descriptor.modifiers.is_static = true;
        self
    }

    /// Mark as final
    pub fn as_final(mut self) -> Self {
        self.descriptor.modifiers.is_final = true;
        self
    }

    /// Public instance field initialised to the type's zero value
    pub fn field(self, name: &str, ty: TypeRef) -> Self {
        let initial = zero_value(&ty);
        self.push_field(name, ty, MemberModifiers::public(), initial)
    }

    /// Public instance field with an explicit initial value
    pub fn field_with(self, name: &str, ty: TypeRef, initial: impl Into<HostValue>) -> Self {
        self.push_field(name, ty, MemberModifiers::public(), initial.into())
    }

    /// Non-public instance field (storage only, never harvested)
    pub fn hidden_field(self, name: &str, ty: TypeRef) -> Self {
        let initial = zero_value(&ty);
        self.push_field(name, ty, MemberModifiers::default(), initial)
    }

    /// Public static mutable field
    pub fn static_field(self, name: &str, ty: TypeRef, value: impl Into<HostValue>) -> Self {
        self.push_field(name, ty, MemberModifiers::public_static(), value.into())
    }

    /// Public static final field
    pub fn constant(self, name: &str, ty: TypeRef, value: impl Into<HostValue>) -> Self {
        self.push_field(name, ty, MemberModifiers::constant(), value.into())
    }

    /// Public constructor
    pub fn constructor<F>(self, parameters: Vec<TypeRef>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HostResult<()> + Send + Sync + 'static,
    {
        self.push_constructor(parameters, MemberModifiers::public(), Arc::new(body))
    }

    /// Non-public constructor (never attempted by the engine)
    pub fn hidden_constructor<F>(self, parameters: Vec<TypeRef>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HostResult<()> + Send + Sync + 'static,
    {
        self.push_constructor(parameters, MemberModifiers::default(), Arc::new(body))
    }

    /// Public instance method
    pub fn method<F>(self, name: &str, parameters: Vec<TypeRef>, returns: TypeRef, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        self.push_method(name, parameters, returns, MemberModifiers::public(), Arc::new(body))
    }

    /// Public static method
    pub fn static_method<F>(self, name: &str, parameters: Vec<TypeRef>, returns: TypeRef, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        self.push_method(name, parameters, returns, MemberModifiers::public_static(), Arc::new(body))
    }

    /// Non-public instance method
    pub fn hidden_method<F>(self, name: &str, parameters: Vec<TypeRef>, returns: TypeRef, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        self.push_method(name, parameters, returns, MemberModifiers::default(), Arc::new(body))
    }

    /// Declare a nested type by fully qualified name
    pub fn nested(mut self, name: impl Into<String>) -> Self {
        self.descriptor.nested_types.push(name.into());
        self
    }

    /// Custom display string for instances
    pub fn display<F>(mut self, f: F) -> Self
    where
        F: Fn(&HostObject) -> String + Send + Sync + 'static,
    {
        self.display = Some(Arc::new(f));
        self
    }

    /// Finish the definition
    pub fn build(self) -> TypeDefinition {
        TypeDefinition {
            descriptor: self.descriptor,
            initial: self.initial,
            constructors: self.constructors,
            methods: self.methods,
            display: self.display,
        }
    }

    fn push_field(mut self, name: &str, ty: TypeRef, modifiers: MemberModifiers, initial: HostValue) -> Self {
        let index = self.descriptor.fields.len();
        self.descriptor.fields.push(FieldInfo {
            name: name.to_string(),
            declaring_type: self.descriptor.name.clone(),
            field_type: ty,
            modifiers,
            index,
        });
        self.initial.push(initial);
        self
    }

    fn push_constructor(mut self, parameters: Vec<TypeRef>, modifiers: MemberModifiers, body: ConstructorFn) -> Self {
        let index = self.descriptor.constructors.len();
        self.descriptor.constructors.push(ConstructorInfo {
            declaring_type: self.descriptor.name.clone(),
            parameters,
            modifiers,
            index,
        });
        self.constructors.push(body);
        self
    }

    fn push_method(
        mut self,
        name: &str,
        parameters: Vec<TypeRef>,
        returns: TypeRef,
        modifiers: MemberModifiers,
        body: MethodFn,
    ) -> Self {
        let index = self.descriptor.methods.len();
        self.descriptor.methods.push(MethodInfo {
            name: name.to_string(),
            declaring_type: self.descriptor.name.clone(),
            return_type: returns,
            parameters,
            modifiers,
            index,
        });
        self.methods.push(body);
        self
    }
}
