//! Type descriptors
//!
//! Uniform, immutable description of a runtime type's shape: its fields,
//! methods, constructors, nested types and modifier flags. Descriptors are
//! produced by an [`Introspector`](crate::Introspector) and shared behind
//! `Arc` for the lifetime of a pass.

use crate::types::{simple_name_of, TypeRef};

/// Modifier flags for a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeModifiers {
    /// Public visibility
    pub is_public: bool,
    /// Abstract type
    pub is_abstract: bool,
    /// Static-only holder type (no meaningful instances)
    pub is_static: bool,
    /// Interface
    pub is_interface: bool,
    /// Enumeration
    pub is_enum: bool,
    /// Annotation
    pub is_annotation: bool,
    /// Final (cannot be extended)
    pub is_final: bool,
    /// Compiler-generated
    pub is_synthetic: bool,
    /// Anonymous type
    pub is_anonymous: bool,
}

impl TypeModifiers {
    /// Plain public concrete type
    pub fn public() -> Self {
        Self {
            is_public: true,
            ..Self::default()
        }
    }
}

/// Modifier flags for a field, method or constructor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberModifiers {
    /// Public visibility
    pub is_public: bool,
    /// Static member
    pub is_static: bool,
    /// Final field
    pub is_final: bool,
    /// Abstract method
    pub is_abstract: bool,
    /// Compiler-generated
    pub is_synthetic: bool,
}

impl MemberModifiers {
    /// Public instance member
    pub fn public() -> Self {
        Self {
            is_public: true,
            ..Self::default()
        }
    }

    /// Public static member
    pub fn public_static() -> Self {
        Self {
            is_public: true,
            is_static: true,
            ..Self::default()
        }
    }

    /// Public static final member
    pub fn constant() -> Self {
        Self {
            is_public: true,
            is_static: true,
            is_final: true,
            ..Self::default()
        }
    }
}

/// Field information
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Declaring type name
    pub declaring_type: String,
    /// Declared field type
    pub field_type: TypeRef,
    /// Field modifiers
    pub modifiers: MemberModifiers,
    /// Slot index within the declaring type
    pub index: usize,
}

impl FieldInfo {
    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }
}

/// Method information
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Declaring type name
    pub declaring_type: String,
    /// Declared return type
    pub return_type: TypeRef,
    /// Declared parameter types
    pub parameters: Vec<TypeRef>,
    /// Method modifiers
    pub modifiers: MemberModifiers,
    /// Index within the declaring type
    pub index: usize,
}

impl MethodInfo {
    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }
}

/// Constructor information
#[derive(Debug, Clone)]
pub struct ConstructorInfo {
    /// Declaring type name
    pub declaring_type: String,
    /// Declared parameter types
    pub parameters: Vec<TypeRef>,
    /// Constructor modifiers
    pub modifiers: MemberModifiers,
    /// Index within the declaring type
    pub index: usize,
}

/// Runtime type description
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Fully qualified name
    pub name: String,
    /// Type modifiers
    pub modifiers: TypeModifiers,
    /// Declared fields (slot order)
    pub fields: Vec<FieldInfo>,
    /// Declared methods
    pub methods: Vec<MethodInfo>,
    /// Declared constructors
    pub constructors: Vec<ConstructorInfo>,
    /// Fully qualified names of declared nested types
    pub nested_types: Vec<String>,
}

impl TypeDescriptor {
    /// Create an empty public descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: TypeModifiers::public(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    /// Name without package or enclosing-type prefix
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    /// Public fields
    pub fn public_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.modifiers.is_public)
    }

    /// Public methods
    pub fn public_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter().filter(|m| m.modifiers.is_public)
    }

    /// Public constructors
    pub fn public_constructors(&self) -> impl Iterator<Item = &ConstructorInfo> {
        self.constructors.iter().filter(|c| c.modifiers.is_public)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// First declared method with this name, public or not
    pub fn declared_method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Public method with this name taking the fewest parameters
    pub fn public_method(&self, name: &str) -> Option<&MethodInfo> {
        self.public_methods()
            .filter(|m| m.name == name)
            .min_by_key(|m| m.parameters.len())
    }

    /// Nested type whose simple name equals `simple_name`
    pub fn nested_type_named(&self, simple_name: &str) -> Option<&str> {
        self.nested_types
            .iter()
            .find(|n| simple_name_of(n) == simple_name)
            .map(String::as_str)
    }

    /// Field slot names in slot order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, params: Vec<TypeRef>, modifiers: MemberModifiers) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            declaring_type: "pkg.Builder".to_string(),
            return_type: TypeRef::named("pkg.Thing"),
            parameters: params,
            modifiers,
            index: 0,
        }
    }

    #[test]
    fn test_public_method_prefers_fewest_params() {
        let mut desc = TypeDescriptor::new("pkg.Thing$Builder");
        desc.methods.push(method("build", vec![TypeRef::int()], MemberModifiers::public()));
        desc.methods.push(method("build", vec![], MemberModifiers::public()));
        desc.methods.push(method("hidden", vec![], MemberModifiers::default()));

        assert_eq!(desc.public_method("build").unwrap().parameters.len(), 0);
        assert!(desc.public_method("hidden").is_none());
        assert!(desc.declared_method("hidden").is_some());
        assert_eq!(desc.simple_name(), "Builder");
    }

    #[test]
    fn test_nested_type_lookup() {
        let mut desc = TypeDescriptor::new("pkg.Thing");
        desc.nested_types.push("pkg.Thing$Builder".to_string());
        desc.nested_types.push("pkg.Thing$Kind".to_string());

        assert_eq!(desc.nested_type_named("Builder"), Some("pkg.Thing$Builder"));
        assert_eq!(desc.nested_type_named("Factory"), None);
    }
}
