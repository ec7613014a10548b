//! Declared type references
//!
//! A `TypeRef` is the static type a host declares for a field, a parameter
//! or a return value. It is what the argument synthesizer dispatches on,
//! so it only distinguishes what the synthesizer and the member selector
//! need: primitives and their boxed wrappers, strings, arrays, and named
//! reference types.

use std::fmt;

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Boolean
    Bool,
    /// UTF-16 style character
    Char,
    /// Signed 8-bit integer
    Byte,
    /// Signed 16-bit integer
    Short,
    /// Signed 32-bit integer
    Int,
    /// Signed 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
}

impl Primitive {
    /// Unboxed name ("int", "long", ...)
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Boxed wrapper name ("Integer", "Long", ...)
    pub fn wrapper_name(self) -> &'static str {
        match self {
            Primitive::Bool => "Boolean",
            Primitive::Char => "Character",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }
}

/// Declared type of a field, parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// No value (method return only)
    Void,
    /// Unboxed primitive
    Primitive(Primitive),
    /// Boxed primitive wrapper
    Boxed(Primitive),
    /// String or char sequence
    Str,
    /// Array of an element type
    Array(Box<TypeRef>),
    /// Named reference type resolved through the host
    Named(String),
}

impl TypeRef {
    /// `int`
    pub fn int() -> Self {
        TypeRef::Primitive(Primitive::Int)
    }

    /// `long`
    pub fn long() -> Self {
        TypeRef::Primitive(Primitive::Long)
    }

    /// `boolean`
    pub fn bool() -> Self {
        TypeRef::Primitive(Primitive::Bool)
    }

    /// `double`
    pub fn double() -> Self {
        TypeRef::Primitive(Primitive::Double)
    }

    /// Array of `element`
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Named reference type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Fully qualified name
    pub fn name(&self) -> String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive(p) => p.name().to_string(),
            TypeRef::Boxed(p) => p.wrapper_name().to_string(),
            TypeRef::Str => "String".to_string(),
            TypeRef::Array(elem) => format!("{}[]", elem.name()),
            TypeRef::Named(name) => name.clone(),
        }
    }

    /// Name without package or enclosing-type prefix
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Named(name) => simple_name_of(name).to_string(),
            other => other.name(),
        }
    }

    /// True for `void`
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// True for primitives, their wrappers and `void`
    pub fn is_primitive_or_wrapper(&self) -> bool {
        matches!(
            self,
            TypeRef::Primitive(_) | TypeRef::Boxed(_) | TypeRef::Void
        )
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Strip the package and enclosing-type prefix from a type name.
///
/// `pkg.Outer$Builder` becomes `Builder`, `pkg.Simple` becomes `Simple`.
pub fn simple_name_of(name: &str) -> &str {
    let start = name
        .rfind(['.', '$'])
        .map(|i| i + 1)
        .unwrap_or(0);
    &name[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(TypeRef::int().name(), "int");
        assert_eq!(TypeRef::Boxed(Primitive::Int).name(), "Integer");
        assert_eq!(TypeRef::array(TypeRef::Str).name(), "String[]");
        assert_eq!(TypeRef::named("pkg.Simple").name(), "pkg.Simple");
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name_of("pkg.Outer$Builder"), "Builder");
        assert_eq!(simple_name_of("pkg.Simple"), "Simple");
        assert_eq!(simple_name_of("Simple"), "Simple");
        assert_eq!(
            TypeRef::named("host.content.ContentResolver").simple_name(),
            "ContentResolver"
        );
    }

    #[test]
    fn test_primitive_or_wrapper() {
        assert!(TypeRef::int().is_primitive_or_wrapper());
        assert!(TypeRef::Boxed(Primitive::Double).is_primitive_or_wrapper());
        assert!(!TypeRef::Str.is_primitive_or_wrapper());
        assert!(!TypeRef::array(TypeRef::int()).is_primitive_or_wrapper());
        assert!(!TypeRef::named("pkg.Simple").is_primitive_or_wrapper());
    }
}
