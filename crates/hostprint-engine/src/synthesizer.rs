//! Placeholder arguments for constructors and methods
//!
//! Values are fixed literals, not random, so repeated passes over the same
//! host produce the same report.

use hostprint_sdk::{HostValue, Primitive, TypeRef};

use crate::factory::InstanceFactory;

const DEFAULT_STRING: &str = "default";

/// Literal for a primitive type and its boxed wrapper
fn primitive_literal(p: Primitive) -> HostValue {
    match p {
        Primitive::Int => HostValue::Int(10),
        Primitive::Long => HostValue::Long(10),
        Primitive::Float => HostValue::Float(10.0),
        Primitive::Double => HostValue::Double(10.0),
        Primitive::Bool => HostValue::Bool(true),
        Primitive::Char => HostValue::Char('d'),
        Primitive::Short => HostValue::Short(1337),
        Primitive::Byte => HostValue::Byte(1337_i32 as i8),
    }
}

/// Two-element literal array for a primitive element type
fn primitive_array(p: Primitive) -> Vec<HostValue> {
    match p {
        Primitive::Int => vec![HostValue::Int(10), HostValue::Int(10)],
        Primitive::Long => vec![HostValue::Long(10), HostValue::Long(10)],
        Primitive::Float => vec![HostValue::Float(1.02), HostValue::Float(13.34)],
        Primitive::Double => vec![HostValue::Double(1.02), HostValue::Double(13.34)],
        Primitive::Bool => vec![HostValue::Bool(true), HostValue::Bool(false)],
        Primitive::Char => vec![HostValue::Char('d'), HostValue::Char('e')],
        Primitive::Short => vec![HostValue::Short(1337), HostValue::Short(1335)],
        Primitive::Byte => vec![HostValue::Byte(1337_i32 as i8), HostValue::Byte(1335_i32 as i8)],
    }
}

/// Fixed literal for types that need no host lookup.
///
/// Returns `None` for named reference types and for arrays of them; those
/// go through the instance factory.
pub fn primitive_default(ty: &TypeRef) -> Option<HostValue> {
    match ty {
        TypeRef::Void => Some(HostValue::Null),
        TypeRef::Primitive(p) | TypeRef::Boxed(p) => Some(primitive_literal(*p)),
        TypeRef::Str => Some(HostValue::str(DEFAULT_STRING)),
        TypeRef::Array(elem) => match elem.as_ref() {
            TypeRef::Primitive(p) => Some(HostValue::array((**elem).clone(), primitive_array(*p))),
            TypeRef::Str => Some(HostValue::array(
                TypeRef::Str,
                vec![HostValue::str("default1"), HostValue::str("default2")],
            )),
            _ => None,
        },
        TypeRef::Named(_) => None,
    }
}

impl InstanceFactory {
    /// Placeholder value for one declared parameter type.
    ///
    /// Reference types resolve to the cached instance, or are constructed
    /// through [`InstanceFactory::get_instance_by_name`] unless they are
    /// already mid-construction, in which case the argument is null.
    pub fn default_value(&mut self, ty: &TypeRef) -> HostValue {
        if let Some(literal) = primitive_default(ty) {
            return literal;
        }
        let TypeRef::Named(name) = ty else {
            return HostValue::Null;
        };
        if let Some(cached) = self.context.cached(name) {
            return cached.clone().unwrap_or_default();
        }
        if self.context.is_in_flight(name) {
            tracing::debug!(type_name = %name, "argument type is mid-construction, using null");
            return HostValue::Null;
        }
        self.get_instance_by_name(name).unwrap_or_default()
    }

    /// Placeholder values for a parameter list, positionally
    pub fn default_parameters(&mut self, parameters: &[TypeRef]) -> Vec<HostValue> {
        parameters.iter().map(|ty| self.default_value(ty)).collect()
    }
}
