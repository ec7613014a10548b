//! Live values produced and consumed by a host
//!
//! Primitives and strings are stored inline. Arrays, collections, maps and
//! objects are shared allocations: cloning a `HostValue` clones the handle,
//! not the contents, and two handles to the same allocation report the same
//! [`HostValue::identity`]. That identity is what cycle detection keys on.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{HostError, HostResult};
use crate::types::TypeRef;

/// A live host value
#[derive(Clone)]
pub enum HostValue {
    /// Absent reference
    Null,
    /// Boolean
    Bool(bool),
    /// Character
    Char(char),
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Fixed-length typed array
    Array(HostArray),
    /// Ordered multi-element collection
    List(HostList),
    /// Ordered key/value map
    Map(HostMap),
    /// Instance of a host type
    Object(HostObject),
}

impl HostValue {
    /// Create a string value
    pub fn str(s: impl AsRef<str>) -> Self {
        HostValue::Str(Arc::from(s.as_ref()))
    }

    /// Create an array value
    pub fn array(element: TypeRef, items: Vec<HostValue>) -> Self {
        HostValue::Array(HostArray::new(element, items))
    }

    /// Create a collection value
    pub fn list(items: Vec<HostValue>) -> Self {
        HostValue::List(HostList::new(items))
    }

    /// Create a map value
    pub fn map(entries: Vec<(HostValue, HostValue)>) -> Self {
        HostValue::Map(HostMap::new(entries))
    }

    /// Convert an optional string, mapping `None` to null
    pub fn opt_str(s: Option<impl AsRef<str>>) -> Self {
        s.map(HostValue::str).unwrap_or(HostValue::Null)
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// True for booleans, characters and numbers
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            HostValue::Bool(_)
                | HostValue::Char(_)
                | HostValue::Byte(_)
                | HostValue::Short(_)
                | HostValue::Int(_)
                | HostValue::Long(_)
                | HostValue::Float(_)
                | HostValue::Double(_)
        )
    }

    /// Borrow string contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as i32 (integers that fit only)
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            HostValue::Byte(b) => Some(b as i32),
            HostValue::Short(s) => Some(s as i32),
            HostValue::Int(i) => Some(i),
            HostValue::Long(l) => i32::try_from(l).ok(),
            _ => None,
        }
    }

    /// Read as i64
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            HostValue::Long(l) => Some(l),
            _ => self.as_i32().map(i64::from),
        }
    }

    /// Read as bool
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            HostValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow the object handle
    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            HostValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the object handle or fail with a receiver mismatch
    pub fn expect_object(&self, expected: &str) -> HostResult<&HostObject> {
        self.as_object().ok_or_else(|| HostError::ReceiverMismatch {
            expected: expected.to_string(),
            got: self.kind().to_string(),
        })
    }

    /// Identity of the shared allocation, `None` for inline values
    pub fn identity(&self) -> Option<usize> {
        match self {
            HostValue::Array(a) => Some(Arc::as_ptr(&a.items) as *const () as usize),
            HostValue::List(l) => Some(Arc::as_ptr(&l.items) as *const () as usize),
            HostValue::Map(m) => Some(Arc::as_ptr(&m.entries) as *const () as usize),
            HostValue::Object(o) => Some(Arc::as_ptr(&o.inner) as *const () as usize),
            _ => None,
        }
    }

    /// Short kind description
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Char(_) => "char",
            HostValue::Byte(_) => "byte",
            HostValue::Short(_) => "short",
            HostValue::Int(_) => "int",
            HostValue::Long(_) => "long",
            HostValue::Float(_) => "float",
            HostValue::Double(_) => "double",
            HostValue::Str(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::List(_) => "collection",
            HostValue::Map(_) => "map",
            HostValue::Object(_) => "object",
        }
    }

    /// Handle-style rendering for shared values (`Type@1f2e3d`), used
    /// inside container renderings so nested containers never recurse.
    fn identity_string(&self) -> String {
        let id = self.identity().unwrap_or(0);
        match self {
            HostValue::Array(a) => format!("{}[]@{:x}", a.element.name(), id),
            HostValue::List(_) => format!("Collection@{:x}", id),
            HostValue::Map(_) => format!("Map@{:x}", id),
            HostValue::Object(o) => format!("{}@{:x}", o.type_name(), id),
            other => other.to_string(),
        }
    }

    fn shallow_string(&self) -> String {
        if self.identity().is_some() {
            self.identity_string()
        } else {
            self.to_string()
        }
    }
}

impl Default for HostValue {
    fn default() -> Self {
        HostValue::Null
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i32> for HostValue {
    fn from(i: i32) -> Self {
        HostValue::Int(i)
    }
}

impl From<i64> for HostValue {
    fn from(l: i64) -> Self {
        HostValue::Long(l)
    }
}

impl From<f64> for HostValue {
    fn from(d: f64) -> Self {
        HostValue::Double(d)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::str(s)
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(Arc::from(s))
    }
}

impl From<HostObject> for HostValue {
    fn from(obj: HostObject) -> Self {
        HostValue::Object(obj)
    }
}

/// Display string of a value, in the style of a managed runtime's
/// default `toString`: floats keep their fractional part, objects and
/// arrays render as `Type@identity`, collections and maps render their
/// elements one level deep.
impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => f.write_str("null"),
            HostValue::Bool(b) => write!(f, "{}", b),
            HostValue::Char(c) => write!(f, "{}", c),
            HostValue::Byte(b) => write!(f, "{}", b),
            HostValue::Short(s) => write!(f, "{}", s),
            HostValue::Int(i) => write!(f, "{}", i),
            HostValue::Long(l) => write!(f, "{}", l),
            HostValue::Float(x) => write!(f, "{:?}", x),
            HostValue::Double(x) => write!(f, "{:?}", x),
            HostValue::Str(s) => f.write_str(s),
            HostValue::Array(_) | HostValue::Object(_) => f.write_str(&self.identity_string()),
            HostValue::List(list) => {
                let items: Vec<String> = list.snapshot().iter().map(|v| v.shallow_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            HostValue::Map(map) => {
                let entries: Vec<String> = map
                    .snapshot()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k.shallow_string(), v.shallow_string()))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}({})", other.kind(), other.shallow_string()),
        }
    }
}

// ============================================================================
// Shared containers
// ============================================================================

/// Typed array handle
#[derive(Clone)]
pub struct HostArray {
    /// Declared element type
    pub element: TypeRef,
    items: Arc<RwLock<Vec<HostValue>>>,
}

impl HostArray {
    /// Create a new array
    pub fn new(element: TypeRef, items: Vec<HostValue>) -> Self {
        Self {
            element,
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copy out the current elements
    pub fn snapshot(&self) -> Vec<HostValue> {
        self.items.read().clone()
    }

    /// Overwrite the element at `index`
    pub fn set(&self, index: usize, value: HostValue) -> HostResult<()> {
        let mut items = self.items.write();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| HostError::InvocationFailed(format!("index {} out of bounds for length {}", index, len)))?;
        *slot = value;
        Ok(())
    }
}

/// Collection handle
#[derive(Clone, Default)]
pub struct HostList {
    items: Arc<RwLock<Vec<HostValue>>>,
}

impl HostList {
    /// Create a new collection
    pub fn new(items: Vec<HostValue>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Append an element
    pub fn push(&self, value: HostValue) {
        self.items.write().push(value);
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copy out the current elements in iteration order
    pub fn snapshot(&self) -> Vec<HostValue> {
        self.items.read().clone()
    }
}

/// Ordered map handle
#[derive(Clone, Default)]
pub struct HostMap {
    entries: Arc<RwLock<Vec<(HostValue, HostValue)>>>,
}

impl HostMap {
    /// Create a new map
    pub fn new(entries: Vec<(HostValue, HostValue)>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Append an entry
    pub fn insert(&self, key: HostValue, value: HostValue) {
        self.entries.write().push((key, value));
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy out the current entries in insertion order
    pub fn snapshot(&self) -> Vec<(HostValue, HostValue)> {
        self.entries.read().clone()
    }
}

// ============================================================================
// Objects
// ============================================================================

struct ObjectData {
    type_name: String,
    field_names: Arc<[String]>,
    fields: RwLock<Vec<HostValue>>,
}

/// Instance of a host type: a type name plus a named field layout
#[derive(Clone)]
pub struct HostObject {
    inner: Arc<ObjectData>,
}

impl HostObject {
    /// Allocate an object with the given layout and initial field values
    pub fn new(type_name: impl Into<String>, field_names: Arc<[String]>, fields: Vec<HostValue>) -> Self {
        Self {
            inner: Arc::new(ObjectData {
                type_name: type_name.into(),
                field_names,
                fields: RwLock::new(fields),
            }),
        }
    }

    /// Name of the object's type
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Field slot index by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.inner.field_names.iter().position(|n| n == name)
    }

    /// Read a field slot by index
    pub fn get_index(&self, index: usize) -> HostResult<HostValue> {
        self.inner
            .fields
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| self.no_member(&format!("#{}", index)))
    }

    /// Write a field slot by index
    pub fn set_index(&self, index: usize, value: HostValue) -> HostResult<()> {
        let mut fields = self.inner.fields.write();
        match fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.no_member(&format!("#{}", index))),
        }
    }

    /// Read a field by name
    pub fn get(&self, name: &str) -> HostResult<HostValue> {
        let index = self.field_index(name).ok_or_else(|| self.no_member(name))?;
        self.get_index(index)
    }

    /// Write a field by name
    pub fn set(&self, name: &str, value: impl Into<HostValue>) -> HostResult<()> {
        let index = self.field_index(name).ok_or_else(|| self.no_member(name))?;
        self.set_index(index, value.into())
    }

    /// Check whether two handles point at the same object
    pub fn ptr_eq(&self, other: &HostObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn no_member(&self, member: &str) -> HostError {
        HostError::NoSuchMember {
            type_name: self.inner.type_name.clone(),
            member: member.to_string(),
        }
    }
}
