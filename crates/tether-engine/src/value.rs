//! Script value and handle representation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Error;

/// Identity of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeId(u64);

impl RuntimeId {
    /// Allocates a process-wide unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A slot in an engine's object storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    index: usize,
}

impl ObjectRef {
    /// Creates a new object reference.
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Returns the index of this reference.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Handle to an engine object.
///
/// Equality is identity: two handles are equal when they name the same
/// object in the same engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object {
    runtime: RuntimeId,
    slot: ObjectRef,
}

impl Object {
    /// Creates a handle. Only engine implementations should call this.
    pub fn new(runtime: RuntimeId, slot: ObjectRef) -> Self {
        Self { runtime, slot }
    }

    /// The engine instance that owns this object.
    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime
    }

    /// The storage slot of this object inside its engine.
    pub fn slot(&self) -> ObjectRef {
        self.slot
    }
}

/// An interned property identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropName {
    runtime: RuntimeId,
    atom: u32,
}

impl PropName {
    /// Creates an identifier. Only engine implementations should call this.
    pub fn new(runtime: RuntimeId, atom: u32) -> Self {
        Self { runtime, atom }
    }

    /// The engine instance that interned this identifier.
    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime
    }

    /// The atom number inside the owning engine's interner.
    pub fn atom(&self) -> u32 {
        self.atom
    }
}

/// An engine string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsString {
    runtime: RuntimeId,
    text: Arc<str>,
}

impl JsString {
    /// Creates a string handle. Only engine implementations should call this.
    pub fn new(runtime: RuntimeId, text: impl Into<Arc<str>>) -> Self {
        Self {
            runtime,
            text: text.into(),
        }
    }

    /// The engine instance that created this string.
    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime
    }

    /// The UTF-8 contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A script value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(JsString),
    /// Object handle
    Object(Object),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN never equals itself
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a.as_str() == b.as_str(),
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns true if this value is a string.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Borrows the object handle, if this is an object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrows the string, if this is a string.
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Casts to an object handle, failing with a `TypeError` otherwise.
    pub fn into_object(self) -> Result<Object, Error> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::TypeError(format!(
                "expected object, got {}",
                other.type_of()
            ))),
        }
    }

    /// Casts to a string, failing with a `TypeError` otherwise.
    pub fn into_string(self) -> Result<JsString, Error> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::TypeError(format!(
                "expected string, got {}",
                other.type_of()
            ))),
        }
    }

    /// Returns the type of this value as a string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object", // Historical quirk
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s.as_str()),
            Value::Object(_) => write!(f, "[object Object]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_ids_are_unique() {
        let a = RuntimeId::next();
        let b = RuntimeId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_object_equality_is_identity() {
        let rt = RuntimeId::next();
        let a = Object::new(rt, ObjectRef::new(1));
        let b = Object::new(rt, ObjectRef::new(2));
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::Number(1.5), Value::Number(1.5));
    }

    #[test]
    fn test_into_object_rejects_primitives() {
        let err = Value::Number(3.0).into_object().unwrap_err();
        assert_eq!(err, Error::TypeError("expected object, got number".to_string()));
        assert!(Value::Undefined.into_object().is_err());
    }

    #[test]
    fn test_type_of() {
        let rt = RuntimeId::next();
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::String(JsString::new(rt, "x")).type_of(), "string");
        assert_eq!(Value::Object(Object::new(rt, ObjectRef::new(0))).type_of(), "object");
    }
}
