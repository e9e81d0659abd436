//! Typed attribute values.
//!
//! Every attribute carried by a protocol object is one of a small closed set
//! of value shapes. Decoding bytes into these values is the transport
//! layer's job; this module only defines the shapes and the coercions the
//! message layer needs (integer reads for header fields and flags, name
//! reads for object-type resolution).

use bytes::Bytes;

use crate::error::{Result, TetherError};
use crate::object::ObjectRef;

/// A typed attribute value.
#[derive(Clone)]
pub enum TypedValue {
    /// Signed integer.
    Int(i64),
    /// Opaque bytes (authenticators, binary attribute data).
    Data(Bytes),
    /// UTF-8 text.
    Text(String),
    /// Reference to another protocol object (nested payloads).
    Object(ObjectRef),
}

impl TypedValue {
    /// Short tag for diagnostics and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Int(_) => "int",
            TypedValue::Data(_) => "data",
            TypedValue::Text(_) => "text",
            TypedValue::Object(_) => "object",
        }
    }

    /// Coerce to an integer, or fail with `InvalidArgument`.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            TypedValue::Int(v) => Ok(*v),
            other => Err(TetherError::InvalidArgument(format!(
                "expected int value, got {}",
                other.kind()
            ))),
        }
    }

    /// Coerce to an unsigned 32-bit integer (header fields, flags).
    pub fn as_u32(&self) -> Result<u32> {
        let v = self.as_int()?;
        u32::try_from(v).map_err(|_| {
            TetherError::InvalidArgument(format!("integer value {v} out of range"))
        })
    }

    /// Borrow the nested object reference, or fail with `InvalidArgument`.
    pub fn as_object(&self) -> Result<&ObjectRef> {
        match self {
            TypedValue::Object(o) => Ok(o),
            other => Err(TetherError::InvalidArgument(format!(
                "expected object value, got {}",
                other.kind()
            ))),
        }
    }

    /// Read this value as a name.
    ///
    /// Object-type names arrive either as text or as opaque data holding
    /// UTF-8; anything else (or non-UTF-8 data) is not a name.
    pub fn as_name_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s.as_str()),
            TypedValue::Data(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// True when this value is typed data (the only shape an
    /// authenticator accepts).
    pub fn is_data(&self) -> bool {
        matches!(self, TypedValue::Data(_))
    }
}

impl std::fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::Int(v) => write!(f, "Int({v})"),
            TypedValue::Data(b) => write!(f, "Data({} bytes)", b.len()),
            TypedValue::Text(s) => write!(f, "Text({s:?})"),
            TypedValue::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<u32> for TypedValue {
    fn from(v: u32) -> Self {
        TypedValue::Int(i64::from(v))
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::Text(v.to_string())
    }
}

impl From<Bytes> for TypedValue {
    fn from(v: Bytes) -> Self {
        TypedValue::Data(v)
    }
}

impl From<ObjectRef> for TypedValue {
    fn from(v: ObjectRef) -> Self {
        TypedValue::Object(v)
    }
}
