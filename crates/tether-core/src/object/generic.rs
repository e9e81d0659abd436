//! Generic attribute storage layer.
//!
//! The reusable value store embedded inside the message entity and other
//! protocol object types: an ordered name/value list plus an optional inner
//! layer for capabilities this store does not provide.

use crate::error::Result;
use crate::object::chain::{
    delegate_get, delegate_serialize, delegate_signal, AttributeSink, ObjectLayer, Signal,
};
use crate::value::TypedValue;

/// Extensible mapping from attribute name to typed value.
///
/// Writes replace in place on an exact name match and append otherwise, so
/// serialization reproduces first-write order.
#[derive(Default)]
pub struct GenericObject {
    values: Vec<(String, TypedValue)>,
    inner: Option<Box<dyn ObjectLayer + Send>>,
}

impl GenericObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store that delegates unhandled calls to `inner`.
    pub fn with_inner(inner: Box<dyn ObjectLayer + Send>) -> Self {
        Self {
            values: Vec::new(),
            inner: Some(inner),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|(n, _)| n == name)
    }
}

impl ObjectLayer for GenericObject {
    fn get_attribute(&self, name: &str) -> Result<TypedValue> {
        match self.position(name) {
            Some(i) => Ok(self.values[i].1.clone()),
            None => delegate_get(&self.inner, name),
        }
    }

    /// The store accepts any name; it is the chain's catch-all.
    fn set_attribute(&mut self, name: &str, value: TypedValue) -> Result<()> {
        match self.position(name) {
            Some(i) => self.values[i].1 = value,
            None => self.values.push((name.to_string(), value)),
        }
        Ok(())
    }

    fn deliver_signal(&mut self, signal: Signal) -> Result<()> {
        delegate_signal(&mut self.inner, signal)
    }

    fn serialize_attributes(&self, sink: &mut dyn AttributeSink) -> Result<()> {
        for (name, value) in &self.values {
            sink.write(name, value)?;
        }
        delegate_serialize(&self.inner, sink)
    }
}

impl std::fmt::Debug for GenericObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericObject")
            .field("values", &self.values)
            .field("chained", &self.inner.is_some())
            .finish()
    }
}
