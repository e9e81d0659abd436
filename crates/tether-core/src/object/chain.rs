//! Layer contract, delegation combinators, and shared object handles.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, TetherError};
use crate::value::TypedValue;

/// Signal delivered through the object chain.
///
/// Closed set with typed payloads; layers that do not handle a signal
/// delegate it inward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Terminal outcome of a correlated transaction.
    Status(crate::error::Code),
}

/// Receiver for [`ObjectLayer::serialize_attributes`].
pub trait AttributeSink {
    fn write(&mut self, name: &str, value: &TypedValue) -> Result<()>;
}

impl AttributeSink for Vec<(String, TypedValue)> {
    fn write(&mut self, name: &str, value: &TypedValue) -> Result<()> {
        self.push((name.to_string(), value.clone()));
        Ok(())
    }
}

/// One layer of a protocol object.
///
/// Default method bodies implement the leaf behavior: attribute and signal
/// calls fail with `NotFound`, serialization writes nothing. A layer
/// overrides only the capabilities it provides; destruction needs no
/// capability of its own because dropping a layer releases whatever it
/// owns.
pub trait ObjectLayer: Send {
    fn get_attribute(&self, name: &str) -> Result<TypedValue> {
        let _ = name;
        Err(TetherError::NotFound)
    }

    fn set_attribute(&mut self, name: &str, value: TypedValue) -> Result<()> {
        let _ = (name, value);
        Err(TetherError::NotFound)
    }

    fn deliver_signal(&mut self, signal: Signal) -> Result<()> {
        let _ = signal;
        Err(TetherError::NotFound)
    }

    fn serialize_attributes(&self, sink: &mut dyn AttributeSink) -> Result<()> {
        let _ = sink;
        Ok(())
    }
}

/// Shared-ownership handle to a chained object.
///
/// Every cross-entity link (payload objects, bound targets, handle-table
/// entries) is one of these; the last clone dropped releases the chain.
pub type ObjectRef = Arc<Mutex<dyn ObjectLayer + Send>>;

/// Wrap a layer into a shared handle.
pub fn object_ref<T: ObjectLayer + 'static>(layer: T) -> ObjectRef {
    Arc::new(Mutex::new(layer))
}

// Poisoned lock means a panic elsewhere; report it instead of unwrapping.
fn lock(obj: &ObjectRef) -> Result<MutexGuard<'_, dyn ObjectLayer + Send + 'static>> {
    obj.lock().map_err(|_| TetherError::Unexpected)
}

/// Delegate an attribute read to the inner layer, `NotFound` at the leaf.
pub fn delegate_get(
    inner: &Option<Box<dyn ObjectLayer + Send>>,
    name: &str,
) -> Result<TypedValue> {
    match inner {
        Some(layer) => layer.get_attribute(name),
        None => Err(TetherError::NotFound),
    }
}

/// Delegate an attribute write to the inner layer, `NotFound` at the leaf.
pub fn delegate_set(
    inner: &mut Option<Box<dyn ObjectLayer + Send>>,
    name: &str,
    value: TypedValue,
) -> Result<()> {
    match inner {
        Some(layer) => layer.set_attribute(name, value),
        None => Err(TetherError::NotFound),
    }
}

/// Delegate a signal to the inner layer, `NotFound` at the leaf.
pub fn delegate_signal(
    inner: &mut Option<Box<dyn ObjectLayer + Send>>,
    signal: Signal,
) -> Result<()> {
    match inner {
        Some(layer) => layer.deliver_signal(signal),
        None => Err(TetherError::NotFound),
    }
}

/// Delegate serialization to the inner layer; nothing to write at the leaf.
pub fn delegate_serialize(
    inner: &Option<Box<dyn ObjectLayer + Send>>,
    sink: &mut dyn AttributeSink,
) -> Result<()> {
    match inner {
        Some(layer) => layer.serialize_attributes(sink),
        None => Ok(()),
    }
}

/// Read one attribute from a shared object.
pub fn get_attr(obj: &ObjectRef, name: &str) -> Result<TypedValue> {
    lock(obj)?.get_attribute(name)
}

/// Write one attribute on a shared object.
pub fn set_attr(obj: &ObjectRef, name: &str, value: TypedValue) -> Result<()> {
    lock(obj)?.set_attribute(name, value)
}

/// Deliver a signal to a shared object.
pub fn signal(obj: &ObjectRef, sig: Signal) -> Result<()> {
    lock(obj)?.deliver_signal(sig)
}

/// Snapshot the full attribute set of a shared object.
pub fn snapshot_attributes(obj: &ObjectRef) -> Result<Vec<(String, TypedValue)>> {
    let mut out = Vec::new();
    lock(obj)?.serialize_attributes(&mut out)?;
    Ok(out)
}

/// Apply every attribute of `spec` to `target`, stopping at the first
/// failure. The specification's own serialization order is preserved.
pub fn apply_attributes(target: &ObjectRef, spec: &ObjectRef) -> Result<()> {
    let pairs = snapshot_attributes(spec)?;
    for (name, value) in pairs {
        set_attr(target, &name, value)?;
    }
    Ok(())
}
