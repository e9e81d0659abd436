//! Managed object types and their registry.
//!
//! An object type is a named capability provider: it knows how to find,
//! create, and update one category of managed resource. The registry maps
//! type names (as carried in OPEN payloads) to providers.

use std::sync::Arc;

use dashmap::DashMap;

use tether_core::error::{Result, TetherError};
use tether_core::object::{apply_attributes, ObjectRef};

/// One category of managed resource.
///
/// The default method bodies describe a type with no capability: lookups
/// report it unsearchable, creation is refused, and updates fall back to
/// generic attribute application. Implementations override what they
/// actually support.
pub trait ObjectType: Send + Sync {
    /// Type name matched against the `type` attribute of OPEN payloads.
    fn name(&self) -> &'static str;

    /// Find the object matching a caller-supplied specification.
    fn lookup(&self, spec: &ObjectRef) -> Result<ObjectRef> {
        let _ = spec;
        Err(TetherError::NotImplemented(
            "unsearchable object type".into(),
        ))
    }

    /// Create a fresh, empty object of this type.
    fn create(&self) -> Result<ObjectRef> {
        Err(TetherError::NotImplemented(
            "type cannot create objects".into(),
        ))
    }

    /// Apply a specification's attributes to an object of this type.
    fn update(&self, object: &ObjectRef, spec: &ObjectRef) -> Result<()> {
        apply_attributes(object, spec)
    }
}

/// Registry of available object types.
#[derive(Default)]
pub struct TypeRegistry {
    types: DashMap<&'static str, Arc<dyn ObjectType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// Register a type; a second registration under the same name is
    /// rejected rather than silently replacing the first.
    pub fn register(&self, ty: Arc<dyn ObjectType>) -> Result<()> {
        let name = ty.name();
        if self.types.contains_key(name) {
            return Err(TetherError::InvalidArgument(format!(
                "object type '{name}' is already registered"
            )));
        }
        self.types.insert(name, ty);
        Ok(())
    }

    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<Arc<dyn ObjectType>> {
        self.types.get(name).map(|e| e.value().clone())
    }

    pub fn registered_names(&self) -> Vec<&'static str> {
        self.types.iter().map(|e| *e.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
