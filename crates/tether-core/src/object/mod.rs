//! Polymorphic object chain.
//!
//! One logical protocol object is a stack of layered capability providers:
//! each layer answers the attribute and signal calls it recognizes and
//! delegates the rest to the layer beneath it. The message entity, the
//! generic attribute store, and caller-supplied layers (e.g. status
//! waiters) all compose through the same [`ObjectLayer`] contract.

pub mod chain;
pub mod generic;

pub use chain::{
    apply_attributes, delegate_get, delegate_serialize, delegate_set, delegate_signal, get_attr,
    object_ref, set_attr, signal, snapshot_attributes, AttributeSink, ObjectLayer, ObjectRef,
    Signal,
};
pub use generic::GenericObject;
