//! tether core: transport-agnostic message object model, registry, and
//! error surface.
//!
//! This crate defines the contracts shared by the engine, managed-object
//! types, and client tooling: typed attribute values, the polymorphic
//! object chain, the message entity, and the pending-transaction registry.
//! It intentionally carries no transport or runtime dependencies so it can
//! be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `TetherError`/`Result` so a hostile
//! or malformed message can never crash the hosting process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod message;
pub mod object;
pub mod registry;
pub mod value;

/// Shared result type.
pub use error::{Code, Result, TetherError};
pub use message::{Message, MessageRef, Opcode};
pub use object::{GenericObject, ObjectLayer, ObjectRef, Signal};
pub use registry::MessageRegistry;
pub use value::TypedValue;
