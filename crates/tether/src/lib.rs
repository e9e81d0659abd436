//! Top-level facade crate for tether.
//!
//! Re-exports the core object model and the engine so users can depend on a single crate.

pub mod core {
    pub use tether_core::*;
}

pub mod engine {
    pub use tether_engine::*;
}
