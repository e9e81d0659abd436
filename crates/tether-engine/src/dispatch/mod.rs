//! Dispatch module exports.
//!
//! Re-exports the message processor so downstream consumers can depend on
//! this module directly.

pub mod processor;

pub use processor::Processor;
