//! tether engine library entry.
//!
//! This crate wires the message processor, its collaborator seams (reply
//! channel, handle table, object-type registry), the outbound request
//! session, and the config loader into a cohesive engine stack. It is
//! intended to be consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod collab;
pub mod config;
pub mod dispatch;
pub mod session;
