//! Collaborator seams consumed by the message processor.
//!
//! The processor drives everything outside the message layer through the
//! narrow interfaces here: the reply channel back to the peer, the handle
//! table naming live objects, and the registry of managed object types.

pub mod handle;
pub mod reply;
pub mod types;

pub use handle::{HandleTable, InMemoryHandleTable};
pub use reply::{MpscReplyChannel, Reply, ReplyChannel};
pub use types::{ObjectType, TypeRegistry};
