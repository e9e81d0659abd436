//! Registry of outbound requests awaiting a response.
//!
//! An owned value, not process-global: the protocol-handling context that
//! owns the registry decides its locking discipline and lifetime. While a
//! message is registered the registry holds its owning handle, so a pending
//! request cannot be dropped out from under the correlation scan; the
//! cancellation path is an explicit [`MessageRegistry::unregister`] followed
//! by dropping the returned handle.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{Result, TetherError};
use crate::message::MessageRef;

/// Pending-transaction set, ordered newest first.
#[derive(Default)]
pub struct MessageRegistry {
    pending: VecDeque<MessageRef>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn position(&self, m: &MessageRef) -> Option<usize> {
        self.pending.iter().position(|p| Arc::ptr_eq(p, m))
    }

    /// Insert a message at the head of the pending set.
    ///
    /// Fails with `InvalidArgument` if the message is already registered;
    /// the set is left unchanged. Membership and the message's registered
    /// flag are updated in the same call, never one without the other.
    pub fn register(&mut self, m: MessageRef) -> Result<()> {
        {
            let mut guard = m.lock().map_err(|_| TetherError::Unexpected)?;
            if guard.is_registered() || self.position(&m).is_some() {
                return Err(TetherError::InvalidArgument(
                    "message already registered".into(),
                ));
            }
            guard.set_registered(true);
            tracing::trace!(id = guard.id(), pending = self.pending.len() + 1, "register");
        }
        self.pending.push_front(m);
        Ok(())
    }

    /// Splice a message out of the pending set and hand its owning handle
    /// back to the caller.
    ///
    /// Fails with `InvalidArgument` if the message is not currently
    /// registered; the set is left unchanged.
    pub fn unregister(&mut self, m: &MessageRef) -> Result<MessageRef> {
        let Some(i) = self.position(m) else {
            return Err(TetherError::InvalidArgument(
                "message is not registered".into(),
            ));
        };
        let owned = self
            .pending
            .remove(i)
            .ok_or(TetherError::Unexpected)?;
        {
            let mut guard = owned.lock().map_err(|_| TetherError::Unexpected)?;
            guard.set_registered(false);
            tracing::trace!(id = guard.id(), pending = self.pending.len(), "unregister");
        }
        Ok(owned)
    }

    /// Resolve a response id against the pending set.
    ///
    /// Linear scan from the head comparing each message's own transaction
    /// id; first match wins. O(n) in outstanding transactions, which is
    /// bounded by caller concurrency rather than request volume.
    pub fn find_by_response_id(&self, rid: u32) -> Option<MessageRef> {
        self.pending
            .iter()
            .find(|m| m.lock().map(|g| g.id() == rid).unwrap_or(false))
            .cloned()
    }
}
