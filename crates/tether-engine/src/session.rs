//! Outbound request issuing.
//!
//! The registry only ever holds requests this process sent and is still
//! waiting on; this module is the issuing side. A [`RequestSession`]
//! assigns transaction ids, builds the request entity, and registers it;
//! a [`StatusWaiter`] chained under the request's generic layer lets the
//! caller await the correlated outcome delivered by the processor.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use tether_core::error::{Code, Result, TetherError};
use tether_core::message::{Message, MessageRef, Opcode};
use tether_core::object::{ObjectLayer, ObjectRef, Signal};
use tether_core::registry::MessageRegistry;
use tether_core::value::TypedValue;

/// Issues correlated requests against a peer.
pub struct RequestSession {
    next_id: AtomicU32,
    max_pending: usize,
}

impl RequestSession {
    /// `max_pending` bounds the number of simultaneously outstanding
    /// requests; the correlation scan is linear in this count.
    pub fn new(max_pending: usize) -> Self {
        Self {
            next_id: AtomicU32::new(1),
            max_pending,
        }
    }

    /// Build and register one outbound request.
    ///
    /// The returned handle is registered (the registry keeps it alive
    /// until [`RequestSession::complete`]); `object` becomes the bound
    /// target a matched response settles against, and `waiter`, if given,
    /// is chained under the generic layer to observe the outcome.
    pub fn start_request(
        &self,
        registry: &mut MessageRegistry,
        op: Opcode,
        handle: u32,
        object: Option<ObjectRef>,
        waiter: Option<Box<dyn ObjectLayer + Send>>,
    ) -> Result<MessageRef> {
        if registry.len() >= self.max_pending {
            return Err(TetherError::InvalidArgument(format!(
                "pending transaction limit reached ({})",
                self.max_pending
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut m = match waiter {
            Some(layer) => Message::with_inner(layer),
            None => Message::new(),
        };
        m.set_attribute("op", TypedValue::from(op.as_wire()))?;
        m.set_attribute("id", TypedValue::from(id))?;
        m.set_attribute("handle", TypedValue::from(handle))?;
        if let Some(target) = object {
            m.set_attribute("object", TypedValue::Object(target))?;
        }

        let request: MessageRef = Arc::new(Mutex::new(m));
        registry.register(request.clone())?;
        tracing::debug!(id, op = op.as_wire(), handle, "request registered");
        Ok(request)
    }

    /// Retire a settled (or cancelled) request, handing ownership back to
    /// the caller; dropping the result releases the entity.
    pub fn complete(
        &self,
        registry: &mut MessageRegistry,
        request: &MessageRef,
    ) -> Result<MessageRef> {
        registry.unregister(request)
    }
}

/// Chain layer that forwards the terminal status into a oneshot.
///
/// A transaction settles exactly once; a second status signal finds the
/// sender gone and reports `Unexpected`.
pub struct StatusWaiter {
    tx: Option<oneshot::Sender<Code>>,
}

impl StatusWaiter {
    pub fn new() -> (Self, oneshot::Receiver<Code>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }
}

impl ObjectLayer for StatusWaiter {
    fn deliver_signal(&mut self, signal: Signal) -> Result<()> {
        let Signal::Status(code) = signal;
        match self.tx.take() {
            Some(tx) => {
                // The receiver may have given up waiting; that is its call.
                let _ = tx.send(code);
                Ok(())
            }
            None => Err(TetherError::Unexpected),
        }
    }
}
