//! Reply channel back to the requesting peer.
//!
//! Wire encoding is the transport's concern; the engine emits structured
//! [`Reply`] values and lets the channel implementation decide how they
//! leave the process. The bundled implementation feeds a bounded tokio
//! channel, which is also what the tests and the demo binary consume.

use async_trait::async_trait;
use tokio::sync::mpsc;

use tether_core::error::{Code, Result, TetherError};
use tether_core::object::{snapshot_attributes, ObjectRef};
use tether_core::value::TypedValue;

/// One terminal outcome sent to the peer for a request it issued.
#[derive(Debug)]
pub enum Reply {
    /// Full current attribute set of the resolved object.
    Update {
        to_id: u32,
        attributes: Vec<(String, TypedValue)>,
    },
    /// Plain acknowledgement.
    Success { to_id: u32 },
    /// Failure report with a stable code and a short reason.
    Error {
        to_id: u32,
        code: Code,
        message: String,
    },
}

impl Reply {
    /// Request id this reply answers.
    pub fn to_id(&self) -> u32 {
        match self {
            Reply::Update { to_id, .. } => *to_id,
            Reply::Success { to_id } => *to_id,
            Reply::Error { to_id, .. } => *to_id,
        }
    }
}

/// Outbound side of the correlated request/response channel.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn send_error(&self, code: Code, request_id: u32, message: &str) -> Result<()>;
    async fn send_update(&self, request_id: u32, object: &ObjectRef) -> Result<()>;
    async fn send_success(&self, request_id: u32) -> Result<()>;
}

/// Bounded-queue reply channel.
pub struct MpscReplyChannel {
    tx: mpsc::Sender<Reply>,
}

impl MpscReplyChannel {
    /// Create a channel with the given queue depth, handing back the
    /// receiving end for the transport (or test) to drain.
    pub fn new(depth: usize) -> (Self, mpsc::Receiver<Reply>) {
        let (tx, rx) = mpsc::channel(depth);
        (Self { tx }, rx)
    }

    async fn push(&self, reply: Reply) -> Result<()> {
        self.tx
            .send(reply)
            .await
            .map_err(|_| TetherError::ChannelClosed)
    }
}

#[async_trait]
impl ReplyChannel for MpscReplyChannel {
    async fn send_error(&self, code: Code, request_id: u32, message: &str) -> Result<()> {
        tracing::debug!(code = code.as_str(), to_id = request_id, message, "error reply");
        self.push(Reply::Error {
            to_id: request_id,
            code,
            message: message.to_string(),
        })
        .await
    }

    async fn send_update(&self, request_id: u32, object: &ObjectRef) -> Result<()> {
        // Snapshot before the send so no object lock is held across await.
        let attributes = snapshot_attributes(object)?;
        tracing::debug!(to_id = request_id, count = attributes.len(), "update reply");
        self.push(Reply::Update {
            to_id: request_id,
            attributes,
        })
        .await
    }

    async fn send_success(&self, request_id: u32) -> Result<()> {
        tracing::debug!(to_id = request_id, "success reply");
        self.push(Reply::Success { to_id: request_id }).await
    }
}
