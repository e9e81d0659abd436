//! Protocol state machine.
//!
//! One inbound message in, exactly one terminal outcome out: a reply on
//! the channel, or a status signal to the locally pending transaction the
//! message responds to. Protocol-level failures (bad attribute, missing
//! object, create conflict) are reported to the peer and count as handled;
//! the only failures surfaced to the caller are the ones with no peer-side
//! story: an unsolicited response, an unknown opcode, or a dead channel.

use std::sync::Arc;

use tether_core::error::{Code, Result, TetherError};
use tether_core::message::{Message, MessageRef, Opcode};
use tether_core::object::{apply_attributes, get_attr, ObjectLayer, ObjectRef, Signal};
use tether_core::registry::MessageRegistry;

use crate::collab::{HandleTable, ReplyChannel, TypeRegistry};

/// Message processor: validates, resolves targets, performs the requested
/// effect, and correlates responses with pending requests.
pub struct Processor {
    types: Arc<TypeRegistry>,
    handles: Arc<dyn HandleTable>,
}

impl Processor {
    pub fn new(types: Arc<TypeRegistry>, handles: Arc<dyn HandleTable>) -> Self {
        Self { types, handles }
    }

    /// Run one inbound message to completion.
    ///
    /// The registry is the caller's; it is consulted for response
    /// correlation and never mutated here (registration happens on the
    /// issuing side, see [`crate::session`]).
    pub async fn process(
        &self,
        registry: &MessageRegistry,
        channel: &dyn ReplyChannel,
        msg: &Message,
    ) -> Result<()> {
        tracing::debug!(op = msg.op(), id = msg.id(), rid = msg.rid(), "processing message");

        // A message claiming to be a response must name a real pending
        // transaction before anything else happens; if it doesn't,
        // something's fishy and no side effect is allowed.
        let pending = if msg.rid() != 0 {
            match registry.find_by_response_id(msg.rid()) {
                Some(m) => Some(m),
                None => {
                    tracing::warn!(rid = msg.rid(), "response names no pending transaction");
                    return Err(TetherError::NotFound);
                }
            }
        } else {
            None
        };

        let Some(op) = msg.opcode() else {
            return Err(TetherError::NotImplemented(format!(
                "unknown opcode {}",
                msg.op()
            )));
        };

        match op {
            Opcode::Open => self.process_open(channel, msg, pending).await,
            Opcode::Refresh => self.refresh_by_handle(channel, msg).await,
            Opcode::Update => self.process_update(channel, msg, pending).await,
            Opcode::Notify => {
                channel
                    .send_error(Code::NotImplemented, msg.id(), "notify not implemented yet")
                    .await
            }
            Opcode::Error => {
                let Some(m) = pending else {
                    return Err(TetherError::Unexpected);
                };
                settle(&m, peer_reported_code(msg));
                Ok(())
            }
            Opcode::RequestOk => {
                let Some(m) = pending else {
                    return Err(TetherError::Unexpected);
                };
                settle(&m, Code::Success);
                Ok(())
            }
        }
    }

    async fn process_open(
        &self,
        channel: &dyn ReplyChannel,
        msg: &Message,
        pending: Option<MessageRef>,
    ) -> Result<()> {
        if pending.is_some() {
            return channel
                .send_error(Code::InvalidArgument, msg.id(), "OPEN can't be a response")
                .await;
        }

        // No payload means no type and no flags; the open degenerates to a
        // refresh of whatever the handle names.
        let Some(payload) = msg.object() else {
            return self.refresh_by_handle(channel, msg).await;
        };

        // A `type` attribute that is not a name (wrong shape, unknown name)
        // resolves to no type rather than failing.
        let ty = get_attr(payload, "type")
            .ok()
            .and_then(|tv| tv.as_name_str().map(str::to_string))
            .and_then(|name| self.types.find(&name));

        let create = match read_flag(payload, "create") {
            Ok(v) => v,
            Err(e) => {
                return channel
                    .send_error(e.code(), msg.id(), "invalid create flag value")
                    .await;
            }
        };
        let update = match read_flag(payload, "update") {
            Ok(v) => v,
            Err(e) => {
                return channel
                    .send_error(e.code(), msg.id(), "invalid update flag value")
                    .await;
            }
        };
        let exclusive = match read_flag(payload, "exclusive") {
            Ok(v) => v,
            Err(e) => {
                return channel
                    .send_error(e.code(), msg.id(), "invalid exclusive flag value")
                    .await;
            }
        };

        let Some(ty) = ty else {
            if create {
                return channel
                    .send_error(Code::InvalidArgument, msg.id(), "type required on create")
                    .await;
            }
            return self.refresh_by_handle(channel, msg).await;
        };

        let object = match ty.lookup(payload) {
            Ok(found) => Some(found),
            Err(TetherError::NotFound) => None,
            Err(e) => {
                let text = match &e {
                    TetherError::NotImplemented(_) => "unsearchable object type",
                    _ => "object lookup failed",
                };
                return channel.send_error(e.code(), msg.id(), text).await;
            }
        };

        if object.is_none() && !create {
            return channel
                .send_error(Code::NotFound, msg.id(), "no object matches specification")
                .await;
        }

        if object.is_some() && create && exclusive {
            // Release the found reference before reporting the conflict.
            drop(object);
            return channel
                .send_error(Code::AlreadyExists, msg.id(), "specified object already exists")
                .await;
        }

        let object = match object {
            Some(found) => found,
            None => match ty.create() {
                Ok(created) => created,
                Err(e) => {
                    return channel
                        .send_error(e.code(), msg.id(), "can't create new object")
                        .await;
                }
            },
        };

        if create || update {
            if let Err(e) = ty.update(&object, payload) {
                drop(object);
                return channel
                    .send_error(e.code(), msg.id(), "can't update object")
                    .await;
            }
        }

        // Converges with the refresh path: answer with the object's full
        // current attribute set.
        channel.send_update(msg.id(), &object).await
    }

    /// Shared tail of OPEN-without-type and REFRESH: resolve the target
    /// through the handle table and reply with its attributes.
    async fn refresh_by_handle(&self, channel: &dyn ReplyChannel, msg: &Message) -> Result<()> {
        let object = match self.handles.lookup_by_handle(msg.handle()) {
            Ok(found) => found,
            Err(e) => {
                return channel
                    .send_error(e.code(), msg.id(), "no matching handle")
                    .await;
            }
        };
        channel.send_update(msg.id(), &object).await
    }

    async fn process_update(
        &self,
        channel: &dyn ReplyChannel,
        msg: &Message,
        pending: Option<MessageRef>,
    ) -> Result<()> {
        // As a matched response the target is whatever the pending request
        // bound; as a fresh request it comes from the handle table.
        let target = match &pending {
            Some(m) => {
                let bound = m
                    .lock()
                    .map_err(|_| TetherError::Unexpected)?
                    .object()
                    .cloned();
                match bound {
                    Some(obj) => obj,
                    None => {
                        tracing::warn!(rid = msg.rid(), "pending request has no bound object");
                        settle(m, Code::Unexpected);
                        return Ok(());
                    }
                }
            }
            None => match self.handles.lookup_by_handle(msg.handle()) {
                Ok(found) => found,
                Err(e) => {
                    return channel
                        .send_error(e.code(), msg.id(), "no matching handle")
                        .await;
                }
            },
        };

        let applied = match msg.object() {
            Some(payload) => apply_attributes(&target, payload),
            None => Err(TetherError::InvalidArgument(
                "update requires a payload object".into(),
            )),
        };

        match applied {
            Err(e) => {
                drop(target);
                if msg.rid() == 0 {
                    channel
                        .send_error(e.code(), msg.id(), "can't update object")
                        .await?;
                }
                if let Some(m) = &pending {
                    settle(m, e.code());
                }
                Ok(())
            }
            Ok(()) => {
                if msg.rid() == 0 {
                    channel.send_success(msg.id()).await?;
                }
                if let Some(m) = &pending {
                    settle(m, Code::Success);
                }
                Ok(())
            }
        }
    }
}

/// Read an optional integer flag from an OPEN payload.
///
/// Absent means unset; present but uncoercible propagates the coercion
/// error for the caller to report.
fn read_flag(payload: &ObjectRef, name: &str) -> Result<bool> {
    match get_attr(payload, name) {
        Ok(tv) => Ok(tv.as_int()? != 0),
        Err(TetherError::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Result code a peer ERROR message reports; anything malformed or absent
/// reads as `Unexpected`.
fn peer_reported_code(msg: &Message) -> Code {
    let result = msg
        .object()
        .and_then(|payload| get_attr(payload, "result").ok());
    match result {
        Some(tv) => match tv.as_u32() {
            Ok(v) => Code::from_wire(v),
            Err(_) => Code::Unexpected,
        },
        None => Code::Unexpected,
    }
}

/// Deliver a terminal status signal to a pending request.
///
/// Delivery failures do not change the processing outcome; a request with
/// no interested layer simply never observes its completion.
fn settle(pending: &MessageRef, code: Code) {
    match pending.lock() {
        Ok(mut m) => {
            if let Err(e) = m.deliver_signal(Signal::Status(code)) {
                tracing::debug!(code = code.as_str(), error = %e, "status signal unhandled");
            }
        }
        Err(_) => tracing::warn!("pending message lock poisoned; status dropped"),
    }
}
