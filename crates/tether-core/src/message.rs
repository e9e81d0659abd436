//! Protocol message entity.
//!
//! One `Message` represents one transaction: the fixed header fields the
//! processor dispatches on, plus an embedded generic layer so callers can
//! attach arbitrary attributes (and further layers, e.g. status waiters)
//! without the message type knowing about them.

use std::sync::{Arc, Mutex};

use crate::error::{Result, TetherError};
use crate::object::{AttributeSink, GenericObject, ObjectLayer, ObjectRef, Signal};
use crate::value::TypedValue;

/// Protocol operations (wire-level integers, values stable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Open,
    Refresh,
    Update,
    Notify,
    Error,
    RequestOk,
}

impl Opcode {
    pub fn as_wire(self) -> u32 {
        match self {
            Opcode::Open => 1,
            Opcode::Refresh => 2,
            Opcode::Update => 3,
            Opcode::Notify => 4,
            Opcode::Error => 5,
            Opcode::RequestOk => 6,
        }
    }

    /// Unknown values are rejected here and surface as `NotImplemented`
    /// at dispatch; they are never fatal to the process.
    pub fn from_wire(v: u32) -> Option<Self> {
        match v {
            1 => Some(Opcode::Open),
            2 => Some(Opcode::Refresh),
            3 => Some(Opcode::Update),
            4 => Some(Opcode::Notify),
            5 => Some(Opcode::Error),
            6 => Some(Opcode::RequestOk),
            _ => None,
        }
    }
}

/// Shared handle to a message awaiting a response.
pub type MessageRef = Arc<Mutex<Message>>;

/// One protocol transaction.
///
/// `object` is a single slot with two roles over the message lifetime: on
/// an inbound message it carries the caller-supplied payload attributes,
/// and on a registered outbound request it is the bound target the eventual
/// response settles against.
pub struct Message {
    op: u32,
    id: u32,
    rid: u32,
    handle: u32,
    authid: u32,
    authenticator: Option<TypedValue>,
    object: Option<ObjectRef>,
    registered: bool,
    inner: GenericObject,
}

impl Message {
    /// Create a message paired with its generic attribute layer.
    pub fn new() -> Self {
        Self::with_generic(GenericObject::new())
    }

    /// Create a message whose generic layer delegates to `inner`.
    ///
    /// This is how callers chain their own layers (status waiters,
    /// recording layers) under a request.
    pub fn with_inner(inner: Box<dyn ObjectLayer + Send>) -> Self {
        Self::with_generic(GenericObject::with_inner(inner))
    }

    fn with_generic(inner: GenericObject) -> Self {
        Self {
            op: 0,
            id: 0,
            rid: 0,
            handle: 0,
            authid: 0,
            authenticator: None,
            object: None,
            registered: false,
            inner,
        }
    }

    /// Raw operation field; may name an opcode this build does not know.
    pub fn op(&self) -> u32 {
        self.op
    }

    /// Decoded opcode, if the raw value names one.
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_wire(self.op)
    }

    /// Transaction id assigned to this message.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Transaction id this message responds to; zero on a fresh request.
    pub fn rid(&self) -> u32 {
        self.rid
    }

    /// Handle of the object this message addresses.
    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn authid(&self) -> u32 {
        self.authid
    }

    /// Derived length of the attached authenticator, in bytes.
    pub fn authlen(&self) -> u32 {
        match &self.authenticator {
            Some(TypedValue::Data(b)) => b.len() as u32,
            _ => 0,
        }
    }

    /// Payload specification (inbound) or bound target (pending request).
    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub(crate) fn set_registered(&mut self, registered: bool) {
        self.registered = registered;
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectLayer for Message {
    fn get_attribute(&self, name: &str) -> Result<TypedValue> {
        match name {
            "authlen" => Ok(TypedValue::from(self.authlen())),
            "authenticator" => self.authenticator.clone().ok_or(TetherError::NotFound),
            "authid" => Ok(TypedValue::from(self.authid)),
            "op" => Ok(TypedValue::from(self.op)),
            "handle" => Ok(TypedValue::from(self.handle)),
            "id" => Ok(TypedValue::from(self.id)),
            "rid" => Ok(TypedValue::from(self.rid)),
            _ => self.inner.get_attribute(name),
        }
    }

    fn set_attribute(&mut self, name: &str, value: TypedValue) -> Result<()> {
        match name {
            // Replaces any previously attached authenticator.
            "authenticator" => {
                if !value.is_data() {
                    return Err(TetherError::InvalidArgument(format!(
                        "authenticator must be typed data, got {}",
                        value.kind()
                    )));
                }
                self.authenticator = Some(value);
                Ok(())
            }
            "object" => {
                self.object = Some(value.as_object()?.clone());
                Ok(())
            }
            "authid" => {
                self.authid = value.as_u32()?;
                Ok(())
            }
            "op" => {
                self.op = value.as_u32()?;
                Ok(())
            }
            "handle" => {
                self.handle = value.as_u32()?;
                Ok(())
            }
            "id" => {
                self.id = value.as_u32()?;
                Ok(())
            }
            "rid" => {
                self.rid = value.as_u32()?;
                Ok(())
            }
            "authlen" => Err(TetherError::InvalidArgument(
                "authlen is derived and read-only".into(),
            )),
            // Unrecognized names belong to the generic layer; any failure
            // down the chain reports as NotFound.
            _ => self
                .inner
                .set_attribute(name, value)
                .map_err(|_| TetherError::NotFound),
        }
    }

    fn deliver_signal(&mut self, signal: Signal) -> Result<()> {
        self.inner.deliver_signal(signal)
    }

    /// The message publishes no attributes of its own; serialization is
    /// whatever the generic layer (and anything chained under it) holds.
    fn serialize_attributes(&self, sink: &mut dyn AttributeSink) -> Result<()> {
        self.inner.serialize_attributes(sink)
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("op", &self.op)
            .field("id", &self.id)
            .field("rid", &self.rid)
            .field("handle", &self.handle)
            .field("authid", &self.authid)
            .field("authlen", &self.authlen())
            .field("bound", &self.object.is_some())
            .field("registered", &self.registered)
            .finish()
    }
}
