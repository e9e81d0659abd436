//! Message entity attribute accessor tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::Bytes;

use tether_core::error::TetherError;
use tether_core::object::{object_ref, snapshot_attributes, GenericObject, ObjectLayer, Signal};
use tether_core::value::TypedValue;
use tether_core::{Code, Message};

#[test]
fn header_fields_round_trip() {
    let mut m = Message::new();
    m.set_attribute("op", TypedValue::Int(3)).unwrap();
    m.set_attribute("id", TypedValue::Int(7)).unwrap();
    m.set_attribute("rid", TypedValue::Int(0)).unwrap();
    m.set_attribute("handle", TypedValue::Int(42)).unwrap();
    m.set_attribute("authid", TypedValue::Int(9)).unwrap();

    assert_eq!(m.op(), 3);
    assert_eq!(m.id(), 7);
    assert_eq!(m.rid(), 0);
    assert_eq!(m.handle(), 42);
    assert_eq!(m.authid(), 9);

    assert_eq!(m.get_attribute("op").unwrap().as_int().unwrap(), 3);
    assert_eq!(m.get_attribute("handle").unwrap().as_int().unwrap(), 42);
}

#[test]
fn integer_fields_reject_other_shapes() {
    let mut m = Message::new();
    m.set_attribute("op", TypedValue::Int(2)).unwrap();

    let err = m
        .set_attribute("op", TypedValue::Text("refresh".into()))
        .expect_err("text op must fail");
    assert!(matches!(err, TetherError::InvalidArgument(_)));

    // Prior value untouched on failure.
    assert_eq!(m.op(), 2);

    let err = m
        .set_attribute("id", TypedValue::Int(-1))
        .expect_err("negative id must fail");
    assert!(matches!(err, TetherError::InvalidArgument(_)));
}

#[test]
fn authenticator_requires_typed_data() {
    let mut m = Message::new();

    let err = m
        .get_attribute("authenticator")
        .expect_err("unset authenticator");
    assert!(matches!(err, TetherError::NotFound));

    let err = m
        .set_attribute("authenticator", TypedValue::Text("nope".into()))
        .expect_err("text authenticator must fail");
    assert!(matches!(err, TetherError::InvalidArgument(_)));

    m.set_attribute("authenticator", TypedValue::Data(Bytes::from_static(b"\x01\x02\x03")))
        .unwrap();
    assert_eq!(m.authlen(), 3);

    // Replacing the authenticator replaces the derived length too.
    m.set_attribute("authenticator", TypedValue::Data(Bytes::from_static(b"\xaa")))
        .unwrap();
    assert_eq!(m.get_attribute("authlen").unwrap().as_int().unwrap(), 1);
}

#[test]
fn authlen_is_never_settable() {
    let mut m = Message::new();
    let err = m
        .set_attribute("authlen", TypedValue::Int(16))
        .expect_err("authlen is derived");
    assert!(matches!(err, TetherError::InvalidArgument(_)));
    assert_eq!(m.authlen(), 0);
}

#[test]
fn object_slot_requires_object_value() {
    let mut m = Message::new();
    let err = m
        .set_attribute("object", TypedValue::Int(1))
        .expect_err("int object must fail");
    assert!(matches!(err, TetherError::InvalidArgument(_)));
    assert!(m.object().is_none());

    let payload = object_ref(GenericObject::new());
    m.set_attribute("object", TypedValue::Object(payload)).unwrap();
    assert!(m.object().is_some());
}

#[test]
fn unknown_attributes_live_in_the_generic_layer() {
    let mut m = Message::new();
    m.set_attribute("name", TypedValue::Text("fred".into())).unwrap();
    assert_eq!(
        m.get_attribute("name").unwrap().as_name_str().unwrap(),
        "fred"
    );

    // Header fields never leak into the serialized attribute set; only the
    // generic layer publishes over the wire.
    m.set_attribute("id", TypedValue::Int(12)).unwrap();
    let mut out: Vec<(String, TypedValue)> = Vec::new();
    m.serialize_attributes(&mut out).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].0, "name");
}

#[test]
fn misses_fall_through_the_whole_chain() {
    let m = Message::new();
    let err = m.get_attribute("no-such-attribute").expect_err("must miss");
    assert!(matches!(err, TetherError::NotFound));
}

/// Layer that records status signals, chained under the generic layer.
#[derive(Default)]
struct Recorder {
    seen: Vec<Code>,
}

impl ObjectLayer for Recorder {
    fn deliver_signal(&mut self, signal: Signal) -> tether_core::Result<()> {
        let Signal::Status(code) = signal;
        self.seen.push(code);
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> tether_core::Result<TypedValue> {
        match name {
            "signals-seen" => Ok(TypedValue::Int(self.seen.len() as i64)),
            _ => Err(TetherError::NotFound),
        }
    }
}

#[test]
fn signals_and_reads_delegate_to_chained_layers() {
    let mut m = Message::with_inner(Box::new(Recorder::default()));

    m.deliver_signal(Signal::Status(Code::Success)).unwrap();
    m.deliver_signal(Signal::Status(Code::NotFound)).unwrap();

    assert_eq!(
        m.get_attribute("signals-seen").unwrap().as_int().unwrap(),
        2
    );
}

#[test]
fn signal_with_no_handler_reports_not_found() {
    let mut m = Message::new();
    let err = m
        .deliver_signal(Signal::Status(Code::Success))
        .expect_err("no layer handles signals");
    assert!(matches!(err, TetherError::NotFound));
}

#[test]
fn snapshot_sees_generic_attributes_through_the_shared_handle() {
    let mut m = Message::new();
    m.set_attribute("ip-address", TypedValue::Data(Bytes::from_static(b"\x0a\x00\x00\x01")))
        .unwrap();
    m.set_attribute("state", TypedValue::Int(1)).unwrap();

    let shared = object_ref(m);
    let pairs = snapshot_attributes(&shared).unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0, "ip-address");
    assert_eq!(pairs[1].0, "state");
}
