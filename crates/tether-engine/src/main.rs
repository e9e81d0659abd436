//! tether engine demo.
//!
//! Loopback exchange against an in-process object store:
//! - inbound OPEN (create) of a sample "host" object
//! - inbound REFRESH of the same object through the handle table
//! - outbound UPDATE request settled by a simulated peer REQUEST_OK
//!
//! Replies are rendered as JSON through the tracing output.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use tether_core::error::{Result, TetherError};
use tether_core::message::{Message, Opcode};
use tether_core::object::{
    apply_attributes, get_attr, object_ref, GenericObject, ObjectLayer, ObjectRef,
};
use tether_core::registry::MessageRegistry;
use tether_core::value::TypedValue;

use tether_engine::collab::{
    InMemoryHandleTable, MpscReplyChannel, ObjectType, Reply, TypeRegistry,
};
use tether_engine::config::{self, EngineConfig};
use tether_engine::dispatch::Processor;
use tether_engine::session::{RequestSession, StatusWaiter};

/// Demo object type: hosts looked up by their `name` attribute.
#[derive(Default)]
struct HostType {
    store: DashMap<String, ObjectRef>,
}

impl ObjectType for HostType {
    fn name(&self) -> &'static str {
        "host"
    }

    fn lookup(&self, spec: &ObjectRef) -> Result<ObjectRef> {
        let name = get_attr(spec, "name")
            .ok()
            .and_then(|tv| tv.as_name_str().map(str::to_string))
            .ok_or(TetherError::NotFound)?;
        self.store
            .get(&name)
            .map(|e| e.value().clone())
            .ok_or(TetherError::NotFound)
    }

    fn create(&self) -> Result<ObjectRef> {
        Ok(object_ref(GenericObject::new()))
    }

    fn update(&self, object: &ObjectRef, spec: &ObjectRef) -> Result<()> {
        apply_attributes(object, spec)?;
        if let Some(name) = get_attr(object, "name")
            .ok()
            .and_then(|tv| tv.as_name_str().map(str::to_string))
        {
            self.store.insert(name, object.clone());
        }
        Ok(())
    }
}

fn value_json(v: &TypedValue) -> serde_json::Value {
    match v {
        TypedValue::Int(i) => json!(i),
        TypedValue::Text(s) => json!(s),
        TypedValue::Data(b) => {
            let hex: String = b.iter().map(|x| format!("{x:02x}")).collect();
            json!({ "hex": hex })
        }
        TypedValue::Object(_) => json!("<object>"),
    }
}

fn reply_json(reply: &Reply) -> serde_json::Value {
    match reply {
        Reply::Update { to_id, attributes } => json!({
            "type": "update",
            "to_id": to_id,
            "attributes": attributes
                .iter()
                .map(|(n, v)| json!({ "name": n, "value": value_json(v) }))
                .collect::<Vec<_>>(),
        }),
        Reply::Success { to_id } => json!({ "type": "success", "to_id": to_id }),
        Reply::Error { to_id, code, message } => json!({
            "type": "error",
            "to_id": to_id,
            "code": code.as_str(),
            "message": message,
        }),
    }
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<Reply>) {
    while let Ok(reply) = rx.try_recv() {
        tracing::info!(reply = %reply_json(&reply), "reply");
    }
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = if Path::new("tether.yaml").exists() {
        config::load_from_file("tether.yaml").expect("config load failed")
    } else {
        EngineConfig::default()
    };

    let types = Arc::new(TypeRegistry::new());
    let host_type = Arc::new(HostType::default());
    types
        .register(host_type.clone())
        .expect("host type registers once");

    let handles = Arc::new(InMemoryHandleTable::new());
    let processor = Processor::new(types, handles.clone());
    let session = RequestSession::new(cfg.engine.max_pending);
    let mut registry = MessageRegistry::new();
    let (channel, mut rx) = MpscReplyChannel::new(cfg.engine.reply_queue_depth);

    tracing::info!(
        max_pending = cfg.engine.max_pending,
        "tether-engine demo starting"
    );

    // 1) Inbound OPEN: create a host named fred.
    let payload = object_ref({
        let mut spec = GenericObject::new();
        spec.set_attribute("type", TypedValue::from("host")).expect("generic set");
        spec.set_attribute("create", TypedValue::Int(1)).expect("generic set");
        spec.set_attribute("name", TypedValue::from("fred")).expect("generic set");
        spec.set_attribute(
            "ip-address",
            TypedValue::Data(bytes::Bytes::from_static(b"\x0a\x00\x00\x01")),
        )
        .expect("generic set");
        spec
    });
    let mut open = Message::new();
    open.set_attribute("op", TypedValue::from(Opcode::Open.as_wire())).expect("set op");
    open.set_attribute("id", TypedValue::Int(1)).expect("set id");
    open.set_attribute("object", TypedValue::Object(payload)).expect("set object");

    processor
        .process(&registry, &channel, &open)
        .await
        .expect("open handled");
    drain(&mut rx);

    // 2) Publish the new host in the handle table, then refresh it.
    let fred = host_type
        .store
        .get("fred")
        .map(|e| e.value().clone())
        .expect("fred was created");
    let handle = handles.insert(fred.clone());

    let mut refresh = Message::new();
    refresh.set_attribute("op", TypedValue::from(Opcode::Refresh.as_wire())).expect("set op");
    refresh.set_attribute("id", TypedValue::Int(2)).expect("set id");
    refresh.set_attribute("handle", TypedValue::from(handle)).expect("set handle");

    processor
        .process(&registry, &channel, &refresh)
        .await
        .expect("refresh handled");
    drain(&mut rx);

    // 3) Outbound UPDATE request, answered by a simulated peer REQUEST_OK.
    let (waiter, settled) = StatusWaiter::new();
    let request = session
        .start_request(
            &mut registry,
            Opcode::Update,
            handle,
            Some(fred),
            Some(Box::new(waiter)),
        )
        .expect("request registered");
    let request_id = request.lock().map(|m| m.id()).expect("request lock");

    let mut peer_ok = Message::new();
    peer_ok.set_attribute("op", TypedValue::from(Opcode::RequestOk.as_wire())).expect("set op");
    peer_ok.set_attribute("rid", TypedValue::from(request_id)).expect("set rid");

    processor
        .process(&registry, &channel, &peer_ok)
        .await
        .expect("response handled");

    let status = settled.await.expect("status delivered");
    tracing::info!(status = status.as_str(), request_id, "request settled");

    session
        .complete(&mut registry, &request)
        .expect("request retires");
    drain(&mut rx);

    tracing::info!(pending = registry.len(), "demo complete");
}
