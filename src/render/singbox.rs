//! sing-box (generic outbound router) JSON document.
//!
//! Each record becomes a typed outbound tagged with its display name. A
//! `proxy` selector offers every record plus `direct`, and is the route's final outbound.
//! Outbound tags must be unique, so a record named like a built-in tag (or like
//! an already taken tag) gets `-2` appended until it is free.

use super::{PluginSpec, unique_tags};
use crate::error::SieveError;
use crate::node::{Extra, NodeRecord, Transport};
use serde_json::{Value, json};

const SELECTOR_TAG: &str = "proxy";
const DIRECT_TAG: &str = "direct";

fn transport(record: &NodeRecord) -> Option<Value> {
    match &record.transport {
        Transport::Tcp => None,
        Transport::WebSocket { path, host } => {
            let mut ws = json!({ "type": "ws", "path": path });
            if let Some(host) = host {
                ws["headers"] = json!({ "Host": host });
            }
            Some(ws)
        }
        Transport::Grpc { service_name } => Some(json!({
            "type": "grpc",
            "service_name": service_name.as_deref().unwrap_or(""),
        })),
        Transport::Other { name } => Some(json!({ "type": name })),
    }
}

/// Builds the outbound object for one record, tagged with its display name.
pub fn outbound(record: &NodeRecord) -> Value {
    tagged_outbound(record, &record.name)
}

fn tagged_outbound(record: &NodeRecord, tag: &str) -> Value {
    let mut out = match &record.extra {
        Extra::VMess { alter_id, cipher } => json!({
            "type": "vmess",
            "uuid": record.credential,
            "alter_id": alter_id,
            "security": cipher,
        }),
        Extra::VLess { flow, .. } => {
            let mut out = json!({ "type": "vless", "uuid": record.credential });
            if let Some(flow) = flow {
                out["flow"] = json!(flow);
            }
            out
        }
        Extra::Trojan { .. } => json!({ "type": "trojan", "password": record.credential }),
        Extra::Shadowsocks { method, plugin } => {
            let mut out = json!({
                "type": "shadowsocks",
                "method": method,
                "password": record.credential,
            });
            if let Some(plugin) = plugin {
                let spec = PluginSpec::parse(plugin);
                out["plugin"] = json!(spec.name);
                if !spec.options.is_empty() {
                    out["plugin_opts"] = json!(spec.options);
                }
            }
            out
        }
    };

    out["tag"] = json!(tag);
    out["server"] = json!(record.server);
    out["server_port"] = json!(record.port);
    if record.tls {
        out["tls"] = json!({
            "enabled": true,
            "server_name": record.server_name(),
        });
    }
    if let Some(transport) = transport(record) {
        out["transport"] = transport;
    }
    out
}

/// Builds the whole sing-box document as a JSON value.
pub fn singbox_document(nodes: &[NodeRecord]) -> Value {
    let tags = unique_tags(nodes, &[SELECTOR_TAG, DIRECT_TAG]);
    let mut choices: Vec<Value> = tags.iter().map(|tag| json!(tag)).collect();
    choices.push(json!(DIRECT_TAG));

    let mut outbounds = vec![json!({
        "type": "selector",
        "tag": SELECTOR_TAG,
        "outbounds": choices,
    })];
    outbounds.extend(
        nodes
            .iter()
            .zip(&tags)
            .map(|(node, tag)| tagged_outbound(node, tag)),
    );
    outbounds.push(json!({ "type": "direct", "tag": DIRECT_TAG }));

    json!({
        "log": { "level": "info" },
        "dns": { "servers": [{ "address": "8.8.8.8" }] },
        "outbounds": outbounds,
        "route": { "final": SELECTOR_TAG },
    })
}

/// Renders the sing-box document as pretty-printed JSON.
pub fn render_singbox(nodes: &[NodeRecord]) -> Result<String, SieveError> {
    Ok(serde_json::to_string_pretty(&singbox_document(nodes))?)
}
