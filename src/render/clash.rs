//! Clash (rule-based router) YAML document.
//!
//! Layout:
//! - `proxies`: one entry per record
//! - `proxy-groups`: `Auto` (url-test over the first `auto_limit` records) and
//!   `Balance` (load-balance over all records)
//! - `rules`: a fixed list sending LAN/CN traffic direct and everything else to `Auto`
//!
//! Proxy names must not repeat or shadow a group or built-in target, so such
//! names get `-2` appended. SIP003 plugins are translated to `plugin` plus
//! `plugin-opts`; plugins Clash cannot run are left out.

use super::{PluginSpec, unique_tags};
use crate::error::SieveError;
use crate::node::{Extra, NodeRecord, Scheme, Transport};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const AUTO_GROUP: &str = "Auto";
const BALANCE_GROUP: &str = "Balance";
const RESERVED_NAMES: [&str; 4] = [AUTO_GROUP, BALANCE_GROUP, "DIRECT", "REJECT"];

const HEALTH_CHECK_URL: &str = "http://www.gstatic.com/generate_204";
const HEALTH_CHECK_INTERVAL: u32 = 300;

const RULES: [&str; 8] = [
    "DOMAIN-SUFFIX,local,DIRECT",
    "IP-CIDR,127.0.0.0/8,DIRECT",
    "IP-CIDR,10.0.0.0/8,DIRECT",
    "IP-CIDR,172.16.0.0/12,DIRECT",
    "IP-CIDR,192.168.0.0/16,DIRECT",
    "DOMAIN-SUFFIX,cn,DIRECT",
    "GEOIP,CN,DIRECT",
    "MATCH,Auto",
];

#[derive(Debug, Serialize)]
struct WsOpts<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<&'static str, &'a str>,
}

#[derive(Debug, Serialize)]
struct GrpcOpts<'a> {
    #[serde(rename = "grpc-service-name")]
    service_name: &'a str,
}

#[derive(Debug, Default, PartialEq, Serialize)]
struct PluginOpts<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls: Option<bool>,
}

/// Maps a SIP003 plugin onto Clash's `plugin` name and `plugin-opts`.
/// Plugins Clash does not support yield `None`.
fn clash_plugin(raw: &str) -> Option<(&'static str, PluginOpts<'_>)> {
    let spec = PluginSpec::parse(raw);
    match spec.name {
        "obfs-local" | "simple-obfs" => Some((
            "obfs",
            PluginOpts {
                mode: Some(spec.option("obfs").unwrap_or("http")),
                host: spec.option("obfs-host"),
                ..PluginOpts::default()
            },
        )),
        "v2ray-plugin" => Some((
            "v2ray-plugin",
            PluginOpts {
                mode: Some(spec.option("mode").unwrap_or("websocket")),
                host: spec.option("host"),
                path: spec.option("path"),
                tls: spec.has_flag("tls").then_some(true),
            },
        )),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ClashProxy<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    server: &'a str,
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    uuid: Option<&'a str>,
    #[serde(rename = "alterId", skip_serializing_if = "Option::is_none")]
    alter_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cipher: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    servername: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sni: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin_opts: Option<PluginOpts<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ws_opts: Option<WsOpts<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grpc_opts: Option<GrpcOpts<'a>>,
    udp: bool,
}

impl<'a> ClashProxy<'a> {
    fn from_record(record: &'a NodeRecord, name: &'a str) -> Self {
        let mut proxy = ClashProxy {
            name,
            kind: match record.scheme {
                Scheme::VMess => "vmess",
                Scheme::VLess => "vless",
                Scheme::Trojan => "trojan",
                Scheme::Shadowsocks => "ss",
            },
            server: &record.server,
            port: record.port,
            uuid: None,
            alter_id: None,
            cipher: None,
            password: None,
            tls: None,
            servername: None,
            sni: None,
            flow: None,
            plugin: None,
            plugin_opts: None,
            network: None,
            ws_opts: None,
            grpc_opts: None,
            udp: true,
        };

        match &record.extra {
            Extra::VMess { alter_id, cipher } => {
                proxy.uuid = Some(record.credential.as_str());
                proxy.alter_id = Some(*alter_id);
                proxy.cipher = Some(cipher.as_str());
                proxy.tls = Some(record.tls);
                if record.tls {
                    proxy.servername = Some(record.server_name());
                }
            }
            Extra::VLess { flow, .. } => {
                proxy.uuid = Some(record.credential.as_str());
                proxy.tls = Some(record.tls);
                proxy.flow = flow.as_deref();
                if record.tls {
                    proxy.servername = Some(record.server_name());
                }
            }
            Extra::Trojan { sni } => {
                proxy.password = Some(record.credential.as_str());
                proxy.sni = Some(sni.as_str());
            }
            Extra::Shadowsocks { method, plugin } => {
                proxy.cipher = Some(method.as_str());
                proxy.password = Some(record.credential.as_str());
                if let Some(raw) = plugin {
                    match clash_plugin(raw) {
                        Some((name, opts)) => {
                            proxy.plugin = Some(name);
                            proxy.plugin_opts = Some(opts);
                        }
                        None => {
                            debug!(name = %record.name, plugin = %raw, "unsupported plugin omitted")
                        }
                    }
                }
            }
        }

        match &record.transport {
            Transport::Tcp => {}
            Transport::WebSocket { path, host } => {
                proxy.network = Some("ws");
                let mut headers = BTreeMap::new();
                if let Some(host) = host {
                    headers.insert("Host", host.as_str());
                }
                proxy.ws_opts = Some(WsOpts {
                    path: path.as_str(),
                    headers,
                });
            }
            Transport::Grpc { service_name } => {
                proxy.network = Some("grpc");
                proxy.grpc_opts = service_name
                    .as_deref()
                    .map(|service_name| GrpcOpts { service_name });
            }
            Transport::Other { name } => proxy.network = Some(name.as_str()),
        }
        proxy
    }
}

#[derive(Debug, Serialize)]
struct ProxyGroup<'a> {
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<&'static str>,
    url: &'static str,
    interval: u32,
    proxies: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ClashDocument<'a> {
    proxies: Vec<ClashProxy<'a>>,
    #[serde(rename = "proxy-groups")]
    proxy_groups: Vec<ProxyGroup<'a>>,
    rules: Vec<&'static str>,
}

/// Renders the Clash YAML document.
///
/// `auto_limit` caps the `Auto` group; `Balance` always spans every record.
pub fn render_clash(nodes: &[NodeRecord], auto_limit: usize) -> Result<String, SieveError> {
    let tags = unique_tags(nodes, &RESERVED_NAMES);
    let names: Vec<&str> = tags.iter().map(String::as_str).collect();
    let document = ClashDocument {
        proxies: nodes
            .iter()
            .zip(&names)
            .map(|(node, name)| ClashProxy::from_record(node, *name))
            .collect(),
        proxy_groups: vec![
            ProxyGroup {
                name: AUTO_GROUP,
                kind: "url-test",
                strategy: None,
                url: HEALTH_CHECK_URL,
                interval: HEALTH_CHECK_INTERVAL,
                proxies: names.iter().take(auto_limit).copied().collect(),
            },
            ProxyGroup {
                name: BALANCE_GROUP,
                kind: "load-balance",
                strategy: Some("consistent-hashing"),
                url: HEALTH_CHECK_URL,
                interval: HEALTH_CHECK_INTERVAL,
                proxies: names,
            },
        ],
        rules: RULES.to_vec(),
    };
    serde_yaml::to_string(&document).map_err(|e| SieveError::Render(e.to_string()))
}
