//! VLESS descriptor parser
//!
//! URI format: `vless://<uuid>@<host>:<port>[?<query>][#<name>]`
//!
//! **Required**: `uuid`, `host`, `port` (1–65535).
//!
//! **Query parameters** (`application/x-www-form-urlencoded`, first value wins):
//! `security` (`tls` turns TLS on), `type` (tcp/ws/grpc/..., default tcp), `flow`,
//! `sni` (TLS server name), `path` (ws, default `/`), `host` (ws `Host` header,
//! defaults to `sni`, then to the connection host), `serviceName` (grpc).
//!
//! **Fragment**: URL-decoded display name; when absent the name is `VLESS-<host>`.
//!
//! ## Parsing rules
//!
//! 1. Prefix `vless://` is case-insensitive.
//! 2. The last `@` separates uuid from `host:port`; a bracketed IPv6 host is unwrapped.
//! 3. A missing `@` or `:` is `StructuralMismatch`; an empty uuid or host is `IncompleteRecord`.

use crate::DescriptorParser;
use crate::constants::{default_name, error_msg, scheme};
use crate::error::{DescriptorError, Result};
use crate::node::{Extra, NodeRecord, Scheme, Transport};
use crate::uri;

/// VLESS descriptor parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VLess;

impl DescriptorParser for VLess {
    const PREFIX: &'static str = scheme::VLESS;

    fn parse(link: &str) -> Result<NodeRecord> {
        let body = uri::strip_scheme(link.trim(), Self::PREFIX)?;
        let parts = uri::split_link(body);

        let (uuid, host_port) = parts
            .main
            .rsplit_once('@')
            .ok_or_else(|| DescriptorError::StructuralMismatch(error_msg::MISSING_AT.to_string()))?;
        let (host, port) = uri::split_host_port(host_port)?;

        let uuid = uuid.trim();
        if uuid.is_empty() {
            return Err(DescriptorError::IncompleteRecord("missing uuid".to_string()));
        }
        if host.is_empty() {
            return Err(DescriptorError::IncompleteRecord("missing host".to_string()));
        }

        let params = uri::query_params(parts.query);
        let tls = uri::param(&params, "security").is_some_and(|s| s.eq_ignore_ascii_case("tls"));
        let network = uri::param(&params, "type").unwrap_or("tcp");
        let sni = uri::param(&params, "sni");
        let ws_host = uri::param(&params, "host").or(sni).unwrap_or(host.as_str());
        let transport = Transport::from_network(
            network,
            uri::param(&params, "path"),
            Some(ws_host),
            uri::param(&params, "serviceName"),
        );
        let flow = uri::param(&params, "flow").map(str::to_string);
        let sni = sni.map(str::to_string);

        let name = uri::decode_name(parts.fragment)?
            .unwrap_or_else(|| format!("{}{}", default_name::VLESS, host));

        Ok(NodeRecord {
            name,
            scheme: Scheme::VLess,
            server: host,
            port,
            credential: uuid.to_string(),
            transport,
            tls,
            extra: Extra::VLess { flow, sni },
        })
    }

    fn to_link(record: &NodeRecord) -> String {
        let (flow, sni) = match &record.extra {
            Extra::VLess { flow, sni } => (flow.as_deref(), sni.as_deref()),
            _ => (None, None),
        };
        let mut query_params = vec![format!(
            "type={}",
            urlencoding::encode(record.transport.network())
        )];
        if record.tls {
            query_params.push("security=tls".to_string());
        }
        if let Some(sni) = sni {
            query_params.push(format!("sni={}", urlencoding::encode(sni)));
        }
        match &record.transport {
            Transport::WebSocket { path, host } => {
                query_params.push(format!("path={}", urlencoding::encode(path)));
                // 与默认值相同的 Host 不写出
                let default_host = sni.unwrap_or(record.server.as_str());
                if let Some(host) = host.as_deref().filter(|h| *h != default_host) {
                    query_params.push(format!("host={}", urlencoding::encode(host)));
                }
            }
            Transport::Grpc {
                service_name: Some(service_name),
            } => {
                query_params.push(format!("serviceName={}", urlencoding::encode(service_name)));
            }
            _ => {}
        }
        if let Some(flow) = flow {
            query_params.push(format!("flow={}", urlencoding::encode(flow)));
        }

        format!(
            "vless://{}@{}:{}?{}#{}",
            record.credential,
            uri::authority_host(&record.server),
            record.port,
            query_params.join("&"),
            urlencoding::encode(&record.name)
        )
    }
}
