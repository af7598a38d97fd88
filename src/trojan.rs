//! Trojan descriptor parser
//!
//! Link format: `trojan://<password>@<host>:<port>[?<query>]#<name>`
//!
//! **Required**: `password`, `host`, `port` (1–65535) and the `#name` fragment.
//! Unlike VLESS and Shadowsocks there is no synthesized name: a link without a
//! name is rejected whether or not it carries a query.
//!
//! **Query parameters** (optional, first value wins): `sni` (defaults to the host),
//! `type` (tcp/ws/grpc), `path` and `host` for ws, `serviceName` for grpc.
//!
//! TLS is always on for this scheme.
//!
//! ## Parsing rules
//!
//! 1. Prefix `trojan://` is case-insensitive.
//! 2. The password is URL-decoded; the last `@` separates it from `host:port`.
//! 3. Missing `@`, `:` or `#name` → `StructuralMismatch`; empty password or host → `IncompleteRecord`.

use crate::DescriptorParser;
use crate::constants::{error_msg, scheme};
use crate::error::{DescriptorError, Result};
use crate::node::{Extra, NodeRecord, Scheme, Transport};
use crate::uri;

/// Trojan descriptor parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Trojan;

impl DescriptorParser for Trojan {
    const PREFIX: &'static str = scheme::TROJAN;

    fn parse(link: &str) -> Result<NodeRecord> {
        let body = uri::strip_scheme(link.trim(), Self::PREFIX)?;
        let parts = uri::split_link(body);

        let (password_raw, host_port) = parts
            .main
            .rsplit_once('@')
            .ok_or_else(|| DescriptorError::StructuralMismatch(error_msg::MISSING_AT.to_string()))?;
        let (host, port) = uri::split_host_port(host_port)?;
        let password = uri::decode_component(password_raw)?;

        if password.is_empty() {
            return Err(DescriptorError::IncompleteRecord("missing password".to_string()));
        }
        if host.is_empty() {
            return Err(DescriptorError::IncompleteRecord("missing host".to_string()));
        }

        let name = uri::decode_name(parts.fragment)?.ok_or_else(|| {
            DescriptorError::StructuralMismatch(error_msg::MISSING_NAME.to_string())
        })?;

        let params = uri::query_params(parts.query);
        let sni = uri::param(&params, "sni").unwrap_or(&host).to_string();
        let transport = Transport::from_network(
            uri::param(&params, "type").unwrap_or("tcp"),
            uri::param(&params, "path"),
            Some(uri::param(&params, "host").unwrap_or(&sni)),
            uri::param(&params, "serviceName"),
        );

        Ok(NodeRecord {
            name,
            scheme: Scheme::Trojan,
            server: host,
            port,
            credential: password,
            transport,
            tls: true,
            extra: Extra::Trojan { sni },
        })
    }

    fn to_link(record: &NodeRecord) -> String {
        let mut query_params = Vec::new();
        if let Extra::Trojan { sni } = &record.extra {
            query_params.push(format!("sni={}", urlencoding::encode(sni)));
        }
        match &record.transport {
            Transport::Tcp => {}
            Transport::WebSocket { path, host } => {
                query_params.push("type=ws".to_string());
                query_params.push(format!("path={}", urlencoding::encode(path)));
                if let Some(host) = host {
                    query_params.push(format!("host={}", urlencoding::encode(host)));
                }
            }
            Transport::Grpc { service_name } => {
                query_params.push("type=grpc".to_string());
                if let Some(service_name) = service_name {
                    query_params.push(format!("serviceName={}", urlencoding::encode(service_name)));
                }
            }
            Transport::Other { name } => {
                query_params.push(format!("type={}", urlencoding::encode(name)));
            }
        }

        let mut link = format!(
            "trojan://{}@{}:{}",
            urlencoding::encode(&record.credential),
            uri::authority_host(&record.server),
            record.port
        );
        if !query_params.is_empty() {
            link.push('?');
            link.push_str(&query_params.join("&"));
        }
        link.push('#');
        link.push_str(&urlencoding::encode(&record.name));
        link
    }
}
