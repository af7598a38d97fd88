//! Shadowsocks descriptor parser
//!
//! Three body encodings are found in the wild:
//!
//! | Encoding | Form |
//! |----------|------|
//! | **Legacy** | `ss://base64(method:password@host:port)[#name]` |
//! | **SIP002** | `ss://base64(method:password)@host:port[/][?plugin=...][#name]` |
//! | **Plain** | `ss://method:password@host:port[#name]` (credential URL-encoded) |
//!
//! Rather than sniffing the body, the parser runs an explicit fallback chain:
//! the whole body is first decoded as a legacy payload; if that fails and the
//! body has an `@`, the userinfo is decoded as SIP002 base64, and if that does
//! not yield `method:password` it is URL-decoded as plain text.
//!
//! **Fragment**: URL-decoded display name; when absent the name is `SS-<server>`.
//!
//! **Errors**: no usable encoding → `Decode` (no `@`) or `IncompleteRecord`
//! (credential without `method:password`); malformed `host:port` → `StructuralMismatch`.

use crate::DescriptorParser;
use crate::codec;
use crate::constants::{default_name, error_msg, scheme};
use crate::error::{DescriptorError, Result};
use crate::node::{Extra, NodeRecord, Scheme, Transport};
use crate::uri;
use tracing::trace;

/// Which body encoding produced the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Legacy,
    Sip002,
    Plain,
}

/// Credential and endpoint text recovered from the body, not yet validated.
struct RawBody {
    encoding: Encoding,
    userinfo: String,
    host_port: String,
}

/// Legacy form: the whole body is base64 of `method:password@host:port`.
fn decode_legacy(main: &str) -> Result<RawBody> {
    let decoded = codec::decode_base64_text(main)?;
    let (userinfo, host_port) = decoded
        .rsplit_once('@')
        .ok_or_else(|| DescriptorError::StructuralMismatch(error_msg::MISSING_AT.to_string()))?;
    Ok(RawBody {
        encoding: Encoding::Legacy,
        userinfo: userinfo.to_string(),
        host_port: host_port.to_string(),
    })
}

/// SIP002 userinfo, falling back to the URL-encoded plain form.
fn decode_userinfo(userinfo: &str) -> Result<(Encoding, String)> {
    match codec::decode_base64_text(userinfo) {
        Ok(decoded) if decoded.contains(':') => Ok((Encoding::Sip002, decoded)),
        _ => Ok((Encoding::Plain, uri::decode_component(userinfo)?)),
    }
}

fn decode_body(main: &str) -> Result<RawBody> {
    let legacy_err = match decode_legacy(main) {
        Ok(body) => return Ok(body),
        Err(err) => err,
    };
    let Some((userinfo, host_port)) = main.rsplit_once('@') else {
        return Err(legacy_err);
    };
    let (encoding, userinfo) = decode_userinfo(userinfo)?;
    Ok(RawBody {
        encoding,
        userinfo,
        host_port: host_port.to_string(),
    })
}

/// Shadowsocks descriptor parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Shadowsocks;

impl DescriptorParser for Shadowsocks {
    const PREFIX: &'static str = scheme::SHADOWSOCKS;

    fn parse(link: &str) -> Result<NodeRecord> {
        let body = uri::strip_scheme(link.trim(), Self::PREFIX)?;
        let parts = uri::split_link(body);
        let main = parts.main.trim().trim_end_matches('/');

        let raw = decode_body(main)?;
        trace!(encoding = ?raw.encoding, "shadowsocks body decoded");

        let (method, password) = raw.userinfo.split_once(':').ok_or_else(|| {
            DescriptorError::IncompleteRecord(error_msg::MISSING_METHOD_PASSWORD.to_string())
        })?;
        if method.is_empty() || password.is_empty() {
            return Err(DescriptorError::IncompleteRecord(
                error_msg::MISSING_METHOD_PASSWORD.to_string(),
            ));
        }
        let (server, port) = uri::split_host_port(&raw.host_port)?;
        if server.is_empty() {
            return Err(DescriptorError::IncompleteRecord("missing server".to_string()));
        }

        let params = uri::query_params(parts.query);
        let plugin = uri::param(&params, "plugin").map(str::to_string);
        let name = uri::decode_name(parts.fragment)?
            .unwrap_or_else(|| format!("{}{}", default_name::SHADOWSOCKS, server));

        Ok(NodeRecord {
            name,
            scheme: Scheme::Shadowsocks,
            server,
            port,
            credential: password.to_string(),
            transport: Transport::Tcp,
            tls: false,
            extra: Extra::Shadowsocks {
                method: method.to_string(),
                plugin,
            },
        })
    }

    fn to_link(record: &NodeRecord) -> String {
        let (method, plugin) = match &record.extra {
            Extra::Shadowsocks { method, plugin } => (method.as_str(), plugin.as_deref()),
            _ => ("", None),
        };
        let userinfo = codec::encode_base64_text(&format!("{}:{}", method, record.credential));

        let mut link = format!(
            "ss://{}@{}:{}",
            userinfo,
            uri::authority_host(&record.server),
            record.port
        );
        // SIP002: 有 plugin 时端口后需要 `/`
        if let Some(plugin) = plugin {
            link.push_str(&format!("/?plugin={}", urlencoding::encode(plugin)));
        }
        link.push('#');
        link.push_str(&urlencoding::encode(&record.name));
        link
    }
}
