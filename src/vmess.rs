//! VMess descriptor parser
//!
//! ## Link format
//!
//! `vmess://base64(JSON)` — standard or URL-safe base64; padding is restored
//! and whitespace stripped before decoding.
//!
//! ## JSON fields
//!
//! | Field | Record field | Default |
//! |-------|--------------|---------|
//! | `ps` | `name` | `"VMess-" + add` |
//! | `add` | `server` | required |
//! | `port` | `port` | required |
//! | `id` | `credential` | required |
//! | `aid` | `extra.alter_id` | `0` |
//! | `scy` | `extra.cipher` | `"auto"` |
//! | `net` | `transport` | `"tcp"` |
//! | `path` | ws path / grpc service name | `"/"` for ws |
//! | `host` | ws `Host` header | none |
//! | `tls` | `tls` (`"tls"` means true) | false |
//!
//! Every field is accepted as a string or a number.
//!
//! ## Errors
//!
//! - invalid base64, UTF-8, JSON, or a JSON value that is not an object → `Decode`
//! - `add` or `id` missing or empty → `IncompleteRecord`
//! - `port` missing → `IncompleteRecord`; not an integer in 1–65535 → `StructuralMismatch`

use crate::DescriptorParser;
use crate::codec;
use crate::constants::{default_name, scheme};
use crate::error::{DescriptorError, Result};
use crate::node::{Extra, NodeRecord, Scheme, Transport};
use crate::uri;
use serde::{Deserialize, Deserializer};
use serde_json::json;

/// Deserializes an optional scalar (string, integer or bool) as a trimmed string.
fn deserialize_lenient<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Bool(bool),
    }
    Ok(match Option::<Scalar>::deserialize(d)? {
        None => None,
        Some(Scalar::Str(s)) => Some(s.trim().to_string()),
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
    }
    .filter(|s| !s.is_empty()))
}

/// Wire form of the VMess JSON body. Everything is optional here so that a
/// missing field surfaces as an incomplete node rather than a JSON error.
#[derive(Debug, Default, Deserialize)]
struct VMessJson {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    ps: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    add: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    port: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    aid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    scy: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    net: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    host: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    tls: Option<String>,
}

impl VMessJson {
    fn into_record(self) -> Result<NodeRecord> {
        let server = self
            .add
            .ok_or_else(|| DescriptorError::IncompleteRecord("missing 'add'".to_string()))?;
        let uuid = self
            .id
            .ok_or_else(|| DescriptorError::IncompleteRecord("missing 'id'".to_string()))?;
        let port = match self.port {
            Some(raw) => uri::parse_port(&raw)?,
            None => {
                return Err(DescriptorError::IncompleteRecord(
                    "missing 'port'".to_string(),
                ));
            }
        };

        let network = self.net.as_deref().unwrap_or("tcp");
        let transport = Transport::from_network(
            network,
            self.path.as_deref(),
            self.host.as_deref(),
            self.path.as_deref(),
        );
        let tls = self
            .tls
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("tls"));

        Ok(NodeRecord {
            name: self
                .ps
                .unwrap_or_else(|| format!("{}{}", default_name::VMESS, server)),
            scheme: Scheme::VMess,
            port,
            credential: uuid,
            transport,
            tls,
            extra: Extra::VMess {
                alter_id: self.aid.and_then(|a| a.parse().ok()).unwrap_or(0),
                cipher: self.scy.unwrap_or_else(|| "auto".to_string()),
            },
            server,
        })
    }
}

/// VMess descriptor parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VMess;

impl DescriptorParser for VMess {
    const PREFIX: &'static str = scheme::VMESS;

    fn parse(link: &str) -> Result<NodeRecord> {
        let body = uri::strip_scheme(link.trim(), Self::PREFIX)?;
        let json_str = codec::decode_base64_text(body)?;

        let value: serde_json::Value = serde_json::from_str(&json_str)?;
        if !value.is_object() {
            return Err(DescriptorError::Decode(
                "vmess payload is not a JSON object".to_string(),
            ));
        }
        let payload: VMessJson = serde_json::from_value(value)?;
        payload.into_record()
    }

    fn to_link(record: &NodeRecord) -> String {
        let (alter_id, cipher) = match &record.extra {
            Extra::VMess { alter_id, cipher } => (*alter_id, cipher.as_str()),
            _ => (0, "auto"),
        };
        let (path, host) = match &record.transport {
            Transport::WebSocket { path, host } => (path.as_str(), host.as_deref().unwrap_or("")),
            Transport::Grpc { service_name } => (service_name.as_deref().unwrap_or(""), ""),
            _ => ("", ""),
        };

        let body = json!({
            "v": "2",
            "ps": record.name,
            "add": record.server,
            "port": record.port,
            "id": record.credential,
            "aid": alter_id,
            "scy": cipher,
            "net": record.transport.network(),
            "type": "none",
            "host": host,
            "path": path,
            "tls": if record.tls { "tls" } else { "" },
        });
        format!("{}{}", scheme::VMESS, codec::encode_base64_text(&body.to_string()))
    }
}
