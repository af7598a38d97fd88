//! Canonical, scheme-agnostic node record.
//!
//! Every scheme parser produces a [`NodeRecord`]; the safety filter, the
//! deduplicator and the renderers only ever see this shape.

use crate::constants::scheme;
use crate::uri;
use crate::{DescriptorParser, Shadowsocks, Trojan, VLess, VMess};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy protocol of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// `vmess://`
    VMess,
    /// `vless://`
    VLess,
    /// `trojan://`
    Trojan,
    /// `ss://`
    Shadowsocks,
}

impl Scheme {
    /// Lowercase protocol name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::VMess => "vmess",
            Scheme::VLess => "vless",
            Scheme::Trojan => "trojan",
            Scheme::Shadowsocks => "shadowsocks",
        }
    }

    /// Detects the scheme from a link prefix, ignoring ASCII case.
    pub fn from_link(link: &str) -> Option<Self> {
        [
            (scheme::VMESS, Scheme::VMess),
            (scheme::VLESS, Scheme::VLess),
            (scheme::TROJAN, Scheme::Trojan),
            (scheme::SHADOWSOCKS, Scheme::Shadowsocks),
        ]
        .into_iter()
        .find(|(prefix, _)| uri::has_prefix(link, prefix))
        .map(|(_, scheme)| scheme)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream layer beneath the proxy protocol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "network", rename_all = "lowercase")]
pub enum Transport {
    /// Plain TCP
    Tcp,
    /// WebSocket with request path and optional `Host` header override
    #[serde(rename = "ws")]
    WebSocket {
        /// Request path, `/` when unspecified
        path: String,
        /// `Host` header override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        host: Option<String>,
    },
    /// gRPC with optional service name
    Grpc {
        /// gRPC service name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service_name: Option<String>,
    },
    /// Any other transport, kept by name (h2, kcp, quic, httpupgrade, ...)
    Other {
        /// Transport name as written in the descriptor
        name: String,
    },
}

impl Transport {
    /// Builds a transport from a descriptor's network name.
    ///
    /// `path` feeds WebSocket, `service_name` feeds gRPC; both are ignored otherwise.
    pub(crate) fn from_network(
        network: &str,
        path: Option<&str>,
        host: Option<&str>,
        service_name: Option<&str>,
    ) -> Self {
        match network.trim().to_ascii_lowercase().as_str() {
            "" | "tcp" => Transport::Tcp,
            "ws" | "websocket" => Transport::WebSocket {
                path: path.unwrap_or("/").to_string(),
                host: host.map(str::to_string),
            },
            "grpc" => Transport::Grpc {
                service_name: service_name.map(str::to_string),
            },
            other => Transport::Other {
                name: other.to_string(),
            },
        }
    }

    /// Network name as used in descriptor links (`tcp`, `ws`, `grpc`, ...).
    pub fn network(&self) -> &str {
        match self {
            Transport::Tcp => "tcp",
            Transport::WebSocket { .. } => "ws",
            Transport::Grpc { .. } => "grpc",
            Transport::Other { name } => name,
        }
    }
}

/// Scheme-specific attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extra {
    /// VMess alter ID and cipher (`scy`)
    VMess {
        /// Alter ID, 0 when absent
        alter_id: u16,
        /// Cipher, `auto` when absent
        cipher: String,
    },
    /// VLESS flow control and TLS server name
    VLess {
        /// Flow (e.g. `xtls-rprx-vision`), kept verbatim
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow: Option<String>,
        /// `sni` query parameter
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sni: Option<String>,
    },
    /// Trojan TLS server name
    Trojan {
        /// SNI, defaults to the server host
        sni: String,
    },
    /// Shadowsocks cipher method and plugin
    Shadowsocks {
        /// Cipher method (aes-256-gcm, chacha20-ietf-poly1305, ...)
        method: String,
        /// SIP003 plugin string
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin: Option<String>,
    },
}

/// Canonical proxy node
///
/// `server` and `credential` are never empty and `port` is never 0 for a
/// record produced by [`parse_link`](crate::parse_link).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Display name; unique only after deduplication
    pub name: String,
    /// Proxy protocol
    pub scheme: Scheme,
    /// Hostname or IP literal
    pub server: String,
    /// Port in 1–65535
    pub port: u16,
    /// UUID (vmess/vless) or password (trojan/shadowsocks)
    pub credential: String,
    /// Stream layer
    pub transport: Transport,
    /// Whether the transport is wrapped in TLS
    pub tls: bool,
    /// Scheme-specific attributes
    pub extra: Extra,
}

impl NodeRecord {
    /// TLS server name to present: explicit SNI, then WebSocket host header, then the server.
    pub fn server_name(&self) -> &str {
        match &self.extra {
            Extra::Trojan { sni } => return sni,
            Extra::VLess { sni: Some(sni), .. } => return sni,
            _ => {}
        }
        match &self.transport {
            Transport::WebSocket {
                host: Some(host), ..
            } => host,
            _ => &self.server,
        }
    }

    /// Re-encodes the record as a descriptor link of its scheme.
    ///
    /// # Example
    ///
    /// ```rust
    /// use subsift::parse_link;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let record = parse_link("trojan://secret@example.com:443?sni=cdn.example.com#Edge")?;
    /// let again = parse_link(&record.to_link())?;
    /// assert_eq!(record, again);
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_link(&self) -> String {
        match self.scheme {
            Scheme::VMess => VMess::to_link(self),
            Scheme::VLess => VLess::to_link(self),
            Scheme::Trojan => Trojan::to_link(self),
            Scheme::Shadowsocks => Shadowsocks::to_link(self),
        }
    }
}
