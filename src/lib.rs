//! # subsift
//!
//! Parses proxy subscription descriptors into canonical node records, filters
//! them against a safety policy, deduplicates display names, and renders the
//! result for Clash and sing-box.
//!
//! ## Features
//!
//! - Decode `vmess://`, `vless://`, `trojan://` and `ss://` links into one [`NodeRecord`] shape
//! - Never abort a batch on a bad line: every line yields a [`ParseOutcome`]
//! - Reject administrative/database ports and private-network servers ([`SafetyPolicy`])
//! - Keep display names unique in first-seen order ([`Deduplicator`])
//! - Unwrap base64 subscription containers and re-encode the filtered list ([`subscription`])
//! - Render Clash YAML and sing-box JSON ([`render`])
//!
//! ## Supported schemes
//!
//! - **[VMess]** (`vmess://`) — base64(JSON) body with padding restoration
//! - **[VLess]** (`vless://`) — query form, name synthesized as `VLESS-<host>` when missing
//! - **[Trojan]** (`trojan://`) — query form, `#name` required, TLS always on
//! - **[Shadowsocks]** (`ss://`) — legacy base64, SIP002 and plain bodies via a fallback chain
//!
//! ## Parsing rules (shared)
//!
//! - **Scheme prefix**: case-insensitive (`VMESS://` is valid). Anything else is `UnknownScheme`.
//! - **Port**: 1–65535; anything else fails the whole line.
//! - **Query string**: `application/x-www-form-urlencoded`; the first value of a repeated key wins.
//! - **Fragment (`#`)**: URL-decoded display name.
//! - **Errors**: `Decode`, `StructuralMismatch`, `IncompleteRecord`, `UnknownScheme` (see [`DescriptorError`]).
//!
//! ## Example
//!
//! ```rust
//! use subsift::{SieveConfig, process_lines};
//!
//! let lines = [
//!     "vless://uuid1@1.2.3.4:443?security=tls&type=ws&path=/x#Node1",
//!     "trojan://pw@5.6.7.8:443?sni=example.com#Node1",
//!     "",
//!     "ssr://not-supported",
//! ];
//! let batch = process_lines(lines, &SieveConfig::default());
//!
//! let names: Vec<_> = batch.nodes.iter().map(|n| n.name.as_str()).collect();
//! assert_eq!(names, ["Node1", "Node1-2"]);
//! assert_eq!(batch.summary().failed, 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod batch;
mod codec;
mod config;
mod constants;
mod dedup;
mod error;
mod node;
mod outcome;
pub mod render;
mod safety;
mod shadowsocks;
pub mod subscription;
mod trojan;
mod uri;
mod vless;
mod vmess;

#[cfg(test)]
mod pipeline_comprehensive;

pub use batch::{Batch, Rejection, Report, Summary, process_lines, process_text};
pub use config::SieveConfig;
pub use dedup::{DedupOutcome, Deduplicator, dedup_names};
pub use error::{DescriptorError, FailureKind, Result, SieveError};
pub use node::{Extra, NodeRecord, Scheme, Transport};
pub use outcome::{Failure, ParseOutcome, preview};
pub use safety::{RejectReason, SafetyPolicy, Verdict, is_safe_endpoint};
pub use shadowsocks::Shadowsocks;
pub use trojan::Trojan;
pub use vless::VLess;
pub use vmess::VMess;

/// Trait implemented by each scheme parser
pub trait DescriptorParser {
    /// Lowercase scheme prefix including `://`
    const PREFIX: &'static str;

    /// Parse one descriptor link into a canonical record
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError` if the link cannot be decoded or is missing required fields.
    ///
    /// # Example
    ///
    /// ```rust
    /// use subsift::{DescriptorParser, VLess};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let node = VLess::parse("vless://uuid@example.com:443?security=tls")?;
    /// assert_eq!(node.name, "VLESS-example.com");
    /// assert!(node.tls);
    /// # Ok(())
    /// # }
    /// ```
    fn parse(link: &str) -> Result<NodeRecord>;

    /// Re-encode a record as a link of this scheme
    fn to_link(record: &NodeRecord) -> String;
}

/// Parse any supported descriptor link
///
/// Dispatches on the scheme prefix.
///
/// # Errors
///
/// `UnknownScheme` for an unrecognized prefix, otherwise whatever the scheme parser reports.
///
/// # Example
///
/// ```rust
/// use subsift::{DescriptorError, Scheme, parse_link};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let node = parse_link("ss://aes-256-gcm:secret@example.com:8388#Home")?;
/// assert_eq!(node.scheme, Scheme::Shadowsocks);
/// assert_eq!(node.name, "Home");
///
/// let err = parse_link("socks5://example.com:1080").unwrap_err();
/// assert!(matches!(err, DescriptorError::UnknownScheme(_)));
/// # Ok(())
/// # }
/// ```
pub fn parse_link(link: &str) -> Result<NodeRecord> {
    let link = link.trim();
    match Scheme::from_link(link) {
        Some(Scheme::VMess) => VMess::parse(link),
        Some(Scheme::VLess) => VLess::parse(link),
        Some(Scheme::Trojan) => Trojan::parse(link),
        Some(Scheme::Shadowsocks) => Shadowsocks::parse(link),
        None => {
            let scheme_name = link.split_once("://").map_or("none", |(name, _)| name);
            Err(DescriptorError::UnknownScheme(scheme_name.to_string()))
        }
    }
}

/// Parse one line into a [`ParseOutcome`]; never fails.
pub fn parse_descriptor(line: &str) -> ParseOutcome {
    let line = line.trim();
    match parse_link(line) {
        Ok(record) => ParseOutcome::Parsed(record),
        Err(error) => ParseOutcome::Failed {
            line: line.to_string(),
            error,
        },
    }
}
