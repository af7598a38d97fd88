//! Outer subscription container handling.
//!
//! Subscriptions are usually served as one base64 blob wrapping a
//! newline-separated list of links, but plenty are plain text. Unwrapping tries
//! base64 first and falls back to the content as-is when decoding or UTF-8
//! conversion fails.

use crate::codec;
use crate::node::NodeRecord;
use std::borrow::Cow;
use tracing::debug;

/// Returns the decoded subscription text, or `content` unchanged if it is not base64.
///
/// # Example
///
/// ```rust
/// use subsift::subscription::unwrap_container;
///
/// assert_eq!(unwrap_container("dmxlc3M6Ly91QGg6MQ=="), "vless://u@h:1");
/// assert_eq!(unwrap_container("vless://u@h:1"), "vless://u@h:1");
/// ```
pub fn unwrap_container(content: &str) -> Cow<'_, str> {
    match codec::decode_base64_text(content) {
        Ok(text) if !text.trim().is_empty() => {
            debug!(bytes = text.len(), "subscription decoded from base64");
            Cow::Owned(text)
        }
        _ => {
            debug!("subscription treated as plain text");
            Cow::Borrowed(content)
        }
    }
}

/// A filtered subscription in both wire forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSubscription {
    /// One link per line
    pub plain: String,
    /// Base64 of `plain`
    pub base64: String,
}

/// Re-encodes records as links, one per line, plain and base64-wrapped.
pub fn encode_subscription(nodes: &[NodeRecord]) -> EncodedSubscription {
    let plain = nodes
        .iter()
        .map(NodeRecord::to_link)
        .collect::<Vec<_>>()
        .join("\n");
    let base64 = codec::encode_base64_text(&plain);
    EncodedSubscription { plain, base64 }
}
