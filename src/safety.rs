//! Safety policy applied to a node's network-facing fields.
//!
//! The policy only needs `(port, server)`, so it can run on a descriptor that
//! has not been fully canonicalized. The private-address check is a textual
//! prefix match: `172.` covers all of `172.0.0.0/8`, not just `172.16.0.0/12`.

use crate::constants::{DENIED_PORTS, PRIVATE_PREFIXES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a node was excluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RejectReason {
    /// Port is on the denylist
    DeniedPort {
        /// The offending port
        port: u16,
    },
    /// Server starts with a private-network prefix
    PrivateAddress {
        /// The matching prefix
        prefix: String,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::DeniedPort { port } => write!(f, "denied port {}", port),
            RejectReason::PrivateAddress { prefix } => {
                write!(f, "private address (prefix {})", prefix)
            }
        }
    }
}

/// Accept or reject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Node may be proxied to
    Accept,
    /// Node is excluded
    Reject(RejectReason),
}

impl Verdict {
    /// True for [`Verdict::Accept`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Port denylist and private-address prefixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyPolicy {
    /// Ports never proxied to
    pub denied_ports: Vec<u16>,
    /// Server prefixes treated as private networks
    pub private_prefixes: Vec<String>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        SafetyPolicy {
            denied_ports: DENIED_PORTS.to_vec(),
            private_prefixes: PRIVATE_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl SafetyPolicy {
    /// Evaluates a node's port and server address. The port rule is checked first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use subsift::{RejectReason, SafetyPolicy, Verdict};
    ///
    /// let policy = SafetyPolicy::default();
    /// assert_eq!(policy.evaluate(443, "8.8.8.8"), Verdict::Accept);
    /// assert_eq!(
    ///     policy.evaluate(3306, "8.8.8.8"),
    ///     Verdict::Reject(RejectReason::DeniedPort { port: 3306 })
    /// );
    /// ```
    pub fn evaluate(&self, port: u16, server: &str) -> Verdict {
        if self.denied_ports.contains(&port) {
            return Verdict::Reject(RejectReason::DeniedPort { port });
        }
        let server = server.trim();
        match self
            .private_prefixes
            .iter()
            .find(|prefix| server.starts_with(prefix.as_str()))
        {
            Some(prefix) => Verdict::Reject(RejectReason::PrivateAddress {
                prefix: prefix.clone(),
            }),
            None => Verdict::Accept,
        }
    }

    /// Shorthand for `evaluate(..).is_accepted()`.
    pub fn is_safe(&self, port: u16, server: &str) -> bool {
        self.evaluate(port, server).is_accepted()
    }
}

/// Checks `(port, server)` against the built-in policy without allocating one.
pub fn is_safe_endpoint(port: u16, server: &str) -> bool {
    let server = server.trim();
    !DENIED_PORTS.contains(&port) && !PRIVATE_PREFIXES.iter().any(|p| server.starts_with(p))
}
