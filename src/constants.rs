//! Shared constants for scheme prefixes, reason strings and policy defaults.

/// Descriptor URI scheme prefixes (lowercase, with `://`).
pub mod scheme {
    /// VMess: `vmess://`
    pub const VMESS: &str = "vmess://";
    /// VLESS: `vless://`
    pub const VLESS: &str = "vless://";
    /// Shadowsocks: `ss://`
    pub const SHADOWSOCKS: &str = "ss://";
    /// Trojan: `trojan://`
    pub const TROJAN: &str = "trojan://";
}

/// Common reason fragments for link parsing.
pub mod error_msg {
    /// Missing `@` in userinfo@host part.
    pub const MISSING_AT: &str = "missing '@' in main part";
    /// Missing `:` in host:port part.
    pub const MISSING_COLON_HOST_PORT: &str = "missing ':' in host:port";
    /// Invalid port value.
    pub const INVALID_PORT: &str = "invalid port";
    /// Missing `#name` where the scheme requires one.
    pub const MISSING_NAME: &str = "missing '#name' segment";
    /// Missing `:` between method and password.
    pub const MISSING_METHOD_PASSWORD: &str = "missing method:password";
}

/// Prefixes used when a descriptor carries no display name.
pub mod default_name {
    /// VMess without `ps`.
    pub const VMESS: &str = "VMess-";
    /// VLESS without `#name`.
    pub const VLESS: &str = "VLESS-";
    /// Shadowsocks without `#name`.
    pub const SHADOWSOCKS: &str = "SS-";
}

/// Ports that are never proxied to (SSH, Telnet, RDP, MySQL, MSSQL, PostgreSQL).
pub const DENIED_PORTS: [u16; 6] = [22, 23, 3389, 3306, 1433, 5432];

/// Server address prefixes treated as private networks (textual prefix match).
pub const PRIVATE_PREFIXES: [&str; 4] = ["127.", "10.", "192.168.", "172."];

/// Characters of the original line kept in a failure preview.
pub const PREVIEW_LEN: usize = 50;

/// Marker appended to a truncated preview.
pub const PREVIEW_ELLIPSIS: &str = "...";

/// Suffix appended to a display name that collides with an earlier one.
pub const COLLISION_SUFFIX: &str = "-2";

/// Maximum number of records in the Clash `Auto` group.
pub const AUTO_GROUP_LIMIT: usize = 10;
