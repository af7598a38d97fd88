//! Link splitting helpers shared by the scheme parsers.

use crate::constants::error_msg;
use crate::error::{DescriptorError, Result};
use std::collections::HashMap;

/// A link body split into `main[?query][#fragment]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinkParts<'a> {
    pub main: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// Returns true if `link` starts with `prefix`, ignoring ASCII case.
pub(crate) fn has_prefix(link: &str, prefix: &str) -> bool {
    link.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Strips a case-insensitive scheme prefix, returning the body.
pub(crate) fn strip_scheme<'a>(link: &'a str, prefix: &str) -> Result<&'a str> {
    if !has_prefix(link, prefix) {
        return Err(DescriptorError::StructuralMismatch(format!(
            "link must start with {}",
            prefix
        )));
    }
    Ok(&link[prefix.len()..])
}

/// Splits on the first `#`, then on the first `?` of what precedes it.
pub(crate) fn split_link(body: &str) -> LinkParts<'_> {
    let (before_hash, fragment) = match body.split_once('#') {
        Some((before, fragment)) => (before, Some(fragment)),
        None => (body, None),
    };
    let (main, query) = match before_hash.split_once('?') {
        Some((main, query)) => (main, Some(query)),
        None => (before_hash, None),
    };
    LinkParts {
        main,
        query,
        fragment,
    }
}

/// Parses `application/x-www-form-urlencoded` pairs; the first value of a repeated key wins.
pub(crate) fn query_params(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()).into_owned() {
            params.entry(key).or_insert(value);
        }
    }
    params
}

/// Looks up a query parameter, treating an empty value as absent.
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Splits `host:port` on the last `:`; bracketed IPv6 hosts are unwrapped.
pub(crate) fn split_host_port(host_port: &str) -> Result<(String, u16)> {
    let host_port = host_port.trim().trim_end_matches('/');
    let (host, port) = host_port.rsplit_once(':').ok_or_else(|| {
        DescriptorError::StructuralMismatch(error_msg::MISSING_COLON_HOST_PORT.to_string())
    })?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    Ok((host.to_string(), parse_port(port)?))
}

/// Parses a port in 1–65535 written as plain ASCII digits.
pub(crate) fn parse_port(raw: &str) -> Result<u16> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DescriptorError::StructuralMismatch(format!(
            "{} {:?}: not a decimal number",
            error_msg::INVALID_PORT,
            raw
        )));
    }
    let port: u16 = digits.parse().map_err(|e| {
        DescriptorError::StructuralMismatch(format!("{} {:?}: {}", error_msg::INVALID_PORT, raw, e))
    })?;
    if port == 0 {
        return Err(DescriptorError::StructuralMismatch(format!(
            "{} 0: out of range",
            error_msg::INVALID_PORT
        )));
    }
    Ok(port)
}

/// Percent-decodes a link component.
pub(crate) fn decode_component(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .map_err(|e| DescriptorError::Decode(format!("invalid percent-encoding: {}", e)))
}

/// Decodes a `#name` fragment; empty or missing fragments yield `None`.
pub(crate) fn decode_name(fragment: Option<&str>) -> Result<Option<String>> {
    match fragment.map(str::trim).filter(|f| !f.is_empty()) {
        Some(raw) => {
            let name = decode_component(raw)?;
            let name = name.trim();
            Ok((!name.is_empty()).then(|| name.to_string()))
        }
        None => Ok(None),
    }
}

/// Formats a host for use in a link authority, bracketing IPv6 literals.
pub(crate) fn authority_host(host: &str) -> String {
    if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}
