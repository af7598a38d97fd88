//! Lenient base64 text decoding shared by VMess bodies, Shadowsocks userinfo and
//! outer subscription containers.
//!
//! Whitespace (including newlines from pasted blobs) is removed, missing `=`
//! padding is restored, and the URL-safe alphabet is tried after the standard one.

use crate::error::{DescriptorError, Result};
use base64::Engine;
use base64::engine::general_purpose;

/// Decodes base64 text into a UTF-8 string.
pub(crate) fn decode_base64_text(input: &str) -> Result<String> {
    let mut cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(DescriptorError::Decode("empty base64 payload".to_string()));
    }
    while cleaned.len() % 4 != 0 {
        cleaned.push('=');
    }

    let bytes = general_purpose::STANDARD
        .decode(&cleaned)
        .or_else(|err| general_purpose::URL_SAFE.decode(&cleaned).map_err(|_| err))?;
    Ok(String::from_utf8(bytes)?)
}

/// Encodes text with the standard padded alphabet.
pub(crate) fn encode_base64_text(input: &str) -> String {
    general_purpose::STANDARD.encode(input.as_bytes())
}
