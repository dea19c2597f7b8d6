//! Icon codec
//!
//! Converts icon bytes to the base-64 text stored in snapshots and back.
//! Decoding is lenient: it accepts bare base-64, data-URI style
//! `<metadata>,<payload>` strings, and remote http(s) URLs, and it never
//! fails. Anything it cannot make sense of yields `None`.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde_json::Value;
use url::Url;

use crate::models::Icon;

/// Decoder that tolerates missing padding and stray trailing bits, as browsers do
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode raw bytes as padded standard base-64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode an icon for embedding in a snapshot
///
/// Remote icons are written as their URL, which `decode` hands back unchanged.
pub fn encode_icon(icon: &Icon) -> String {
    match icon {
        Icon::Inline(bytes) => encode(bytes),
        Icon::Remote(url) => url.clone(),
    }
}

/// Decode the textual form of an icon
///
/// Returns `Icon::Remote` for http(s) URLs, `Icon::Inline` for valid
/// base-64 (optionally behind a data-URI prefix), and `None` otherwise.
pub fn decode(input: &str) -> Option<Icon> {
    if input.trim().is_empty() {
        return None;
    }

    if is_http_url(input) {
        return Some(Icon::Remote(input.to_string()));
    }

    let payload = match input.split_once(',') {
        Some((_, payload)) => payload,
        None => input,
    };

    if payload.is_empty() || !payload.bytes().all(is_base64_char) {
        return None;
    }

    LENIENT.decode(payload).ok().map(Icon::Inline)
}

/// Decode an icon from an arbitrary JSON value
///
/// Only strings can carry an icon; every other value yields `None`.
pub fn decode_value(value: &Value) -> Option<Icon> {
    value.as_str().and_then(decode)
}

fn is_http_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')
}
