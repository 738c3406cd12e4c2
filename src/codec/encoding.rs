//! Base64 encoding and detection for subscription payloads.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use thiserror::Error;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Errors produced while decoding a subscription payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The payload decoded to bytes that are not UTF-8 text.
    #[error("decoded payload is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Returns true if `text` looks like a base64 payload.
///
/// Whitespace is ignored. The heuristic only checks the alphabet, the
/// padding and the length, so short plain words may still match.
pub fn is_encoded(text: &str) -> bool {
    let compact = strip_whitespace(text);
    let body = compact.trim_end_matches('=');

    if body.is_empty() || compact.len() - body.len() > 2 {
        return false;
    }

    body.len() % 4 != 1
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'-' | b'_'))
}

/// Decode a base64 payload into UTF-8 text.
pub fn decode(text: &str) -> Result<String, CodecError> {
    let compact = strip_whitespace(text);
    let engine = if compact.contains(&['-', '_'][..]) {
        &URL_SAFE_LENIENT
    } else {
        &STANDARD_LENIENT
    };

    let bytes = engine.decode(compact.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode UTF-8 text as padded standard base64.
pub fn encode(raw: &str) -> String {
    STANDARD.encode(raw.as_bytes())
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}
