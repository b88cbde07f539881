//! Response envelope parsing
//!
//! Every native response is a JSON object `{"type": ..., "payload": ...}`.
//! A `type` of `"error"` is turned into [`SdkError::Remote`]; anything else
//! is success and the payload is decoded by the caller. The payload is
//! borrowed from the response bytes, never copied, so decoding a secret
//! payload into guarded memory leaves no plain copy behind.

use crate::error::{SdkError, SdkResult};
use crate::memory::{GuardedBuffer, Secret};
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::value::RawValue;
use zeroize::Zeroize;

pub const ERROR_TYPE: &str = "error";

/// Response types that mean "done, nothing else to report"
const STATUS_OK_TYPES: [&str; 2] = ["success", "ok"];

#[derive(serde::Deserialize)]
struct RawEnvelope<'a> {
    #[serde(rename = "type")]
    kind: String,
    #[serde(borrow, default)]
    payload: Option<&'a RawValue>,
}

/// A parsed, successful response
#[derive(Debug)]
pub struct Envelope<'a> {
    kind: String,
    payload: Option<&'a RawValue>,
}

impl<'a> Envelope<'a> {
    /// Parse response bytes; an error envelope becomes `Err(Remote)`
    pub fn parse(bytes: &'a [u8]) -> SdkResult<Self> {
        let raw: RawEnvelope<'a> =
            serde_json::from_slice(bytes).map_err(|e| SdkError::Decode(e.to_string()))?;

        if raw.kind == ERROR_TYPE {
            return Err(match remote_message(raw.payload) {
                Some(message) => SdkError::Remote(message),
                None => SdkError::Decode("error response carries no message".to_string()),
            });
        }

        Ok(Self {
            kind: raw.kind,
            payload: raw.payload,
        })
    }

    /// The response `type` tag
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The raw payload sub-document, if present
    pub fn payload(&self) -> Option<&'a RawValue> {
        self.payload
    }

    /// Whether the tag is one of the plain status types
    pub fn is_status_ok(&self) -> bool {
        STATUS_OK_TYPES.contains(&self.kind.as_str())
    }

    /// Decode the payload; a missing payload decodes as JSON `null`
    pub fn decode<T: Deserialize<'a>>(&self) -> SdkResult<T> {
        let raw = self.payload.map(RawValue::get).unwrap_or("null");
        serde_json::from_str(raw).map_err(|e| SdkError::Decode(e.to_string()))
    }

    /// Decode a string payload straight into guarded memory
    pub fn decode_secret(&self) -> SdkResult<Secret> {
        let raw = self
            .payload
            .map(RawValue::get)
            .ok_or_else(|| SdkError::Decode("response has no payload".to_string()))?;
        let buffer = unescape_json_string(raw.as_bytes())?;
        Secret::new(buffer).map_err(|e| SdkError::Decode(e.to_string()))
    }
}

/// Parse a response and decode its payload as `T`
pub fn parse_typed<T: DeserializeOwned>(bytes: &[u8]) -> SdkResult<T> {
    Envelope::parse(bytes)?.decode()
}

/// Parse a status-only response: `true` when the tag is `success` or `ok`
pub fn parse_status(bytes: &[u8]) -> SdkResult<bool> {
    Ok(Envelope::parse(bytes)?.is_status_ok())
}

/// Parse a response whose payload is a single secret string
pub fn parse_secret(bytes: &[u8]) -> SdkResult<Secret> {
    Envelope::parse(bytes)?.decode_secret()
}

/// Message of an error envelope: `payload.message`, then `payload.error`,
/// then the payload itself when it is a string
fn remote_message(payload: Option<&RawValue>) -> Option<String> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum ErrorPayload {
        Text(String),
        Object {
            message: Option<String>,
            error: Option<serde_json::Value>,
        },
    }

    match serde_json::from_str::<ErrorPayload>(payload?.get()).ok()? {
        ErrorPayload::Text(text) => Some(text),
        ErrorPayload::Object {
            message: Some(message),
            ..
        } => Some(message),
        ErrorPayload::Object {
            error: Some(serde_json::Value::String(error)),
            ..
        } => Some(error),
        ErrorPayload::Object {
            error: Some(error), ..
        } if !error.is_null() => Some(error.to_string()),
        ErrorPayload::Object { .. } => None,
    }
}

/// Unescape a raw JSON string literal (quotes included) into guarded memory
fn unescape_json_string(raw: &[u8]) -> SdkResult<GuardedBuffer> {
    let decode_error = |reason: &str| SdkError::Decode(format!("secret payload {}", reason));

    let inner = match raw {
        [b'"', inner @ .., b'"'] => inner,
        _ => return Err(decode_error("is not a JSON string")),
    };

    let mut out = GuardedBuffer::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let start = i;
        while i < inner.len() && inner[i] != b'\\' {
            i += 1;
        }
        out.extend_from_slice(&inner[start..i]);
        if i == inner.len() {
            break;
        }

        let escape = *inner.get(i + 1).ok_or_else(|| decode_error("ends mid-escape"))?;
        i += 2;
        let simple = match escape {
            b'"' => Some(b'"'),
            b'\\' => Some(b'\\'),
            b'/' => Some(b'/'),
            b'b' => Some(0x08),
            b'f' => Some(0x0c),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'u' => None,
            _ => return Err(decode_error("has an invalid escape")),
        };
        if let Some(byte) = simple {
            out.extend_from_slice(&[byte]);
            continue;
        }

        let mut code = hex4(inner, i).ok_or_else(|| decode_error("has a bad \\u escape"))?;
        i += 4;
        if (0xD800..0xDC00).contains(&code) {
            // high surrogate must be followed by an escaped low surrogate
            let low = match inner.get(i..i + 2) {
                Some(b"\\u") => hex4(inner, i + 2),
                _ => None,
            }
            .filter(|low| (0xDC00..0xE000).contains(low))
            .ok_or_else(|| decode_error("has an unpaired surrogate"))?;
            i += 6;
            code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        }

        let ch = char::from_u32(code).ok_or_else(|| decode_error("has an invalid code point"))?;
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
        utf8.zeroize();
    }

    Ok(out)
}

fn hex4(bytes: &[u8], at: usize) -> Option<u32> {
    let digits = bytes.get(at..at + 4)?;
    digits.iter().try_fold(0u32, |acc, &digit| {
        let value = (digit as char).to_digit(16)?;
        Some(acc * 16 + value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_typed_payload() {
        let value: u64 = parse_typed(br#"{"type":"ok","payload":42}"#).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_missing_payload_decodes_as_null() {
        let value: Option<u32> = parse_typed(br#"{"type":"ok"}"#).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_payload_borrowed_raw() {
        let bytes = br#"{"type":"accounts","payload":[{"index":0}]}"#;
        let envelope = Envelope::parse(bytes).unwrap();
        assert_eq!(envelope.kind(), "accounts");
        assert_eq!(envelope.payload().unwrap().get(), r#"[{"index":0}]"#);
        assert!(!envelope.is_status_ok());
    }

    #[rstest]
    #[case(br#"{"type":"error","payload":{"type":"wallet","error":"bad"}}"#, "bad")]
    #[case(br#"{"type":"error","payload":{"message":"no such method"}}"#, "no such method")]
    #[case(br#"{"type":"error","payload":{"message":"m","error":"e"}}"#, "m")]
    #[case(br#"{"type":"error","payload":"plain text"}"#, "plain text")]
    #[case(br#"{"type":"error","payload":{"error":{"code":7}}}"#, r#"{"code":7}"#)]
    fn test_error_envelope_message(#[case] bytes: &[u8], #[case] expected: &str) {
        match Envelope::parse(bytes) {
            Err(SdkError::Remote(message)) => assert_eq!(message, expected),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[rstest]
    #[case(br#"{"type":"success"}"#, true)]
    #[case(br#"{"type":"ok","payload":null}"#, true)]
    #[case(br#"{"type":"bool","payload":true}"#, false)]
    fn test_parse_status(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(parse_status(bytes).unwrap(), expected);
    }

    #[rstest]
    #[case(br#"{"type":"error"}"#)]
    #[case(br#"{"type":"error","payload":17}"#)]
    #[case(br#"{"type":"error","payload":{"code":3}}"#)]
    fn test_error_without_message_is_decode_error(#[case] bytes: &[u8]) {
        assert!(matches!(Envelope::parse(bytes), Err(SdkError::Decode(_))));
    }

    #[rstest]
    #[case(b"")]
    #[case(b"not json")]
    #[case(br#"{"payload":1}"#)]
    #[case(br#"[1,2]"#)]
    fn test_malformed_is_decode_error(#[case] bytes: &[u8]) {
        assert!(matches!(Envelope::parse(bytes), Err(SdkError::Decode(_))));
    }

    #[test]
    fn test_secret_payload_plain() {
        let secret = parse_secret(br#"{"type":"generatedMnemonic","payload":"acid bench"}"#).unwrap();
        assert_eq!(secret.expose(), "acid bench");
    }

    #[test]
    fn test_secret_payload_with_escapes() {
        let response = r#"{"type":"ok","payload":"a\"b\\c\né😀 ok"}"#;
        let secret = parse_secret(response.as_bytes()).unwrap();
        assert_eq!(secret.expose(), "a\"b\\c\n\u{e9}\u{1F600} ok");
    }

    #[test]
    fn test_secret_payload_unicode_escapes() {
        let secret = parse_secret(br#"{"type":"ok","payload":"\u00e9\ud83d\ude00\/"}"#).unwrap();
        assert_eq!(secret.expose(), "\u{e9}\u{1F600}/");
    }

    #[rstest]
    #[case(br#"{"type":"ok","payload":12}"#)]
    #[case(br#"{"type":"ok"}"#)]
    #[case(br#"{"type":"ok","payload":"\ud83d"}"#)]
    #[case(br#"{"type":"ok","payload":"\q"}"#)]
    fn test_secret_payload_rejected(#[case] bytes: &[u8]) {
        assert!(matches!(parse_secret(bytes), Err(SdkError::Decode(_))));
    }
}
