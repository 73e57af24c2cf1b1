//! `x-hub-signature-256` verification.
//!
//! The platform signs the body after escaping every non-ASCII character as
//! `\uXXXX`, so the same escaping is applied before computing the HMAC.

use std::borrow::Cow;
use std::fmt::Write;

use hmac::{Hmac, Mac};
use log::warn;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::SecurityError;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Write every char outside `\0..=~` as lowercase `\uXXXX`, one escape per
/// UTF-16 code unit.
pub fn escape_unicode(body: &str) -> Cow<'_, str> {
    if body.chars().all(|c| c <= '~') {
        return Cow::Borrowed(body);
    }

    let mut escaped = String::with_capacity(body.len() + 16);
    let mut units = [0u16; 2];
    for c in body.chars() {
        if c <= '~' {
            escaped.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            let _ = write!(escaped, "\\u{:04x}", unit);
        }
    }
    Cow::Owned(escaped)
}

/// Lowercase hex HMAC-SHA256 of the escaped `body`.
pub fn sign(body: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(escape_unicode(body).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a `sha256=<hex>` header against `raw_body`.
///
/// Returns `Ok(false)` for any mismatch, including a missing prefix.
pub fn verify_signature(
    raw_body: &str,
    signature: &str,
    app_secret: Option<&str>,
) -> Result<bool, SecurityError> {
    let secret = app_secret.ok_or(SecurityError::MissingAppSecret)?;

    let Some(received) = signature.strip_prefix(PREFIX) else {
        warn!("signature header without `{PREFIX}` prefix");
        return Ok(false);
    };

    let expected = sign(raw_body, secret);
    let valid: bool = expected.as_bytes().ct_eq(received.as_bytes()).into();
    if !valid {
        warn!("webhook signature mismatch");
    }
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signature() {
        let signature = "sha256=27e6af74a061a5f40d6d0176376ae333768e477fdf1d1d756828aaf1192fd664";
        assert!(verify_signature("b", signature, Some("s")).unwrap());
    }

    #[test]
    fn test_payload_signature() {
        let body = r#"{"object":"whatsapp_business_account"}"#;
        assert_eq!(
            sign(body, "secret"),
            "03f6dd944ecab4ddac0e3dbc3923b2da4e12b03df679ae23a52efd78ca6056e0"
        );
    }

    #[test]
    fn test_tampered_signature() {
        let signature = "sha256=27e6af74a061a5f40d6d0176376ae333768e477fdf1d1d756828aaf1192fd665";
        assert!(!verify_signature("b", signature, Some("s")).unwrap());
        assert!(!verify_signature("c", &format!("sha256={}", sign("b", "s")), Some("s")).unwrap());
    }

    #[test]
    fn test_missing_prefix_or_empty() {
        assert!(!verify_signature("b", &sign("b", "s"), Some("s")).unwrap());
        assert!(!verify_signature("b", "", Some("s")).unwrap());
        assert!(!verify_signature("b", "sha256=", Some("s")).unwrap());
    }

    #[test]
    fn test_missing_secret() {
        assert_eq!(
            verify_signature("b", "sha256=00", None),
            Err(SecurityError::MissingAppSecret)
        );
    }

    #[test]
    fn test_escape_unicode() {
        assert!(matches!(escape_unicode("plain ~"), Cow::Borrowed("plain ~")));
        assert_eq!(escape_unicode("olá"), "ol\\u00e1");
        assert_eq!(escape_unicode("😀"), "\\ud83d\\ude00");
        assert_eq!(escape_unicode("\u{7f}"), "\\u007f");
    }

    #[test]
    fn test_non_ascii_signature() {
        let body = "{\"text\":\"olá 😀\"}";
        assert_eq!(
            sign(body, "secret"),
            "09d20e4ee753a652ca217d7dcf8d6d7b18ad7d75fb560faedb36267905fe66b0"
        );
    }
}
