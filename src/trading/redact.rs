//! Redaction of sensitive material
//!
//! Every string that leaves the crate through a log line, an error message or a
//! tool result passes through [`redact`]. Wallet addresses keep their first and
//! last four hex digits so they stay recognizable; longer hex runs (private
//! keys, signatures, hashes) are replaced entirely.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Replacement for hex runs longer than an address
pub const REDACTED: &str = "[REDACTED]";

/// Field names (lowercased, separators removed) that never leave the crate
const DENIED_KEYS: &[&str] = &[
    "privatekey",
    "secret",
    "signature",
    "session",
    "token",
    "apikey",
    "mnemonic",
];

static HEX_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(0x)?([0-9a-fA-F]{40,})").expect("Invalid hex run regex")
});

/// Masks addresses and removes key material from free text
pub fn redact(text: &str) -> String {
    HEX_RUN
        .replace_all(text, |caps: &Captures<'_>| {
            let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let hex = &caps[2];
            if hex.len() == 40 {
                format!("{}{}...{}", prefix, &hex[..4], &hex[36..])
            } else {
                REDACTED.to_string()
            }
        })
        .into_owned()
}

/// Short form of a configured address for log lines: `0x1234...abcd`
pub fn mask_address(address: &str) -> String {
    if address.len() < 10 || !address.is_ascii() {
        return "***".to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Returns a copy of `value` with denied fields removed and strings redacted
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !is_denied(key))
                .map(|(key, v)| (key.clone(), sanitize_value(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::String(s) => Value::String(redact(s)),
        other => other.clone(),
    }
}

fn is_denied(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    DENIED_KEYS.iter().any(|denied| normalized.contains(denied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contains_unmasked_address(text: &str) -> bool {
        let mut run = 0;
        for c in text.chars() {
            if c.is_ascii_hexdigit() {
                run += 1;
                if run >= 40 {
                    return true;
                }
            } else {
                run = 0;
            }
        }
        false
    }

    #[test]
    fn test_masks_wallet_address() {
        let text = "User 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 has no margin";
        assert_eq!(redact(text), "User 0xf39F...2266 has no margin");
    }

    #[test]
    fn test_masks_address_without_prefix() {
        let text = "vault f39fd6e51aad88f6f4ce6ab8827279cfffb92266";
        assert_eq!(redact(text), "vault f39f...2266");
    }

    #[test]
    fn test_redacts_private_key_entirely() {
        let text = "key=0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let out = redact(text);
        assert_eq!(out, "key=[REDACTED]");
        assert!(!out.contains("ac09"));
    }

    #[test]
    fn test_leaves_short_hex_alone() {
        assert_eq!(redact("oid 0x1a2b cloid deadbeef"), "oid 0x1a2b cloid deadbeef");
    }

    #[test]
    fn test_mask_address() {
        assert_eq!(
            mask_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(mask_address("0x12"), "***");
    }

    #[test]
    fn test_sanitize_value_drops_denied_fields() {
        let payload = json!({
            "action": {"type": "order"},
            "signature": {"r": "0x01", "s": "0x02", "v": 27},
            "private_key": "abc",
            "sessionToken": "xyz",
            "vaultAddress": "0x1234567890abcdef1234567890abcdef12345678",
            "nested": [{"apiKey": "k", "coin": "SOL"}]
        });

        let clean = sanitize_value(&payload);
        assert!(clean.get("signature").is_none());
        assert!(clean.get("private_key").is_none());
        assert!(clean.get("sessionToken").is_none());
        assert_eq!(clean["vaultAddress"], "0x1234...5678");
        assert!(clean["nested"][0].get("apiKey").is_none());
        assert_eq!(clean["nested"][0]["coin"], "SOL");
        assert_eq!(clean["action"]["type"], "order");
    }

    #[test]
    fn test_no_unmasked_address_survives() {
        let inputs = [
            "0x1234567890abcdef1234567890abcdef12345678",
            "a1234567890abcdef1234567890abcdef12345678b and 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
            "sig 0x3a4f5e6d7c8b9a0f1e2d3c4b5a69788796a5b4c3d2e1f0a9b8c7d6e5f4a3b2c1d0e1f2a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f7081",
        ];
        for input in inputs {
            assert!(!contains_unmasked_address(&redact(input)), "leaked: {}", input);
        }
    }
}
