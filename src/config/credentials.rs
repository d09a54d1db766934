//! Signing Credential Management
//!
//! Secure handling of the Hyperliquid signing key and account addresses loaded
//! from environment variables. Key material is never logged and is masked when
//! displayed.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::ConfigError;
use crate::trading::redact::mask_address;

/// Secure string wrapper that masks sensitive data in logs
///
/// Debug output shows only `SecretString(***)` and Display shows the truncated
/// form `first4...last4`. The buffer is zeroed on drop.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn new(value: String) -> Self {
        SecretString(Zeroizing::new(value))
    }

    /// Returns a reference to the inner string
    ///
    /// **Security Warning**: Only use this when actually needed for signing.
    /// Never log or display the returned value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns a masked version of the secret for safe logging
    pub fn masked(&self) -> String {
        let s = self.0.as_str();
        if s.len() <= 8 {
            return "***".to_string();
        }
        format!("{}...{}", &s[..4], &s[s.len() - 4..])
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString::new(s)
    }
}

/// Hyperliquid signing credentials
///
/// `account_address` is set when the key is an API ("agent") wallet signing on
/// behalf of another account. `vault_address` scopes trading to a vault.
#[derive(Clone)]
pub struct Credentials {
    pub private_key: SecretString,
    pub account_address: Option<String>,
    pub vault_address: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("private_key", &self.private_key)
            .field(
                "account_address",
                &self.account_address.as_deref().map(mask_address),
            )
            .field(
                "vault_address",
                &self.vault_address.as_deref().map(mask_address),
            )
            .finish()
    }
}

impl Credentials {
    /// Loads credentials from environment variables
    ///
    /// Reads `HYPERLIQUID_PRIVATE_KEY` (required), `HYPERLIQUID_ACCOUNT_ADDRESS`
    /// and `HYPERLIQUID_VAULT_ADDRESS` (optional). Values are trimmed and empty
    /// optional values are treated as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let private_key = std::env::var("HYPERLIQUID_PRIVATE_KEY")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("HYPERLIQUID_PRIVATE_KEY"))?;

        Self::new(
            private_key,
            optional_env("HYPERLIQUID_ACCOUNT_ADDRESS"),
            optional_env("HYPERLIQUID_VAULT_ADDRESS"),
        )
    }

    /// Builds credentials from explicit values, validating their format
    pub fn new(
        private_key: String,
        account_address: Option<String>,
        vault_address: Option<String>,
    ) -> Result<Self, ConfigError> {
        let key_hex = private_key.trim_start_matches("0x");
        if key_hex.len() != 64 || !key_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid {
                name: "HYPERLIQUID_PRIVATE_KEY",
                reason: "expected 32-byte hex string".to_string(),
            });
        }

        if let Some(addr) = &account_address {
            validate_address("HYPERLIQUID_ACCOUNT_ADDRESS", addr)?;
        }
        if let Some(addr) = &vault_address {
            validate_address("HYPERLIQUID_VAULT_ADDRESS", addr)?;
        }

        Ok(Self {
            private_key: SecretString::new(private_key),
            account_address,
            vault_address,
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks the `0x` + 40 hex character address format
pub fn validate_address(name: &'static str, address: &str) -> Result<(), ConfigError> {
    let valid = address
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("'{}' is not a 0x-prefixed 20-byte address", mask_address(address)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_secret_string_masking() {
        let secret = SecretString::new("abcdefghijklmnop".to_string());
        assert_eq!(secret.masked(), "abcd...mnop");
        assert_eq!(format!("{:?}", secret), "SecretString(***)");

        let short = SecretString::new("short".to_string());
        assert_eq!(short.masked(), "***");
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let creds = Credentials::new(
            TEST_KEY.to_string(),
            Some("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string()),
            None,
        )
        .unwrap();

        let debug = format!("{:?}", creds);
        assert!(!debug.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478"));
        assert!(!debug.contains("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
    }

    #[test]
    fn test_rejects_malformed_key() {
        let result = Credentials::new("0x1234".to_string(), None, None);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_malformed_vault_address() {
        let result = Credentials::new(TEST_KEY.to_string(), None, Some("vault".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "HYPERLIQUID_VAULT_ADDRESS",
                ..
            })
        ));
    }
}
