//! L1 action signing
//!
//! Two stages:
//! 1. `action_hash = keccak256(msgpack(action) ‖ nonce_be ‖ vault_tag)`
//! 2. EIP-712 signature over the phantom `Agent { source, connectionId }`
//!    where `source` is `a` on mainnet and `b` on testnet.

use alloy::primitives::{keccak256, Address, PrimitiveSignature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolStruct};
use zeroize::Zeroizing;

use super::types::{Action, ActionSignature};
use crate::config::SecretString;
use crate::error::GatewayError;

pub const EIP712_DOMAIN_NAME: &str = "Exchange";
pub const EIP712_DOMAIN_VERSION: &str = "1";
pub const EIP712_CHAIN_ID: u64 = 1337;

sol! {
    #[derive(Debug)]
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}

/// Computes the connection id signed for an action
pub fn action_hash(
    action: &Action,
    nonce: u64,
    vault_address: Option<Address>,
) -> Result<B256, GatewayError> {
    let mut data = rmp_serde::to_vec_named(action)
        .map_err(|e| GatewayError::Signing(format!("action serialization failed: {}", e)))?;

    data.extend_from_slice(&nonce.to_be_bytes());

    match vault_address {
        None => data.push(0x00),
        Some(addr) => {
            data.push(0x01);
            data.extend_from_slice(addr.as_slice());
        }
    }

    Ok(keccak256(&data))
}

/// Signs exchange actions with the configured key
pub struct ActionSigner {
    wallet: PrivateKeySigner,
    is_mainnet: bool,
}

impl std::fmt::Debug for ActionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSigner")
            .field("address", &crate::trading::redact::mask_address(&self.address_hex()))
            .field("is_mainnet", &self.is_mainnet)
            .finish()
    }
}

impl ActionSigner {
    pub fn new(private_key: &SecretString, is_mainnet: bool) -> Result<Self, GatewayError> {
        let key_hex = private_key.expose_secret().trim().trim_start_matches("0x");
        let bytes = Zeroizing::new(
            hex::decode(key_hex)
                .map_err(|_| GatewayError::Signing("private key is not valid hex".to_string()))?,
        );
        let wallet = PrivateKeySigner::from_slice(&bytes)
            .map_err(|_| GatewayError::Signing("private key is not a valid secp256k1 key".to_string()))?;

        Ok(Self { wallet, is_mainnet })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Lowercase `0x`-prefixed signer address
    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.wallet.address().as_slice()))
    }

    pub fn is_mainnet(&self) -> bool {
        self.is_mainnet
    }

    /// Signs `action` for submission with `nonce`
    pub async fn sign_action(
        &self,
        action: &Action,
        nonce: u64,
        vault_address: Option<Address>,
    ) -> Result<ActionSignature, GatewayError> {
        let connection_id = action_hash(action, nonce, vault_address)?;
        let signature = self.sign_agent(connection_id).await?;

        Ok(ActionSignature {
            r: format!("0x{}", hex::encode(signature.r().to_be_bytes::<32>())),
            s: format!("0x{}", hex::encode(signature.s().to_be_bytes::<32>())),
            v: 27 + signature.v() as u8,
        })
    }

    async fn sign_agent(&self, connection_id: B256) -> Result<PrimitiveSignature, GatewayError> {
        let domain = eip712_domain! {
            name: EIP712_DOMAIN_NAME,
            version: EIP712_DOMAIN_VERSION,
            chain_id: EIP712_CHAIN_ID,
            verifying_contract: Address::ZERO,
        };

        let agent = Agent {
            source: if self.is_mainnet { "a" } else { "b" }.to_string(),
            connectionId: connection_id,
        };

        let signing_hash = agent.eip712_signing_hash(&domain);

        self.wallet
            .sign_hash(&signing_hash)
            .await
            .map_err(|e| GatewayError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperliquid::types::{BulkCancel, BulkOrder, CancelWire, OrderTypeWire, OrderWire};

    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn signer(is_mainnet: bool) -> ActionSigner {
        ActionSigner::new(&SecretString::new(TEST_PRIVATE_KEY.to_string()), is_mainnet).unwrap()
    }

    fn order_action() -> Action {
        Action::Order(BulkOrder::ungrouped(vec![OrderWire {
            asset: 0,
            is_buy: true,
            limit_px: "100".to_string(),
            sz: "1".to_string(),
            reduce_only: false,
            order_type: OrderTypeWire::limit("Ioc"),
            cloid: None,
        }]))
    }

    #[test]
    fn test_signer_address() {
        assert_eq!(
            signer(true).address_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_rejects_invalid_key() {
        let result = ActionSigner::new(&SecretString::new("0xzz".to_string()), true);
        assert!(matches!(result, Err(GatewayError::Signing(_))));
    }

    #[test]
    fn test_action_hash_depends_on_nonce_and_vault() {
        let action = order_action();
        let base = action_hash(&action, 1_700_000_000_000, None).unwrap();
        let other_nonce = action_hash(&action, 1_700_000_000_001, None).unwrap();
        let vault: Address = "0x1234567890abcdef1234567890abcdef12345678".parse().unwrap();
        let with_vault = action_hash(&action, 1_700_000_000_000, Some(vault)).unwrap();

        assert!(!base.is_zero());
        assert_ne!(base, other_nonce);
        assert_ne!(base, with_vault);
        assert_eq!(base, action_hash(&action, 1_700_000_000_000, None).unwrap());
    }

    #[test]
    fn test_msgpack_starts_with_type_key() {
        let action = Action::Cancel(BulkCancel {
            cancels: vec![CancelWire { asset: 1, oid: 2 }],
        });
        let bytes = rmp_serde::to_vec_named(&action).unwrap();
        // fixmap with two entries, then fixstr "type"
        assert_eq!(bytes[0], 0x82);
        assert_eq!(&bytes[1..6], b"\xa4type");
    }

    #[tokio::test]
    async fn test_sign_action_components() {
        let signature = signer(true)
            .sign_action(&order_action(), 1_700_000_000_000, None)
            .await
            .unwrap();

        assert_eq!(signature.r.len(), 66);
        assert_eq!(signature.s.len(), 66);
        assert!(signature.v == 27 || signature.v == 28);
    }

    #[tokio::test]
    async fn test_mainnet_and_testnet_signatures_differ() {
        let action = order_action();
        let mainnet = signer(true).sign_action(&action, 42, None).await.unwrap();
        let testnet = signer(false).sign_action(&action, 42, None).await.unwrap();
        assert_ne!(mainnet.r, testnet.r);
    }
}
