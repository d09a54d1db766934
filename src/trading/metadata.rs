//! Exchange metadata snapshot
//!
//! The perpetuals universe is loaded once per process on first use and read
//! without locking afterwards. Also holds the price and size formatting rules
//! that depend on an asset's size decimals.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::GatewayError;
use crate::hyperliquid::{DynGateway, Meta};

/// Perp prices carry at most `6 - szDecimals` decimals
pub const MAX_PRICE_DECIMALS: u32 = 6;

pub const MAX_PRICE_SIG_FIGS: u32 = 5;

/// Quote suffixes accepted on symbols, longest first
pub const QUOTE_SUFFIXES: &[&str] = &["-USDC", "-PERP", "-USD"];

/// Tradable perpetual
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSpec {
    /// Exchange coin name, e.g. `SOL`
    pub coin: String,
    /// Position in the universe; the `a` field of order wires
    pub asset_index: u32,
    pub sz_decimals: u32,
    pub max_leverage: u32,
    pub only_isolated: bool,
}

impl AssetSpec {
    /// Truncates toward zero to the allowed size decimals
    pub fn round_size(&self, size: Decimal) -> Decimal {
        size.round_dp_with_strategy(self.sz_decimals, RoundingStrategy::ToZero)
    }

    pub fn format_size(&self, size: Decimal) -> String {
        self.round_size(size).normalize().to_string()
    }

    /// 5 significant figures and `6 - szDecimals` decimals; integers pass unchanged
    pub fn round_price(&self, price: Decimal) -> Decimal {
        if price.fract().is_zero() {
            return price.trunc();
        }
        let significant = price.round_sf(MAX_PRICE_SIG_FIGS).unwrap_or(price);
        significant.round_dp(MAX_PRICE_DECIMALS.saturating_sub(self.sz_decimals))
    }

    pub fn format_price(&self, price: Decimal) -> String {
        self.round_price(price).normalize().to_string()
    }

    /// Canonical symbol for this asset
    pub fn symbol(&self) -> String {
        format!("{}-USD", self.coin)
    }
}

/// Extracts the exchange coin from a symbol such as `SOL-USD` or `xyz:TSLA-USDC`
///
/// Returns `None` when the symbol does not follow the naming convention.
pub fn coin_for_symbol(symbol: &str) -> Option<&str> {
    let base = QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| symbol.strip_suffix(suffix))?;

    let (dex, coin) = match base.split_once(':') {
        Some((dex, coin)) => (Some(dex), coin),
        None => (None, base),
    };

    let alnum = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
    if !alnum(coin) || dex.is_some_and(|d| !alnum(d)) {
        return None;
    }

    Some(base)
}

/// Immutable view of the tradable universe
#[derive(Debug, Clone, Default)]
pub struct AssetMetadata {
    assets: Vec<AssetSpec>,
    by_coin: HashMap<String, usize>,
    by_lowercase: HashMap<String, usize>,
    by_index: HashMap<u32, usize>,
}

impl AssetMetadata {
    /// Builds the snapshot, dropping delisted assets
    pub fn from_meta(meta: &Meta) -> Self {
        let mut metadata = Self::default();

        for (index, info) in meta.universe.iter().enumerate() {
            if info.is_delisted {
                continue;
            }
            let slot = metadata.assets.len();
            metadata.by_coin.insert(info.name.clone(), slot);
            metadata.by_lowercase.insert(info.name.to_lowercase(), slot);
            metadata.by_index.insert(index as u32, slot);
            metadata.assets.push(AssetSpec {
                coin: info.name.clone(),
                asset_index: index as u32,
                sz_decimals: info.sz_decimals,
                max_leverage: info.max_leverage,
                only_isolated: info.only_isolated,
            });
        }

        metadata
    }

    /// Exact coin match, falling back to a case-insensitive one
    pub fn get(&self, coin: &str) -> Option<&AssetSpec> {
        self.by_coin
            .get(coin)
            .or_else(|| self.by_lowercase.get(&coin.to_lowercase()))
            .map(|slot| &self.assets[*slot])
    }

    pub fn by_asset_index(&self, asset_index: u32) -> Option<&AssetSpec> {
        self.by_index.get(&asset_index).map(|slot| &self.assets[*slot])
    }

    pub fn resolve_symbol(&self, symbol: &str) -> Option<&AssetSpec> {
        coin_for_symbol(symbol).and_then(|coin| self.get(coin))
    }

    pub fn contains(&self, coin: &str) -> bool {
        self.by_coin.contains_key(coin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetSpec> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Lazily loaded metadata shared by every tool invocation
pub struct MetadataCache {
    gateway: DynGateway,
    snapshot: OnceCell<Arc<AssetMetadata>>,
}

impl MetadataCache {
    pub fn new(gateway: DynGateway) -> Self {
        Self {
            gateway,
            snapshot: OnceCell::new(),
        }
    }

    /// Returns the snapshot, loading it on first call
    ///
    /// Concurrent first callers wait on a single load. A failed load leaves
    /// the cache empty so the next call tries again.
    pub async fn get(&self) -> Result<Arc<AssetMetadata>, GatewayError> {
        self.snapshot
            .get_or_try_init(|| async {
                let meta = self.gateway.asset_metadata().await?;
                let metadata = AssetMetadata::from_meta(&meta);
                info!(
                    assets = metadata.len(),
                    delisted = meta.universe.len() - metadata.len(),
                    "Loaded exchange metadata"
                );
                Ok(Arc::new(metadata))
            })
            .await
            .map(Arc::clone)
    }

    /// Snapshot if already loaded
    pub fn loaded(&self) -> Option<Arc<AssetMetadata>> {
        self.snapshot.get().cloned()
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("loaded", &self.snapshot.initialized())
            .finish()
    }
}
