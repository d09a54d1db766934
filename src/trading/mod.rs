//! Trading core
//!
//! Intent validation, bracket orchestration and response normalization.
//! Nothing here talks HTTP directly; exchange access goes through
//! [`crate::hyperliquid::ExchangeGateway`].

pub mod bracket;
pub mod intent;
pub mod metadata;
pub mod normalizer;
pub mod redact;
pub mod validator;

pub use bracket::{BracketOrchestrator, BracketResult, BracketStatus, LegRole, LegState, OrderLeg};
pub use intent::{EntryPrice, Side, TimeInForce, TradeIntent, TriggerSpec};
pub use metadata::{AssetMetadata, AssetSpec, MetadataCache};
pub use normalizer::{normalize, LegOutcome};
pub use validator::{ValidationError, ValidationErrorKind, Validator};
