//! Error taxonomy for the cost engine
//!
//! Three runtime classes: invalid scenario input, a pricing field that is
//! absent with no static default, and an empty candidate set for a tier or
//! layer. Unit-conversion mistakes are a fourth, tested-not-raised class:
//! they are guarded by reference-price unit tests rather than runtime checks.

use serde::{Deserialize, Serialize};

use crate::pricing::PriceKey;
use crate::provider::Provider;

/// Errors produced by the cost engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum CostError {
    /// Inconsistent or invalid scenario input; reported, never retried
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// A required price field is absent and has no static default.
    ///
    /// Affects only the (layer, provider) combinations that need the field;
    /// other providers are still computed. A missing price is never silently
    /// rendered as $0.
    #[error("pricing data missing: {provider} has no value for {price}")]
    PricingDataMissing {
        /// Provider whose pricing table lacks the field
        provider: Provider,
        /// The missing price field
        price: PriceKey,
    },

    /// Empty candidate set for a tier or layer; fatal for the calculation
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
