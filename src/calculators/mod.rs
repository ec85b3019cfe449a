//! Per-(provider, layer) cost calculators
//!
//! One small calculator per provider and layer, selected through a lookup
//! table instead of string branching. Unit conversions happen in exactly one
//! place each ([`per_million`], [`per_thousand`]); calculators never divide a
//! documented unit twice.

mod aws;
mod azure;
mod gcp;

pub use aws::{AwsIngestion, AwsProcessing, AwsTwin, AwsVisualization};
pub use azure::{AzureIngestion, AzureProcessing, AzureTwin, AzureVisualization};
pub use gcp::{GcpIngestion, GcpProcessing, GcpVisualization};

use serde::{Deserialize, Serialize};

use crate::error::CostError;
use crate::pricing::PricingTable;
use crate::provider::{Layer, Provider};
use crate::usage::UsageMetrics;

/// Cost breakdown for one (layer, provider) choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerCostResult {
    /// The service's own monthly price
    pub base_cost: f64,
    /// Mandatory bridging compute (e.g. a serverless function between two
    /// managed services); zero where the provider needs none
    pub glue_cost: f64,
    /// Incoming transfer cost, filled in by the cascade once the anchor is known
    pub transfer_cost_in: f64,
    /// base + glue + incoming transfer
    pub total_monthly_cost: f64,
    /// Monthly data volume flowing into the layer, in GB
    pub data_size_gb: f64,
}

impl LayerCostResult {
    /// Build a result with no incoming transfer yet
    pub fn new(base_cost: f64, glue_cost: f64, data_size_gb: f64) -> Self {
        Self {
            base_cost,
            glue_cost,
            transfer_cost_in: 0.0,
            total_monthly_cost: base_cost + glue_cost,
            data_size_gb,
        }
    }

    /// Attach the incoming transfer cost and recompute the total
    pub fn with_transfer_in(mut self, transfer_cost_in: f64) -> Self {
        self.transfer_cost_in = transfer_cost_in;
        self.total_monthly_cost = self.base_cost + self.glue_cost + transfer_cost_in;
        self
    }
}

/// Capability interface for one (provider, layer) cost procedure
pub trait CostCalculator: Sync {
    /// Price this layer on this provider for the given usage
    fn cost(
        &self,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<LayerCostResult, CostError>;
}

/// Convert a per-million price to a total: `count / 1e6 * price`
pub(crate) fn per_million(count: f64, price_per_million: f64) -> f64 {
    count / 1_000_000.0 * price_per_million
}

/// Convert a per-1,000 price to a total: `count * (price / 1,000)`
///
/// The division happens here and nowhere else; callers pass the listed
/// per-1,000 price unmodified.
pub(crate) fn per_thousand(count: f64, price_per_thousand: f64) -> f64 {
    count * (price_per_thousand / 1_000.0)
}

/// Look up the calculator for a (provider, layer) pair
///
/// `None` means the layer has no legal implementation on that provider
/// (storage is decided by the lifecycle solver; GCP has no managed twin
/// service).
pub fn calculator_for(provider: Provider, layer: Layer) -> Option<&'static dyn CostCalculator> {
    match (provider, layer) {
        (Provider::Aws, Layer::Ingestion) => Some(&AwsIngestion),
        (Provider::Aws, Layer::Processing) => Some(&AwsProcessing),
        (Provider::Aws, Layer::TwinManagement) => Some(&AwsTwin),
        (Provider::Aws, Layer::Visualization) => Some(&AwsVisualization),
        (Provider::Azure, Layer::Ingestion) => Some(&AzureIngestion),
        (Provider::Azure, Layer::Processing) => Some(&AzureProcessing),
        (Provider::Azure, Layer::TwinManagement) => Some(&AzureTwin),
        (Provider::Azure, Layer::Visualization) => Some(&AzureVisualization),
        (Provider::Gcp, Layer::Ingestion) => Some(&GcpIngestion),
        (Provider::Gcp, Layer::Processing) => Some(&GcpProcessing),
        (Provider::Gcp, Layer::TwinManagement) => None,
        (Provider::Gcp, Layer::Visualization) => Some(&GcpVisualization),
        (_, Layer::Storage) => None,
    }
}

/// Providers with a legal implementation for a layer, in tie-break order
pub fn available_providers(layer: Layer) -> Vec<Provider> {
    Provider::ALL
        .into_iter()
        .filter(|p| calculator_for(*p, layer).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_table_covers_cascade_layers() {
        for layer in Layer::CASCADE {
            assert!(
                !available_providers(layer).is_empty(),
                "no provider for {layer}"
            );
        }
    }

    #[test]
    fn test_twin_unavailable_on_gcp() {
        assert!(calculator_for(Provider::Gcp, Layer::TwinManagement).is_none());
        assert_eq!(
            available_providers(Layer::TwinManagement),
            vec![Provider::Aws, Provider::Azure]
        );
    }

    #[test]
    fn test_storage_has_no_calculator() {
        for p in Provider::ALL {
            assert!(calculator_for(p, Layer::Storage).is_none());
        }
    }

    #[test]
    fn test_transfer_in_recomputes_total() {
        let result = LayerCostResult::new(10.0, 2.0, 1.0).with_transfer_in(3.0);
        assert!((result.total_monthly_cost - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_conversions_divide_once() {
        // $0.025 per 1,000 -> $0.000025 per operation
        assert!((per_thousand(1.0, 0.025) - 0.000_025).abs() < 1e-12);
        // $1.00 per million -> $0.000001 per operation
        assert!((per_million(1.0, 1.0) - 0.000_001).abs() < 1e-12);
    }
}
