//! AWS cost calculators
//!
//! IoT Core rule actions write straight into the hot store, so ingestion
//! carries no glue function on AWS.

use super::{per_million, per_thousand, CostCalculator, LayerCostResult};
use crate::error::CostError;
use crate::pricing::{PriceKey, PricingTable};
use crate::provider::Provider;
use crate::usage::UsageMetrics;

const P: Provider = Provider::Aws;

/// L1 on AWS (IoT Core)
pub struct AwsIngestion;

impl CostCalculator for AwsIngestion {
    fn cost(
        &self,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<LayerCostResult, CostError> {
        let base = per_million(
            usage.total_messages_per_month,
            pricing.price(P, PriceKey::IngestionPerMillionMessages)?,
        );
        Ok(LayerCostResult::new(base, 0.0, usage.data_size_gb))
    }
}

/// L3 on AWS (IoT Events state transitions)
pub struct AwsProcessing;

impl CostCalculator for AwsProcessing {
    fn cost(
        &self,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<LayerCostResult, CostError> {
        let base = per_thousand(
            usage.twin_update_count,
            pricing.price(P, PriceKey::ProcessingPer1kTransitions)?,
        );
        Ok(LayerCostResult::new(base, 0.0, usage.data_size_gb))
    }
}

/// L4 on AWS (IoT TwinMaker)
pub struct AwsTwin;

impl CostCalculator for AwsTwin {
    fn cost(
        &self,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<LayerCostResult, CostError> {
        let base = per_million(
            usage.twin_update_count,
            pricing.price(P, PriceKey::TwinOpsPerMillion)?,
        );
        Ok(LayerCostResult::new(base, 0.0, usage.data_size_gb))
    }
}

/// L5 on AWS (QuickSight)
pub struct AwsVisualization;

impl CostCalculator for AwsVisualization {
    fn cost(
        &self,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<LayerCostResult, CostError> {
        let seats =
            usage.dashboard_user_count * pricing.price(P, PriceKey::VisualizationPerUserMonth)?;
        let scene = if usage.needs_3d_scene {
            pricing.price(P, PriceKey::Visualization3dScenePerMonth)?
        } else {
            0.0
        };
        Ok(LayerCostResult::new(seats + scene, 0.0, usage.data_size_gb))
    }
}
