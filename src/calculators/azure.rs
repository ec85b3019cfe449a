//! Azure cost calculators
//!
//! IoT Hub has no direct Cosmos DB route, so ingestion carries a mandatory
//! bridging function priced per invocation (one invocation per message).

use super::{per_million, per_thousand, CostCalculator, LayerCostResult};
use crate::error::CostError;
use crate::pricing::{PriceKey, PricingTable};
use crate::provider::Provider;
use crate::usage::UsageMetrics;

const P: Provider = Provider::Azure;

/// L1 on Azure (IoT Hub + bridging function)
pub struct AzureIngestion;

impl CostCalculator for AzureIngestion {
    fn cost(
        &self,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<LayerCostResult, CostError> {
        let base = per_million(
            usage.total_messages_per_month,
            pricing.price(P, PriceKey::IngestionPerMillionMessages)?,
        );
        let glue = per_million(
            usage.total_messages_per_month,
            pricing.price(P, PriceKey::GlueFunctionPerMillionInvocations)?,
        );
        Ok(LayerCostResult::new(base, glue, usage.data_size_gb))
    }
}

/// L3 on Azure (Digital Twins state transitions)
pub struct AzureProcessing;

impl CostCalculator for AzureProcessing {
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

/// L4 on Azure (Digital Twins graph operations)
pub struct AzureTwin;

impl CostCalculator for AzureTwin {
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

/// L5 on Azure (Grafana / Power BI seats)
pub struct AzureVisualization;

impl CostCalculator for AzureVisualization {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioParams;

    fn usage() -> UsageMetrics {
        UsageMetrics::from_scenario(&ScenarioParams::new(1_000, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_ingestion_glue_is_separate() {
        let result = AzureIngestion
            .cost(&usage(), &PricingTable::with_defaults())
            .unwrap();
        // 43.2M messages: $0.80/million base, $0.20/million glue
        assert!((result.base_cost - 34.56).abs() < 1e-9);
        assert!((result.glue_cost - 8.64).abs() < 1e-9);
        assert!(
            (result.total_monthly_cost - result.base_cost - result.glue_cost).abs() < 1e-9
        );
    }

    #[test]
    fn test_twin_cost_scales_with_updates() {
        let pricing = PricingTable::with_defaults();
        let small = AzureTwin.cost(&usage(), &pricing).unwrap();
        let mut doubled = usage();
        doubled.twin_update_count *= 2.0;
        let large = AzureTwin.cost(&doubled, &pricing).unwrap();
        assert!((large.base_cost - 2.0 * small.base_cost).abs() < 1e-9);
    }

    #[test]
    fn test_missing_price_is_an_error() {
        let mut pricing = PricingTable::with_defaults();
        pricing.clear_price(Provider::Azure, PriceKey::TwinOpsPerMillion);
        assert!(matches!(
            AzureTwin.cost(&usage(), &pricing),
            Err(CostError::PricingDataMissing { .. })
        ));
    }
}
