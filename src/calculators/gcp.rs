//! GCP cost calculators
//!
//! Pub/Sub needs a Cloud Function to land messages in Firestore, so
//! ingestion carries glue. GCP has no managed twin service; the twin layer
//! has no calculator here and the lookup table returns `None` for it.

use super::{per_million, per_thousand, CostCalculator, LayerCostResult};
use crate::error::CostError;
use crate::pricing::{PriceKey, PricingTable};
use crate::provider::Provider;
use crate::usage::UsageMetrics;

const P: Provider = Provider::Gcp;

/// L1 on GCP (Pub/Sub + Cloud Function)
pub struct GcpIngestion;

impl CostCalculator for GcpIngestion {
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

/// L3 on GCP (Dataflow state transitions)
pub struct GcpProcessing;

impl CostCalculator for GcpProcessing {
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

/// L5 on GCP (Looker seats)
pub struct GcpVisualization;

impl CostCalculator for GcpVisualization {
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
