//! Anchor-relative layer decision cascade
//!
//! Once the lifecycle solver has fixed the Hot-tier provider (the anchor),
//! each remaining layer is decided independently: every candidate provider
//! is priced as its own layer cost plus the transfer between the layer and
//! the anchor's hot store, and the minimum wins. This deliberately stays a
//! cascade rather than a joint five-layer optimization; an earlier design
//! locked every layer to one provider, and the cascade keeps its anchoring
//! behavior while letting each layer move separately.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculators::{available_providers, calculator_for, LayerCostResult};
use crate::error::CostError;
use crate::lifecycle::COST_EPS;
use crate::pricing::PricingTable;
use crate::provider::{Layer, Provider, Tier};
use crate::transfer::{Endpoint, TransferCostMatrix};
use crate::usage::UsageMetrics;

/// One candidate row in a layer comparison table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerComparison {
    /// Candidate provider
    pub provider: Provider,
    /// Cost breakdown with the anchor transfer applied; absent on failure
    pub cost: Option<LayerCostResult>,
    /// Why the candidate could not be priced, if it could not
    pub error: Option<String>,
}

/// The resolved choice for one cascade layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDecision {
    /// The layer
    pub layer: Layer,
    /// Winning provider
    pub provider: Provider,
    /// Winning cost breakdown, anchor transfer included
    pub cost: LayerCostResult,
    /// All candidates, in tie-break order
    pub comparisons: Vec<LayerComparison>,
    /// True when the layer had exactly one legal provider and no comparison
    /// was run
    pub sole_candidate: bool,
}

/// Transfer between a candidate layer placement and the anchor's hot store
///
/// Ingestion pushes into the hot store; processing, twin management, and
/// visualization pull from it. The matrix holds both directions.
fn anchor_transfer(
    layer: Layer,
    candidate: Provider,
    anchor: Provider,
    matrix: &TransferCostMatrix,
) -> Result<f64, CostError> {
    let layer_end = Endpoint::service(candidate, layer);
    let hot_end = Endpoint::storage(anchor, Tier::Hot);
    match layer {
        Layer::Ingestion => matrix.cost(layer_end, hot_end),
        _ => matrix.cost(hot_end, layer_end),
    }
}

/// Decide one layer relative to the anchor
pub fn decide_layer(
    layer: Layer,
    anchor: Provider,
    usage: &UsageMetrics,
    pricing: &PricingTable,
    matrix: &TransferCostMatrix,
) -> Result<LayerDecision, CostError> {
    let in_table = pricing.providers();
    let candidates: Vec<Provider> = available_providers(layer)
        .into_iter()
        .filter(|p| in_table.contains(p))
        .collect();
    if candidates.is_empty() {
        return Err(CostError::ConfigurationError(format!(
            "no provider available for the {layer} layer"
        )));
    }
    let sole_candidate = candidates.len() == 1;

    let mut comparisons = Vec::with_capacity(candidates.len());
    let mut best: Option<(Provider, LayerCostResult)> = None;

    for provider in candidates {
        let calculator = calculator_for(provider, layer).ok_or_else(|| {
            CostError::ConfigurationError(format!(
                "no calculator registered for {provider} {layer}"
            ))
        })?;
        let priced = calculator.cost(usage, pricing).and_then(|cost| {
            let transfer = anchor_transfer(layer, provider, anchor, matrix)?;
            Ok(cost.with_transfer_in(transfer))
        });
        match priced {
            Ok(cost) => {
                let replace = match &best {
                    None => true,
                    Some((_, incumbent)) => {
                        cost.total_monthly_cost
                            < incumbent.total_monthly_cost - COST_EPS
                    }
                };
                if replace {
                    best = Some((provider, cost.clone()));
                }
                comparisons.push(LayerComparison {
                    provider,
                    cost: Some(cost),
                    error: None,
                });
            }
            Err(err) => {
                // Reported per (layer, provider); the other providers are
                // still compared. Never rendered as $0.
                comparisons.push(LayerComparison {
                    provider,
                    cost: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let (provider, cost) = best.ok_or_else(|| {
        CostError::ConfigurationError(format!(
            "no provider could be priced for the {layer} layer"
        ))
    })?;
    debug!(
        layer = layer.name(),
        provider = provider.as_str(),
        total = cost.total_monthly_cost,
        sole_candidate,
        "layer decided"
    );

    Ok(LayerDecision {
        layer,
        provider,
        cost,
        comparisons,
        sole_candidate,
    })
}

/// Decide all cascade layers in pipeline order
pub fn decide_layers(
    anchor: Provider,
    usage: &UsageMetrics,
    pricing: &PricingTable,
    matrix: &TransferCostMatrix,
) -> Result<Vec<LayerDecision>, CostError> {
    Layer::CASCADE
        .into_iter()
        .map(|layer| decide_layer(layer, anchor, usage, pricing, matrix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{Price, PriceKey};
    use crate::scenario::ScenarioParams;

    fn setup() -> (UsageMetrics, PricingTable) {
        let usage =
            UsageMetrics::from_scenario(&ScenarioParams::new(1_000, 1.0, 1.0)).unwrap();
        (usage, PricingTable::with_defaults())
    }

    #[test]
    fn test_every_cascade_layer_resolves() {
        let (usage, pricing) = setup();
        let matrix = TransferCostMatrix::build(&pricing.providers(), &usage, &pricing);
        let decisions = decide_layers(Provider::Azure, &usage, &pricing, &matrix).unwrap();
        assert_eq!(decisions.len(), 4);
        for d in &decisions {
            assert!(d.cost.total_monthly_cost >= 0.0);
            assert!(!d.comparisons.is_empty());
        }
    }

    #[test]
    fn test_twin_layer_skips_gcp() {
        let (usage, pricing) = setup();
        let matrix = TransferCostMatrix::build(&pricing.providers(), &usage, &pricing);
        let decision =
            decide_layer(Layer::TwinManagement, Provider::Aws, &usage, &pricing, &matrix)
                .unwrap();
        assert!(decision
            .comparisons
            .iter()
            .all(|c| c.provider != Provider::Gcp));
        assert!(!decision.sole_candidate);
    }

    #[test]
    fn test_sole_candidate_short_circuit() {
        let usage =
            UsageMetrics::from_scenario(&ScenarioParams::new(1_000, 1.0, 1.0)).unwrap();
        // Only Azure in the snapshot: every layer has exactly one candidate.
        let full = PricingTable::with_defaults();
        let mut pricing = PricingTable::new(full.fetched_at());
        for key in [
            PriceKey::IngestionPerMillionMessages,
            PriceKey::GlueFunctionPerMillionInvocations,
            PriceKey::HotStoragePerGbMonth,
            PriceKey::TwinOpsPerMillion,
            PriceKey::IntraCloudTransferPerGb,
        ] {
            if let Some(p) = full.price_entry(Provider::Azure, key) {
                pricing.set_price(Provider::Azure, key, *p);
            }
        }
        let matrix = TransferCostMatrix::build(&pricing.providers(), &usage, &pricing);
        let decision =
            decide_layer(Layer::TwinManagement, Provider::Azure, &usage, &pricing, &matrix)
                .unwrap();
        assert!(decision.sole_candidate);
        assert_eq!(decision.provider, Provider::Azure);
    }

    #[test]
    fn test_pricing_gap_reported_not_zeroed() {
        let (usage, mut pricing) = setup();
        pricing.clear_price(Provider::Aws, PriceKey::ProcessingPer1kTransitions);
        let matrix = TransferCostMatrix::build(&pricing.providers(), &usage, &pricing);
        let decision =
            decide_layer(Layer::Processing, Provider::Azure, &usage, &pricing, &matrix)
                .unwrap();
        let aws_row = decision
            .comparisons
            .iter()
            .find(|c| c.provider == Provider::Aws)
            .unwrap();
        assert!(aws_row.cost.is_none());
        assert!(aws_row.error.as_deref().unwrap().contains("pricing data missing"));
        assert_ne!(decision.provider, Provider::Aws);
    }

    #[test]
    fn test_anchor_transfer_breaks_base_cost_ties() {
        let (usage, mut pricing) = setup();
        // Identical processing prices everywhere. The anchor-local candidate
        // pays the intra-cloud rate instead of egress, so it wins.
        for p in Provider::ALL {
            pricing.set_price(
                p,
                PriceKey::ProcessingPer1kTransitions,
                Price::default_of(0.025),
            );
        }
        let matrix = TransferCostMatrix::build(&pricing.providers(), &usage, &pricing);
        let decision =
            decide_layer(Layer::Processing, Provider::Gcp, &usage, &pricing, &matrix).unwrap();
        assert_eq!(decision.provider, Provider::Gcp);
    }
}
