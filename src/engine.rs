//! The cost engine: one pure calculation from scenario and pricing to result

use tracing::debug;

use crate::cascade::decide_layers;
use crate::error::CostError;
use crate::lifecycle::LifecycleGraph;
use crate::pricing::PricingTable;
use crate::report::{assemble, CalculationResult};
use crate::scenario::ScenarioParams;
use crate::transfer::TransferCostMatrix;
use crate::usage::UsageMetrics;

/// The decision engine
///
/// Stateless: every call owns private copies of its usage, matrix, and graph
/// structures, and the pricing snapshot is read-only, so concurrent
/// calculations need no coordination. The engine performs no I/O; pricing is
/// refreshed out of band and passed in whole.
#[derive(Debug, Default, Clone)]
pub struct CostEngine;

impl CostEngine {
    /// Create an engine
    pub fn new() -> Self {
        Self
    }

    /// Run one calculation
    ///
    /// Pure function of its inputs: identical (scenario, pricing) pairs
    /// yield identical results.
    pub fn calculate(
        &self,
        params: &ScenarioParams,
        pricing: &PricingTable,
    ) -> Result<CalculationResult, CostError> {
        params.validate()?;
        let usage = UsageMetrics::from_scenario(params)?;
        debug!(
            messages = usage.total_messages_per_month,
            gb = usage.data_size_gb,
            "usage derived"
        );

        let providers = pricing.providers();
        let matrix = TransferCostMatrix::build(&providers, &usage, pricing);

        let solution = LifecycleGraph::build(params, &usage, pricing)?.solve(&matrix)?;
        let anchor = solution.path.anchor();
        debug!(anchor = anchor.as_str(), "storage anchor resolved");

        let decisions = decide_layers(anchor, &usage, pricing, &matrix)?;

        assemble(usage.data_size_gb, &solution, &decisions, &matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_with_defaults() {
        let engine = CostEngine::new();
        let result = engine
            .calculate(&ScenarioParams::default(), &PricingTable::with_defaults())
            .unwrap();
        assert_eq!(result.lifecycle.nodes.len(), 3);
        assert!(result.total_monthly_cost > 0.0);
    }

    #[test]
    fn test_invalid_scenario_is_rejected() {
        let engine = CostEngine::new();
        let mut params = ScenarioParams::default();
        params.sending_interval_minutes = -5.0;
        assert!(matches!(
            engine.calculate(&params, &PricingTable::with_defaults()),
            Err(CostError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_empty_pricing_table_is_fatal() {
        use chrono::Utc;
        let engine = CostEngine::new();
        let err = engine
            .calculate(&ScenarioParams::default(), &PricingTable::new(Utc::now()))
            .unwrap_err();
        assert!(matches!(err, CostError::ConfigurationError(_)));
    }
}
