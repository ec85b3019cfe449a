//! Result assembly: choices, breakdowns, and comparison tables
//!
//! Every figure in a table comes from the same structures the optimizer
//! used (the transfer matrix, the solver's node costs, the cascade's
//! comparisons), so a report can never disagree with the decision it
//! describes.

use serde::{Deserialize, Serialize};

use crate::calculators::LayerCostResult;
use crate::cascade::{LayerComparison, LayerDecision};
use crate::error::CostError;
use crate::lifecycle::{LifecycleSolution, PathResult};
use crate::provider::{Layer, Provider, Tier};
use crate::transfer::{Endpoint, TransferCostMatrix, TransferRow};

/// The provider chosen for each layer and tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderChoices {
    /// L1 ingestion
    pub ingestion: Provider,
    /// L2 Hot tier (the anchor)
    pub hot: Provider,
    /// L2 Cool tier
    pub cool: Provider,
    /// L2 Archive tier
    pub archive: Provider,
    /// L3 processing
    pub processing: Provider,
    /// L4 twin management
    pub twin_management: Provider,
    /// L5 visualization
    pub visualization: Provider,
}

/// One row of the per-layer cost breakdown
///
/// Storage rows carry the monthly tier price; their `transfer_cost_in` is
/// the tier hop feeding them, which recurs monthly in steady state as each
/// cohort of data ages past the tier boundary. The L1 row carries the push
/// into the hot store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerBreakdown {
    /// Path label, e.g. `"L2_GCP_Cool"`
    pub label: String,
    /// Layer
    pub layer: Layer,
    /// Tier for storage rows, `None` otherwise
    pub tier: Option<Tier>,
    /// Chosen provider
    pub provider: Provider,
    /// Cost breakdown
    pub cost: LayerCostResult,
}

/// One provider row in a storage tier comparison table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageTierRow {
    /// Candidate provider
    pub provider: Provider,
    /// Tier price for the data volume, per month; absent when pricing was
    /// missing
    pub monthly_storage_cost: Option<f64>,
    /// Storage over the full residency
    pub storage_cost: Option<f64>,
    /// Minimum cumulative cost to reach and hold this node
    pub cumulative_cost: Option<f64>,
    /// Best completion cost given this choice — the figure to compare, not
    /// the local tier price
    pub lookahead_cost: Option<f64>,
    /// The pricing failure, if the node was excluded
    pub error: Option<String>,
}

/// Comparison table for one storage tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageComparison {
    /// The tier
    pub tier: Tier,
    /// One row per provider, tie-break order
    pub rows: Vec<StorageTierRow>,
}

/// Comparison table for one cascade layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerTable {
    /// The layer
    pub layer: Layer,
    /// One row per candidate
    pub rows: Vec<LayerComparison>,
    /// True when the layer was selected without comparison
    pub sole_candidate: bool,
}

/// Savings relative to the alternatives that were not taken
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsSummary {
    /// Lifecycle total of the winning path
    pub lifecycle_total: f64,
    /// Lifecycle total when every tier stays on the anchor; absent when the
    /// anchor is missing a tier price
    pub anchor_only_lifecycle_total: Option<f64>,
    /// `anchor_only - winning`, when both exist
    pub lifecycle_savings: Option<f64>,
    /// Per cascade layer: chosen total vs the most expensive priced candidate
    pub layer_savings: Vec<LayerSavings>,
}

/// Chosen-vs-worst spread for one cascade layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSavings {
    /// The layer
    pub layer: Layer,
    /// Winning monthly total
    pub chosen_total: f64,
    /// Most expensive priced candidate's monthly total
    pub most_expensive_total: f64,
    /// The spread
    pub savings: f64,
}

/// Complete output of one calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Winning provider per layer/tier
    pub choices: ProviderChoices,
    /// Ordered labels, `L1` through `L5` with the three storage tiers
    pub cheapest_path_labels: Vec<String>,
    /// Monthly cost rows for the winning assignment, pipeline order
    pub layer_breakdown: Vec<LayerBreakdown>,
    /// Sum of the breakdown totals
    pub total_monthly_cost: f64,
    /// Cascade comparison tables
    pub layer_tables: Vec<LayerTable>,
    /// Storage comparison tables with cumulative and lookahead costs
    pub storage_tables: Vec<StorageComparison>,
    /// Every transfer pair the calculation priced
    pub transfer_table: Vec<TransferRow>,
    /// The winning lifecycle path with residency-weighted costs
    pub lifecycle: PathResult,
    /// Savings summary
    pub savings: SavingsSummary,
}

/// Assemble the result from the solver and cascade outputs
pub fn assemble(
    data_size_gb: f64,
    solution: &LifecycleSolution,
    decisions: &[LayerDecision],
    matrix: &TransferCostMatrix,
) -> Result<CalculationResult, CostError> {
    let path = &solution.path;
    let anchor = path.anchor();

    let decision_for = |layer: Layer| -> Result<&LayerDecision, CostError> {
        decisions.iter().find(|d| d.layer == layer).ok_or_else(|| {
            CostError::ConfigurationError(format!("cascade produced no decision for {layer}"))
        })
    };
    let ingestion = decision_for(Layer::Ingestion)?;
    let processing = decision_for(Layer::Processing)?;
    let twin = decision_for(Layer::TwinManagement)?;
    let visualization = decision_for(Layer::Visualization)?;

    let choices = ProviderChoices {
        ingestion: ingestion.provider,
        hot: path.nodes[0].provider,
        cool: path.nodes[1].provider,
        archive: path.nodes[2].provider,
        processing: processing.provider,
        twin_management: twin.provider,
        visualization: visualization.provider,
    };

    // Breakdown rows in pipeline order. Storage rows use the monthly tier
    // price; the hot row's inflow is already booked on L1.
    let mut layer_breakdown = Vec::with_capacity(7);
    let mut labels = Vec::with_capacity(7);
    let mut push_cascade = |d: &LayerDecision, breakdown: &mut Vec<LayerBreakdown>,
                            labels: &mut Vec<String>| {
        let label = format!("{}_{}", d.layer.code(), d.provider.label());
        labels.push(label.clone());
        breakdown.push(LayerBreakdown {
            label,
            layer: d.layer,
            tier: None,
            provider: d.provider,
            cost: d.cost.clone(),
        });
    };

    push_cascade(ingestion, &mut layer_breakdown, &mut labels);
    for (i, node) in path.nodes.iter().enumerate() {
        let monthly = solution
            .node_costs
            .iter()
            .find(|nc| nc.node == *node)
            .map(|nc| nc.monthly_storage_cost)
            .ok_or_else(|| {
                CostError::ConfigurationError(format!(
                    "path node {} missing from node costs",
                    node.label()
                ))
            })?;
        let transfer_in = if i == 0 { 0.0 } else { path.transfer_costs[i - 1] };
        let label = node.label();
        labels.push(label.clone());
        layer_breakdown.push(LayerBreakdown {
            label,
            layer: Layer::Storage,
            tier: Some(node.tier),
            provider: node.provider,
            cost: LayerCostResult::new(monthly, 0.0, data_size_gb)
                .with_transfer_in(transfer_in),
        });
    }
    for d in [processing, twin, visualization] {
        push_cascade(d, &mut layer_breakdown, &mut labels);
    }

    let cheapest_path_labels = labels;
    let total_monthly_cost = layer_breakdown
        .iter()
        .map(|row| row.cost.total_monthly_cost)
        .sum();

    let storage_tables = storage_tables(solution);
    let layer_tables = decisions
        .iter()
        .map(|d| LayerTable {
            layer: d.layer,
            rows: d.comparisons.clone(),
            sole_candidate: d.sole_candidate,
        })
        .collect();

    let savings = savings_summary(solution, decisions, matrix, anchor);

    Ok(CalculationResult {
        choices,
        cheapest_path_labels,
        layer_breakdown,
        total_monthly_cost,
        layer_tables,
        storage_tables,
        transfer_table: matrix.rows(),
        lifecycle: path.clone(),
        savings,
    })
}

fn storage_tables(solution: &LifecycleSolution) -> Vec<StorageComparison> {
    Tier::ALL
        .into_iter()
        .map(|tier| {
            let mut rows: Vec<StorageTierRow> = solution
                .node_costs
                .iter()
                .filter(|nc| nc.node.tier == tier)
                .map(|nc| StorageTierRow {
                    provider: nc.node.provider,
                    monthly_storage_cost: Some(nc.monthly_storage_cost),
                    storage_cost: Some(nc.storage_cost),
                    cumulative_cost: nc.cumulative_cost,
                    lookahead_cost: nc.lookahead_cost,
                    error: None,
                })
                .collect();
            for (node, err) in &solution.excluded {
                if node.tier == tier {
                    rows.push(StorageTierRow {
                        provider: node.provider,
                        monthly_storage_cost: None,
                        storage_cost: None,
                        cumulative_cost: None,
                        lookahead_cost: None,
                        error: Some(err.to_string()),
                    });
                }
            }
            rows.sort_by_key(|r| r.provider);
            StorageComparison { tier, rows }
        })
        .collect()
}

fn savings_summary(
    solution: &LifecycleSolution,
    decisions: &[LayerDecision],
    matrix: &TransferCostMatrix,
    anchor: Provider,
) -> SavingsSummary {
    let lifecycle_total = solution.path.total_cost;

    // Cost of keeping every tier on the anchor, when the anchor has all
    // three tier prices.
    let anchor_node = |tier: Tier| {
        solution
            .node_costs
            .iter()
            .find(|nc| nc.node.provider == anchor && nc.node.tier == tier)
            .map(|nc| nc.storage_cost)
    };
    let anchor_only_lifecycle_total = (|| {
        let storage =
            anchor_node(Tier::Hot)? + anchor_node(Tier::Cool)? + anchor_node(Tier::Archive)?;
        let hop1 = matrix
            .cost(
                Endpoint::storage(anchor, Tier::Hot),
                Endpoint::storage(anchor, Tier::Cool),
            )
            .ok()?;
        let hop2 = matrix
            .cost(
                Endpoint::storage(anchor, Tier::Cool),
                Endpoint::storage(anchor, Tier::Archive),
            )
            .ok()?;
        Some(storage + hop1 + hop2)
    })();
    let lifecycle_savings = anchor_only_lifecycle_total.map(|a| a - lifecycle_total);

    let layer_savings = decisions
        .iter()
        .filter_map(|d| {
            let worst = d
                .comparisons
                .iter()
                .filter_map(|c| c.cost.as_ref())
                .map(|c| c.total_monthly_cost)
                .fold(f64::NEG_INFINITY, f64::max);
            if worst.is_finite() {
                Some(LayerSavings {
                    layer: d.layer,
                    chosen_total: d.cost.total_monthly_cost,
                    most_expensive_total: worst,
                    savings: worst - d.cost.total_monthly_cost,
                })
            } else {
                None
            }
        })
        .collect();

    SavingsSummary {
        lifecycle_total,
        anchor_only_lifecycle_total,
        lifecycle_savings,
        layer_savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::decide_layers;
    use crate::lifecycle::LifecycleGraph;
    use crate::pricing::PricingTable;
    use crate::scenario::ScenarioParams;
    use crate::usage::UsageMetrics;

    fn result() -> CalculationResult {
        let params = ScenarioParams::default();
        let usage = UsageMetrics::from_scenario(&params).unwrap();
        let pricing = PricingTable::with_defaults();
        let matrix = TransferCostMatrix::build(&pricing.providers(), &usage, &pricing);
        let solution = LifecycleGraph::build(&params, &usage, &pricing)
            .unwrap()
            .solve(&matrix)
            .unwrap();
        let decisions =
            decide_layers(solution.path.anchor(), &usage, &pricing, &matrix).unwrap();
        assemble(usage.data_size_gb, &solution, &decisions, &matrix).unwrap()
    }

    #[test]
    fn test_labels_cover_all_seven_slots() {
        let result = result();
        assert_eq!(result.cheapest_path_labels.len(), 7);
        assert!(result.cheapest_path_labels[0].starts_with("L1_"));
        assert!(result.cheapest_path_labels[1].ends_with("_Hot"));
        assert!(result.cheapest_path_labels[3].ends_with("_Archive"));
        assert!(result.cheapest_path_labels[6].starts_with("L5_"));
    }

    #[test]
    fn test_breakdown_totals_are_consistent() {
        let result = result();
        assert_eq!(result.layer_breakdown.len(), 7);
        let sum: f64 = result
            .layer_breakdown
            .iter()
            .map(|r| r.cost.total_monthly_cost)
            .sum();
        assert!((result.total_monthly_cost - sum).abs() < 1e-9);
        for row in &result.layer_breakdown {
            assert!(row.cost.total_monthly_cost >= 0.0);
        }
    }

    #[test]
    fn test_storage_tables_expose_lookahead() {
        let result = result();
        assert_eq!(result.storage_tables.len(), 3);
        for table in &result.storage_tables {
            assert!(!table.rows.is_empty());
            for row in &table.rows {
                assert!(row.error.is_some() || row.lookahead_cost.is_some());
            }
        }
    }

    #[test]
    fn test_transfer_table_matches_matrix() {
        let result = result();
        // 2 tier hops x 9 pairs + 4 layer pairings x 9.
        assert_eq!(result.transfer_table.len(), 54);
        assert!(result.transfer_table.iter().all(|r| r.cost.is_some()));
    }

    #[test]
    fn test_savings_are_non_negative() {
        let result = result();
        if let Some(s) = result.savings.lifecycle_savings {
            assert!(s >= -1e-9);
        }
        for ls in &result.savings.layer_savings {
            assert!(ls.savings >= -1e-9);
        }
    }
}
