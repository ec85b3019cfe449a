//! Storage lifecycle graph and shortest-path solver
//!
//! Nodes are (tier, provider) pairs across Hot/Cool/Archive; an edge
//! (Hot, p) -> (Cool, q) costs the one-time transfer plus the destination's
//! storage over its residency. Tiers carry an explicit index and edges only
//! ever step from index n to n + 1, so the graph is a DAG by construction
//! and no tier can be skipped.
//!
//! With strictly ordered tiers a forward tier-by-tier dynamic-programming
//! pass is Dijkstra on this bounded DAG (at most 9 nodes). A backward pass
//! computes each node's lookahead cost: the minimum cost to finish the
//! lifecycle given a fixed choice at that node. Lookahead is exposed so
//! comparison tables can show "best completion given this choice" rather
//! than a tier's local cost.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CostError;
use crate::pricing::{PriceKey, PricingTable};
use crate::provider::{Provider, Tier};
use crate::scenario::ScenarioParams;
use crate::transfer::{Endpoint, TransferCostMatrix};
use crate::usage::UsageMetrics;

/// Two costs within this distance are tied for tie-break purposes.
pub(crate) const COST_EPS: f64 = 1e-9;

/// One (tier, provider) node in the lifecycle graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleNode {
    /// Storage tier
    pub tier: Tier,
    /// Provider hosting the tier
    pub provider: Provider,
}

impl LifecycleNode {
    /// Path label, e.g. `"L2_AWS_Hot"`
    pub fn label(&self) -> String {
        format!("L2_{}_{}", self.provider.label(), self.tier.label())
    }
}

/// Cost detail for one node, including solver results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCost {
    /// The node
    pub node: LifecycleNode,
    /// Storage price for the data volume, per month
    pub monthly_storage_cost: f64,
    /// Months the data resides in this tier
    pub residency_months: u32,
    /// Storage over the full residency (monthly x months)
    pub storage_cost: f64,
    /// Minimum cumulative cost to reach and hold this node; `None` when the
    /// node is unreachable from every Hot source
    pub cumulative_cost: Option<f64>,
    /// Minimum cost to complete the lifecycle from this node, its own
    /// storage included; `None` when no completion exists
    pub lookahead_cost: Option<f64>,
}

/// The winning Hot -> Cool -> Archive path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResult {
    /// Exactly three nodes, in tier order
    pub nodes: Vec<LifecycleNode>,
    /// Residency-weighted storage cost per node
    pub storage_costs: Vec<f64>,
    /// One-time transfer cost per hop (two hops)
    pub transfer_costs: Vec<f64>,
    /// Sum of the three storage and two transfer terms
    pub total_cost: f64,
}

impl PathResult {
    /// The Hot-tier provider, anchor for the layer cascade
    pub fn anchor(&self) -> Provider {
        self.nodes[0].provider
    }
}

/// Full solver output: the path plus per-node costs for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleSolution {
    /// The cost-minimal path
    pub path: PathResult,
    /// Every priced node with cumulative and lookahead costs, tier-major
    pub node_costs: Vec<NodeCost>,
    /// Nodes dropped for missing pricing, with the reason
    pub excluded: Vec<(LifecycleNode, CostError)>,
}

fn tier_price_key(tier: Tier) -> PriceKey {
    match tier {
        Tier::Hot => PriceKey::HotStoragePerGbMonth,
        Tier::Cool => PriceKey::CoolStoragePerGbMonth,
        Tier::Archive => PriceKey::ArchiveStoragePerGbMonth,
    }
}

#[derive(Debug, Clone)]
struct GraphNode {
    provider: Provider,
    monthly: f64,
    total: f64,
}

/// The weighted lifecycle DAG for one calculation
#[derive(Debug, Clone)]
pub struct LifecycleGraph {
    // One candidate list per tier index.
    tiers: [Vec<GraphNode>; 3],
    residency: (u32, u32, u32),
    excluded: Vec<(LifecycleNode, CostError)>,
}

impl LifecycleGraph {
    /// Build the graph, pricing each (tier, provider) node
    ///
    /// A provider missing a tier price is excluded from that tier only; a
    /// tier left with no candidate at all is a fatal
    /// [`CostError::ConfigurationError`] — tiers are never silently skipped.
    pub fn build(
        params: &ScenarioParams,
        usage: &UsageMetrics,
        pricing: &PricingTable,
    ) -> Result<Self, CostError> {
        let providers = pricing.providers();
        if providers.is_empty() {
            return Err(CostError::ConfigurationError(
                "pricing table contains no providers".into(),
            ));
        }

        let residency = params.residency_months();
        let months = [residency.0, residency.1, residency.2];
        let mut tiers: [Vec<GraphNode>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut excluded = Vec::new();

        for tier in Tier::ALL {
            for &provider in &providers {
                match pricing.price(provider, tier_price_key(tier)) {
                    Ok(rate) => {
                        let monthly = rate * usage.data_size_gb;
                        tiers[tier.index()].push(GraphNode {
                            provider,
                            monthly,
                            total: monthly * months[tier.index()] as f64,
                        });
                    }
                    Err(err) => excluded.push((LifecycleNode { tier, provider }, err)),
                }
            }
            if tiers[tier.index()].is_empty() {
                return Err(CostError::ConfigurationError(format!(
                    "no provider offers a {tier} tier price"
                )));
            }
        }

        Ok(Self {
            tiers,
            residency,
            excluded,
        })
    }

    /// Months of residency per tier (hot, cool, archive)
    pub fn residency(&self) -> (u32, u32, u32) {
        self.residency
    }

    fn edge(
        &self,
        from_tier: Tier,
        from: &GraphNode,
        to_tier: Tier,
        to: &GraphNode,
        matrix: &TransferCostMatrix,
    ) -> Option<f64> {
        matrix
            .cost(
                Endpoint::storage(from.provider, from_tier),
                Endpoint::storage(to.provider, to_tier),
            )
            .ok()
    }

    /// Solve for the minimum-cost path and per-node lookahead costs
    pub fn solve(&self, matrix: &TransferCostMatrix) -> Result<LifecycleSolution, CostError> {
        let [hot, cool, archive] = &self.tiers;

        // Forward pass: minimum cumulative cost to reach and hold each node.
        let mut cumulative: [Vec<Option<f64>>; 3] = [
            hot.iter().map(|n| Some(n.total)).collect(),
            vec![None; cool.len()],
            vec![None; archive.len()],
        ];
        // Chosen predecessor index per node in tiers 1 and 2.
        let mut pred: [Vec<Option<usize>>; 2] = [vec![None; cool.len()], vec![None; archive.len()]];

        for (level, (from_tier, to_tier)) in
            [(Tier::Hot, Tier::Cool), (Tier::Cool, Tier::Archive)].into_iter().enumerate()
        {
            let (from_nodes, to_nodes) = match level {
                0 => (hot, cool),
                _ => (cool, archive),
            };
            for (j, to) in to_nodes.iter().enumerate() {
                let mut best: Option<(f64, usize)> = None;
                for (i, from) in from_nodes.iter().enumerate() {
                    let Some(reach) = cumulative[level][i] else {
                        continue;
                    };
                    let Some(transfer) = self.edge(from_tier, from, to_tier, to, matrix) else {
                        continue;
                    };
                    let cost = reach + transfer + to.total;
                    best = Some(match best {
                        None => (cost, i),
                        Some((cur, cur_i)) => {
                            if cost < cur - COST_EPS {
                                (cost, i)
                            } else if cost <= cur + COST_EPS
                                && better_predecessor(from_nodes, i, cur_i, to.provider)
                            {
                                (cur.min(cost), i)
                            } else {
                                (cur, cur_i)
                            }
                        }
                    });
                }
                if let Some((cost, i)) = best {
                    cumulative[level + 1][j] = Some(cost);
                    pred[level][j] = Some(i);
                }
            }
            if cumulative[level + 1].iter().all(Option::is_none) {
                return Err(CostError::ConfigurationError(format!(
                    "no reachable candidate in the {to_tier} tier"
                )));
            }
        }

        // Backward pass: lookahead completion cost per node.
        let mut lookahead: [Vec<Option<f64>>; 3] = [
            vec![None; hot.len()],
            vec![None; cool.len()],
            archive.iter().map(|n| Some(n.total)).collect(),
        ];
        for (level, (from_tier, to_tier)) in
            [(Tier::Cool, Tier::Archive), (Tier::Hot, Tier::Cool)].into_iter().enumerate()
        {
            let (from_idx, from_nodes, to_idx, to_nodes) = match level {
                0 => (1usize, cool, 2usize, archive),
                _ => (0usize, hot, 1usize, cool),
            };
            for (i, from) in from_nodes.iter().enumerate() {
                let mut best: Option<f64> = None;
                for (j, to) in to_nodes.iter().enumerate() {
                    let Some(rest) = lookahead[to_idx][j] else {
                        continue;
                    };
                    let Some(transfer) = self.edge(from_tier, from, to_tier, to, matrix) else {
                        continue;
                    };
                    let cost = transfer + rest;
                    best = Some(best.map_or(cost, |b: f64| b.min(cost)));
                }
                lookahead[from_idx][i] = best.map(|b| from.total + b);
            }
        }

        // Sink selection with the stability-then-lexicographic tie-break.
        let sink = select_sink(archive, cool, hot, &cumulative[2], &pred)?;
        let mid = pred[1][sink].ok_or_else(|| {
            CostError::ConfigurationError("archive sink has no predecessor".into())
        })?;
        let src = pred[0][mid].ok_or_else(|| {
            CostError::ConfigurationError("cool node has no predecessor".into())
        })?;

        let chain = [&hot[src], &cool[mid], &archive[sink]];
        let nodes: Vec<LifecycleNode> = chain
            .iter()
            .zip(Tier::ALL)
            .map(|(n, tier)| LifecycleNode {
                tier,
                provider: n.provider,
            })
            .collect();
        let storage_costs: Vec<f64> = chain.iter().map(|n| n.total).collect();
        let transfer_costs = vec![
            matrix.cost(
                Endpoint::storage(hot[src].provider, Tier::Hot),
                Endpoint::storage(cool[mid].provider, Tier::Cool),
            )?,
            matrix.cost(
                Endpoint::storage(cool[mid].provider, Tier::Cool),
                Endpoint::storage(archive[sink].provider, Tier::Archive),
            )?,
        ];
        let total_cost =
            storage_costs.iter().sum::<f64>() + transfer_costs.iter().sum::<f64>();

        debug!(
            path = %nodes.iter().map(LifecycleNode::label).collect::<Vec<_>>().join(" -> "),
            total = total_cost,
            "lifecycle path resolved"
        );

        let mut node_costs = Vec::new();
        let months = [self.residency.0, self.residency.1, self.residency.2];
        for (idx, tier) in Tier::ALL.into_iter().enumerate() {
            for (i, n) in self.tiers[idx].iter().enumerate() {
                node_costs.push(NodeCost {
                    node: LifecycleNode {
                        tier,
                        provider: n.provider,
                    },
                    monthly_storage_cost: n.monthly,
                    residency_months: months[idx],
                    storage_cost: n.total,
                    cumulative_cost: cumulative[idx][i],
                    lookahead_cost: lookahead[idx][i],
                });
            }
        }

        Ok(LifecycleSolution {
            path: PathResult {
                nodes,
                storage_costs,
                transfer_costs,
                total_cost,
            },
            node_costs,
            excluded: self.excluded.clone(),
        })
    }
}

/// Whether predecessor `i` beats the incumbent `cur_i` on a cost tie:
/// prefer the predecessor on the same provider as the destination, then the
/// lexicographically smaller provider.
fn better_predecessor(
    from_nodes: &[GraphNode],
    i: usize,
    cur_i: usize,
    dest: Provider,
) -> bool {
    let cand = from_nodes[i].provider;
    let cur = from_nodes[cur_i].provider;
    let cand_stays = cand == dest;
    let cur_stays = cur == dest;
    if cand_stays != cur_stays {
        return cand_stays;
    }
    cand < cur
}

/// Pick the archive sink: minimum cumulative cost, ties broken by fewest
/// provider switches along the reconstructed path, then by lexicographic
/// provider sequence.
fn select_sink(
    archive: &[GraphNode],
    cool: &[GraphNode],
    hot: &[GraphNode],
    cumulative: &[Option<f64>],
    pred: &[Vec<Option<usize>>; 2],
) -> Result<usize, CostError> {
    let min = cumulative
        .iter()
        .flatten()
        .fold(f64::INFINITY, |a, &b| a.min(b));
    if min.is_infinite() {
        return Err(CostError::ConfigurationError(
            "no complete lifecycle path exists".into(),
        ));
    }

    let mut best: Option<(usize, u32, [Provider; 3])> = None;
    for (k, cost) in cumulative.iter().enumerate() {
        let Some(cost) = cost else { continue };
        if *cost > min + COST_EPS {
            continue;
        }
        let Some(mid) = pred[1][k] else { continue };
        let Some(src) = pred[0][mid] else { continue };
        let chain = [
            hot[src].provider,
            cool[mid].provider,
            archive[k].provider,
        ];
        let switches = (chain[0] != chain[1]) as u32 + (chain[1] != chain[2]) as u32;
        let replace = match &best {
            None => true,
            Some((_, cur_switches, cur_chain)) => {
                switches < *cur_switches || (switches == *cur_switches && chain < *cur_chain)
            }
        };
        if replace {
            best = Some((k, switches, chain));
        }
    }
    best.map(|(k, _, _)| k)
        .ok_or_else(|| CostError::ConfigurationError("no complete lifecycle path exists".into()))
}
