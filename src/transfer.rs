//! Transfer cost model and the per-calculation transfer matrix
//!
//! Pricing rules, applied in priority order:
//!
//! 1. Same provider, same physical service, tier reclassification only
//!    (Cool -> Archive inside one object store): $0, a lifecycle policy
//!    change with no egress.
//! 2. Same provider, different managed service (document DB -> object
//!    store, or a pipeline layer feeding storage): volume x the intra-cloud
//!    transfer rate. Non-zero.
//! 3. Different providers: the source provider's graduated egress bands.
//!
//! Every pair the solver or the cascade can ask for is computed once into a
//! [`TransferCostMatrix`] and reused by both the optimizer and every
//! reporting table, so a report can never show $0 where the optimizer used a
//! non-zero figure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CostError;
use crate::pricing::{PriceKey, PricingTable};
use crate::provider::{Layer, Provider, Tier};
use crate::usage::UsageMetrics;

/// The physical service class a tier lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageService {
    /// Hot tier: the provider's document database
    DocumentDb,
    /// Cool and Archive tiers: the provider's object store
    ObjectStore,
}

/// Which physical service holds a tier (the same mapping on every provider)
pub fn storage_service(tier: Tier) -> StorageService {
    match tier {
        Tier::Hot => StorageService::DocumentDb,
        Tier::Cool | Tier::Archive => StorageService::ObjectStore,
    }
}

/// One side of a transfer: a pipeline layer or a storage tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransferPoint {
    /// A non-storage pipeline layer
    Service(Layer),
    /// A storage tier
    Storage(Tier),
}

impl TransferPoint {
    fn label(&self) -> String {
        match self {
            TransferPoint::Service(layer) => layer.code().to_string(),
            TransferPoint::Storage(tier) => format!("L2 {}", tier.label()),
        }
    }
}

/// A (provider, point) endpoint of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    /// Provider hosting the endpoint
    pub provider: Provider,
    /// Layer or tier at the endpoint
    pub point: TransferPoint,
}

impl Endpoint {
    /// Endpoint at a storage tier
    pub fn storage(provider: Provider, tier: Tier) -> Self {
        Self {
            provider,
            point: TransferPoint::Storage(tier),
        }
    }

    /// Endpoint at a pipeline layer
    pub fn service(provider: Provider, layer: Layer) -> Self {
        Self {
            provider,
            point: TransferPoint::Service(layer),
        }
    }
}

/// Price one transfer of `gb` per month between two endpoints
pub fn transfer_cost(
    from: Endpoint,
    to: Endpoint,
    gb: f64,
    pricing: &PricingTable,
) -> Result<f64, CostError> {
    if from.provider == to.provider {
        if let (TransferPoint::Storage(a), TransferPoint::Storage(b)) = (from.point, to.point) {
            if storage_service(a) == storage_service(b) {
                // Tier reclassification inside one service: no data moves.
                return Ok(0.0);
            }
        }
        let rate = pricing.price(from.provider, PriceKey::IntraCloudTransferPerGb)?;
        return Ok(gb * rate);
    }
    pricing.egress_cost(from.provider, gb)
}

/// One row of the transfer matrix, for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRow {
    /// Source label, e.g. `"AWS L2 Hot"`
    pub from: String,
    /// Destination label
    pub to: String,
    /// Cost per month, absent when pricing data was missing
    pub cost: Option<f64>,
    /// The pricing failure, if any
    pub error: Option<String>,
}

/// All transfer costs one calculation can ask for, computed once
///
/// Single source of truth shared by the lifecycle solver, the cascade, and
/// the reporting tables.
#[derive(Debug, Clone)]
pub struct TransferCostMatrix {
    data_size_gb: f64,
    entries: BTreeMap<(Endpoint, Endpoint), f64>,
    failures: BTreeMap<(Endpoint, Endpoint), CostError>,
}

impl TransferCostMatrix {
    /// Build the matrix for the given providers and monthly data volume
    pub fn build(providers: &[Provider], usage: &UsageMetrics, pricing: &PricingTable) -> Self {
        let mut matrix = Self {
            data_size_gb: usage.data_size_gb,
            entries: BTreeMap::new(),
            failures: BTreeMap::new(),
        };

        let gb = usage.data_size_gb;
        let mut insert = |from: Endpoint, to: Endpoint| match transfer_cost(from, to, gb, pricing) {
            Ok(cost) => {
                matrix.entries.insert((from, to), cost);
            }
            Err(err) => {
                matrix.failures.insert((from, to), err);
            }
        };

        // Tier hops for the lifecycle graph.
        for (tier, next) in [(Tier::Hot, Tier::Cool), (Tier::Cool, Tier::Archive)] {
            for &p in providers {
                for &q in providers {
                    insert(Endpoint::storage(p, tier), Endpoint::storage(q, next));
                }
            }
        }

        // Ingestion pushes into the hot store; the other cascade layers pull
        // from it.
        for &p in providers {
            for &q in providers {
                insert(
                    Endpoint::service(p, Layer::Ingestion),
                    Endpoint::storage(q, Tier::Hot),
                );
                for layer in [Layer::Processing, Layer::TwinManagement, Layer::Visualization] {
                    insert(Endpoint::storage(q, Tier::Hot), Endpoint::service(p, layer));
                }
            }
        }

        matrix
    }

    /// Monthly data volume the matrix was priced for
    pub fn data_size_gb(&self) -> f64 {
        self.data_size_gb
    }

    /// Cost for a pair; missing pricing surfaces the recorded error
    pub fn cost(&self, from: Endpoint, to: Endpoint) -> Result<f64, CostError> {
        if let Some(cost) = self.entries.get(&(from, to)) {
            return Ok(*cost);
        }
        if let Some(err) = self.failures.get(&(from, to)) {
            return Err(err.clone());
        }
        Err(CostError::ConfigurationError(format!(
            "transfer pair not in matrix: {} {} -> {} {}",
            from.provider,
            from.point.label(),
            to.provider,
            to.point.label()
        )))
    }

    /// Reporting rows for every computed pair, in deterministic order
    pub fn rows(&self) -> Vec<TransferRow> {
        let mut rows = Vec::with_capacity(self.entries.len() + self.failures.len());
        for ((from, to), cost) in &self.entries {
            rows.push(TransferRow {
                from: format!("{} {}", from.provider, from.point.label()),
                to: format!("{} {}", to.provider, to.point.label()),
                cost: Some(*cost),
                error: None,
            });
        }
        for ((from, to), err) in &self.failures {
            rows.push(TransferRow {
                from: format!("{} {}", from.provider, from.point.label()),
                to: format!("{} {}", to.provider, to.point.label()),
                cost: None,
                error: Some(err.to_string()),
            });
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioParams;

    #[test]
    fn test_same_service_reclassification_is_free() {
        // Reference scenario B: Cool -> Archive inside one provider is $0 at
        // any volume.
        let pricing = PricingTable::with_defaults();
        for gb in [0.0, 1.0, 87_000.0, 5_000_000.0] {
            let cost = transfer_cost(
                Endpoint::storage(Provider::Azure, Tier::Cool),
                Endpoint::storage(Provider::Azure, Tier::Archive),
                gb,
                &pricing,
            )
            .unwrap();
            assert_eq!(cost, 0.0);
        }
    }

    #[test]
    fn test_cross_service_same_cloud_is_not_free() {
        // Reference scenario C: document DB -> object store on one cloud.
        // 87,000 GB at the $0.01/GB intra rate is the historical $870.
        let pricing = PricingTable::with_defaults();
        let cost = transfer_cost(
            Endpoint::storage(Provider::Azure, Tier::Hot),
            Endpoint::storage(Provider::Azure, Tier::Cool),
            87_000.0,
            &pricing,
        )
        .unwrap();
        assert!((cost - 870.0).abs() < 1e-6);
    }

    #[test]
    fn test_cross_cloud_uses_source_egress() {
        let pricing = PricingTable::with_defaults();
        let cost = transfer_cost(
            Endpoint::storage(Provider::Aws, Tier::Cool),
            Endpoint::storage(Provider::Gcp, Tier::Archive),
            100.0,
            &pricing,
        )
        .unwrap();
        // First AWS band: $0.09/GB
        assert!((cost - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_covers_solver_and_cascade_pairs() {
        let usage =
            UsageMetrics::from_scenario(&ScenarioParams::new(1_000, 1.0, 1.0)).unwrap();
        let pricing = PricingTable::with_defaults();
        let matrix = TransferCostMatrix::build(&Provider::ALL, &usage, &pricing);

        for p in Provider::ALL {
            for q in Provider::ALL {
                assert!(matrix
                    .cost(
                        Endpoint::storage(p, Tier::Hot),
                        Endpoint::storage(q, Tier::Cool)
                    )
                    .is_ok());
                assert!(matrix
                    .cost(
                        Endpoint::service(p, Layer::Ingestion),
                        Endpoint::storage(q, Tier::Hot)
                    )
                    .is_ok());
            }
        }
    }

    #[test]
    fn test_matrix_records_failures_instead_of_zero() {
        let usage =
            UsageMetrics::from_scenario(&ScenarioParams::new(1_000, 1.0, 1.0)).unwrap();
        let mut pricing = PricingTable::with_defaults();
        pricing.clear_price(Provider::Gcp, PriceKey::IntraCloudTransferPerGb);
        let matrix = TransferCostMatrix::build(&Provider::ALL, &usage, &pricing);

        let result = matrix.cost(
            Endpoint::storage(Provider::Gcp, Tier::Hot),
            Endpoint::storage(Provider::Gcp, Tier::Cool),
        );
        assert!(matches!(
            result,
            Err(CostError::PricingDataMissing { .. })
        ));
    }
}
