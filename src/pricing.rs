//! Immutable pricing snapshot threaded through every calculator
//!
//! The table is assembled out of band by the pricing-fetch subsystem and
//! passed in whole; the engine never mutates it. Every field is either a
//! fetched value or an explicitly flagged static default, so a missing price
//! can never silently render as $0.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CostError;
use crate::provider::Provider;

/// Where a price value came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PriceSource {
    /// Retrieved from the provider's billing API at the given time
    Fetched(DateTime<Utc>),
    /// Built-in list price used when the fetch subsystem had no value
    StaticDefault,
}

/// A single price field with provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Price in USD, in the unit named by its [`PriceKey`]
    pub amount: f64,
    /// Provenance flag
    pub source: PriceSource,
}

impl Price {
    /// A flagged static default
    pub fn default_of(amount: f64) -> Self {
        Self {
            amount,
            source: PriceSource::StaticDefault,
        }
    }

    /// A fetched value with its retrieval timestamp
    pub fn fetched(amount: f64, at: DateTime<Utc>) -> Self {
        Self {
            amount,
            source: PriceSource::Fetched(at),
        }
    }
}

/// Identifies one price field in a provider's table
///
/// The unit is part of the name; calculators convert each unit exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PriceKey {
    /// Ingestion service, USD per million device messages
    IngestionPerMillionMessages,
    /// Bridging serverless function, USD per million invocations
    GlueFunctionPerMillionInvocations,
    /// Hot tier (document DB), USD per GB-month
    HotStoragePerGbMonth,
    /// Cool tier (object store), USD per GB-month
    CoolStoragePerGbMonth,
    /// Archive tier (object store), USD per GB-month
    ArchiveStoragePerGbMonth,
    /// Stream processing, USD per 1,000 state transitions
    ProcessingPer1kTransitions,
    /// Twin operations, USD per million twin updates
    TwinOpsPerMillion,
    /// Dashboard seat, USD per user-month
    VisualizationPerUserMonth,
    /// 3D scene hosting, flat USD per month
    Visualization3dScenePerMonth,
    /// Same-cloud cross-service data movement, USD per GB
    IntraCloudTransferPerGb,
    /// Cross-cloud egress; priced through the provider's volume bands
    EgressPerGb,
}

impl fmt::Display for PriceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceKey::IngestionPerMillionMessages => "ingestion (per million messages)",
            PriceKey::GlueFunctionPerMillionInvocations => "glue function (per million invocations)",
            PriceKey::HotStoragePerGbMonth => "hot storage (per GB-month)",
            PriceKey::CoolStoragePerGbMonth => "cool storage (per GB-month)",
            PriceKey::ArchiveStoragePerGbMonth => "archive storage (per GB-month)",
            PriceKey::ProcessingPer1kTransitions => "processing (per 1,000 transitions)",
            PriceKey::TwinOpsPerMillion => "twin operations (per million updates)",
            PriceKey::VisualizationPerUserMonth => "visualization seat (per user-month)",
            PriceKey::Visualization3dScenePerMonth => "3D scene hosting (per month)",
            PriceKey::IntraCloudTransferPerGb => "intra-cloud transfer (per GB)",
            PriceKey::EgressPerGb => "egress (per GB)",
        };
        f.write_str(name)
    }
}

/// One graduated egress volume band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EgressBand {
    /// Upper bound of the band in GB per month; `None` = unbounded last band
    pub up_to_gb: Option<f64>,
    /// USD per GB within this band
    pub per_gb: f64,
}

/// Price fields for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderPricing {
    prices: BTreeMap<PriceKey, Price>,
    egress_bands: Vec<EgressBand>,
}

impl ProviderPricing {
    /// Create an empty provider table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a price field
    pub fn with_price(mut self, key: PriceKey, price: Price) -> Self {
        self.prices.insert(key, price);
        self
    }

    /// Set the graduated egress bands
    pub fn with_egress_bands(mut self, bands: Vec<EgressBand>) -> Self {
        self.egress_bands = bands;
        self
    }

    /// Look up a price field
    pub fn price(&self, key: PriceKey) -> Option<&Price> {
        self.prices.get(&key)
    }
}

/// Complete pricing snapshot across providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    providers: BTreeMap<Provider, ProviderPricing>,
    /// When the snapshot was assembled
    fetched_at: DateTime<Utc>,
}

impl PricingTable {
    /// Create an empty table stamped with the given assembly time
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            providers: BTreeMap::new(),
            fetched_at,
        }
    }

    /// Built-in list prices for all three providers, every field flagged
    /// [`PriceSource::StaticDefault`]
    pub fn with_defaults() -> Self {
        let mut table = Self::new(Utc::now());

        // AWS: IoT Core ingest, DynamoDB hot, S3 IA / Glacier Deep cool+archive
        table.providers.insert(
            Provider::Aws,
            ProviderPricing::new()
                .with_price(
                    PriceKey::IngestionPerMillionMessages,
                    Price::default_of(1.00),
                )
                .with_price(
                    PriceKey::GlueFunctionPerMillionInvocations,
                    Price::default_of(0.20),
                )
                .with_price(PriceKey::HotStoragePerGbMonth, Price::default_of(0.25))
                .with_price(PriceKey::CoolStoragePerGbMonth, Price::default_of(0.0125))
                .with_price(PriceKey::ArchiveStoragePerGbMonth, Price::default_of(0.004))
                .with_price(PriceKey::ProcessingPer1kTransitions, Price::default_of(0.025))
                .with_price(PriceKey::TwinOpsPerMillion, Price::default_of(1.00))
                .with_price(PriceKey::VisualizationPerUserMonth, Price::default_of(18.00))
                .with_price(
                    PriceKey::Visualization3dScenePerMonth,
                    Price::default_of(5.00),
                )
                .with_price(PriceKey::IntraCloudTransferPerGb, Price::default_of(0.01))
                .with_egress_bands(vec![
                    EgressBand {
                        up_to_gb: Some(10_240.0),
                        per_gb: 0.09,
                    },
                    EgressBand {
                        up_to_gb: Some(51_200.0),
                        per_gb: 0.085,
                    },
                    EgressBand {
                        up_to_gb: Some(153_600.0),
                        per_gb: 0.07,
                    },
                    EgressBand {
                        up_to_gb: None,
                        per_gb: 0.05,
                    },
                ]),
        );

        // Azure: IoT Hub ingest, Cosmos DB hot, Blob Cool / Blob Archive
        table.providers.insert(
            Provider::Azure,
            ProviderPricing::new()
                .with_price(
                    PriceKey::IngestionPerMillionMessages,
                    Price::default_of(0.80),
                )
                .with_price(
                    PriceKey::GlueFunctionPerMillionInvocations,
                    Price::default_of(0.20),
                )
                .with_price(PriceKey::HotStoragePerGbMonth, Price::default_of(0.25))
                .with_price(PriceKey::CoolStoragePerGbMonth, Price::default_of(0.01))
                .with_price(PriceKey::ArchiveStoragePerGbMonth, Price::default_of(0.002))
                .with_price(PriceKey::ProcessingPer1kTransitions, Price::default_of(0.025))
                .with_price(PriceKey::TwinOpsPerMillion, Price::default_of(1.00))
                .with_price(PriceKey::VisualizationPerUserMonth, Price::default_of(10.00))
                .with_price(
                    PriceKey::Visualization3dScenePerMonth,
                    Price::default_of(4.00),
                )
                .with_price(PriceKey::IntraCloudTransferPerGb, Price::default_of(0.01))
                .with_egress_bands(vec![
                    EgressBand {
                        up_to_gb: Some(10_240.0),
                        per_gb: 0.087,
                    },
                    EgressBand {
                        up_to_gb: Some(51_200.0),
                        per_gb: 0.083,
                    },
                    EgressBand {
                        up_to_gb: Some(153_600.0),
                        per_gb: 0.07,
                    },
                    EgressBand {
                        up_to_gb: None,
                        per_gb: 0.05,
                    },
                ]),
        );

        // GCP: Pub/Sub ingest, Firestore hot, Nearline / Archive object store.
        // No managed twin service, so TwinOpsPerMillion is intentionally absent.
        table.providers.insert(
            Provider::Gcp,
            ProviderPricing::new()
                .with_price(
                    PriceKey::IngestionPerMillionMessages,
                    Price::default_of(0.60),
                )
                .with_price(
                    PriceKey::GlueFunctionPerMillionInvocations,
                    Price::default_of(0.40),
                )
                .with_price(PriceKey::HotStoragePerGbMonth, Price::default_of(0.18))
                .with_price(PriceKey::CoolStoragePerGbMonth, Price::default_of(0.01))
                .with_price(
                    PriceKey::ArchiveStoragePerGbMonth,
                    Price::default_of(0.0025),
                )
                .with_price(PriceKey::ProcessingPer1kTransitions, Price::default_of(0.04))
                .with_price(PriceKey::VisualizationPerUserMonth, Price::default_of(9.00))
                .with_price(
                    PriceKey::Visualization3dScenePerMonth,
                    Price::default_of(6.00),
                )
                .with_price(PriceKey::IntraCloudTransferPerGb, Price::default_of(0.01))
                .with_egress_bands(vec![
                    EgressBand {
                        up_to_gb: Some(1_024.0),
                        per_gb: 0.12,
                    },
                    EgressBand {
                        up_to_gb: Some(10_240.0),
                        per_gb: 0.11,
                    },
                    EgressBand {
                        up_to_gb: None,
                        per_gb: 0.08,
                    },
                ]),
        );

        table
    }

    /// Replace or insert a provider's pricing
    pub fn with_provider(mut self, provider: Provider, pricing: ProviderPricing) -> Self {
        self.providers.insert(provider, pricing);
        self
    }

    /// Set one price field on a provider already in the table
    pub fn set_price(&mut self, provider: Provider, key: PriceKey, price: Price) {
        self.providers
            .entry(provider)
            .or_default()
            .prices
            .insert(key, price);
    }

    /// Replace a provider's egress bands
    pub fn set_egress_bands(&mut self, provider: Provider, bands: Vec<EgressBand>) {
        self.providers.entry(provider).or_default().egress_bands = bands;
    }

    /// Remove one price field; used by tests to model fetch gaps
    pub fn clear_price(&mut self, provider: Provider, key: PriceKey) {
        if let Some(p) = self.providers.get_mut(&provider) {
            p.prices.remove(&key);
        }
    }

    /// Providers present in the snapshot, in tie-break order
    pub fn providers(&self) -> Vec<Provider> {
        self.providers.keys().copied().collect()
    }

    /// Snapshot assembly time
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Whether the snapshot is older than `max_age`
    pub fn is_stale(&self, max_age: Duration) -> bool {
        Utc::now() - self.fetched_at > max_age
    }

    /// Look up a price field with provenance
    pub fn price_entry(&self, provider: Provider, key: PriceKey) -> Option<&Price> {
        self.providers.get(&provider)?.prices.get(&key)
    }

    /// Look up a price amount, failing with [`CostError::PricingDataMissing`]
    /// when the field is absent
    pub fn price(&self, provider: Provider, key: PriceKey) -> Result<f64, CostError> {
        self.price_entry(provider, key)
            .map(|p| p.amount)
            .ok_or(CostError::PricingDataMissing { provider, price: key })
    }

    /// Graduated egress cost for `gb` leaving `provider` in one month
    ///
    /// Each band rate applies only to the volume inside the band, so the
    /// total is monotone in volume.
    pub fn egress_cost(&self, provider: Provider, gb: f64) -> Result<f64, CostError> {
        let bands = self
            .providers
            .get(&provider)
            .map(|p| p.egress_bands.as_slice())
            .unwrap_or(&[]);
        if bands.is_empty() {
            return Err(CostError::PricingDataMissing {
                provider,
                price: PriceKey::EgressPerGb,
            });
        }

        let mut remaining = gb.max(0.0);
        let mut floor = 0.0;
        let mut total = 0.0;
        for band in bands {
            let width = match band.up_to_gb {
                Some(up_to) => (up_to - floor).max(0.0),
                None => f64::INFINITY,
            };
            let in_band = remaining.min(width);
            total += in_band * band.per_gb;
            remaining -= in_band;
            if remaining <= 0.0 {
                break;
            }
            if let Some(up_to) = band.up_to_gb {
                floor = up_to;
            }
        }
        Ok(total)
    }
}
