#![forbid(unsafe_code)]
//! # tierlift
//!
//! Cost engine for a layered IoT-to-dashboard pipeline replicated across
//! AWS, Azure, and GCP. Given a usage scenario and an immutable pricing
//! snapshot, it prices every layer on every provider, solves the tiered
//! storage lifecycle (Hot -> Cool -> Archive) as a shortest-path problem,
//! and decides the remaining layers relative to the resolved storage anchor.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Cost Engine                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌────────┐   ┌──────────┐   ┌───────────┐   ┌───────────┐ │
//! │  │ Usage  │   │ Transfer │   │ Lifecycle │   │   Layer   │ │
//! │  │ Model  │──▶│  Matrix  │──▶│  Solver   │──▶│  Cascade  │ │
//! │  └────────┘   └──────────┘   └───────────┘   └───────────┘ │
//! │      │             │              │                │        │
//! │      ▼             ▼              ▼                ▼        │
//! │  Per-layer     Priced once,   Min-cost path    Anchor-     │
//! │  metrics       reused by      + lookahead      relative    │
//! │                every table    per node         choices     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure function of `(ScenarioParams, PricingTable)`:
//! nothing persists across calls, no step performs I/O, and the bounded
//! graph (at most 9 lifecycle nodes) completes in well under a second.
//! Pricing retrieval, HTTP surfaces, and dashboards live outside this crate
//! and call [`CostEngine::calculate`] as a library function.

pub mod calculators;
pub mod cascade;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod provider;
pub mod report;
pub mod scenario;
pub mod transfer;
pub mod usage;

pub use calculators::{calculator_for, CostCalculator, LayerCostResult};
pub use cascade::{LayerComparison, LayerDecision};
pub use engine::CostEngine;
pub use error::CostError;
pub use lifecycle::{LifecycleNode, LifecycleSolution, NodeCost, PathResult};
pub use pricing::{EgressBand, Price, PriceKey, PriceSource, PricingTable, ProviderPricing};
pub use provider::{Layer, Provider, Tier};
pub use report::{CalculationResult, ProviderChoices, SavingsSummary};
pub use scenario::ScenarioParams;
pub use transfer::{transfer_cost, Endpoint, TransferCostMatrix, TransferPoint};
pub use usage::UsageMetrics;
