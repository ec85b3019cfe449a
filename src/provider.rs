//! Cloud provider, pipeline layer, and storage tier definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cloud provider
///
/// Variant order is the fixed lexicographic tie-break order used by the
/// lifecycle solver and the layer cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Amazon Web Services
    Aws,
    /// Microsoft Azure
    Azure,
    /// Google Cloud Platform
    Gcp,
}

impl Provider {
    /// All providers in tie-break order.
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Azure, Provider::Gcp];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
        }
    }

    /// Display label used in path labels and reports
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Azure => "Azure",
            Provider::Gcp => "GCP",
        }
    }

    /// Parse from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" => Some(Provider::Aws),
            "azure" => Some(Provider::Azure),
            "gcp" => Some(Provider::Gcp),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Storage tier within the lifecycle
///
/// The explicit tier index makes the lifecycle graph a DAG by construction:
/// edges only ever go from index `n` to index `n + 1`, so no tier can be
/// skipped or revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Frequently accessed, most expensive per GB
    Hot,
    /// Infrequently accessed
    Cool,
    /// Long-term retention, cheapest per GB
    Archive,
}

impl Tier {
    /// All tiers in lifecycle order.
    pub const ALL: [Tier; 3] = [Tier::Hot, Tier::Cool, Tier::Archive];

    /// Position in the lifecycle (Hot = 0, Cool = 1, Archive = 2)
    pub fn index(&self) -> usize {
        match self {
            Tier::Hot => 0,
            Tier::Cool => 1,
            Tier::Archive => 2,
        }
    }

    /// The next tier in the lifecycle, if any
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Hot => Some(Tier::Cool),
            Tier::Cool => Some(Tier::Archive),
            Tier::Archive => None,
        }
    }

    /// Display label used in path labels and reports
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Hot => "Hot",
            Tier::Cool => "Cool",
            Tier::Archive => "Archive",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// L1: device message ingestion
    Ingestion,
    /// L2: tiered storage lifecycle (decided by the path solver, not the cascade)
    Storage,
    /// L3: stream processing / enrichment
    Processing,
    /// L4: digital twin management
    TwinManagement,
    /// L5: dashboards and visualization
    Visualization,
}

impl Layer {
    /// The layers decided by the anchor-relative cascade, in pipeline order.
    pub const CASCADE: [Layer; 4] = [
        Layer::Ingestion,
        Layer::Processing,
        Layer::TwinManagement,
        Layer::Visualization,
    ];

    /// Short layer code used in path labels (`L1` .. `L5`)
    pub fn code(&self) -> &'static str {
        match self {
            Layer::Ingestion => "L1",
            Layer::Storage => "L2",
            Layer::Processing => "L3",
            Layer::TwinManagement => "L4",
            Layer::Visualization => "L5",
        }
    }

    /// Human-readable layer name
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Ingestion => "ingestion",
            Layer::Storage => "storage",
            Layer::Processing => "processing",
            Layer::TwinManagement => "twin management",
            Layer::Visualization => "visualization",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roundtrip() {
        for p in Provider::ALL {
            assert_eq!(Provider::from_str(p.as_str()), Some(p));
        }
        assert_eq!(Provider::from_str("oracle"), None);
    }

    #[test]
    fn test_tie_break_order() {
        assert!(Provider::Aws < Provider::Azure);
        assert!(Provider::Azure < Provider::Gcp);
    }

    #[test]
    fn test_tier_ordering() {
        assert_eq!(Tier::Hot.index(), 0);
        assert_eq!(Tier::Hot.next(), Some(Tier::Cool));
        assert_eq!(Tier::Cool.next(), Some(Tier::Archive));
        assert_eq!(Tier::Archive.next(), None);
    }

    #[test]
    fn test_layer_codes() {
        assert_eq!(Layer::Ingestion.code(), "L1");
        assert_eq!(Layer::Visualization.code(), "L5");
        assert_eq!(Layer::CASCADE.len(), 4);
    }
}
