//! Decision policy configuration

use claimwise_domain::NETWORK_CITIES;
use serde::{Deserialize, Serialize};

/// Per-factor weights; must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorWeights {
    /// Age appropriateness weight
    pub age: f64,
    /// Procedure coverage weight
    pub procedure: f64,
    /// Location network weight
    pub location: f64,
    /// Policy duration weight
    pub duration: f64,
    /// Claim amount weight
    pub amount: f64,
}

impl FactorWeights {
    const SUM_TOLERANCE: f64 = 1e-6;

    /// Validate that the weights are non-negative and sum to 1.0
    pub fn validate(&self) -> Result<(), String> {
        let all = [self.age, self.procedure, self.location, self.duration, self.amount];
        if all.iter().any(|w| *w < 0.0) {
            return Err("weights must be non-negative".to_string());
        }
        let sum: f64 = all.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(format!("weights must sum to 1.0 (got {})", sum));
        }
        Ok(())
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            age: 0.15,
            procedure: 0.30,
            location: 0.15,
            duration: 0.25,
            amount: 0.15,
        }
    }
}

/// Everything the evaluator needs besides the query and retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// Per-factor weights
    pub weights: FactorWeights,

    /// Cities with network hospitals
    pub network_cities: Vec<String>,

    /// Confidence below this is an outright rejection
    pub reject_threshold: f64,

    /// Confidence at or above this earns the full coverage tier
    pub full_tier_threshold: f64,

    /// Confidence at or above this earns the standard coverage tier
    pub standard_tier_threshold: f64,

    /// Coverage ratio for the full tier
    pub full_tier_coverage: f64,

    /// Coverage ratio for the standard tier
    pub standard_tier_coverage: f64,

    /// Coverage ratio for the minimum approved tier
    pub minimum_tier_coverage: f64,

    /// Fallback claim limit when no clause states one
    pub default_policy_limit: u64,

    /// Claim amounts at or above this are tagged high-value
    pub high_value_threshold: u64,

    /// Claimants younger than this cannot receive complex procedures
    pub minor_age: u32,
}

impl DecisionPolicy {
    /// Validate thresholds, tiers, and weights
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()?;
        for (name, value) in [
            ("reject_threshold", self.reject_threshold),
            ("full_tier_threshold", self.full_tier_threshold),
            ("standard_tier_threshold", self.standard_tier_threshold),
            ("full_tier_coverage", self.full_tier_coverage),
            ("standard_tier_coverage", self.standard_tier_coverage),
            ("minimum_tier_coverage", self.minimum_tier_coverage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1]", name));
            }
        }
        if self.reject_threshold >= self.standard_tier_threshold
            || self.standard_tier_threshold >= self.full_tier_threshold
        {
            return Err("thresholds must be ordered reject < standard < full".to_string());
        }
        if self.default_policy_limit == 0 {
            return Err("default_policy_limit must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Whether a city has network hospitals
    pub fn is_network_city(&self, city: &str) -> bool {
        self.network_cities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(city.trim()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            network_cities: NETWORK_CITIES.iter().map(|s| s.to_string()).collect(),
            reject_threshold: 0.3,
            full_tier_threshold: 0.8,
            standard_tier_threshold: 0.6,
            full_tier_coverage: 0.95,
            standard_tier_coverage: 0.80,
            minimum_tier_coverage: 0.60,
            default_policy_limit: 500_000,
            high_value_threshold: 100_000,
            minor_age: 18,
        }
    }
}
