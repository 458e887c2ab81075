use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use batna_models::BaselineConfig;

use crate::error::EstimatorError;
use crate::generator::Scenario;

/// A strategy's guess at both reservation values for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatnaEstimate {
    pub estimated_buyer_batna: f64,
    pub estimated_seller_batna: f64,
}

impl BatnaEstimate {
    fn validated(self, index: usize) -> Result<Self, EstimatorError> {
        for (field, value) in [
            ("estimated_buyer_batna", self.estimated_buyer_batna),
            ("estimated_seller_batna", self.estimated_seller_batna),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EstimatorError::Invalid {
                    index,
                    field,
                    value,
                });
            }
        }
        Ok(self)
    }
}

/// Source of BATNA estimates for a batch. Mockable for testing.
///
/// Estimates are produced once per scenario before its session starts;
/// a session never calls back into the estimator.
#[async_trait]
pub trait BatnaEstimator: Send + Sync {
    fn name(&self) -> &str;

    async fn estimate(&self, scenario: &Scenario) -> Result<BatnaEstimate, EstimatorError>;
}

/// Fixed-margin heuristic around the asking price.
pub struct BaselineEstimator {
    config: BaselineConfig,
}

impl BaselineEstimator {
    pub fn new(config: BaselineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BatnaEstimator for BaselineEstimator {
    fn name(&self) -> &str {
        "baseline"
    }

    async fn estimate(&self, scenario: &Scenario) -> Result<BatnaEstimate, EstimatorError> {
        BatnaEstimate {
            estimated_buyer_batna: scenario.starting_price * (1.0 + self.config.buyer_margin),
            estimated_seller_batna: scenario.starting_price * (1.0 - self.config.seller_margin),
        }
        .validated(scenario.index)
    }
}

/// Perfect information. An upper reference for what estimation can buy.
pub struct OracleEstimator;

#[async_trait]
impl BatnaEstimator for OracleEstimator {
    fn name(&self) -> &str {
        "oracle"
    }

    async fn estimate(&self, scenario: &Scenario) -> Result<BatnaEstimate, EstimatorError> {
        Ok(BatnaEstimate {
            estimated_buyer_batna: scenario.buyer_batna,
            estimated_seller_batna: scenario.seller_batna,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PrecomputedEntry {
    index: usize,
    estimated_buyer_batna: f64,
    estimated_seller_batna: f64,
}

/// Estimates produced offline (e.g. by a trained model), keyed by scenario index.
///
/// The file is a JSON array of
/// `{"index": 0, "estimated_buyer_batna": 540.0, "estimated_seller_batna": 455.5}`.
pub struct PrecomputedEstimator {
    name: String,
    estimates: HashMap<usize, BatnaEstimate>,
}

impl PrecomputedEstimator {
    pub fn from_json(name: &str, json: &str) -> Result<Self, EstimatorError> {
        let entries: Vec<PrecomputedEntry> = serde_json::from_str(json)?;
        let estimates = entries
            .into_iter()
            .map(|e| {
                (
                    e.index,
                    BatnaEstimate {
                        estimated_buyer_batna: e.estimated_buyer_batna,
                        estimated_seller_batna: e.estimated_seller_batna,
                    },
                )
            })
            .collect();
        Ok(Self {
            name: name.to_string(),
            estimates,
        })
    }

    pub fn from_path(name: &str, path: &Path) -> Result<Self, EstimatorError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(name, &json)
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

#[async_trait]
impl BatnaEstimator for PrecomputedEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn estimate(&self, scenario: &Scenario) -> Result<BatnaEstimate, EstimatorError> {
        self.estimates
            .get(&scenario.index)
            .copied()
            .ok_or(EstimatorError::Missing(scenario.index))?
            .validated(scenario.index)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use batna_models::Profile;

    pub fn scenario(index: usize) -> Scenario {
        Scenario {
            index,
            starting_price: 500.0,
            buyer_batna: 560.0,
            seller_batna: 440.0,
            buyer_profile: Profile::Diplomat,
            seller_profile: Profile::Diplomat,
            month_to_key: 6,
            random_seed: 42,
        }
    }

    /// Fails on every scenario whose index is listed.
    pub struct FlakyEstimator {
        pub failing: Vec<usize>,
    }

    #[async_trait]
    impl BatnaEstimator for FlakyEstimator {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn estimate(&self, scenario: &Scenario) -> Result<BatnaEstimate, EstimatorError> {
            if self.failing.contains(&scenario.index) {
                return Err(EstimatorError::Unavailable("mock failure".to_string()));
            }
            OracleEstimator.estimate(scenario).await
        }
    }

    #[tokio::test]
    async fn baseline_applies_margins() {
        let estimator = BaselineEstimator::new(BaselineConfig {
            seller_margin: 0.1,
            buyer_margin: 0.2,
        });
        let estimate = estimator.estimate(&scenario(0)).await.unwrap();
        assert!((estimate.estimated_seller_batna - 450.0).abs() < 1e-9);
        assert!((estimate.estimated_buyer_batna - 600.0).abs() < 1e-9);
        assert_eq!(estimator.name(), "baseline");
    }

    #[tokio::test]
    async fn baseline_rejects_negative_estimate() {
        let estimator = BaselineEstimator::new(BaselineConfig {
            seller_margin: 1.5,
            buyer_margin: 0.1,
        });
        let err = estimator.estimate(&scenario(3)).await.unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::Invalid {
                index: 3,
                field: "estimated_seller_batna",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn oracle_returns_true_values() {
        let estimate = OracleEstimator.estimate(&scenario(0)).await.unwrap();
        assert_eq!(estimate.estimated_buyer_batna, 560.0);
        assert_eq!(estimate.estimated_seller_batna, 440.0);
    }

    #[tokio::test]
    async fn precomputed_lookup_by_index() {
        let json = r#"[
            {"index": 0, "estimated_buyer_batna": 540.0, "estimated_seller_batna": 455.5},
            {"index": 2, "estimated_buyer_batna": 530.0, "estimated_seller_batna": 470.0}
        ]"#;
        let estimator = PrecomputedEstimator::from_json("model", json).unwrap();
        assert_eq!(estimator.len(), 2);
        assert_eq!(estimator.name(), "model");

        let estimate = estimator.estimate(&scenario(2)).await.unwrap();
        assert_eq!(estimate.estimated_buyer_batna, 530.0);

        let missing = estimator.estimate(&scenario(1)).await.unwrap_err();
        assert!(matches!(missing, EstimatorError::Missing(1)));
    }

    #[test]
    fn precomputed_rejects_malformed_json() {
        assert!(matches!(
            PrecomputedEstimator::from_json("model", "{not json"),
            Err(EstimatorError::Json(_))
        ));
    }

    #[test]
    fn precomputed_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimates.json");
        std::fs::write(
            &path,
            r#"[{"index": 5, "estimated_buyer_batna": 1.0, "estimated_seller_batna": 2.0}]"#,
        )
        .unwrap();
        let estimator = PrecomputedEstimator::from_path("file", &path).unwrap();
        assert!(!estimator.is_empty());
    }
}
