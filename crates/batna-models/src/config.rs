use serde::{Deserialize, Serialize};

/// Top-level configuration for batch simulation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How many negotiations to run and how to seed them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    #[serde(default = "default_count")]
    pub count: usize,
    /// Fixes the scenario sequence. Comparison runs need this to be set.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Maximum number of sessions running at once.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            seed: None,
            parallelism: default_parallelism(),
        }
    }
}

/// Distributions the scenario generator draws from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    #[serde(default = "default_min_price")]
    pub min_starting_price: f64,
    #[serde(default = "default_max_price")]
    pub max_starting_price: f64,
    /// seller_batna = starting_price * (1 - p), p ~ U(0, max_seller_discount).
    #[serde(default = "default_spread")]
    pub max_seller_discount: f64,
    /// buyer_batna = starting_price * (1 + q), q ~ U(0, max_buyer_premium).
    #[serde(default = "default_spread")]
    pub max_buyer_premium: f64,
    /// Initial month_to_key ~ U{0..=max_initial_month}. May exceed the session clamp.
    #[serde(default = "default_max_initial_month")]
    pub max_initial_month: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_starting_price: default_min_price(),
            max_starting_price: default_max_price(),
            max_seller_discount: default_spread(),
            max_buyer_premium: default_spread(),
            max_initial_month: default_max_initial_month(),
        }
    }
}

/// Margins used by the baseline BATNA heuristic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaselineConfig {
    /// Estimated seller BATNA = starting_price * (1 - seller_margin).
    #[serde(default = "default_margin")]
    pub seller_margin: f64,
    /// Estimated buyer BATNA = starting_price * (1 + buyer_margin).
    #[serde(default = "default_margin")]
    pub buyer_margin: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            seller_margin: default_margin(),
            buyer_margin: default_margin(),
        }
    }
}

/// Where the archiver writes results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// Write the per-session JSON bundles alongside the CSV.
    #[serde(default = "default_true")]
    pub write_bundles: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_bundles: true,
        }
    }
}

fn default_count() -> usize {
    100
}
fn default_parallelism() -> usize {
    8
}
fn default_min_price() -> f64 {
    250.0
}
fn default_max_price() -> f64 {
    1000.0
}
fn default_spread() -> f64 {
    0.2
}
fn default_max_initial_month() -> u32 {
    16
}
fn default_margin() -> f64 {
    0.1
}
fn default_output_dir() -> String {
    "output".to_string()
}
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_sim_config() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn defaults_match_generator_distribution() {
        let generator = GeneratorConfig::default();
        assert_eq!(generator.min_starting_price, 250.0);
        assert_eq!(generator.max_starting_price, 1000.0);
        assert_eq!(generator.max_seller_discount, 0.2);
        assert_eq!(generator.max_buyer_premium, 0.2);
        assert_eq!(generator.max_initial_month, 16);
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[batch]
count = 250
seed = 7
parallelism = 4

[generator]
min_starting_price = 300.0
max_starting_price = 900.0

[baseline]
seller_margin = 0.05

[output]
dir = "/tmp/batna-out"
write_bundles = false
"#;

        let config: SimConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.batch.count, 250);
        assert_eq!(config.batch.seed, Some(7));
        assert_eq!(config.generator.min_starting_price, 300.0);
        assert_eq!(config.generator.max_buyer_premium, 0.2);
        assert_eq!(config.baseline.seller_margin, 0.05);
        assert_eq!(config.baseline.buyer_margin, 0.1);
        assert!(!config.output.write_bundles);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: SimConfig = toml::from_str("").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.batch.seed, None);
        assert_eq!(config.output.dir, "output");
    }
}
