use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};

/// Configuration for a `compare_strategies` run.
///
/// # Fields
/// - `num_classes`, `num_features`, `num_samples` — shape of the random
///   problem generated when no fixture is supplied
/// - `reg`         — L2 regularization strength
/// - `seed`        — RNG seed for the random problem and gradient probes
/// - `repeats`     — timed evaluations per strategy; the mean is reported
/// - `grad_checks` — number of random entries probed by the sparse gradient
///   check; `0` skips it
/// - `tolerance`   — largest loss / gradient difference still counted as
///   agreement between strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub num_classes: usize,
    pub num_features: usize,
    pub num_samples: usize,
    pub reg: f64,
    pub seed: u64,
    pub repeats: usize,
    pub grad_checks: usize,
    pub tolerance: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        CompareConfig {
            num_classes: 10,
            num_features: 64,
            num_samples: 500,
            reg: 5e-6,
            seed: 0,
            repeats: 3,
            grad_checks: 10,
            tolerance: 1e-7,
        }
    }
}

impl CompareConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_classes == 0 || self.num_features == 0 || self.num_samples == 0 {
            return Err(LossError::InvalidInput("problem dimensions must be non-zero"));
        }
        if self.repeats == 0 {
            return Err(LossError::InvalidInput("repeats must be at least 1"));
        }
        if !(self.tolerance >= 0.0) {
            return Err(LossError::InvalidInput("tolerance must be non-negative"));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file; missing fields take their
    /// default values.
    pub fn load_json(path: &str) -> Result<CompareConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: CompareConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: CompareConfig = serde_json::from_str(r#"{"num_samples": 7, "seed": 42}"#).unwrap();
        assert_eq!(config.num_samples, 7);
        assert_eq!(config.seed, 42);
        assert_eq!(config.num_classes, CompareConfig::default().num_classes);
    }

    #[test]
    fn rejects_zero_repeats() {
        let config = CompareConfig { repeats: 0, ..CompareConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let config = CompareConfig { num_classes: 4, reg: 0.25, ..CompareConfig::default() };
        let path = std::env::temp_dir().join(format!("softmax-linear-config-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        config.save_json(path).unwrap();
        let back = CompareConfig::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(back, config);
    }
}
