use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::config_with_check::ConfigWithCheck;
use crate::common::sats_exception::{ErrCode, SatsError};

pub const DEFAULT_ROLL_N: usize = 200;
pub const DEFAULT_ALPHA: f64 = 1.25;
pub const DEFAULT_MIN_WEIGHT: f64 = 1e-5;

/// Tolerance for the sum-to-one post-condition
pub const SUM_TOLERANCE: f64 = 1e-8;

/// Weight model configuration, shared by the feature builder and the allocator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Trailing window for the moving average and std dev
    pub roll_n: usize,

    /// Boost factor applied to the z-score
    pub alpha: f64,

    /// Lower bound for every day's weight
    pub min_weight: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            roll_n: DEFAULT_ROLL_N,
            alpha: DEFAULT_ALPHA,
            min_weight: DEFAULT_MIN_WEIGHT,
        }
    }
}

impl WeightConfig {
    pub fn new(conf: Option<HashMap<String, serde_json::Value>>) -> Result<Self, SatsError> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());
        let default = Self::default();

        let config = Self {
            roll_n: conf.take("roll_n")?.unwrap_or(default.roll_n),
            alpha: conf.take("alpha")?.unwrap_or(default.alpha),
            min_weight: conf.take("min_weight")?.unwrap_or(default.min_weight),
        };

        conf.check()?;
        config.validate()?;
        Ok(config)
    }

    /// Load overrides from a JSON object file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SatsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SatsError::new(
                format!("cannot open config {}: {}", path.display(), e),
                ErrCode::ConfigError,
            )
        })?;
        let conf: HashMap<String, serde_json::Value> =
            serde_json::from_reader(BufReader::new(file))?;
        Self::new(Some(conf))
    }

    pub fn validate(&self) -> Result<(), SatsError> {
        if self.roll_n == 0 {
            return Err(SatsError::new("roll_n must be at least 1", ErrCode::ConfigError));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(SatsError::new(
                format!("alpha must be finite and non-negative, got {}", self.alpha),
                ErrCode::ConfigError,
            ));
        }
        if !(self.min_weight > 0.0 && self.min_weight < 1.0) {
            return Err(SatsError::new(
                format!("min_weight must be in (0, 1), got {}", self.min_weight),
                ErrCode::ConfigError,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WeightConfig::new(None).unwrap();
        assert_eq!(config.roll_n, 200);
        assert_eq!(config.alpha, 1.25);
        assert_eq!(config.min_weight, 1e-5);
        assert_eq!(config, WeightConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = WeightConfig::new(Some(HashMap::from([
            ("roll_n".to_string(), json!(30)),
            ("alpha".to_string(), json!(0.5)),
        ])))
        .unwrap();
        assert_eq!(config.roll_n, 30);
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.min_weight, DEFAULT_MIN_WEIGHT);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = WeightConfig::new(Some(HashMap::from([(
            "beta".to_string(),
            json!(1.0),
        )])))
        .unwrap_err();
        assert_eq!(err.errcode, ErrCode::ParaError);
    }

    #[test]
    fn test_validation() {
        let bad = [
            ("roll_n", json!(0)),
            ("alpha", json!(-1.0)),
            ("min_weight", json!(0.0)),
            ("min_weight", json!(1.5)),
        ];
        for (key, value) in bad {
            let err = WeightConfig::new(Some(HashMap::from([(key.to_string(), value)]))).unwrap_err();
            assert_eq!(err.errcode, ErrCode::ConfigError, "key {}", key);
        }
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"roll_n": 50, "min_weight": 0.0001}}"#).unwrap();
        let config = WeightConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.roll_n, 50);
        assert_eq!(config.min_weight, 0.0001);
        assert_eq!(config.alpha, DEFAULT_ALPHA);
    }

    #[test]
    fn test_missing_json_file() {
        let err = WeightConfig::from_json_file("/nonexistent/weights.json").unwrap_err();
        assert_eq!(err.errcode, ErrCode::ConfigError);
    }
}
