use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A close with its trailing-window statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub moving_average: Option<f64>,
    pub moving_std_dev: Option<f64>,
}

impl FeatureRecord {
    /// Moving average and std dev, when both are present and finite
    pub fn stats(&self) -> Option<(f64, f64)> {
        match (self.moving_average, self.moving_std_dev) {
            (Some(ma), Some(sd)) if ma.is_finite() && sd.is_finite() => Some((ma, sd)),
            _ => None,
        }
    }
}
