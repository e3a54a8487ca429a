use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chart::chart_data::ChartDataPoint;
use crate::common::{
    enums::DayStatus,
    sats_exception::{ErrCode, SatsError},
};
use crate::config::weight_config::SUM_TOLERANCE;
use crate::feature::feature_record::FeatureRecord;

/// One calendar day of the allocation, with the features it was decided on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRow {
    pub date: NaiveDate,
    pub weight: f64,
    pub close: Option<f64>,
    pub moving_average: Option<f64>,
    pub moving_std_dev: Option<f64>,
}

impl WeightRow {
    pub fn new(date: NaiveDate, weight: f64, record: Option<&FeatureRecord>) -> Self {
        Self {
            date,
            weight,
            close: record.map(|r| r.close),
            moving_average: record.and_then(|r| r.moving_average),
            moving_std_dev: record.and_then(|r| r.moving_std_dev),
        }
    }

    pub fn status(&self) -> DayStatus {
        if self.close.is_some() {
            DayStatus::Past
        } else {
            DayStatus::Future
        }
    }

    pub fn is_past(&self) -> bool {
        self.status() == DayStatus::Past
    }
}

/// Per-day weights for one month, summing to one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    rows: Vec<WeightRow>,
}

impl WeightVector {
    pub fn new(rows: Vec<WeightRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[WeightRow] {
        &self.rows
    }

    pub fn weights(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.weight).collect()
    }

    pub fn sum(&self) -> f64 {
        self.rows.iter().map(|r| r.weight).sum()
    }

    pub fn past_days(&self) -> impl Iterator<Item = &WeightRow> {
        self.rows.iter().filter(|r| r.is_past())
    }

    pub fn future_days(&self) -> impl Iterator<Item = &WeightRow> {
        self.rows.iter().filter(|r| !r.is_past())
    }

    /// Sum within tolerance of one and every weight at or above the floor
    pub fn validate(&self, min_weight: f64) -> Result<(), SatsError> {
        let sum = self.sum();
        if !((sum - 1.0).abs() <= SUM_TOLERANCE) {
            return Err(SatsError::new(
                format!("weights sum to {} instead of 1", sum),
                ErrCode::WeightSumViolation,
            ));
        }
        if let Some(row) = self.rows.iter().find(|r| !(r.weight >= min_weight)) {
            return Err(SatsError::new(
                format!("{} weight={} is below floor {}", row.date, row.weight, min_weight),
                ErrCode::WeightFloorViolation,
            ));
        }
        Ok(())
    }

    /// Chart points for the days that have a price
    pub fn to_chart_points(&self) -> Vec<ChartDataPoint> {
        self.rows
            .iter()
            .filter_map(|r| {
                r.close.map(|close| ChartDataPoint {
                    date: r.date,
                    model_weight: r.weight,
                    weight_percent: r.weight * 100.0,
                    bitcoin_price: close,
                })
            })
            .collect()
    }
}
