use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use super::weight_vector::{WeightRow, WeightVector};
use crate::common::{
    enums::SkipReason,
    sats_exception::SatsError,
    time::month_days,
};
use crate::config::weight_config::WeightConfig;
use crate::feature::feature_record::FeatureRecord;

/// Something the allocator did on a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AllocationNote {
    /// Boost committed; `weight` is the day's new weight
    Boosted {
        date: NaiveDate,
        z_score: f64,
        weight: f64,
    },
    /// Boost abandoned because a later day would drop below the floor
    FloorGuard {
        date: NaiveDate,
        z_score: f64,
        reduction: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub weights: WeightVector,
    pub notes: Vec<AllocationNote>,
}

impl Allocation {
    pub fn boosted_days(&self) -> usize {
        self.notes
            .iter()
            .filter(|n| matches!(n, AllocationNote::Boosted { .. }))
            .count()
    }

    pub fn guarded_days(&self) -> usize {
        self.notes
            .iter()
            .filter(|n| matches!(n, AllocationNote::FloorGuard { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DayDecision {
    Skip(SkipReason),
    FloorGuard { z_score: f64, reduction: f64 },
    Boost { z_score: f64, boosted: f64, reduction: f64 },
}

/// Redistributes a month's budget toward days priced below trend
#[derive(Debug, Clone)]
pub struct WeightAllocator {
    config: WeightConfig,
}

impl WeightAllocator {
    pub fn new(config: WeightConfig) -> Result<Self, SatsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    /// Allocate the month that contains `today`
    pub fn allocate_current_month(
        &self,
        features: &[FeatureRecord],
        today: NaiveDate,
    ) -> Result<Allocation, SatsError> {
        self.allocate_month(features, today.year(), today.month(), today)
    }

    /// Allocate every day of `year-month`, adjusting only days up to `today`.
    ///
    /// Days are visited in calendar order. A boosted day takes
    /// `w * (1 + alpha * z)` and the excess is deducted evenly from every later
    /// day, so the vector sums to one after each step. The boost is dropped
    /// entirely when any later day would fall below `min_weight`.
    pub fn allocate_month(
        &self,
        features: &[FeatureRecord],
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<Allocation, SatsError> {
        let days = month_days(year, month)?;
        let n = days.len();
        let mut weights = vec![1.0 / n as f64; n];
        let mut resolved: Vec<Option<&FeatureRecord>> = vec![None; n];
        let mut notes = Vec::new();

        let by_date: HashMap<NaiveDate, &FeatureRecord> =
            features.iter().map(|f| (f.date, f)).collect();

        for (i, &date) in days.iter().enumerate() {
            if date > today {
                break;
            }
            let record = by_date.get(&date).copied();
            resolved[i] = record;

            match self.decide(i, record, &weights) {
                DayDecision::Skip(reason) => {
                    debug!(%date, %reason, "weight unchanged");
                }
                DayDecision::FloorGuard { z_score, reduction } => {
                    info!(%date, z_score, reduction, "boost skipped, a later day would breach the floor");
                    notes.push(AllocationNote::FloorGuard { date, z_score, reduction });
                }
                DayDecision::Boost { z_score, boosted, reduction } => {
                    weights[i] = boosted;
                    for w in weights[i + 1..].iter_mut() {
                        *w -= reduction;
                    }
                    debug!(%date, z_score, weight = boosted, reduction, "boost applied");
                    notes.push(AllocationNote::Boosted { date, z_score, weight: boosted });
                }
            }
        }

        if resolved.iter().all(Option::is_none) {
            info!(year, month, "no feature record matched this month, weights stay uniform");
        }

        let rows = days
            .iter()
            .zip(weights)
            .zip(resolved)
            .map(|((&date, weight), record)| WeightRow::new(date, weight, record))
            .collect();
        let weights = WeightVector::new(rows);
        weights.validate(self.config.min_weight)?;

        Ok(Allocation { weights, notes })
    }

    fn decide(&self, i: usize, record: Option<&FeatureRecord>, weights: &[f64]) -> DayDecision {
        let Some(record) = record else {
            return DayDecision::Skip(SkipReason::NoRecord);
        };
        let Some((ma, sd)) = record.stats() else {
            return DayDecision::Skip(SkipReason::NoStats);
        };
        if sd <= 0.0 {
            return DayDecision::Skip(SkipReason::FlatWindow);
        }
        if record.close >= ma {
            return DayDecision::Skip(SkipReason::AboveTrend);
        }

        let z_score = (ma - record.close) / sd;
        let current = weights[i];
        let boosted = current * (1.0 + self.config.alpha * z_score);
        let excess = boosted - current;
        if excess <= 0.0 {
            return DayDecision::Skip(SkipReason::NoExcess);
        }

        let future_count = weights.len() - i - 1;
        if future_count == 0 {
            return DayDecision::Skip(SkipReason::LastDay);
        }

        let reduction = excess / future_count as f64;
        if weights[i + 1..]
            .iter()
            .any(|&w| w - reduction < self.config.min_weight)
        {
            return DayDecision::FloorGuard { z_score, reduction };
        }

        DayDecision::Boost { z_score, boosted, reduction }
    }
}
