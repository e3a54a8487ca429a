use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::allocator::weight_vector::WeightVector;
use crate::common::sats_exception::{ErrCode, SatsError};

/// A day's share of the budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub date: NaiveDate,
    pub weight: f64,
    pub usd_amount: f64,
    pub btc_amount: Option<f64>,
    pub close: Option<f64>,
    pub is_past: bool,
}

/// Monthly USD budget spread over the weight vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaPlan {
    pub total_budget: f64,
    pub rows: Vec<PlanRow>,
}

impl DcaPlan {
    pub fn new(weights: &WeightVector, total_budget: f64) -> Result<Self, SatsError> {
        if !total_budget.is_finite() || total_budget <= 0.0 {
            return Err(SatsError::new(
                format!("budget must be a positive amount, got {}", total_budget),
                ErrCode::InvalidBudget,
            ));
        }

        let rows = weights
            .rows()
            .iter()
            .map(|r| {
                let usd_amount = r.weight * total_budget;
                PlanRow {
                    date: r.date,
                    weight: r.weight,
                    usd_amount,
                    btc_amount: r.close.map(|close| usd_amount / close),
                    close: r.close,
                    is_past: r.is_past(),
                }
            })
            .collect();

        Ok(Self { total_budget, rows })
    }

    pub fn total_usd(&self) -> f64 {
        self.rows.iter().map(|r| r.usd_amount).sum()
    }

    pub fn spent_usd(&self) -> f64 {
        self.rows.iter().filter(|r| r.is_past).map(|r| r.usd_amount).sum()
    }

    pub fn remaining_usd(&self) -> f64 {
        self.total_usd() - self.spent_usd()
    }

    pub fn total_btc(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.btc_amount).sum()
    }

    /// BTC plain DCA would have bought over the same past days
    pub fn uniform_baseline_btc(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let daily = self.total_budget / self.rows.len() as f64;
        self.rows
            .iter()
            .filter_map(|r| r.close)
            .map(|close| daily / close)
            .sum()
    }

    /// Percent more BTC than the uniform baseline, None before any past day
    pub fn excess_btc_pct(&self) -> Option<f64> {
        let baseline = self.uniform_baseline_btc();
        if baseline > 0.0 {
            Some((self.total_btc() / baseline - 1.0) * 100.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::weight_vector::WeightRow;

    fn vector() -> WeightVector {
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let row = |day, weight, close| WeightRow {
            date: d(day),
            weight,
            close,
            moving_average: None,
            moving_std_dev: None,
        };
        WeightVector::new(vec![
            row(1, 0.5, Some(50_000.0)),
            row(2, 0.25, Some(25_000.0)),
            row(3, 0.25, None),
        ])
    }

    #[test]
    fn test_amounts() {
        let plan = DcaPlan::new(&vector(), 1000.0).unwrap();
        assert_eq!(plan.rows[0].usd_amount, 500.0);
        assert_eq!(plan.rows[0].btc_amount, Some(0.01));
        assert_eq!(plan.rows[2].btc_amount, None);
        assert!(!plan.rows[2].is_past);
        assert_eq!(plan.total_usd(), 1000.0);
        assert_eq!(plan.spent_usd(), 750.0);
        assert_eq!(plan.remaining_usd(), 250.0);
        assert_eq!(plan.total_btc(), 0.02);
    }

    #[test]
    fn test_baseline() {
        let plan = DcaPlan::new(&vector(), 900.0).unwrap();
        // 300 USD per day on the two past days
        let baseline = 300.0 / 50_000.0 + 300.0 / 25_000.0;
        assert!((plan.uniform_baseline_btc() - baseline).abs() < 1e-15);
        let pct = plan.excess_btc_pct().unwrap();
        assert!((pct - (0.018 / baseline - 1.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_budget() {
        for budget in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = DcaPlan::new(&vector(), budget).unwrap_err();
            assert_eq!(err.errcode, ErrCode::InvalidBudget);
        }
    }
}
