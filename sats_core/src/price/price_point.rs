use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::utils::is_valid_price;

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Drop unusable closes and force ascending, date-unique order.
///
/// Points with a non-finite or non-positive close are removed. After a stable
/// sort by date, a repeated date keeps its first occurrence.
pub fn sanitize_prices(prices: Vec<PricePoint>) -> Vec<PricePoint> {
    let total = prices.len();
    let mut kept: Vec<PricePoint> = prices
        .into_iter()
        .filter(|p| {
            let ok = is_valid_price(p.close);
            if !ok {
                warn!(date = %p.date, close = p.close, "dropping invalid close");
            }
            ok
        })
        .collect();

    kept.sort_by_key(|p| p.date);
    kept.dedup_by(|later, first| {
        let dup = later.date == first.date;
        if dup {
            warn!(date = %later.date, "dropping duplicate date");
        }
        dup
    });

    if kept.len() < total {
        warn!(dropped = total - kept.len(), kept = kept.len(), "sanitized price series");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_drops_invalid_closes() {
        let prices = vec![
            PricePoint::new(d(1), 100.0),
            PricePoint::new(d(2), f64::NAN),
            PricePoint::new(d(3), -5.0),
            PricePoint::new(d(4), 0.0),
            PricePoint::new(d(5), 101.0),
        ];
        let kept = sanitize_prices(prices);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].date, d(5));
    }

    #[test]
    fn test_sorts_and_dedups() {
        let prices = vec![
            PricePoint::new(d(3), 3.0),
            PricePoint::new(d(1), 1.0),
            PricePoint::new(d(3), 30.0),
            PricePoint::new(d(2), 2.0),
        ];
        let kept = sanitize_prices(prices);
        let closes: Vec<f64> = kept.iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sanitize_prices(Vec::new()).is_empty());
    }
}
