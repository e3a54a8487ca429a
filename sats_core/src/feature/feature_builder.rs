use tracing::debug;

use super::feature_record::FeatureRecord;
use crate::config::weight_config::WeightConfig;
use crate::math::rolling::RollingModel;
use crate::price::price_point::{sanitize_prices, PricePoint};

/// Build one feature record per usable price.
///
/// Statistics for index `i` use only the `roll_n` closes ending at `i`; the
/// first `roll_n - 1` records carry none. Invalid closes are dropped first, so
/// the window is index-based over what remains.
pub fn build_features(prices: &[PricePoint], config: &WeightConfig) -> Vec<FeatureRecord> {
    let prices = sanitize_prices(prices.to_vec());
    let mut model = RollingModel::new(config.roll_n);

    let features: Vec<FeatureRecord> = prices
        .iter()
        .map(|p| {
            let metric = model.add(p.close);
            FeatureRecord {
                date: p.date,
                close: p.close,
                moving_average: metric.map(|m| m.mean),
                moving_std_dev: metric.map(|m| m.std_dev),
            }
        })
        .collect();

    debug!(
        records = features.len(),
        with_stats = features.iter().filter(|f| f.moving_average.is_some()).count(),
        roll_n = config.roll_n,
        "built features"
    );
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
            .collect()
    }

    fn config(roll_n: usize) -> WeightConfig {
        WeightConfig {
            roll_n,
            ..WeightConfig::default()
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_features(&[], &WeightConfig::default()).is_empty());
    }

    #[test]
    fn test_warmup_records_have_no_stats() {
        let features = build_features(&series(&[1.0, 2.0, 3.0, 4.0]), &config(3));
        assert_eq!(features.len(), 4);
        assert!(features[0].moving_average.is_none());
        assert!(features[1].moving_std_dev.is_none());
        assert_eq!(features[2].moving_average, Some(2.0));
        assert_eq!(features[3].moving_average, Some(3.0));
        assert_eq!(features[3].close, 4.0);
    }

    #[test]
    fn test_outlier_example() {
        let mut closes = vec![100.0; 200];
        closes.push(50.0);
        let features = build_features(&series(&closes), &WeightConfig::default());
        assert!(features[198].stats().is_none());
        assert_eq!(features[199].stats(), Some((100.0, 0.0)));

        let (ma, sd) = features[200].stats().unwrap();
        assert!((ma - 99.75).abs() < 1e-9);
        assert!((sd - 3.5267).abs() < 1e-3);
        let z = (ma - features[200].close) / sd;
        assert!((z - 199f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_prices_are_dropped() {
        let mut prices = series(&[10.0, 20.0, 30.0]);
        prices[1].close = f64::NAN;
        let features = build_features(&prices, &config(2));
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].moving_average, Some(20.0));
    }

    #[test]
    fn test_deterministic() {
        let prices = series(&[5.0, 7.0, 6.0, 9.0, 8.0]);
        assert_eq!(
            build_features(&prices, &config(3)),
            build_features(&prices, &config(3))
        );
    }
}
