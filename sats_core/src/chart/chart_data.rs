use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::warn;

use crate::common::{
    enums::AllocationTier,
    sats_exception::{ErrCode, SatsError},
    time::parse_date,
    utils::parse_finite,
};

/// Weight range mapped onto the red-to-green color scale
pub const COLOR_MIN_WEIGHT: f64 = 0.001;
pub const COLOR_MAX_WEIGHT: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub date: NaiveDate,
    pub model_weight: f64,
    pub weight_percent: f64,
    pub bitcoin_price: f64,
}

fn parse_chart_row(record: &StringRecord) -> Option<ChartDataPoint> {
    Some(ChartDataPoint {
        date: parse_date(record.get(0)?).ok()?,
        model_weight: parse_finite(record.get(1)?)?,
        weight_percent: parse_finite(record.get(2)?)?,
        bitcoin_price: parse_finite(record.get(3)?)?,
    })
}

/// Read `date,model_weight,weight_percent,bitcoin_price` rows, skipping any
/// row with a non-numeric value
pub fn read_chart_points<R: Read>(reader: R) -> Result<Vec<ChartDataPoint>, SatsError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        match result.ok().as_ref().and_then(parse_chart_row) {
            Some(p) => points.push(p),
            None => warn!(line = line + 2, "dropping malformed chart row"),
        }
    }
    Ok(points)
}

/// Weight at index `floor(len * 0.75)` of the ascending weights
pub fn percentile_75(weights: &[f64]) -> Option<f64> {
    if weights.is_empty() {
        return None;
    }
    let mut sorted = weights.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let idx = ((sorted.len() as f64 * 0.75).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// `rgba(r, g, 0, alpha)` running from red at low weights to green at high ones
pub fn weight_color(weight: f64, alpha: f64) -> String {
    let normalized =
        ((weight - COLOR_MIN_WEIGHT) / (COLOR_MAX_WEIGHT - COLOR_MIN_WEIGHT)).clamp(0.0, 1.0);
    let red = (255.0 * (1.0 - normalized)).round() as u8;
    let green = (255.0 * normalized).round() as u8;
    format!("rgba({}, {}, {}, {})", red, green, 0, alpha)
}

/// Chart points tagged against the series' 75th-percentile weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub threshold: f64,
    pub points: Vec<(ChartDataPoint, AllocationTier)>,
}

impl ChartSeries {
    pub fn new(points: Vec<ChartDataPoint>) -> Result<Self, SatsError> {
        let weights: Vec<f64> = points.iter().map(|p| p.model_weight).collect();
        let threshold = percentile_75(&weights)
            .ok_or_else(|| SatsError::new("chart has no points", ErrCode::NoData))?;

        let points = points
            .into_iter()
            .map(|p| {
                let tier = if p.model_weight > threshold {
                    AllocationTier::High
                } else {
                    AllocationTier::Standard
                };
                (p, tier)
            })
            .collect();

        Ok(Self { threshold, points })
    }

    pub fn count(&self, tier: AllocationTier) -> usize {
        self.points.iter().filter(|(_, t)| *t == tier).count()
    }

    pub fn tier_counts(&self) -> Vec<(AllocationTier, usize)> {
        AllocationTier::iter().map(|t| (t, self.count(t))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, weight: f64) -> ChartDataPoint {
        ChartDataPoint {
            date: NaiveDate::from_ymd_opt(2021, 5, day).unwrap(),
            model_weight: weight,
            weight_percent: weight * 100.0,
            bitcoin_price: 40_000.0,
        }
    }

    #[test]
    fn test_read_chart_points() {
        let csv = "date,model_weight,weight_percent,bitcoin_price\n\
                   2021-05-01,0.002,0.2,57000\n\
                   2021-05-02,abc,0.2,57000\n\
                   2021-05-03,0.004,0.4,NaN\n\
                   2021-05-04,0.003,0.3,56000\n";
        let points = read_chart_points(csv.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].model_weight, 0.003);
    }

    #[test]
    fn test_percentile_75() {
        assert_eq!(percentile_75(&[]), None);
        assert_eq!(percentile_75(&[4.0, 1.0, 3.0, 2.0]), Some(4.0));
        assert_eq!(percentile_75(&[5.0, 1.0, 2.0, 3.0, 4.0, 6.0, 7.0, 8.0]), Some(7.0));
        assert_eq!(percentile_75(&[0.5]), Some(0.5));
    }

    #[test]
    fn test_weight_color() {
        assert_eq!(weight_color(0.0, 1.0), "rgba(255, 0, 0, 1)");
        assert_eq!(weight_color(0.05, 0.5), "rgba(0, 255, 0, 0.5)");
        assert_eq!(weight_color(0.0086, 1.0), "rgba(153, 102, 0, 1)");
    }

    #[test]
    fn test_series_tiers() {
        let weights = [0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08];
        let points = weights.iter().enumerate().map(|(i, &w)| point(i as u32 + 1, w)).collect();
        let series = ChartSeries::new(points).unwrap();
        assert_eq!(series.threshold, 0.07);
        assert_eq!(series.count(AllocationTier::High), 1);
        assert_eq!(series.count(AllocationTier::Standard), 7);
        assert_eq!(
            series.tier_counts(),
            vec![(AllocationTier::High, 1), (AllocationTier::Standard, 7)]
        );
    }

    #[test]
    fn test_series_empty() {
        assert_eq!(ChartSeries::new(Vec::new()).unwrap_err().errcode, ErrCode::NoData);
    }
}
