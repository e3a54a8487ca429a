use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingMetric {
    pub mean: f64,
    pub std_dev: f64,
}

/// Trailing simple moving average and population std dev over a fixed window
#[derive(Debug)]
pub struct RollingModel {
    period: usize,
    prices: VecDeque<f64>,
}

impl RollingModel {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prices: VecDeque::with_capacity(period),
        }
    }

    /// Push the next price, returns the metric once the window is full
    pub fn add(&mut self, price: f64) -> Option<RollingMetric> {
        self.prices.push_back(price);
        if self.prices.len() > self.period {
            self.prices.pop_front();
        }
        if self.prices.len() < self.period {
            return None;
        }

        let n = self.prices.len() as f64;
        let mean = self.prices.iter().sum::<f64>() / n;

        let variance = self.prices.iter()
            .map(|&x| (x - mean).powi(2))
            .sum::<f64>() / n;

        Some(RollingMetric {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup() {
        let mut model = RollingModel::new(3);
        assert!(model.add(1.0).is_none());
        assert!(model.add(2.0).is_none());
        let metric = model.add(3.0).unwrap();
        assert_eq!(metric.mean, 2.0);
        assert!((metric.std_dev - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_window_slides() {
        let mut model = RollingModel::new(2);
        model.add(10.0);
        model.add(20.0);
        let metric = model.add(40.0).unwrap();
        assert_eq!(metric.mean, 30.0);
        assert_eq!(metric.std_dev, 10.0);
    }

    #[test]
    fn test_population_std_dev() {
        let mut model = RollingModel::new(4);
        let mut last = None;
        for p in [2.0, 4.0, 4.0, 6.0] {
            last = model.add(p);
        }
        let metric = last.unwrap();
        assert_eq!(metric.mean, 4.0);
        // sample std dev would be sqrt(8/3)
        assert!((metric.std_dev - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_window_of_one() {
        let mut model = RollingModel::new(1);
        let metric = model.add(7.5).unwrap();
        assert_eq!(metric.mean, 7.5);
        assert_eq!(metric.std_dev, 0.0);
    }
}
