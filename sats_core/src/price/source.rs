use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::price_point::{sanitize_prices, PricePoint};
use crate::common::{
    sats_exception::{ErrCode, SatsError},
    time::parse_date,
    utils::{is_valid_price, parse_price},
};

/// Anything that can hand the core an ascending daily close series
pub trait PriceSource {
    fn name(&self) -> &str;

    fn load(&self) -> Result<Vec<PricePoint>, SatsError>;
}

const DATE_HEADERS: [&str; 2] = ["date", "time"];
const CLOSE_HEADERS: [&str; 3] = ["close", "price", "priceusd"];

/// Daily closes from a headered CSV file
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
    name: String,
}

impl CsvPriceSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("csv:{}", path.display()),
            path,
        }
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<PricePoint>, SatsError> {
        let file = File::open(&self.path).map_err(|e| {
            SatsError::new(
                format!("cannot open {}: {}", self.path.display(), e),
                ErrCode::SrcDataNotFound,
            )
        })?;
        read_prices(file)
    }
}

fn find_column(headers: &StringRecord, names: &[&str], fallback: usize) -> usize {
    headers
        .iter()
        .position(|h| names.contains(&h.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(fallback)
}

fn parse_row(record: &StringRecord, date_col: usize, close_col: usize) -> Option<PricePoint> {
    // timestamps such as 2024-01-01T00:00:00Z keep only the date part
    let raw_date = record.get(date_col)?.split(['T', ' ']).next()?;
    let date = parse_date(raw_date).ok()?;
    let close = parse_price(record.get(close_col)?)?;
    Some(PricePoint::new(date, close))
}

/// Read `date,close` rows from any reader, dropping malformed rows
pub fn read_prices<R: Read>(reader: R) -> Result<Vec<PricePoint>, SatsError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_col = find_column(&headers, &DATE_HEADERS, 0);
    let close_col = find_column(&headers, &CLOSE_HEADERS, 1);
    debug!(date_col, close_col, "price csv columns");

    let mut prices = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 2, error = %e, "unreadable price row");
                continue;
            }
        };
        match parse_row(&record, date_col, close_col) {
            Some(point) => prices.push(point),
            None => warn!(line = line + 2, "dropping malformed price row"),
        }
    }

    let prices = sanitize_prices(prices);
    if prices.is_empty() {
        return Err(SatsError::new("price csv has no usable rows", ErrCode::NoData));
    }
    Ok(prices)
}

/// Random walk with a slight upward drift, used when no real feed is available
#[derive(Debug, Clone)]
pub struct SyntheticPriceSource {
    pub end_date: NaiveDate,
    pub days: usize,
    pub start_price: f64,
    pub daily_drift: f64,
    pub daily_shock: f64,
    pub seed: Option<u64>,
}

impl SyntheticPriceSource {
    pub fn new(end_date: NaiveDate) -> Self {
        Self {
            end_date,
            days: 730,
            start_price: 30_000.0,
            daily_drift: 0.001,
            daily_shock: 0.03,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    fn check(&self) -> Result<(), SatsError> {
        if self.days == 0 {
            return Err(SatsError::new("synthetic series needs at least one day", ErrCode::ParaError));
        }
        if !is_valid_price(self.start_price) {
            return Err(SatsError::new(
                format!("start price={} is not a positive number", self.start_price),
                ErrCode::PriceBelowZero,
            ));
        }
        if !(0.0..1.0).contains(&self.daily_shock) || !self.daily_drift.is_finite() {
            return Err(SatsError::new(
                format!("drift={} shock={} out of range", self.daily_drift, self.daily_shock),
                ErrCode::ParaError,
            ));
        }
        Ok(())
    }
}

impl PriceSource for SyntheticPriceSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self) -> Result<Vec<PricePoint>, SatsError> {
        self.check()?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let start = self.end_date - Duration::days(self.days as i64 - 1);
        let mut price = self.start_price;
        let mut prices = Vec::with_capacity(self.days);

        for (i, date) in start.iter_days().take(self.days).enumerate() {
            if i > 0 {
                let shock = if self.daily_shock > 0.0 {
                    rng.gen_range(-self.daily_shock..self.daily_shock)
                } else {
                    0.0
                };
                // floor keeps the walk strictly positive under extreme drift
                price = (price * (1.0 + self.daily_drift + shock)).max(0.01);
            }
            prices.push(PricePoint::new(date, price));
        }

        Ok(prices)
    }
}

/// Use `primary`, or `fallback` when the primary fails
pub struct FallbackPriceSource {
    primary: Box<dyn PriceSource>,
    fallback: Box<dyn PriceSource>,
}

impl FallbackPriceSource {
    pub fn new(primary: Box<dyn PriceSource>, fallback: Box<dyn PriceSource>) -> Self {
        Self { primary, fallback }
    }
}

impl PriceSource for FallbackPriceSource {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn load(&self) -> Result<Vec<PricePoint>, SatsError> {
        match self.primary.load() {
            Ok(prices) => Ok(prices),
            Err(e) => {
                info!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "price source failed, using fallback"
                );
                self.fallback.load()
            }
        }
    }
}
