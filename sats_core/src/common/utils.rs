/// A close price usable for feature computation
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Parse a price cell, returns None if unparseable, non-finite or non-positive
pub fn parse_price(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|p| is_valid_price(*p))
}

/// Parse a numeric cell, returns None for anything that is not a finite number
pub fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check if two floats are equal within an absolute tolerance
pub fn is_close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
