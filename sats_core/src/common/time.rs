use chrono::{Datelike, NaiveDate};

use crate::common::sats_exception::{ErrCode, SatsError};

/// Parse a date in `YYYY-MM-DD` or `YYYYMMDD` form
pub fn parse_date(date_str: &str) -> Result<NaiveDate, SatsError> {
    let date_str = date_str.trim();
    let parsed = if date_str.contains('-') {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
    } else {
        NaiveDate::parse_from_str(date_str, "%Y%m%d")
    };
    parsed.map_err(|e| {
        SatsError::new(
            format!("invalid date '{}': {}", date_str, e),
            ErrCode::DateParseError,
        )
    })
}

/// Parse a month in `YYYY-MM` form
pub fn parse_month(month_str: &str) -> Result<(i32, u32), SatsError> {
    let date = parse_date(&format!("{}-01", month_str.trim()))?;
    Ok((date.year(), date.month()))
}

/// First day of the given month
pub fn month_start(year: i32, month: u32) -> Result<NaiveDate, SatsError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        SatsError::new(
            format!("invalid month {:04}-{:02}", year, month),
            ErrCode::InvalidMonth,
        )
    })
}

/// Every calendar day of the month, 1st to last inclusive
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, SatsError> {
    let start = month_start(year, month)?;
    Ok(start
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

pub fn to_date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("20240309").unwrap(), expected);
        assert_eq!(parse_date(" 2024-03-09 ").unwrap(), expected);
        assert_eq!(
            parse_date("2024/03/09").unwrap_err().errcode,
            ErrCode::DateParseError
        );
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2023-02").unwrap(), (2023, 2));
        assert!(parse_month("2023-13").is_err());
    }

    #[test]
    fn test_month_days_lengths() {
        assert_eq!(month_days(2023, 2).unwrap().len(), 28);
        assert_eq!(month_days(2024, 2).unwrap().len(), 29);
        assert_eq!(month_days(2024, 4).unwrap().len(), 30);
        assert_eq!(month_days(2024, 12).unwrap().len(), 31);
        assert_eq!(month_days(2024, 0).unwrap_err().errcode, ErrCode::InvalidMonth);
    }

    #[test]
    fn test_month_days_bounds() {
        let days = month_days(2024, 1).unwrap();
        assert_eq!(to_date_str(days[0]), "2024-01-01");
        assert_eq!(to_date_str(days[30]), "2024-01-31");
    }
}
