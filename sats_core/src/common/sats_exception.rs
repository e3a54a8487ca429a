use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error codes for the Stacking Sats core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Config errors (0-99)
    #[strum(serialize = "_CONFIG_ERR_BEGIN")]
    ConfigErrBegin = 0,
    #[strum(serialize = "COMMON_ERROR")]
    CommonError = 1,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 5,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 17,
    #[strum(serialize = "_CONFIG_ERR_END")]
    ConfigErrEnd = 99,

    // Price data errors (100-199)
    #[strum(serialize = "_DATA_ERR_BEGIN")]
    DataErrBegin = 100,
    #[strum(serialize = "SRC_DATA_NOT_FOUND")]
    SrcDataNotFound = 101,
    #[strum(serialize = "SRC_DATA_FORMAT_ERROR")]
    SrcDataFormatError = 102,
    #[strum(serialize = "PRICE_BELOW_ZERO")]
    PriceBelowZero = 103,
    #[strum(serialize = "NO_DATA")]
    NoData = 104,
    #[strum(serialize = "DATE_PARSE_ERROR")]
    DateParseError = 105,
    #[strum(serialize = "_DATA_ERR_END")]
    DataErrEnd = 199,

    // Allocation errors (200-299)
    #[strum(serialize = "_ALLOC_ERR_BEGIN")]
    AllocErrBegin = 200,
    #[strum(serialize = "WEIGHT_SUM_VIOLATION")]
    WeightSumViolation = 201,
    #[strum(serialize = "WEIGHT_FLOOR_VIOLATION")]
    WeightFloorViolation = 202,
    #[strum(serialize = "INVALID_MONTH")]
    InvalidMonth = 203,
    #[strum(serialize = "INVALID_BUDGET")]
    InvalidBudget = 204,
    #[strum(serialize = "_ALLOC_ERR_END")]
    AllocErrEnd = 299,
}

impl ErrCode {
    pub fn is_config_err(&self) -> bool {
        let code = *self as i32;
        code > Self::ConfigErrBegin as i32 && code < Self::ConfigErrEnd as i32
    }

    pub fn is_data_err(&self) -> bool {
        let code = *self as i32;
        code > Self::DataErrBegin as i32 && code < Self::DataErrEnd as i32
    }

    pub fn is_allocation_err(&self) -> bool {
        let code = *self as i32;
        code > Self::AllocErrBegin as i32 && code < Self::AllocErrEnd as i32
    }
}

#[derive(Debug, Error)]
#[error("{errcode}: {msg}")]
pub struct SatsError {
    pub errcode: ErrCode,
    pub msg: String,
}

impl SatsError {
    pub fn new(message: impl Into<String>, code: ErrCode) -> Self {
        Self {
            errcode: code,
            msg: message.into(),
        }
    }

    pub fn is_config_err(&self) -> bool {
        self.errcode.is_config_err()
    }

    pub fn is_data_err(&self) -> bool {
        self.errcode.is_data_err()
    }

    pub fn is_allocation_err(&self) -> bool {
        self.errcode.is_allocation_err()
    }
}

impl From<csv::Error> for SatsError {
    fn from(err: csv::Error) -> Self {
        Self::new(err.to_string(), ErrCode::SrcDataFormatError)
    }
}

impl From<serde_json::Error> for SatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string(), ErrCode::ConfigError)
    }
}
