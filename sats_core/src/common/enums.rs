use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Whether a calendar day already has a resolved close price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum DayStatus {
    #[strum(serialize = "past")]
    Past,
    #[strum(serialize = "future")]
    Future,
}

/// Chart bucket for a day's model weight relative to the 75th percentile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize)]
pub enum AllocationTier {
    #[strum(serialize = "high")]
    High,
    #[strum(serialize = "standard")]
    Standard,
}

/// Why a day kept its weight unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[strum(serialize = "no feature record")]
    NoRecord,
    #[strum(serialize = "insufficient history")]
    NoStats,
    #[strum(serialize = "non-positive std dev")]
    FlatWindow,
    #[strum(serialize = "price at or above trend")]
    AboveTrend,
    #[strum(serialize = "no upward adjustment")]
    NoExcess,
    #[strum(serialize = "last day of month")]
    LastDay,
}
