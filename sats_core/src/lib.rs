pub mod allocator;
pub mod chart;
pub mod common;
pub mod config;
pub mod feature;
pub mod math;
pub mod plan;
pub mod price;

pub use allocator::weight_allocator::{Allocation, AllocationNote, WeightAllocator};
pub use allocator::weight_vector::{WeightRow, WeightVector};
pub use common::sats_exception::{ErrCode, SatsError};
pub use config::weight_config::WeightConfig;
pub use feature::feature_builder::build_features;
pub use feature::feature_record::FeatureRecord;
pub use plan::dca_plan::DcaPlan;
pub use price::price_point::PricePoint;
