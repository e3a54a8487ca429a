pub mod feature_builder;
pub mod feature_record;
