pub mod dca_plan;
