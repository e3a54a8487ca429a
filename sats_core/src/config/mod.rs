pub mod config_with_check;
pub mod weight_config;
