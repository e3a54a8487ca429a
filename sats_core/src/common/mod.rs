pub mod enums;
pub mod sats_exception;
pub mod time;
pub mod utils;
