use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::sats_exception::{ErrCode, SatsError};

/// Key/value overrides that remember which keys were consumed
#[derive(Debug, Default)]
pub struct ConfigWithCheck {
    conf: HashMap<String, Value>,
}

impl ConfigWithCheck {
    pub fn new(conf: HashMap<String, Value>) -> Self {
        Self { conf }
    }

    /// Take a key out of the map, converting it to `T`
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, SatsError> {
        match self.conf.remove(key) {
            None => Ok(None),
            Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| {
                SatsError::new(
                    format!("invalid value {} for para {}: {}", v, key, e),
                    ErrCode::ParaError,
                )
            }),
        }
    }

    /// Fail if any key was never consumed
    pub fn check(&self) -> Result<(), SatsError> {
        if self.conf.is_empty() {
            return Ok(());
        }
        let mut keys: Vec<&str> = self.conf.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Err(SatsError::new(
            format!("unknown para = {}", keys.join(", ")),
            ErrCode::ParaError,
        ))
    }
}
