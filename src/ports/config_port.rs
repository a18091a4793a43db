//! Configuration access port trait.
//!
//! Typed getters return `default` only when the key is absent. A present but
//! malformed value is a [`SigtraderError::ConfigInvalid`].

use crate::domain::error::SigtraderError;
use rust_decimal::Decimal;
use std::str::FromStr;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, SigtraderError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, SigtraderError>;

    fn get_decimal(
        &self,
        section: &str,
        key: &str,
        default: Decimal,
    ) -> Result<Decimal, SigtraderError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => Decimal::from_str(raw.trim())
                .map_err(|_| SigtraderError::invalid(section, key, format!("not a number: {raw}"))),
        }
    }
}
