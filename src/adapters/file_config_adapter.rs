//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive: `configparser` lowercases both.

use crate::domain::error::SigtraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SigtraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| SigtraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SigtraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SigtraderError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, SigtraderError> {
        self.config
            .getint(section, key)
            .map(|value| value.unwrap_or(default))
            .map_err(|reason| {
                SigtraderError::invalid(section, key, format!("not an integer: {reason}"))
            })
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, SigtraderError> {
        match self.config.get(section, key) {
            None => Ok(default),
            Some(raw) => Self::parse_bool(&raw).ok_or_else(|| {
                SigtraderError::invalid(section, key, format!("not a boolean: {raw}"))
            }),
        }
    }
}
