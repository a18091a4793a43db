//! Domain error types.

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("no data for {instrument}")]
    NoData { instrument: String },

    #[error("data read error: {reason}")]
    DataRead { reason: String },

    #[error("result write error: {reason}")]
    ResultWrite { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SigtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        SigtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. }
            | SigtraderError::UnknownStrategy { .. } => 2,
            SigtraderError::NoData { .. } | SigtraderError::DataRead { .. } => 3,
            SigtraderError::ResultWrite { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
