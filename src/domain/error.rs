//! Domain error types.
//!
//! Running out of money is not an error: it is a [`RunStatus`] carried in the
//! simulation result. Everything here aborts the affected run.
//!
//! [`RunStatus`]: crate::domain::strategy::RunStatus

/// Top-level error type for retiresim.
#[derive(Debug, thiserror::Error)]
pub enum RetireSimError {
    #[error("no price data for {year}")]
    MissingPrice { year: i32 },

    #[error("no inflation data for {year}")]
    MissingInflation { year: i32 },

    #[error("insufficient funds: need ${cost:.2}, have ${cash:.2}")]
    InsufficientFunds { cost: f64, cash: f64 },

    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RetireSimError {
    /// True for errors caused by a year missing from the loaded history.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            RetireSimError::MissingPrice { .. } | RetireSimError::MissingInflation { .. }
        )
    }
}

impl From<&RetireSimError> for std::process::ExitCode {
    fn from(err: &RetireSimError) -> Self {
        let code: u8 = match err {
            RetireSimError::Io(_) | RetireSimError::Csv(_) => 1,
            RetireSimError::ConfigParse { .. }
            | RetireSimError::ConfigMissing { .. }
            | RetireSimError::ConfigInvalid { .. } => 2,
            RetireSimError::Data { .. } => 3,
            RetireSimError::MissingPrice { .. } | RetireSimError::MissingInflation { .. } => 4,
            RetireSimError::InsufficientFunds { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
