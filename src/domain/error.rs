//! Domain error types.

/// Top-level error type for rulesim.
///
/// Ordinary inability to trade (no cash, not flat, immature indicators) is
/// never an error; only malformed inputs surface here.
#[derive(Debug, thiserror::Error)]
pub enum RulesimError {
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

    #[error("invalid strategy in {source_name}: {reason}")]
    StrategyParse { source_name: String, reason: String },

    #[error("strategy '{strategy}' has no rules")]
    EmptyStrategy { strategy: String },

    #[error("no candle data: {context}")]
    NoData { context: String },

    #[error("candle data error: {reason}")]
    DataRead { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RulesimError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            RulesimError::Io(_) => 1,
            RulesimError::ConfigParse { .. }
            | RulesimError::ConfigMissing { .. }
            | RulesimError::ConfigInvalid { .. } => 2,
            RulesimError::StrategyParse { .. } | RulesimError::EmptyStrategy { .. } => 4,
            RulesimError::NoData { .. } | RulesimError::DataRead { .. } => 5,
        }
    }
}

impl From<&RulesimError> for std::process::ExitCode {
    fn from(err: &RulesimError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
