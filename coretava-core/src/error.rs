use std::path::PathBuf;

/// Every failure a banner unit can run into. None of these reach the
/// shopper: the visible outcome is always "the banner does not appear".
#[derive(Debug, thiserror::Error)]
pub enum CoretavaError {
    #[error("missing required identifier: {field}")]
    PreconditionMissing { field: &'static str },

    #[error("campaign data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("network failure: {reason}")]
    NetworkFailure { reason: String },

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl CoretavaError {
    pub fn network(reason: impl Into<String>) -> Self {
        CoretavaError::NetworkFailure {
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        CoretavaError::DataUnavailable {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("cookie store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
