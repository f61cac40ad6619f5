use thiserror::Error;

/// Errors raised while validating, loading or persisting the gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field failed validation (for example a non-HTTPS upstream URL).
    #[error("{0}")]
    Validation(String),

    /// The configuration file could not be read or written.
    #[error("failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted configuration document could not be parsed.
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The supplied admin password did not match.
    #[error("invalid password")]
    InvalidPassword,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
