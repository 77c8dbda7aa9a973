use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Only produced while parsing domain names; callers always see `generic` instead.
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Data service unavailable during {operation} ({target}): {reason}")]
    UpstreamUnavailable {
        operation: &'static str,
        target: String,
        reason: String,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Policy tables failed to load: {0}")]
    PolicyLoad(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Operation cancelled: {0}")]
    Cancelled(&'static str),
}

impl Error {
    /// Build an `InvalidInput` error from anything printable.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Short machine-readable kind, used in tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) | Error::UnknownDomain(_) => "invalid_input",
            Error::UpstreamUnavailable { .. } | Error::Timeout(_) => "upstream_unavailable",
            Error::TaskNotFound(_) => "task_not_found",
            Error::Cancelled(_) => "cancelled",
            Error::PolicyLoad(_) => "unavailable",
            _ => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
