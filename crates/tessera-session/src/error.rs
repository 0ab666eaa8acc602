//! Error types for session operations.

use std::path::PathBuf;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for session operations.
///
/// Authentication failures are not represented here: validation only ever
/// answers "authenticated" or "not authenticated".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The randomness source failed while generating a token.
    #[error("Token generation failed: {0}")]
    Generation(String),

    /// The session store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The key or token cannot be carried in a cookie.
    #[error("Cookie error: {0}")]
    Cookie(#[from] CookieError),

    /// The caller cancelled the operation before the store answered.
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the store answered.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors reported by [`SessionStore`](crate::SessionStore) backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("backend failure: {0}")]
    Backend(String),

    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A stored session list could not be (de)serialized.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from encoding or decoding the session cookie value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    /// The cookie value has no `::` delimiter.
    #[error("cookie value has no delimiter")]
    MissingDelimiter,

    /// The key half is empty.
    #[error("session key is empty")]
    EmptyKey,

    /// The token half is empty.
    #[error("session token is empty")]
    EmptyToken,

    /// The key or token contains the `::` delimiter.
    #[error("session key or token contains the delimiter")]
    DelimiterInComponent,

    /// The key or token contains a byte that is not legal in a cookie value.
    #[error("session key or token contains a character not allowed in cookies")]
    InvalidCharacter,

    /// The rendered cookie is not a valid header value.
    #[error("cookie is not a valid header value")]
    InvalidHeader,
}

/// Errors that can occur while loading configuration from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The parsed values are not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
