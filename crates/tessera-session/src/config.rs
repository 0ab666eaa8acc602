//! Configuration for session issuance and the session cookie.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// Default lifetime of a new session (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Default cookie path.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// SameSite policy attached to the session cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    /// Cookie only sent on same-site requests.
    #[serde(alias = "Strict")]
    Strict,

    /// Cookie also sent on top-level cross-site navigation.
    #[default]
    #[serde(alias = "Lax")]
    Lax,

    /// Cookie sent on all requests. Requires `Secure`.
    #[serde(alias = "None")]
    None,
}

impl From<SameSitePolicy> for cookie::SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => cookie::SameSite::Strict,
            SameSitePolicy::Lax => cookie::SameSite::Lax,
            SameSitePolicy::None => cookie::SameSite::None,
        }
    }
}

/// Session configuration.
///
/// Built once at startup and shared read-only (behind an `Arc`) by the
/// session manager and the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime of a newly issued session.
    pub ttl: Duration,

    /// Name of the cookie carrying `key::token`.
    pub cookie_name: String,

    /// SameSite attribute of the cookie.
    pub same_site: SameSitePolicy,

    /// Whether the cookie carries the `Secure` attribute.
    pub secure: bool,

    /// Cookie path.
    pub path: String,

    /// Optional cookie domain.
    pub domain: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            same_site: SameSitePolicy::default(),
            secure: true,
            path: DEFAULT_COOKIE_PATH.to_string(),
            domain: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the SameSite policy.
    pub fn with_same_site(mut self, policy: SameSitePolicy) -> Self {
        self.same_site = policy;
        self
    }

    /// Enable or disable the `Secure` attribute.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the cookie path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Check that the configuration can be used to issue sessions.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(Error::Config("ttl must be greater than zero".to_string()));
        }
        if chrono::TimeDelta::from_std(self.ttl).is_err() {
            return Err(Error::Config("ttl is too large".to_string()));
        }
        if self.cookie_name.is_empty() {
            return Err(Error::Config("cookie name must not be empty".to_string()));
        }
        if !self.cookie_name.bytes().all(is_token_char) {
            return Err(Error::Config(format!(
                "cookie name {:?} is not a valid token",
                self.cookie_name
            )));
        }
        if !is_attribute_value(&self.path) {
            return Err(Error::Config(format!(
                "cookie path {:?} contains an illegal character",
                self.path
            )));
        }
        if let Some(domain) = self.domain.as_deref().filter(|d| !is_attribute_value(d)) {
            return Err(Error::Config(format!(
                "cookie domain {domain:?} contains an illegal character"
            )));
        }
        if self.same_site == SameSitePolicy::None && !self.secure {
            return Err(Error::Config(
                "SameSite=None requires the Secure attribute".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse from a TOML document with an optional `[session]` table.
    ///
    /// ```toml
    /// [session]
    /// ttl_secs = 3600
    /// cookie_name = "sid"
    /// same_site = "strict"
    /// secure = true
    /// ```
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        let config: SessionConfig = file.session.unwrap_or_default().into();
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }
}

/// RFC 7230 `tchar`, which RFC 6265 uses for cookie names.
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Attribute values may not contain control characters or `;`.
fn is_attribute_value(value: &str) -> bool {
    !value.chars().any(|c| c.is_control() || c == ';')
}

/// Load session configuration from a specific file path.
pub fn load_config_file(path: &Path) -> std::result::Result<SessionConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    SessionConfig::from_toml(&contents)
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    session: Option<RawSessionConfig>,
}

/// On-disk shape of the `[session]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSessionConfig {
    ttl_secs: u64,
    cookie_name: String,
    same_site: SameSitePolicy,
    secure: bool,
    path: String,
    domain: Option<String>,
}

impl Default for RawSessionConfig {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            ttl_secs: defaults.ttl.as_secs(),
            cookie_name: defaults.cookie_name,
            same_site: defaults.same_site,
            secure: defaults.secure,
            path: defaults.path,
            domain: defaults.domain,
        }
    }
}

impl From<RawSessionConfig> for SessionConfig {
    fn from(raw: RawSessionConfig) -> Self {
        Self {
            ttl: Duration::from_secs(raw.ttl_secs),
            cookie_name: raw.cookie_name,
            same_site: raw.same_site,
            secure: raw.secure,
            path: raw.path,
            domain: raw.domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.cookie_name, "session");
        assert_eq!(config.same_site, SameSitePolicy::Lax);
        assert!(config.secure);
        assert_eq!(config.path, "/");
        assert!(config.domain.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_ttl(Duration::from_secs(60))
            .with_cookie_name("sid")
            .with_same_site(SameSitePolicy::Strict)
            .with_secure(false)
            .with_path("/app")
            .with_domain("example.com");

        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.same_site, SameSitePolicy::Strict);
        assert!(!config.secure);
        assert_eq!(config.path, "/app");
        assert_eq!(config.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SessionConfig::new().with_ttl(Duration::ZERO).validate().is_err());
        assert!(SessionConfig::new().with_cookie_name("").validate().is_err());
        assert!(
            SessionConfig::new()
                .with_same_site(SameSitePolicy::None)
                .with_secure(false)
                .validate()
                .is_err()
        );
        assert!(
            SessionConfig::new()
                .with_same_site(SameSitePolicy::None)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_validate_rejects_header_unsafe_attributes() {
        for name in ["a b", "a;b", "a=b", "sid\u{1}", "s\u{e9}"] {
            assert!(
                SessionConfig::new().with_cookie_name(name).validate().is_err(),
                "{name:?}"
            );
        }
        for path in ["/\u{1}", "/a;b", "/\n"] {
            assert!(SessionConfig::new().with_path(path).validate().is_err(), "{path:?}");
        }
        assert!(
            SessionConfig::new()
                .with_domain("example.com; secure")
                .validate()
                .is_err()
        );
        assert!(
            SessionConfig::new()
                .with_cookie_name("__Host-sid")
                .with_path("/app/v1")
                .with_domain("example.com")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_from_toml() {
        let config = SessionConfig::from_toml(
            r#"
            [session]
            ttl_secs = 3600
            cookie_name = "sid"
            same_site = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.same_site, SameSitePolicy::Strict);
        // Unspecified fields keep their defaults
        assert!(config.secure);
        assert_eq!(config.path, "/");
    }

    #[test]
    fn test_from_toml_capitalized_same_site() {
        let config = SessionConfig::from_toml("[session]\nsame_site = \"Strict\"\n").unwrap();
        assert_eq!(config.same_site, SameSitePolicy::Strict);
    }

    #[test]
    fn test_from_toml_empty_document_uses_defaults() {
        let config = SessionConfig::from_toml("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let err = SessionConfig::from_toml("[session]\nttl_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_toml("[session]\nttl = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        std::fs::write(&path, "[session]\ncookie_name = \"from_file\"\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.cookie_name, "from_file");
    }

    #[test]
    fn test_load_config_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
