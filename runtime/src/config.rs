//! Static middleware configuration.
//!
//! Read once at process start and immutable afterwards. Two values exist:
//! the base URL every endpoint is appended to, and the request-encoding
//! mode matching the backend's expectations.

use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "API_URL";

/// Environment variable selecting the request-encoding mode.
pub const API_ENGINE_VAR: &str = "API_ENGINE";

/// How non-GET request parameters are encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestEncoding {
    /// Plain JSON bodies with the real HTTP method.
    #[default]
    Json,
    /// Form-method spoofing: every non-GET request goes out as a POST
    /// carrying a multipart form body, with the real method embedded under
    /// the reserved `_method` field. Required by backends that route
    /// PUT/PATCH/DELETE through HTML-form semantics.
    FormSpoof,
}

/// Configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `API_URL` environment variable was missing or empty.
    #[error("missing {API_URL_VAR} environment variable")]
    MissingBaseUrl,
}

/// Immutable middleware configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    encoding: RequestEncoding,
}

impl ApiConfig {
    /// Create a configuration with an explicit base URL and encoding mode.
    #[must_use]
    pub fn new(base_url: impl Into<String>, encoding: RequestEncoding) -> Self {
        Self {
            base_url: base_url.into(),
            encoding,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `API_URL` is required. `API_ENGINE=form-spoof` selects
    /// [`RequestEncoding::FormSpoof`]; any other value (or none) selects
    /// JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBaseUrl`] if `API_URL` is unset or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var(API_URL_VAR).ok().as_deref(),
            std::env::var(API_ENGINE_VAR).ok().as_deref(),
        )
    }

    fn from_vars(base_url: Option<&str>, engine: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let encoding = match engine {
            Some("form-spoof") => RequestEncoding::FormSpoof,
            _ => RequestEncoding::Json,
        };

        Ok(Self {
            base_url: base_url.to_string(),
            encoding,
        })
    }

    /// The base URL endpoints are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The request-encoding mode.
    #[must_use]
    pub const fn encoding(&self) -> RequestEncoding {
        self.encoding
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn explicit_config_keeps_values() {
        let config = ApiConfig::new("https://api.example.com", RequestEncoding::FormSpoof);
        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.encoding(), RequestEncoding::FormSpoof);
    }

    #[test]
    fn default_encoding_is_json() {
        assert_eq!(RequestEncoding::default(), RequestEncoding::Json);
    }

    #[test]
    fn missing_or_empty_base_url_is_rejected() {
        assert!(matches!(
            ApiConfig::from_vars(None, None),
            Err(ConfigError::MissingBaseUrl)
        ));
        assert!(matches!(
            ApiConfig::from_vars(Some(""), Some("form-spoof")),
            Err(ConfigError::MissingBaseUrl)
        ));
    }

    #[test]
    fn engine_variable_selects_the_encoding() {
        let form = ApiConfig::from_vars(Some("https://api.example.com"), Some("form-spoof"));
        assert_eq!(form.unwrap().encoding(), RequestEncoding::FormSpoof);

        let explicit_other = ApiConfig::from_vars(Some("https://api.example.com"), Some("json"));
        assert_eq!(explicit_other.unwrap().encoding(), RequestEncoding::Json);

        let unset = ApiConfig::from_vars(Some("https://api.example.com"), None);
        assert_eq!(unset.unwrap().encoding(), RequestEncoding::Json);
    }
}
