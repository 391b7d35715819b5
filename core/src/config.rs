//! Client configuration.
//!
//! A `Configuration` is built once and then shared read-only by every facade
//! through an `Arc`. To change it, build a new one.

use std::env;
use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::auth::{CredentialResolver, StaticToken};
use crate::error::ConfigError;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "PORTAL_API_URL";

/// Environment variable holding a personal access token.
pub const ACCESS_TOKEN_ENV: &str = "PORTAL_ACCESS_TOKEN";

/// Shared settings for every operation.
#[derive(Clone)]
pub struct Configuration {
    base_url: String,
    default_headers: Vec<(String, String)>,
    credentials: Option<Arc<dyn CredentialResolver>>,
}

impl Configuration {
    pub fn builder(base_url: &str) -> ConfigurationBuilder {
        ConfigurationBuilder::new(base_url)
    }

    /// Reads `PORTAL_API_URL` (falling back to [`DEFAULT_BASE_URL`]) and an
    /// optional `PORTAL_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut builder = Self::builder(&base_url);
        if let Ok(token) = env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                builder = builder.access_token(token);
            }
        }
        builder.build()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub fn credentials(&self) -> Option<&dyn CredentialResolver> {
        self.credentials.as_deref()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("credentials", &self.credentials.is_some())
            .finish()
    }
}

/// Builder for [`Configuration`]. Validation errors surface from `build`.
pub struct ConfigurationBuilder {
    base_url: String,
    default_headers: Vec<(String, String)>,
    credentials: Option<Arc<dyn CredentialResolver>>,
    error: Option<ConfigError>,
}

impl ConfigurationBuilder {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            default_headers: Vec::new(),
            credentials: None,
            error: None,
        }
    }

    /// Adds a header sent with every request unless the request sets it.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        let valid = HeaderName::try_from(name.as_str()).is_ok()
            && HeaderValue::try_from(value.as_str()).is_ok();
        if valid {
            self.default_headers.push((name, value));
        } else if self.error.is_none() {
            self.error = Some(ConfigError::InvalidHeader { name });
        }
        self
    }

    pub fn credentials(mut self, resolver: impl CredentialResolver + 'static) -> Self {
        self.credentials = Some(Arc::new(resolver));
        self
    }

    /// Shorthand for a [`StaticToken`] resolver.
    pub fn access_token(self, token: impl Into<String>) -> Self {
        self.credentials(StaticToken::new(token))
    }

    pub fn build(self) -> Result<Configuration, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let url = Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase { url: self.base_url });
        }
        Ok(Configuration {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            default_headers: self.default_headers,
            credentials: self.credentials,
        })
    }
}
