//! Service configuration and option merging.
//!
//! Options can be supplied in three places, and for each field the first one
//! that is set wins:
//!
//! 1. the `options` argument of a single [`crate::Client::convert`] call,
//! 2. the options the [`crate::Client`] was constructed with,
//! 3. the built-in service defaults (`service = "convert"`, `method = POST`).
//!
//! The merge runs once at call entry and produces a [`ResolvedOptions`] that
//! the rest of the call reads from.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the conversion endpoint.
pub const SERVICE_NAME: &str = "convert";

/// Default API root; the endpoint is `{base_url}/{service}`.
pub const DEFAULT_BASE_URL: &str = "https://api.pdflayer.com/api";

/// Default per-request timeout applied by the HTTP transport.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP method used for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing service options. Every field is optional so that partial
/// option sets can be layered.
///
/// # Example
/// ```rust
/// use pdflayer::ServiceOptions;
///
/// let options = ServiceOptions::builder()
///     .access_key("my-access-key")
///     .secret_key("my-secret-key")
///     .timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOptions {
    /// Account access key, sent as the `access_key` query parameter.
    pub access_key: Option<String>,

    /// Account secret key. Never sent; only used to sign URL requests.
    pub secret_key: Option<String>,

    /// Service (endpoint) name. Default: `convert`.
    pub service: Option<String>,

    /// HTTP method. Default: POST.
    pub method: Option<HttpMethod>,

    /// API root. Default: [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,

    /// Per-request timeout in seconds. Default: [`DEFAULT_TIMEOUT_SECS`].
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("service", &self.service)
            .field("method", &self.method)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ServiceOptions {
    /// Create a new builder for `ServiceOptions`.
    pub fn builder() -> ServiceOptionsBuilder {
        ServiceOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Read credentials and endpoint from the environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `PDFLAYER_ACCESS_KEY` | `access_key` |
    /// | `PDFLAYER_SECRET_KEY` | `secret_key` |
    /// | `PDFLAYER_BASE_URL`   | `base_url` |
    ///
    /// Unset or empty variables leave the field as `None`.
    pub fn from_env() -> Self {
        Self {
            access_key: non_empty_env("PDFLAYER_ACCESS_KEY"),
            secret_key: non_empty_env("PDFLAYER_SECRET_KEY"),
            base_url: non_empty_env("PDFLAYER_BASE_URL"),
            ..Self::default()
        }
    }

    /// Built-in defaults of the conversion service.
    pub fn service_defaults() -> Self {
        Self {
            service: Some(SERVICE_NAME.to_string()),
            method: Some(HttpMethod::Post),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            ..Self::default()
        }
    }

    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: &ServiceOptions) -> ServiceOptions {
        ServiceOptions {
            access_key: self.access_key.or_else(|| fallback.access_key.clone()),
            secret_key: self.secret_key.or_else(|| fallback.secret_key.clone()),
            service: self.service.or_else(|| fallback.service.clone()),
            method: self.method.or(fallback.method),
            base_url: self.base_url.or_else(|| fallback.base_url.clone()),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }

    /// Three-tier merge: `explicit` > `instance` > service defaults.
    pub fn merge(explicit: Option<&ServiceOptions>, instance: &ServiceOptions) -> ResolvedOptions {
        let merged = explicit
            .cloned()
            .unwrap_or_default()
            .or(instance)
            .or(&Self::service_defaults());

        ResolvedOptions {
            access_key: merged.access_key,
            secret_key: merged.secret_key,
            service: merged.service.unwrap_or_else(|| SERVICE_NAME.to_string()),
            method: merged.method.unwrap_or_default(),
            base_url: merged.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Builder for [`ServiceOptions`].
#[derive(Debug)]
pub struct ServiceOptionsBuilder {
    options: ServiceOptions,
}

impl ServiceOptionsBuilder {
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.options.access_key = Some(key.into());
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.options.secret_key = Some(key.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.options.service = Some(service.into());
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.options.method = Some(method);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.options.base_url = Some(url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.options.timeout_secs = Some(secs);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ServiceOptions, ConvertError> {
        let o = &self.options;
        if let Some(ref url) = o.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConvertError::InvalidConfig(format!(
                    "base URL must start with http:// or https://, got '{url}'"
                )));
            }
        }
        if o.timeout_secs == Some(0) {
            return Err(ConvertError::InvalidConfig("Timeout must be ≥ 1 second".into()));
        }
        if o.service.as_deref() == Some("") {
            return Err(ConvertError::InvalidConfig("Service name must not be empty".into()));
        }
        Ok(self.options)
    }
}

/// Options after the three-tier merge. Every field the call needs is set.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub service: String,
    pub method: HttpMethod,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ResolvedOptions {
    /// Full endpoint URL: `{base_url}/{service}`.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.service)
    }
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("service", &self.service)
            .field("method", &self.method)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
