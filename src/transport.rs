//! Transport: the collaborator that actually talks HTTP.
//!
//! The client never calls reqwest directly. It describes the request as a
//! [`TransportQuery`] (resolved options plus the query-string parameters and
//! the expected response mode) and hands it to a [`Transport`]. This keeps
//! request construction testable without a network and lets callers plug in
//! their own HTTP stack.
//!
//! [`HttpTransport`] is the default implementation. It sends a single
//! request: no retries and no connection management beyond what reqwest does.

use crate::config::{HttpMethod, ResolvedOptions};
use crate::error::TransportError;
use crate::params::ConvertParameters;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Name of the query parameter carrying the account access key.
pub const ACCESS_KEY_PARAM: &str = "access_key";

/// How the response body should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Return the body bytes untouched (PDF), unless the service answers
    /// with JSON.
    #[default]
    Binary,
    /// Always decode the body as JSON.
    Json,
}

/// Request-level parameters: response mode and the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub mode: ResponseMode,
    pub qs: ConvertParameters,
}

/// Everything a transport needs to perform one request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportQuery {
    pub options: ResolvedOptions,
    pub params: RequestParams,
}

/// The decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportResponse {
    /// Raw body bytes (a PDF on success).
    Binary(Vec<u8>),
    /// A decoded JSON body.
    Json(Value),
}

impl TransportResponse {
    /// The `error` field of a JSON body, if there is one.
    pub fn error_field(&self) -> Option<&Value> {
        match self {
            TransportResponse::Json(Value::Object(map)) => map.get("error"),
            _ => None,
        }
    }

    /// The body as bytes; JSON is re-serialised.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            TransportResponse::Binary(bytes) => bytes,
            TransportResponse::Json(value) => value.to_string().into_bytes(),
        }
    }
}

/// Performs one request and settles exactly once with its result.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, query: TransportQuery) -> Result<TransportResponse, TransportError>;
}

/// The default transport, backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pdflayer-rust/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing reqwest client (shared connection pool, proxies, …).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Build the full query string: `access_key` first, then the parameter bag.
pub fn query_pairs(query: &TransportQuery) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(query.params.qs.len() + 1);
    if let Some(ref key) = query.options.access_key {
        pairs.push((ACCESS_KEY_PARAM.to_string(), key.clone()));
    }
    pairs.extend(query.params.qs.to_query_pairs());
    pairs
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, query: TransportQuery) -> Result<TransportResponse, TransportError> {
        let url = query.options.endpoint();
        let timeout_secs = query.options.timeout_secs;
        let pairs = query_pairs(&query);

        debug!(
            "{} {} ({} query parameters)",
            query.options.method,
            url,
            pairs.len()
        );

        let builder = match query.options.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        let response = builder
            .query(&pairs)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout { secs: timeout_secs }
                } else {
                    TransportError::Request(e)
                }
            })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { secs: timeout_secs }
            } else {
                TransportError::Request(e)
            }
        })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!("Received {} bytes (json: {})", body.len(), is_json);
        decode_body(query.params.mode, is_json, &body)
    }
}

/// Interpret a successful response body according to `mode`.
pub fn decode_body(
    mode: ResponseMode,
    is_json: bool,
    body: &[u8],
) -> Result<TransportResponse, TransportError> {
    if mode == ResponseMode::Json || is_json {
        serde_json::from_slice(body)
            .map(TransportResponse::Json)
            .map_err(|e| TransportError::Decode(e.to_string()))
    } else {
        Ok(TransportResponse::Binary(body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceOptions;
    use crate::params::{DOCUMENT_HTML, TITLE};
    use serde_json::json;

    fn query(access_key: Option<&str>) -> TransportQuery {
        let instance = ServiceOptions {
            access_key: access_key.map(str::to_string),
            secret_key: Some("never-sent".into()),
            ..Default::default()
        };
        TransportQuery {
            options: ServiceOptions::merge(None, &instance),
            params: RequestParams {
                mode: ResponseMode::Binary,
                qs: ConvertParameters::new()
                    .with(DOCUMENT_HTML, "<p>hi</p>")
                    .with(TITLE, "T"),
            },
        }
    }

    #[test]
    fn access_key_leads_query_string() {
        let pairs = query_pairs(&query(Some("abc")));
        assert_eq!(pairs[0], ("access_key".to_string(), "abc".to_string()));
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(_, v)| v != "never-sent"));
    }

    #[test]
    fn no_access_key_no_param() {
        let pairs = query_pairs(&query(None));
        assert!(pairs.iter().all(|(k, _)| k != ACCESS_KEY_PARAM));
    }

    #[test]
    fn binary_body_is_untouched() {
        let body = b"%PDF-1.4 binary";
        let r = decode_body(ResponseMode::Binary, false, body).unwrap();
        assert_eq!(r, TransportResponse::Binary(body.to_vec()));
        assert!(r.error_field().is_none());
    }

    #[test]
    fn json_body_is_decoded_in_binary_mode() {
        let body = br#"{"success":false,"error":{"code":101}}"#;
        let r = decode_body(ResponseMode::Binary, true, body).unwrap();
        assert_eq!(r.error_field(), Some(&json!({"code": 101})));
    }

    #[test]
    fn json_mode_rejects_garbage() {
        let err = decode_body(ResponseMode::Json, false, b"%PDF").unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn json_response_into_bytes() {
        let r = TransportResponse::Json(json!({"a": 1}));
        assert_eq!(r.into_bytes(), br#"{"a":1}"#.to_vec());
    }
}
