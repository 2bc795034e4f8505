//! Error types for the pdflayer client.
//!
//! Every failure a conversion can hit ends up in [`ConvertError`]. There are
//! four kinds that matter to callers:
//!
//! * [`ConvertError::MissingArgument`] — local precondition failure, raised
//!   before anything touches the network.
//! * [`ConvertError::Transport`] — the HTTP call itself failed (connection,
//!   timeout, non-2xx status, undecodable body). See [`TransportError`].
//! * [`ConvertError::Service`] — the service answered, but the decoded body
//!   carried an `error` object. See [`ServiceError`].
//! * [`ConvertError::ExportWriteFailed`] — the PDF came back but could not be
//!   saved to the requested `export` path.
//!
//! None of them is retried by the client. The remote service does the real
//! parameter validation, so the only checks done locally are presence checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdflayer client.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Local validation ──────────────────────────────────────────────────
    /// A required argument was not supplied.
    #[error("Missing argument '{argument}' for service '{service}'")]
    MissingArgument { service: String, argument: String },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The HTTP exchange with the service failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service returned a well-formed response carrying an `error` field.
    #[error("Service error: {0}")]
    Service(ServiceError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The converted document could not be written to the export path.
    #[error("Failed to write export file '{path}': {source}")]
    ExportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. the conversion task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    pub(crate) fn missing_argument(service: &str, argument: impl Into<String>) -> Self {
        ConvertError::MissingArgument {
            service: service.to_string(),
            argument: argument.into(),
        }
    }
}

/// Failure of the underlying HTTP exchange.
///
/// Produced by [`crate::transport::Transport`] implementations. The client
/// forwards it untouched inside [`ConvertError::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// reqwest could not build or send the request (DNS, TLS, connection).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded as the expected format.
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// An error object reported by the service inside an otherwise valid response.
///
/// pdflayer reports failures as
/// `{"success": false, "error": {"code": 101, "type": "...", "info": "..."}}`.
/// The raw `error` value is kept so nothing the service sent is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Numeric error code, when the service supplied one.
    pub code: Option<i64>,
    /// Machine-readable error type, e.g. `missing_access_key`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Human-readable description.
    pub info: Option<String>,
    /// The `error` value exactly as decoded.
    #[serde(skip)]
    pub raw: Value,
}

impl ServiceError {
    /// Build a `ServiceError` from the decoded `error` field.
    ///
    /// Objects are read for `code`, `type` and `info`; any other value (a bare
    /// string, say) becomes the `info` text.
    pub fn from_value(value: Value) -> Self {
        match &value {
            Value::Object(map) => ServiceError {
                code: map.get("code").and_then(Value::as_i64),
                kind: map.get("type").and_then(Value::as_str).map(str::to_string),
                info: map.get("info").and_then(Value::as_str).map(str::to_string),
                raw: value,
            },
            Value::String(s) => ServiceError {
                code: None,
                kind: None,
                info: Some(s.clone()),
                raw: value,
            },
            other => ServiceError {
                code: None,
                kind: None,
                info: Some(other.to_string()),
                raw: value,
            },
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.kind) {
            (Some(code), Some(kind)) => write!(f, "[{code}] {kind}")?,
            (Some(code), None) => write!(f, "[{code}]")?,
            (None, Some(kind)) => write!(f, "{kind}")?,
            (None, None) => write!(f, "unknown error")?,
        }
        if let Some(ref info) = self.info {
            write!(f, ": {info}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_argument_display() {
        let e = ConvertError::missing_argument("convert", "params");
        let msg = e.to_string();
        assert!(msg.contains("'params'"), "got: {msg}");
        assert!(msg.contains("'convert'"), "got: {msg}");
    }

    #[test]
    fn service_error_from_object() {
        let e = ServiceError::from_value(json!({
            "code": 101,
            "type": "missing_access_key",
            "info": "You have not supplied an API Access Key."
        }));
        assert_eq!(e.code, Some(101));
        assert_eq!(e.kind.as_deref(), Some("missing_access_key"));
        assert_eq!(
            e.to_string(),
            "[101] missing_access_key: You have not supplied an API Access Key."
        );
    }

    #[test]
    fn service_error_from_string() {
        let e = ServiceError::from_value(json!("quota exceeded"));
        assert_eq!(e.info.as_deref(), Some("quota exceeded"));
        assert_eq!(e.raw, json!("quota exceeded"));
        assert_eq!(e.to_string(), "unknown error: quota exceeded");
    }

    #[test]
    fn status_display() {
        let e = ConvertError::from(TransportError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        });
        assert!(e.to_string().contains("HTTP 502"));
    }

    #[test]
    fn export_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = ConvertError::ExportWriteFailed {
            path: PathBuf::from("/nope/out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/nope/out.pdf"));
        assert!(e.source().is_some());
    }
}
