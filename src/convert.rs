//! The conversion call: validate, sign, dispatch, resolve.
//!
//! [`Client::convert`] is the primary entry point. It returns a [`Deferred`]
//! immediately and mirrors the outcome into an optional callback. The
//! pipeline itself lives in [`Client::execute`], which callers that only want
//! an `async fn` can await directly.
//!
//! ## Pipeline
//!
//! ```text
//! options ─▶ merge (call > client > defaults)
//! params  ─▶ presence check ─▶ sign URL ─▶ transport ─▶ error field? ─▶ export?
//! ```
//!
//! Only presence is checked locally. The service owns the real validation
//! rules, and duplicating them here would drift from the service over time.

use crate::config::{ResolvedOptions, ServiceOptions, SERVICE_NAME};
use crate::deferred::{mirror, ConvertCallback, ConvertOutcome, Deferred};
use crate::error::{ConvertError, ServiceError};
use crate::export::{ExportWriter, FsExportWriter};
use crate::output::{ConvertResult, ExportReceipt};
use crate::params::{ConvertParameters, ParamValue, DOCUMENT_HTML, DOCUMENT_URL, SECRET_KEY};
use crate::transport::{
    HttpTransport, RequestParams, ResponseMode, Transport, TransportQuery, TransportResponse,
};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Client for the conversion service.
///
/// Cheap to clone: the transport and export writer are shared behind `Arc`s
/// and the instance options are only read.
#[derive(Clone)]
pub struct Client {
    options: ServiceOptions,
    transport: Arc<dyn Transport>,
    writer: Arc<dyn ExportWriter>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.options)
            .field("transport", &"<dyn Transport>")
            .field("writer", &"<dyn ExportWriter>")
            .finish()
    }
}

impl Client {
    /// Create a client that talks to the service over HTTP.
    pub fn new(options: ServiceOptions) -> Result<Self, ConvertError> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(options, Arc::new(transport)))
    }

    /// Create a client with a caller-supplied transport.
    pub fn with_transport(options: ServiceOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            options,
            transport,
            writer: Arc::new(FsExportWriter),
        }
    }

    /// Replace the writer used for `export` requests.
    pub fn with_export_writer(mut self, writer: Arc<dyn ExportWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// The instance-level options.
    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Convert a document, reporting through a future and an optional callback.
    ///
    /// The conversion starts immediately on the current tokio runtime. The
    /// returned [`Deferred`] resolves to the outcome; if `callback` is given
    /// it receives the same outcome, by reference, exactly once and before
    /// the deferred resolves.
    ///
    /// Called outside a tokio runtime, the deferred settles at once with
    /// [`ConvertError::Internal`] (and the callback is told).
    ///
    /// # Arguments
    /// * `params`   — the parameter bag, usually built with [`crate::ConvertQuery`]
    /// * `callback` — optional continuation
    /// * `options`  — per-call options, taking precedence over the client's
    pub fn convert(
        &self,
        params: Option<ConvertParameters>,
        callback: Option<ConvertCallback>,
        options: Option<ServiceOptions>,
    ) -> Deferred {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let client = self.clone();
                let handle = runtime.spawn(async move {
                    let outcome = AssertUnwindSafe(client.execute(params, options.as_ref()))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|panic| {
                            Err(ConvertError::Internal(format!(
                                "conversion task panicked: {}",
                                panic_message(panic.as_ref())
                            )))
                        });
                    mirror(outcome, callback)
                });
                Deferred::running(handle)
            }
            Err(e) => Deferred::settled(mirror(
                Err(ConvertError::Internal(format!("no tokio runtime available: {e}"))),
                callback,
            )),
        }
    }

    /// Run the conversion pipeline and return its outcome.
    ///
    /// # Errors
    /// - [`ConvertError::MissingArgument`] — `params` is `None` or names no document
    /// - [`ConvertError::Transport`] — the HTTP call failed
    /// - [`ConvertError::Service`] — the service reported an error
    /// - [`ConvertError::ExportWriteFailed`] — the export file could not be written
    pub async fn execute(
        &self,
        params: Option<ConvertParameters>,
        options: Option<&ServiceOptions>,
    ) -> ConvertOutcome {
        let start = Instant::now();
        let resolved = ServiceOptions::merge(options, &self.options);
        debug!("Resolved options: {:?}", resolved);

        let outcome = self.run(params, resolved).await;
        match &outcome {
            Ok(result) => info!(
                "Conversion complete in {}ms ({})",
                start.elapsed().as_millis(),
                describe(result)
            ),
            Err(e) => warn!("Conversion failed: {}", e),
        }
        outcome
    }

    /// Blocking wrapper around [`execute`](Self::execute).
    ///
    /// Creates a temporary tokio runtime internally, so it must not be called
    /// from inside an async context.
    pub fn convert_sync(
        &self,
        params: Option<ConvertParameters>,
        options: Option<&ServiceOptions>,
    ) -> ConvertOutcome {
        tokio::runtime::Runtime::new()
            .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.execute(params, options))
    }

    async fn run(
        &self,
        params: Option<ConvertParameters>,
        options: ResolvedOptions,
    ) -> ConvertOutcome {
        // ── Step 1: Presence validation ──────────────────────────────────
        let params = validate(params)?;

        // ── Step 2: Sign URL requests ────────────────────────────────────
        let qs = sign_params(params, options.secret_key.as_deref());
        let export = qs.export_path();

        // ── Step 3: Dispatch ─────────────────────────────────────────────
        info!(
            "Requesting {} from {} ({} parameters)",
            options.service,
            options.base_url,
            qs.len()
        );
        debug!(
            "Parameters: {}",
            qs.iter().map(|(k, _)| k).collect::<Vec<_>>().join(", ")
        );
        let query = TransportQuery {
            options,
            params: RequestParams {
                mode: ResponseMode::Binary,
                qs,
            },
        };
        let response = self.transport.request(query).await?;

        // ── Step 4: Promote service-reported errors ──────────────────────
        if let Some(error) = response.error_field() {
            return Err(ConvertError::Service(ServiceError::from_value(error.clone())));
        }

        // ── Step 5: Export or return ─────────────────────────────────────
        match export {
            Some(path) => {
                if matches!(response, TransportResponse::Json(_)) {
                    warn!(
                        "Service answered with JSON, not a PDF; exporting the JSON body to {}",
                        path
                    );
                }
                let bytes = response.into_bytes();
                self.writer
                    .write(Path::new(&path), &bytes)
                    .await
                    .map_err(|source| ConvertError::ExportWriteFailed {
                        path: PathBuf::from(&path),
                        source,
                    })?;
                info!("Exported {} bytes to {}", bytes.len(), path);
                Ok(ConvertResult::Exported(ExportReceipt::new(path)))
            }
            None => Ok(match response {
                TransportResponse::Binary(bytes) => ConvertResult::Pdf(bytes),
                TransportResponse::Json(value) => ConvertResult::Json(value),
            }),
        }
    }
}

/// Check that `params` is present and names a document.
fn validate(params: Option<ConvertParameters>) -> Result<ConvertParameters, ConvertError> {
    let params = params.ok_or_else(|| ConvertError::missing_argument(SERVICE_NAME, "params"))?;
    if !params.has_document() {
        return Err(ConvertError::missing_argument(
            SERVICE_NAME,
            format!("params.{DOCUMENT_URL} | params.{DOCUMENT_HTML}"),
        ));
    }
    Ok(params)
}

/// Signature the service expects for URL requests: the lowercase hex MD5 of
/// the unencoded URL followed by the account secret key.
pub fn signature(document_url: &str, secret_key: &str) -> String {
    format!("{:x}", md5::compute(format!("{document_url}{secret_key}")))
}

/// Add `secret_key` and percent-encode `document_url`, if present.
///
/// The hash is taken over the unencoded URL; encoding happens afterwards.
/// HTML requests are returned unchanged.
pub fn sign_params(mut params: ConvertParameters, secret_key: Option<&str>) -> ConvertParameters {
    let Some(url) = params.get(DOCUMENT_URL).map(ParamValue::to_string) else {
        return params;
    };

    let secret = secret_key.unwrap_or_else(|| {
        warn!("No secret key configured; signing document_url without one");
        ""
    });

    params.set(SECRET_KEY, signature(&url, secret));
    params.set(DOCUMENT_URL, urlencoding::encode(&url).into_owned());
    debug!("Signed document_url request");
    params
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

fn describe(result: &ConvertResult) -> String {
    match result {
        ConvertResult::Pdf(bytes) => format!("{} bytes", bytes.len()),
        ConvertResult::Json(_) => "JSON body".to_string(),
        ConvertResult::Exported(receipt) => format!("exported to {}", receipt.file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TITLE;

    #[test]
    fn signature_is_lowercase_hex_md5() {
        assert_eq!(signature("ab", "c"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            signature("https://en.wikipedia.org/wiki/Special:Random", "secret"),
            "5c5850d978aea71a5ae4fc27235ee456"
        );
    }

    #[test]
    fn sign_hashes_before_encoding() {
        let url = "https://example.com/a b?x=1&y=2";
        let params = ConvertParameters::new().with(DOCUMENT_URL, url);

        let signed = sign_params(params, Some("s3cr3t"));

        assert_eq!(
            signed.get(SECRET_KEY),
            Some(&ParamValue::from("fa9212c9648371af9cf55322c3e14254"))
        );
        assert_eq!(
            signed.get(DOCUMENT_URL),
            Some(&ParamValue::from("https%3A%2F%2Fexample.com%2Fa%20b%3Fx%3D1%26y%3D2"))
        );
    }

    #[test]
    fn encoding_escapes_reserved_marks() {
        let url = "https://example.com/it's(1)!*";
        let signed = sign_params(ConvertParameters::new().with(DOCUMENT_URL, url), Some(""));
        assert_eq!(
            signed.get(DOCUMENT_URL),
            Some(&ParamValue::from("https%3A%2F%2Fexample.com%2Fit%27s%281%29%21%2A"))
        );
        // The signature still covers the unencoded URL.
        assert_eq!(
            signed.get(SECRET_KEY),
            Some(&ParamValue::from(signature(url, "")))
        );
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let s: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");
        let s: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }

    #[test]
    fn sign_without_secret_hashes_url_alone() {
        let url = "https://example.com/a b?x=1&y=2";
        let signed = sign_params(ConvertParameters::new().with(DOCUMENT_URL, url), None);
        assert_eq!(
            signed.get(SECRET_KEY),
            Some(&ParamValue::from("81e411855d9842a2ae7eea55e6ed1454"))
        );
    }

    #[test]
    fn sign_leaves_html_requests_alone() {
        let params = ConvertParameters::new()
            .with(DOCUMENT_HTML, "<a href=\"http://x\">x</a>")
            .with(TITLE, "t");
        let signed = sign_params(params.clone(), Some("secret"));
        assert_eq!(signed, params);
        assert!(!signed.contains(SECRET_KEY));
    }

    #[test]
    fn sign_replaces_caller_supplied_secret_key() {
        let params = ConvertParameters::new()
            .with(DOCUMENT_URL, "ab")
            .with(SECRET_KEY, "forged");
        let signed = sign_params(params, Some("c"));
        assert_eq!(
            signed.get(SECRET_KEY),
            Some(&ParamValue::from("900150983cd24fb0d6963f7d28e17f72"))
        );
    }

    #[test]
    fn validate_reports_missing_params() {
        let err = validate(None).unwrap_err();
        match err {
            ConvertError::MissingArgument { service, argument } => {
                assert_eq!(service, "convert");
                assert_eq!(argument, "params");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_reports_missing_document() {
        let err = validate(Some(ConvertParameters::new().with(TITLE, "t"))).unwrap_err();
        match err {
            ConvertError::MissingArgument { argument, .. } => {
                assert_eq!(argument, "params.document_url | params.document_html");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
