//! # pdflayer
//!
//! Client for the [pdflayer](https://pdflayer.com) HTML/URL-to-PDF conversion API.
//!
//! ## What this crate does
//!
//! The service does the rendering. The client builds a correctly shaped
//! request, calls the service and hands the answer back. The part with actual
//! decisions in it is the `convert` call:
//!
//! - a document string starting with `http` is sent as `document_url`,
//!   anything else as `document_html`;
//! - URL requests are signed with `md5(url + secret_key)` and the URL is
//!   percent-encoded *after* hashing;
//! - options are merged call > client > service defaults;
//! - with an `export` parameter the PDF is written to disk and a receipt is
//!   returned instead of the bytes;
//! - the single outcome is delivered both to a future and to an optional
//!   callback.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ConvertQuery
//!  │
//!  ├─ 1. Merge     call options > client options > {service: convert, method: POST}
//!  ├─ 2. Validate  params present, document_url | document_html present
//!  ├─ 3. Sign      secret_key = md5(url + secret), then encode url
//!  ├─ 4. Dispatch  Transport::request (reqwest by default)
//!  ├─ 5. Normalise JSON `error` field → ConvertError::Service
//!  └─ 6. Export    write PDF to `export` path → ExportReceipt
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdflayer::{Client, ConvertQuery, ConvertResult, ServiceOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from PDFLAYER_ACCESS_KEY / PDFLAYER_SECRET_KEY
//!     let client = Client::new(ServiceOptions::from_env())?;
//!     let query = ConvertQuery::new("https://en.wikipedia.org/wiki/Special:Random", None);
//!
//!     match client.convert(Some(query.into()), None, None).await? {
//!         ConvertResult::Pdf(bytes) => std::fs::write("random.pdf", bytes)?,
//!         other => println!("{:?}", other),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdflayer` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdflayer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod deferred;
pub mod error;
pub mod export;
pub mod output;
pub mod params;
pub mod query;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{HttpMethod, ResolvedOptions, ServiceOptions, ServiceOptionsBuilder};
pub use convert::{sign_params, signature, Client};
pub use deferred::{ConvertCallback, ConvertOutcome, Deferred};
pub use error::{ConvertError, ServiceError, TransportError};
pub use export::{ExportWriter, FsExportWriter};
pub use output::{ConvertResult, ExportReceipt};
pub use params::{ConvertParameters, ParamValue};
pub use query::{ConvertQuery, DocumentReference};
pub use transport::{
    HttpTransport, RequestParams, ResponseMode, Transport, TransportQuery, TransportResponse,
};
