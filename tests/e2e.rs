//! End-to-end tests against the live pdflayer API.
//!
//! These make real HTTP calls and consume account quota. They are gated
//! behind the `E2E_ENABLED` environment variable and need credentials in
//! `PDFLAYER_ACCESS_KEY` (and `PDFLAYER_SECRET_KEY` if URL signing is enabled
//! on the account).
//!
//! Run with:
//!   E2E_ENABLED=1 PDFLAYER_ACCESS_KEY=... cargo test --test e2e -- --nocapture

use pdflayer::{
    Client, ConvertError, ConvertParameters, ConvertQuery, ConvertResult, ServiceOptions,
};
use std::sync::{Arc, Mutex};

/// Skip this test unless E2E_ENABLED and an access key are set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let options = ServiceOptions::from_env();
        if options.access_key.is_none() {
            println!("SKIP — PDFLAYER_ACCESS_KEY is not set");
            return;
        }
        options
    }};
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("pdflayer=debug"))
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn url_to_pdf() {
    let options = e2e_skip_unless_ready!();
    init_tracing();

    let client = Client::new(options).expect("client");
    let query = ConvertQuery::new("https://en.wikipedia.org/wiki/Special:Random", None);

    let result = client
        .convert(Some(query.into()), None, None)
        .await
        .expect("convert should succeed");

    let pdf = result.as_pdf().expect("expected PDF bytes");
    assert!(pdf.starts_with(b"%PDF"), "response is not a PDF");
    println!("✓ {} bytes", pdf.len());
}

#[tokio::test]
async fn html_to_exported_file_with_callback() {
    let options = e2e_skip_unless_ready!();
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pdf");
    let client = Client::new(options).expect("client");
    let query = ConvertQuery::new(
        "<h1>Hello from pdflayer</h1>",
        Some(ConvertParameters::new().export(path.to_string_lossy())),
    );

    let called = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&called);
    let result = client
        .convert(
            Some(query.into()),
            Some(Box::new(move |outcome: Result<&ConvertResult, &ConvertError>| {
                *flag.lock().unwrap() = outcome.is_ok();
            })),
            None,
        )
        .await
        .expect("convert should succeed");

    assert!(*called.lock().unwrap(), "callback should report success");
    assert!(result.as_receipt().is_some());
    let bytes = std::fs::read(&path).expect("export file");
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn bad_access_key_is_a_service_error() {
    let _ = e2e_skip_unless_ready!();
    init_tracing();

    let client = Client::new(ServiceOptions {
        access_key: Some("definitely-not-a-key".into()),
        ..Default::default()
    })
    .expect("client");
    let query = ConvertQuery::new("<p>x</p>", None);

    let err = client
        .convert(Some(query.into()), None, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ConvertError::Service(_) | ConvertError::Transport(_)),
        "got: {err}"
    );
}
