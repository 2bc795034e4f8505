//! CLI binary for pdflayer.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConvertQuery` + `ServiceOptions` and writes the PDF or the export
//! receipt.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdflayer::params::{self, Orientation, PageSize};
use pdflayer::{
    Client, ConvertError, ConvertParameters, ConvertQuery, ConvertResult, ParamValue,
    ServiceOptions,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a web page, PDF to stdout
  pdflayer https://en.wikipedia.org/wiki/Special:Random > random.pdf

  # Save to a file (sent as the `export` option; prints a receipt)
  pdflayer https://example.com -o out/example.pdf

  # Inline HTML, or HTML read from a file
  pdflayer '<h1>Hello</h1>' -o hello.pdf
  pdflayer @invoice.html --page-size Letter --orientation landscape -o invoice.pdf

  # Any catalogue parameter
  pdflayer https://example.com --param no_images=1 --param watermark_opacity=40 -o x.pdf

ENVIRONMENT VARIABLES:
  PDFLAYER_ACCESS_KEY     Account access key
  PDFLAYER_SECRET_KEY     Account secret key (signs URL requests, never sent)
  PDFLAYER_BASE_URL       Override the API root (default https://api.pdflayer.com/api)
  RUST_LOG                Override log filtering
"#;

/// Convert web pages and HTML to PDF with the pdflayer API.
#[derive(Parser, Debug)]
#[command(
    name = "pdflayer",
    version,
    about = "Convert web pages and HTML to PDF with the pdflayer API",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// URL (starting with http) or inline HTML. Prefix with @ to read HTML from a file.
    document: String,

    /// Save the PDF to this path instead of writing it to stdout.
    #[arg(short, long, env = "PDFLAYER_OUTPUT")]
    output: Option<PathBuf>,

    /// Account access key.
    #[arg(long, env = "PDFLAYER_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Account secret key used to sign URL requests.
    #[arg(long, env = "PDFLAYER_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// API root URL.
    #[arg(long, env = "PDFLAYER_BASE_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "PDFLAYER_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Page size: A0–A9, B0–B9, C5E, Comm10E, DLE, Executive, Folio, Ledger, Legal, Letter, Tabloid.
    #[arg(long, value_parser = parse_page_size)]
    page_size: Option<PageSize>,

    /// Page orientation.
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Name of the generated document.
    #[arg(long)]
    document_name: Option<String>,

    /// PDF title metadata.
    #[arg(long)]
    title: Option<String>,

    /// Extra parameter as KEY=VALUE (repeatable). Integer values are sent as numbers.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,

    /// Print the result (export receipt or JSON body) as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDFLAYER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFLAYER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFLAYER_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build request ────────────────────────────────────────────────────
    let document = read_document(&cli.document).await?;
    let overrides = build_overrides(&cli);
    let query = ConvertQuery::new(document, Some(overrides));
    let options = build_options(&cli)?;
    let client = Client::new(options).context("Failed to create HTTP client")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = show_progress.then(new_spinner);
    let callback_spinner = spinner.clone();

    let deferred = client.convert(
        Some(query.into_params()),
        Some(Box::new(
            move |outcome: Result<&ConvertResult, &ConvertError>| {
                if let Some(bar) = callback_spinner {
                    match outcome {
                        Ok(_) => bar.finish_and_clear(),
                        Err(e) => bar.abandon_with_message(red(&e.to_string())),
                    }
                }
            },
        )),
        None,
    );

    let result = deferred.await.context("Conversion failed")?;

    // ── Output ───────────────────────────────────────────────────────────
    match result {
        ConvertResult::Exported(receipt) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&receipt).context("Failed to serialise receipt")?
                );
            } else if !cli.quiet {
                eprintln!("{} {}  →  {}", green("✔"), receipt.info, bold(&receipt.file_name));
            }
        }
        ConvertResult::Pdf(bytes) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write to stdout")?;
            handle.flush().ok();
            if !cli.quiet {
                eprintln!("{} {} bytes written to stdout", green("✔"), bytes.len());
            }
        }
        ConvertResult::Json(value) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to serialise response")?
            );
        }
    }

    Ok(())
}

fn new_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message("waiting for pdflayer…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Resolve the positional argument: `@path` reads HTML from a file.
async fn read_document(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read HTML from {:?}", path)),
        None => Ok(arg.to_string()),
    }
}

/// Map CLI flags to the parameter overrides.
fn build_overrides(cli: &Cli) -> ConvertParameters {
    let mut overrides = ConvertParameters::new();
    if let Some(size) = cli.page_size {
        overrides = overrides.page_size(size);
    }
    if let Some(orientation) = cli.orientation {
        overrides = overrides.orientation(orientation.into());
    }
    if let Some(ref name) = cli.document_name {
        overrides = overrides.document_name(name.clone());
    }
    if let Some(ref title) = cli.title {
        overrides.set(params::TITLE, title.clone());
    }
    for (key, value) in &cli.params {
        overrides.set(key.clone(), value.clone());
    }
    // -o wins over a stray --param export=...
    if let Some(ref output) = cli.output {
        overrides = overrides.export(output.to_string_lossy().into_owned());
    }
    overrides
}

/// Map CLI flags to `ServiceOptions`.
fn build_options(cli: &Cli) -> Result<ServiceOptions> {
    let mut builder = ServiceOptions::builder().timeout_secs(cli.timeout);
    if let Some(ref key) = cli.access_key {
        builder = builder.access_key(key.clone());
    }
    if let Some(ref key) = cli.secret_key {
        builder = builder.secret_key(key.clone());
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    builder.build().context("Invalid configuration")
}

/// Parse `--page-size` against the catalogue.
fn parse_page_size(s: &str) -> Result<PageSize, String> {
    PageSize::from_wire(s).ok_or_else(|| {
        let names: Vec<&str> = PageSize::ALL.iter().map(|p| p.as_str()).collect();
        format!("unknown page size '{s}' (expected one of: {})", names.join(", "))
    })
}

/// Parse `--param KEY=VALUE`.
fn parse_param(s: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    let value = match value.parse::<i64>() {
        Ok(n) => ParamValue::Int(n),
        Err(_) => ParamValue::Text(value.to_string()),
    };
    Ok((key.to_string(), value))
}
