//! CLI binary for invoice2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `RenderConfig`, renders one order and prints a summary.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use invoice2pdf::{
    format_amount, render_invoice, ArtifactSummary, Branding, OrderAggregate, OverflowPolicy,
    RenderConfig, RenderedArtifact,
};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render and report, nothing written
  invoice2pdf order.json

  # Render and save to /tmp/invoices/INV-<id>.pdf
  invoice2pdf order.json --write

  # Custom name, directory and store branding
  invoice2pdf order.json --file-name march.pdf --output-dir ./out \
      --branding branding.json --write

  # Full store header and footer from the bundled sample
  invoice2pdf fixtures/order.json --branding fixtures/branding.json --write

  # Long orders across several pages, fixed date
  invoice2pdf big-order.json --paginate --date 2024-01-15 --write

  # Read the order from stdin, JSON summary on stdout
  cat order.json | invoice2pdf - --json

ORDER JSON:
  {
    "_id": "abc123",
    "user":    { "firstName": "Asha", "lastName": "Rao", "email": "asha@example.com" },
    "address": { "street": "12 Temple St", "city": "Palladam", "state": "TN",
                 "pincode": "641664", "phone": "98xxxxxx10" },
    "orderItems": [ { "product": { "name": "Silk Saree" }, "price": 100, "quantity": 2 } ]
  }

BRANDING JSON:
  { "store_name": "LABEL AADVI", "address_line": "...", "phone_line": "...",
    "thank_you": "...", "support_email": "..." }

ENVIRONMENT VARIABLES:
  INVOICE2PDF_OUTPUT_DIR  Output directory (default /tmp/invoices)
  INVOICE2PDF_BRANDING    Branding JSON file
  INVOICE2PDF_CURRENCY    Currency label (default Rs)
  RUST_LOG                Overrides --verbose / --quiet log filtering
"#;

/// Render customer orders as PDF invoices.
#[derive(Parser, Debug)]
#[command(
    name = "invoice2pdf",
    version,
    about = "Render customer orders as PDF invoices",
    long_about = "Render an order aggregate (JSON) as a fixed-layout A4 invoice with \
CGST/SGST totals. The document is produced in memory; pass --write to save it.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Order JSON file, or `-` for stdin.
    input: String,

    /// Artifact file name inside the output directory (default INV-<id>.pdf).
    #[arg(long)]
    file_name: Option<String>,

    /// Directory the artifact is resolved under.
    #[arg(long, env = "INVOICE2PDF_OUTPUT_DIR", default_value = invoice2pdf::config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// JSON file with store name, address, phone and footer text.
    #[arg(long, env = "INVOICE2PDF_BRANDING")]
    branding: Option<PathBuf>,

    /// Continue long tables on new pages instead of drawing past the margin.
    #[arg(long, env = "INVOICE2PDF_PAGINATE")]
    paginate: bool,

    /// Invoice date as YYYY-MM-DD (default: today).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Label printed before every amount.
    #[arg(long, env = "INVOICE2PDF_CURRENCY", default_value = "Rs")]
    currency: String,

    /// Leave content streams uncompressed (useful when inspecting output).
    #[arg(long)]
    no_compress: bool,

    /// Save the document at the resolved path.
    #[arg(short, long)]
    write: bool,

    /// Print a JSON summary (path, totals, stats) on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INVOICE2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "INVOICE2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load input ───────────────────────────────────────────────────────
    let raw = read_input(&cli.input).await?;
    let order = OrderAggregate::from_json(&raw)
        .with_context(|| format!("Failed to parse order from {}", cli.input))?;

    // ── Build config and render ──────────────────────────────────────────
    let config = build_config(&cli).await?;
    let artifact = render_invoice(&order, cli.file_name.as_deref(), &config)
        .await
        .context("Rendering failed")?;

    if cli.write {
        persist(&artifact).await?;
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&ArtifactSummary::from(&artifact))
            .context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&artifact, &config.currency_label, cli.write);
    }

    Ok(())
}

async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read order from stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read order file {input}"))
}

/// Map CLI args to `RenderConfig`.
async fn build_config(cli: &Cli) -> Result<RenderConfig> {
    let mut builder = RenderConfig::builder()
        .output_dir(&cli.output_dir)
        .currency_label(&cli.currency)
        .compress(!cli.no_compress)
        .overflow(if cli.paginate {
            OverflowPolicy::Paginate
        } else {
            OverflowPolicy::SinglePage
        });

    if let Some(ref path) = cli.branding {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read branding from {:?}", path))?;
        let branding: Branding = serde_json::from_str(&text)
            .with_context(|| format!("Invalid branding JSON in {:?}", path))?;
        builder = builder.branding(branding);
    }
    if let Some(date) = cli.date {
        builder = builder.issue_date(date);
    }

    builder.build().context("Invalid configuration")
}

/// Write the document next to its final path, then rename into place so a
/// reader never sees a partial file.
async fn persist(artifact: &RenderedArtifact) -> Result<()> {
    let path: &Path = &artifact.path;
    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &artifact.buffer)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move document into {}", path.display()))?;
    Ok(())
}

fn print_summary(artifact: &RenderedArtifact, currency: &str, written: bool) {
    let t = &artifact.totals;
    let s = &artifact.stats;
    eprintln!(
        "{} {}  {}",
        green("✔"),
        bold(&artifact.path.display().to_string()),
        if written {
            String::new()
        } else {
            dim("(not written, pass --write)")
        }
    );
    eprintln!(
        "   {} rows  {} page(s)  {} bytes  {}ms",
        s.row_count, s.page_count, s.byte_len, s.total_ms
    );
    eprintln!(
        "   subtotal {currency} {}  cgst {currency} {}  sgst {currency} {}  {}",
        format_amount(t.subtotal),
        format_amount(t.cgst),
        format_amount(t.sgst),
        bold(&format!("total {currency} {}", format_amount(t.grand_total))),
    );
}
