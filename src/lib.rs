//! # invoice2pdf
//!
//! Render customer orders as single-document PDF invoices, entirely in
//! memory.
//!
//! ## Pipeline Overview
//!
//! ```text
//! OrderAggregate (JSON)
//!  │
//!  ├─ 1. Sandbox  create the output directory, resolve INV-<id>.pdf
//!  ├─ 2. Layout   title, invoice box, bill-to, table, totals, footer
//!  ├─ 3. Encode   lopdf on a blocking thread, written in chunks
//!  ├─ 4. Drain    bounded channel → one contiguous Bytes buffer
//!  └─ 5. Output   RenderedArtifact { buffer, path, totals, stats }
//! ```
//!
//! Taxes are fixed: CGST 2% and SGST 2% of the subtotal. Amounts are kept
//! in `f64` and rounded to two decimals only when printed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice2pdf::{render_invoice, OrderAggregate, RenderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let order = OrderAggregate::from_json(&std::fs::read_to_string("order.json")?)?;
//!     let config = RenderConfig::default();
//!     let artifact = render_invoice(&order, None, &config).await?;
//!     println!("{} ({} bytes)", artifact.path.display(), artifact.buffer.len());
//!     println!("grand total: {:.2}", artifact.totals.grand_total);
//!     Ok(())
//! }
//! ```
//!
//! The library never writes the document to disk. What to do with the
//! buffer (upload, attach, persist) is the caller's decision.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `invoice2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! invoice2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod sink;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Branding, OverflowPolicy, PageGeometry, RenderConfig, RenderConfigBuilder};
pub use error::InvoiceError;
pub use model::{Address, Customer, LineItem, OrderAggregate};
pub use output::{ArtifactSummary, RenderStats, RenderedArtifact};
pub use pipeline::totals::{compute_totals, format_amount, FinancialTotals};
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
pub use render::{
    render_invoice, render_invoice_sync, resolve_output_path, spawn_render, RenderHandle,
};
