//! Top-level render API.
//!
//! ```text
//! OrderAggregate
//!  │
//!  ├─ 1. Sandbox   create the output directory, resolve the artifact path
//!  ├─ 2. Layout    session + table + totals → Vec<Page>        (async task)
//!  ├─ 3. Encode    lopdf → BufWriter → ChunkWriter        (spawn_blocking)
//!  ├─ 4. Drain     StreamingSink collects chunks           (async task)
//!  └─ 5. Output    RenderedArtifact { buffer, path, totals, stats }
//! ```
//!
//! Steps 3 and 4 run at the same time; the bounded channel between them
//! keeps memory flat while the document is produced.

use crate::config::RenderConfig;
use crate::error::InvoiceError;
use crate::model::OrderAggregate;
use crate::output::{RenderStats, RenderedArtifact};
use crate::pipeline::{encode, layout};
use crate::sink::{self, ChunkWriter};
use std::future::Future;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Render one invoice to an in-memory PDF.
///
/// The output directory is created if needed, but the document itself is
/// only returned, never written; `artifact.path` is where it belongs.
///
/// # Errors
/// - [`InvoiceError::OutputDir`] if the directory cannot be created
/// - [`InvoiceError::Encode`] if the PDF writer rejects the document
/// - [`InvoiceError::Sink`] if streaming the bytes fails
///
/// # Example
/// ```rust,no_run
/// use invoice2pdf::{render_invoice, LineItem, OrderAggregate, RenderConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let order = OrderAggregate::new("abc123").with_item(LineItem::new("Silk Saree", 100.0, 2));
/// let artifact = render_invoice(&order, None, &RenderConfig::default()).await?;
/// assert!(artifact.path.ends_with("INV-abc123.pdf"));
/// # Ok(())
/// # }
/// ```
pub async fn render_invoice(
    order: &OrderAggregate,
    file_name: Option<&str>,
    config: &RenderConfig,
) -> Result<RenderedArtifact, InvoiceError> {
    let result = render_inner(order, file_name, config).await;
    if let (Err(e), Some(cb)) = (&result, &config.progress_callback) {
        cb.on_render_error(&order.id, &e.to_string());
    }
    result
}

async fn render_inner(
    order: &OrderAggregate,
    file_name: Option<&str>,
    config: &RenderConfig,
) -> Result<RenderedArtifact, InvoiceError> {
    let total_start = Instant::now();
    info!(
        "Rendering invoice for order {} ({} items)",
        order.id,
        order.line_items.len()
    );

    // ── Step 1: Sandbox ──────────────────────────────────────────────────
    ensure_output_dir(&config.output_dir).await?;
    let path = resolve_output_path(&config.output_dir, &order.id, file_name);

    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start(&order.id, order.line_items.len());
    }

    // ── Step 2: Layout ───────────────────────────────────────────────────
    let layout_start = Instant::now();
    let composed = layout::compose(order, config);
    let layout_ms = layout_start.elapsed().as_millis() as u64;
    let page_count = composed.pages.len();
    debug!("Layout done in {}ms: {} page(s)", layout_ms, page_count);

    // ── Steps 3 + 4: Encode and drain concurrently ───────────────────────
    let encode_start = Instant::now();
    let (writer, sink) = sink::channel(config.channel_capacity);
    let info = encode::DocumentInfo {
        title: format!("Invoice {}", order.invoice_number()),
    };
    let geometry = config.page;
    let compress = config.compress;
    let chunk_size = config.chunk_size;
    let pages = composed.pages;

    let encoder = tokio::task::spawn_blocking(move || {
        encode_into(writer, chunk_size, |out| {
            encode::write_pdf(&pages, &geometry, &info, compress, out)
        })
    });
    let (encoded, drained) = tokio::join!(encoder, sink.drain());
    let encode_ms = encode_start.elapsed().as_millis() as u64;

    encoded.map_err(|e| InvoiceError::Internal(format!("encoder task failed: {e}")))??;
    let buffer = drained.inspect_err(|e| warn!("Sink failed for order {}: {}", order.id, e))?;

    // ── Step 5: Output ───────────────────────────────────────────────────
    let stats = RenderStats {
        page_count,
        row_count: composed.rows,
        byte_len: buffer.len(),
        layout_ms,
        encode_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Rendered {}: {} bytes, {} page(s), {}ms total",
        path.display(),
        stats.byte_len,
        stats.page_count,
        stats.total_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(&order.id, stats.byte_len);
    }

    Ok(RenderedArtifact {
        buffer,
        path,
        totals: composed.totals,
        stats,
    })
}

/// Run `encode` against a buffered [`ChunkWriter`] and send exactly one
/// completion signal.
///
/// A failed delivery is reported as [`InvoiceError::Sink`] even when the
/// encoder surfaced it as something else.
fn encode_into<F>(writer: ChunkWriter, chunk_size: usize, encode: F) -> Result<(), InvoiceError>
where
    F: FnOnce(&mut BufWriter<ChunkWriter>) -> Result<(), InvoiceError>,
{
    let mut out = BufWriter::with_capacity(chunk_size, writer);
    let result = encode(&mut out).and_then(|()| out.flush().map_err(InvoiceError::Sink));
    let (mut writer, _) = out.into_parts();

    match result {
        Ok(()) => writer.finish().map_err(InvoiceError::Sink),
        Err(err) => {
            let err = match writer.take_error() {
                Some(io_err) => InvoiceError::Sink(io_err),
                None => err,
            };
            writer.fail(io::Error::other(err.to_string()));
            Err(err)
        }
    }
}

/// Create `dir` and any missing parents. Safe to call concurrently.
pub async fn ensure_output_dir(dir: &Path) -> Result<(), InvoiceError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| InvoiceError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })
}

/// `INV-<order_id>.pdf`, with path separators in the id replaced.
pub fn default_file_name(order_id: &str) -> String {
    let id: String = order_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("INV-{id}.pdf")
}

/// Where the artifact for `order_id` lives inside `dir`.
///
/// A supplied name keeps only its final path component, so `../x.pdf`
/// resolves to `dir/x.pdf`. Blank or all-dot names fall back to
/// [`default_file_name`].
pub fn resolve_output_path(dir: &Path, order_id: &str, file_name: Option<&str>) -> PathBuf {
    let name = file_name
        .and_then(final_component)
        .map(str::to_string)
        .unwrap_or_else(|| default_file_name(order_id));
    dir.join(name)
}

fn final_component(name: &str) -> Option<&str> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last.chars().all(|c| c == '.') {
        None
    } else {
        Some(last)
    }
}

// ── Background renders ───────────────────────────────────────────────────

/// A render running as its own tokio task.
///
/// Await it to get the artifact. Dropping the handle does not stop the
/// render.
pub struct RenderHandle {
    inner: JoinHandle<Result<RenderedArtifact, InvoiceError>>,
}

impl RenderHandle {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl Future for RenderHandle {
    type Output = Result<RenderedArtifact, InvoiceError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(InvoiceError::Internal(format!("render task failed: {e}"))),
        })
    }
}

/// Start [`render_invoice`] on a new task. Must be called inside a tokio
/// runtime.
pub fn spawn_render(
    order: OrderAggregate,
    file_name: Option<String>,
    config: RenderConfig,
) -> RenderHandle {
    let inner = tokio::spawn(async move {
        render_invoice(&order, file_name.as_deref(), &config).await
    });
    RenderHandle { inner }
}

/// Synchronous wrapper around [`render_invoice`].
///
/// Creates a temporary tokio runtime internally.
pub fn render_invoice_sync(
    order: &OrderAggregate,
    file_name: Option<&str>,
    config: &RenderConfig,
) -> Result<RenderedArtifact, InvoiceError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| InvoiceError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(render_invoice(order, file_name, config))
}
