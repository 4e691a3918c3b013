//! Progress-callback trait for render events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::RenderConfigBuilder::progress_callback`] to observe a
//! render as it moves through layout and encoding. Callers forward these to
//! whatever they use for telemetry; the library itself only logs.
//!
//! # Example
//!
//! ```rust
//! use invoice2pdf::{RenderConfig, RenderProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct RowCounter {
//!     rows: AtomicUsize,
//! }
//!
//! impl RenderProgressCallback for RowCounter {
//!     fn on_row_rendered(&self, _row: usize, _total_rows: usize) {
//!         self.rows.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(RowCounter { rows: AtomicUsize::new(0) });
//!
//! let config = RenderConfig::builder()
//!     .progress_callback(counter as Arc<dyn RenderProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the render pipeline at each milestone.
///
/// Implementations must be `Send + Sync`: one config (and so one callback)
/// may be shared by many renders running on different tasks at once. All
/// methods default to no-ops.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once before layout starts.
    ///
    /// # Arguments
    /// * `order_id`   — id of the order being rendered
    /// * `item_count` — number of line items in the table
    fn on_render_start(&self, order_id: &str, item_count: usize) {
        let _ = (order_id, item_count);
    }

    /// Called after each table row is laid out.
    ///
    /// # Arguments
    /// * `row`        — 1-indexed row number
    /// * `total_rows` — rows in the table
    fn on_row_rendered(&self, row: usize, total_rows: usize) {
        let _ = (row, total_rows);
    }

    /// Called when the artifact buffer is complete.
    ///
    /// # Arguments
    /// * `order_id` — id of the rendered order
    /// * `byte_len` — size of the finished document
    fn on_render_complete(&self, order_id: &str, byte_len: usize) {
        let _ = (order_id, byte_len);
    }

    /// Called when the render fails. No artifact is produced.
    fn on_render_error(&self, order_id: &str, error: &str) {
        let _ = (order_id, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenderConfig`].
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        rows: AtomicUsize,
        completed_bytes: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl RenderProgressCallback for TrackingCallback {
        fn on_row_rendered(&self, _row: usize, _total_rows: usize) {
            self.rows.fetch_add(1, Ordering::SeqCst);
        }

        fn on_render_complete(&self, _order_id: &str, byte_len: usize) {
            self.completed_bytes.store(byte_len, Ordering::SeqCst);
        }

        fn on_render_error(&self, order_id: &str, error: &str) {
            self.errors
                .lock()
                .unwrap()
                .push(format!("{order_id}: {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_render_start("a", 2);
        cb.on_row_rendered(1, 2);
        cb.on_render_complete("a", 1024);
        cb.on_render_error("a", "boom");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_row_rendered(1, 2);
        tracker.on_row_rendered(2, 2);
        tracker.on_render_complete("a", 2048);
        tracker.on_render_error("b", "sink closed");

        assert_eq!(tracker.rows.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completed_bytes.load(Ordering::SeqCst), 2048);
        assert_eq!(tracker.errors.lock().unwrap().as_slice(), ["b: sink closed"]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_render_start("x", 0);
    }
}
