//! Error types for the invoice2pdf library.
//!
//! A render either produces a complete [`crate::output::RenderedArtifact`]
//! or fails with exactly one [`InvoiceError`]. There is no partial-success
//! state: a sink failure halfway through the document discards everything
//! written so far.
//!
//! Malformed order data is *not* an error. Missing names, prices and
//! quantities fall back to defaults (see [`crate::model::LineItem`]) so a
//! sloppy upstream record still yields a readable invoice.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the invoice2pdf library.
#[derive(Debug, Error)]
pub enum InvoiceError {
    // ── I/O errors ────────────────────────────────────────────────────────
    /// The sandboxed output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A chunk could not be delivered to the streaming sink, or the encoder
    /// signalled failure before completing the document.
    #[error("Streaming sink failed: {0}")]
    Sink(#[source] std::io::Error),

    // ── Encoding errors ───────────────────────────────────────────────────
    /// The PDF encoder rejected the document.
    #[error("PDF encoding failed: {0}")]
    Encode(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// The order payload is not a JSON object of the expected shape.
    #[error("Invalid order payload: {0}")]
    InvalidOrder(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (task panic, runtime creation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvoiceError {
    /// True for failures rooted in filesystem or sink I/O.
    ///
    /// Callers that retry renders typically only retry these.
    pub fn is_io(&self) -> bool {
        matches!(self, InvoiceError::OutputDir { .. } | InvoiceError::Sink(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn output_dir_display_names_path() {
        let e = InvoiceError::OutputDir {
            path: PathBuf::from("/tmp/invoices"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/invoices"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
        assert!(e.is_io());
    }

    #[test]
    fn sink_error_keeps_source() {
        let e = InvoiceError::Sink(io::Error::new(io::ErrorKind::BrokenPipe, "hung up"));
        assert!(e.to_string().contains("hung up"));
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.is_io());
    }

    #[test]
    fn encode_error_is_not_io() {
        let e = InvoiceError::Encode("bad xref".into());
        assert!(!e.is_io());
        assert!(e.to_string().contains("bad xref"));
    }

    #[test]
    fn invalid_config_display() {
        let e = InvoiceError::InvalidConfig("chunk size too small".into());
        assert!(e.to_string().starts_with("Invalid configuration"));
    }
}
