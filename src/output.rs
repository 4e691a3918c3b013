//! Render output types.

use crate::pipeline::totals::FinancialTotals;
use bytes::Bytes;
use serde::Serialize;
use std::path::PathBuf;

/// A finished invoice document.
///
/// The buffer is immutable and owned by the caller. `path` is where the
/// document *would* live inside the output directory; nothing has been
/// written there.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub buffer: Bytes,
    pub path: PathBuf,
    pub totals: FinancialTotals,
    pub stats: RenderStats,
}

impl RenderedArtifact {
    /// File name component of [`Self::path`].
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Timing and size figures for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub page_count: usize,
    pub row_count: usize,
    pub byte_len: usize,
    /// Time spent placing draw commands.
    pub layout_ms: u64,
    /// Time from encoder start until the sink resolved.
    pub encode_ms: u64,
    pub total_ms: u64,
}

/// Serializable view of an artifact, without the document bytes.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary<'a> {
    pub path: &'a std::path::Path,
    pub totals: &'a FinancialTotals,
    pub stats: &'a RenderStats,
}

impl<'a> From<&'a RenderedArtifact> for ArtifactSummary<'a> {
    fn from(artifact: &'a RenderedArtifact) -> Self {
        Self {
            path: &artifact.path,
            totals: &artifact.totals,
            stats: &artifact.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_without_buffer() {
        let artifact = RenderedArtifact {
            buffer: Bytes::from_static(b"%PDF-1.7"),
            path: PathBuf::from("/tmp/invoices/INV-1.pdf"),
            totals: FinancialTotals::from_subtotal(100.0),
            stats: RenderStats {
                page_count: 1,
                row_count: 1,
                byte_len: 8,
                ..Default::default()
            },
        };
        assert_eq!(artifact.file_name(), Some("INV-1.pdf"));
        assert_eq!(artifact.len(), 8);

        let json = serde_json::to_value(ArtifactSummary::from(&artifact)).unwrap();
        assert_eq!(json["path"], "/tmp/invoices/INV-1.pdf");
        assert_eq!(json["stats"]["page_count"], 1);
        let grand = json["totals"]["grand_total"].as_f64().unwrap();
        assert!((grand - 104.0).abs() < 1e-9);
        assert!(json.get("buffer").is_none());
    }
}
