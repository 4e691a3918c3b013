//! Configuration types for invoice rendering.
//!
//! All rendering behaviour is controlled through [`RenderConfig`], built via
//! its [`RenderConfigBuilder`]. One config can be shared by any number of
//! concurrent renders: it is read-only once built.

use crate::error::InvoiceError;
use crate::progress::ProgressCallback;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 841.89;
/// Uniform page margin in points.
pub const DEFAULT_MARGIN: f32 = 45.0;
/// Directory artifacts are addressed under when the caller sets none.
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp/invoices";

const MIN_CHUNK_SIZE: usize = 512;

/// Configuration for rendering invoices.
///
/// # Example
/// ```rust
/// use invoice2pdf::{OverflowPolicy, RenderConfig};
///
/// let config = RenderConfig::builder()
///     .output_dir("/var/tmp/invoices")
///     .overflow(OverflowPolicy::Paginate)
///     .currency_label("INR")
///     .build()
///     .unwrap();
/// assert_eq!(config.currency_label, "INR");
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    /// Directory the artifact path is resolved under. Created on demand;
    /// nothing is written into it by the library. Default: `/tmp/invoices`.
    pub output_dir: PathBuf,

    /// Page size and margin. Default: A4 with a 45 pt margin.
    pub page: PageGeometry,

    /// What to do when the table or totals run past the bottom margin.
    /// Default: [`OverflowPolicy::SinglePage`].
    pub overflow: OverflowPolicy,

    /// Store identity printed in the header and footer.
    pub branding: Branding,

    /// Prefix for amounts in the totals box. Default: `"Rs"`.
    pub currency_label: String,

    /// Date printed on the invoice. `None` means today's local date.
    pub issue_date: Option<NaiveDate>,

    /// `strftime` pattern for the invoice date. Default: `%d/%m/%Y`.
    pub date_format: String,

    /// Size of each chunk handed to the streaming sink. Default: 16 KiB.
    pub chunk_size: usize,

    /// Chunks buffered between encoder and sink before the encoder waits.
    /// Default: 32.
    pub channel_capacity: usize,

    /// Flate-compress page content streams. Default: true.
    pub compress: bool,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            page: PageGeometry::default(),
            overflow: OverflowPolicy::default(),
            branding: Branding::default(),
            currency_label: "Rs".to_string(),
            issue_date: None,
            date_format: "%d/%m/%Y".to_string(),
            chunk_size: 16 * 1024,
            channel_capacity: 32,
            compress: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("output_dir", &self.output_dir)
            .field("page", &self.page)
            .field("overflow", &self.overflow)
            .field("branding", &self.branding)
            .field("currency_label", &self.currency_label)
            .field("issue_date", &self.issue_date)
            .field("date_format", &self.date_format)
            .field("chunk_size", &self.chunk_size)
            .field("channel_capacity", &self.channel_capacity)
            .field("compress", &self.compress)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    /// The invoice date as printed.
    pub fn formatted_issue_date(&self) -> String {
        let date = self
            .issue_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        date.format(&self.date_format).to_string()
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn page(mut self, page: PageGeometry) -> Self {
        self.config.page = page;
        self
    }

    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow = policy;
        self
    }

    pub fn branding(mut self, branding: Branding) -> Self {
        self.config.branding = branding;
        self
    }

    pub fn currency_label(mut self, label: impl Into<String>) -> Self {
        self.config.currency_label = label.into();
        self
    }

    pub fn issue_date(mut self, date: NaiveDate) -> Self {
        self.config.issue_date = Some(date);
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_format = format.into();
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.chunk_size = bytes.max(MIN_CHUNK_SIZE);
        self
    }

    pub fn channel_capacity(mut self, n: usize) -> Self {
        self.config.channel_capacity = n.max(1);
        self
    }

    pub fn compress(mut self, v: bool) -> Self {
        self.config.compress = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, InvoiceError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(InvoiceError::InvalidConfig(
                "output directory must not be empty".into(),
            ));
        }
        c.page.validate()?;
        if StrftimeItems::new(&c.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(InvoiceError::InvalidConfig(format!(
                "invalid date format '{}'",
                c.date_format
            )));
        }
        if c.chunk_size < MIN_CHUNK_SIZE {
            return Err(InvoiceError::InvalidConfig(format!(
                "chunk size must be ≥ {MIN_CHUNK_SIZE} bytes, got {}",
                c.chunk_size
            )));
        }
        if c.channel_capacity == 0 {
            return Err(InvoiceError::InvalidConfig(
                "channel capacity must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Page geometry ────────────────────────────────────────────────────────

/// Physical page size and uniform margin, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin.max(0.0);
        self
    }

    fn validate(&self) -> Result<(), InvoiceError> {
        let usable = self.width.is_finite()
            && self.height.is_finite()
            && self.margin.is_finite()
            && self.margin >= 0.0
            && self.width > 2.0 * self.margin
            && self.height > 2.0 * self.margin;
        if usable {
            Ok(())
        } else {
            Err(InvoiceError::InvalidConfig(format!(
                "page {}×{} with margin {} leaves no drawable area",
                self.width, self.height, self.margin
            )))
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Behaviour when content would cross the bottom margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Keep everything on one page; content past the margin is drawn
    /// off-page. This is the classic single-sheet invoice layout. (default)
    #[default]
    SinglePage,
    /// Break to a new page before any table row, the totals box or the
    /// footer that would not fit. Continuation pages repeat the table header.
    Paginate,
}

/// Store identity printed on every invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Large title at the top of the page.
    pub store_name: String,
    /// Postal address under the title.
    pub address_line: Option<String>,
    /// Contact phone under the address.
    pub phone_line: Option<String>,
    /// Footer greeting. Defaults to "Thank you for shopping with <store>!".
    pub thank_you: Option<String>,
    /// Support address printed in the footer.
    pub support_email: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            store_name: "LABEL AADVI".to_string(),
            address_line: None,
            phone_line: None,
            thank_you: None,
            support_email: None,
        }
    }
}

impl Branding {
    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            ..Self::default()
        }
    }

    pub fn thank_you_line(&self) -> String {
        self.thank_you
            .clone()
            .unwrap_or_else(|| format!("Thank you for shopping with {}!", self.store_name))
    }

    pub fn support_line(&self) -> Option<String> {
        self.support_email
            .as_ref()
            .map(|email| format!("For support, contact: {email}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_layout() {
        let c = RenderConfig::default();
        assert_eq!(c.page, PageGeometry::a4());
        assert_eq!(c.page.margin, 45.0);
        assert_eq!(c.output_dir, PathBuf::from("/tmp/invoices"));
        assert_eq!(c.overflow, OverflowPolicy::SinglePage);
        assert_eq!(c.currency_label, "Rs");
    }

    #[test]
    fn builder_clamps_chunking() {
        let c = RenderConfig::builder()
            .chunk_size(1)
            .channel_capacity(0)
            .build()
            .unwrap();
        assert_eq!(c.chunk_size, MIN_CHUNK_SIZE);
        assert_eq!(c.channel_capacity, 1);
    }

    #[test]
    fn builder_rejects_bad_date_format() {
        let err = RenderConfig::builder().date_format("%Q").build().unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_oversized_margin() {
        let page = PageGeometry::a4().with_margin(400.0);
        assert!(RenderConfig::builder().page(page).build().is_err());
    }

    #[test]
    fn builder_rejects_empty_output_dir() {
        assert!(RenderConfig::builder().output_dir("").build().is_err());
    }

    #[test]
    fn fixed_issue_date_is_formatted() {
        let c = RenderConfig::builder()
            .issue_date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap())
            .build()
            .unwrap();
        assert_eq!(c.formatted_issue_date(), "07/03/2024");
    }

    #[test]
    fn branding_footer_lines() {
        let b = Branding::new("Acme");
        assert_eq!(b.thank_you_line(), "Thank you for shopping with Acme!");
        assert_eq!(b.support_line(), None);

        let b = Branding {
            support_email: Some("help@acme.test".into()),
            ..b
        };
        assert_eq!(
            b.support_line().as_deref(),
            Some("For support, contact: help@acme.test")
        );
    }

    #[test]
    fn branding_deserializes_partially() {
        let b: Branding = serde_json::from_str(r#"{"storeName":"x"}"#).unwrap();
        // Field names are snake_case on the wire; unknown keys are ignored.
        assert_eq!(b.store_name, "LABEL AADVI");
        let b: Branding = serde_json::from_str(r#"{"store_name":"Acme"}"#).unwrap();
        assert_eq!(b.store_name, "Acme");
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", RenderConfig::default());
        assert!(dbg.contains("RenderConfig"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
