//! Line-item table: a header band followed by one fixed-height row per item.
//!
//! ```text
//!  x=60   x=100                x=280      x=370     x=460
//! ┌──────────────────────────────────────────────────────────┐
//! │ S.No  Product              Price      Qty       Total    │  35 pt band
//! └──────────────────────────────────────────────────────────┘
//!   1     Silk Saree           100.00     2         200.00      22 pt row
//! ────────────────────────────────────────────────────────────  separator
//! ```
//!
//! The subtotal is accumulated in the same pass that draws the rows.

use crate::config::OverflowPolicy;
use crate::model::LineItem;
use crate::pipeline::metrics::{self, Font};
use crate::pipeline::session::{Color, DocumentSession, TextStyle};
use crate::pipeline::totals::{format_amount, FinancialTotals, SubtotalAccumulator};
use crate::progress::RenderProgressCallback;
use tracing::debug;

pub const TABLE_X: f32 = 40.0;
pub const TABLE_WIDTH: f32 = 520.0;
pub const HEADER_HEIGHT: f32 = 35.0;
pub const HEADER_RADIUS: f32 = 10.0;
/// Space between the header band and the first row.
pub const HEADER_GAP: f32 = 10.0;
pub const ROW_HEIGHT: f32 = 22.0;
pub const FONT_SIZE: f32 = 12.0;
pub const PRODUCT_WIDTH: f32 = 170.0;
pub const SEPARATOR_END_X: f32 = 550.0;

pub const HEADER_FILL: Color = Color::hex(0xD9D9D9);
pub const TEXT_COLOR: Color = Color::hex(0x111111);
pub const SEPARATOR_COLOR: Color = Color::hex(0xE5E7EB);

/// Fixed column offsets, in table order.
pub const COLUMNS: [Column; 5] = [
    Column { title: "S.No", x: 60.0 },
    Column { title: "Product", x: 100.0 },
    Column { title: "Price", x: 280.0 },
    Column { title: "Qty", x: 370.0 },
    Column { title: "Total", x: 460.0 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub title: &'static str,
    pub x: f32,
}

/// What the table pass produced besides drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSummary {
    pub totals: FinancialTotals,
    pub rows: usize,
    /// Header bands drawn; more than one means the table continued on
    /// another page.
    pub header_count: usize,
}

/// Draws the line-item table through a [`DocumentSession`].
pub struct TableRenderer<'a> {
    overflow: OverflowPolicy,
    progress: Option<&'a dyn RenderProgressCallback>,
}

impl<'a> TableRenderer<'a> {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self {
            overflow,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<&'a dyn RenderProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Draw the header and every row starting at the session cursor.
    ///
    /// Leaves the cursor just below the last separator.
    pub fn render(&self, session: &mut DocumentSession, items: &[LineItem]) -> TableSummary {
        let mut acc = SubtotalAccumulator::default();
        let mut header_count = 0;

        if self.overflow == OverflowPolicy::Paginate
            && !session.state().fits(HEADER_HEIGHT + HEADER_GAP + ROW_HEIGHT)
        {
            session.new_page();
        }
        draw_header(session);
        header_count += 1;

        let total_rows = items.len();
        for (index, item) in items.iter().enumerate() {
            if self.overflow == OverflowPolicy::Paginate && !session.state().fits(row_extent(item))
            {
                debug!("Table row {} continues on page {}", index + 1, session.page_count() + 1);
                session.new_page();
                draw_header(session);
                header_count += 1;
            }

            let row_total = acc.add(item);
            draw_row(session, index + 1, item, row_total);

            if let Some(cb) = self.progress {
                cb.on_row_rendered(index + 1, total_rows);
            }
        }

        TableSummary {
            rows: acc.rows(),
            totals: acc.finish(),
            header_count,
        }
    }
}

/// Header band with the five column titles; advances past the band.
pub fn draw_header(session: &mut DocumentSession) {
    let y = session.cursor();
    session.draw_box(
        TABLE_X,
        y,
        TABLE_WIDTH,
        HEADER_HEIGHT,
        HEADER_RADIUS,
        HEADER_FILL,
        HEADER_FILL,
    );
    let style = TextStyle::new(FONT_SIZE).bold().color(TEXT_COLOR);
    for column in COLUMNS {
        session.draw_text(column.title, column.x, y + 10.0, style);
    }
    session.set_cursor(y + HEADER_HEIGHT + HEADER_GAP);
}

/// Vertical space a row occupies: the fixed row height, or the wrapped
/// product name when it runs to more lines than fit in one row.
pub fn row_extent(item: &LineItem) -> f32 {
    let lines = metrics::wrap_text(&item.product_name, Font::Helvetica, FONT_SIZE, PRODUCT_WIDTH)
        .len()
        .max(1);
    ROW_HEIGHT.max(lines as f32 * metrics::line_height(FONT_SIZE))
}

fn draw_row(session: &mut DocumentSession, number: usize, item: &LineItem, row_total: f64) {
    let y = session.cursor();
    let style = TextStyle::new(FONT_SIZE).color(TEXT_COLOR);

    let cells = [
        number.to_string(),
        item.product_name.clone(),
        format_amount(item.unit_price),
        item.quantity.to_string(),
        format_amount(row_total),
    ];
    for (column, cell) in COLUMNS.iter().zip(cells.iter()) {
        let cell_style = if column.title == "Product" {
            style.max_width(PRODUCT_WIDTH)
        } else {
            style
        };
        session.draw_text(cell, column.x, y, cell_style);
    }

    session.advance_cursor(ROW_HEIGHT);
    let rule_y = session.cursor();
    session.draw_line(TABLE_X, SEPARATOR_END_X, rule_y, SEPARATOR_COLOR);
}
