//! Invoice layout: places every section of the document, top to bottom.
//!
//! ```text
//!            STORE NAME                       title, 28 pt, centred
//!        address line / phone line            10 pt, centred
//! ╭──────────────────────────────────────╮
//! │ INVOICE            Invoice No: INV-… │    70 pt
//! │                    Date: …           │
//! ╰──────────────────────────────────────╯
//! ╭──────────────────────────────────────╮
//! │ BILL TO                              │    110 pt
//! │ Name / Email / Phone    Address:     │
//! ╰──────────────────────────────────────╯
//! ╭────────────  ORDER DETAILS  ─────────╮    40 pt
//! ╭──────────────────────────────────────╮
//! │ S.No Product   Price   Qty   Total   │    35 pt header
//!   rows …                                    22 pt each
//!                     ╭────────────────╮
//!                     │ Subtotal … GT  │      260 × 120
//!                     ╰────────────────╯
//!              thank-you / support            footer
//! ```
//!
//! Boxes sit at fixed x offsets; y comes from the session cursor. After the
//! invoice, bill-to and totals boxes the cursor lands below the last text
//! line drawn in the box and then moves down a number of blank lines in
//! that line's font size, so the gap that follows depends on the text (a
//! two-line address pushes the details band further down).

use crate::config::{OverflowPolicy, RenderConfig};
use crate::model::OrderAggregate;
use crate::pipeline::metrics;
use crate::pipeline::session::{Align, Color, DocumentSession, Page, TextStyle};
use crate::pipeline::table::{TableRenderer, TableSummary};
use crate::pipeline::totals::{format_amount, FinancialTotals};
use tracing::debug;

const BOX_X: f32 = 40.0;
const BOX_WIDTH: f32 = 520.0;
const BOX_RADIUS: f32 = 10.0;
/// Space between the details band and the table header.
const SECTION_GAP: f32 = 20.0;

const INVOICE_BOX_HEIGHT: f32 = 70.0;
const BILL_TO_HEIGHT: f32 = 110.0;
const DETAILS_HEIGHT: f32 = 40.0;

// Blank lines after the last text line of a box, in that line's size.
const INVOICE_TRAILING_LINES: f32 = 5.0;
const BILL_TO_TRAILING_LINES: f32 = 6.0;
const TOTALS_TRAILING_LINES: f32 = 6.0;

const TOTALS_X: f32 = 300.0;
const TOTALS_WIDTH: f32 = 260.0;
const TOTALS_HEIGHT: f32 = 120.0;
const TOTALS_RADIUS: f32 = 12.0;
/// Space between the last table row and the totals box.
const TOTALS_GAP: f32 = 30.0;

const BRAND: Color = Color::hex(0x5A189A);
const ACCENT: Color = Color::hex(0xD9D9D9);
const INK: Color = Color::hex(0x111111);
const SUBTLE: Color = Color::hex(0x444444);
const MUTED: Color = Color::hex(0x333333);
const FOOTER: Color = Color::hex(0x888888);
const TOTALS_FILL: Color = Color::hex(0xF0F5FF);
const TOTALS_STROKE: Color = Color::hex(0xD6E4FF);

/// A laid-out invoice, ready for encoding.
#[derive(Debug, Clone)]
pub struct ComposedInvoice {
    pub pages: Vec<Page>,
    pub totals: FinancialTotals,
    pub rows: usize,
}

/// Lay out the whole invoice for `order`.
pub fn compose(order: &OrderAggregate, config: &RenderConfig) -> ComposedInvoice {
    let mut session = DocumentSession::new(&config.page);

    draw_brand_header(&mut session, config);
    draw_invoice_box(&mut session, order, config);
    draw_bill_to(&mut session, order);
    draw_details_band(&mut session);

    let table = TableRenderer::new(config.overflow)
        .with_progress(config.progress_callback.as_deref())
        .render(&mut session, &order.line_items);
    session.advance_cursor(TOTALS_GAP);

    draw_totals_box(&mut session, &table, config);
    draw_footer(&mut session, config);

    let pages = session.finish();
    debug!(
        "Laid out order {}: {} rows on {} page(s)",
        order.id,
        table.rows,
        pages.len()
    );

    ComposedInvoice {
        pages,
        totals: table.totals,
        rows: table.rows,
    }
}

/// Start a new page first if `height` would cross the bottom margin and the
/// policy allows it.
fn ensure_room(session: &mut DocumentSession, height: f32, policy: OverflowPolicy) {
    if policy == OverflowPolicy::Paginate && !session.state().fits(height) {
        session.new_page();
    }
}

fn draw_brand_header(session: &mut DocumentSession, config: &RenderConfig) {
    let branding = &config.branding;
    session.draw_text_flow(
        &branding.store_name,
        TextStyle::new(28.0).color(BRAND).align(Align::Center),
    );
    let small = TextStyle::new(10.0).color(SUBTLE).align(Align::Center);
    for line in [&branding.address_line, &branding.phone_line].into_iter().flatten() {
        session.draw_text_flow(line, small);
    }
    session.move_down(1.5, 10.0);
}

fn draw_invoice_box(session: &mut DocumentSession, order: &OrderAggregate, config: &RenderConfig) {
    let y = session.cursor();
    session.draw_box(BOX_X, y, BOX_WIDTH, INVOICE_BOX_HEIGHT, BOX_RADIUS, BRAND, ACCENT);
    session.draw_text("INVOICE", 60.0, y + 30.0, TextStyle::new(22.0).color(Color::WHITE));

    let meta = TextStyle::new(12.0).color(Color::WHITE);
    session.draw_text(
        &format!("Invoice No: {}", order.invoice_number()),
        380.0,
        y + 15.0,
        meta,
    );
    let date_height = session.draw_text(
        &format!("Date: {}", config.formatted_issue_date()),
        380.0,
        y + 45.0,
        meta,
    );

    session.set_cursor(y + 45.0 + date_height);
    session.move_down(INVOICE_TRAILING_LINES, meta.font_size);
}

fn draw_bill_to(session: &mut DocumentSession, order: &OrderAggregate) {
    let y = session.cursor();
    session.draw_box(BOX_X, y, BOX_WIDTH, BILL_TO_HEIGHT, BOX_RADIUS, ACCENT, ACCENT);
    session.draw_text("BILL TO", 60.0, y + 12.0, TextStyle::new(16.0).color(INK));

    let body = TextStyle::new(12.0).color(INK);
    session.draw_text(&format!("Name: {}", order.user.display_name()), 60.0, y + 35.0, body);
    session.draw_text(&format!("Email: {}", order.user.email_or_na()), 60.0, y + 55.0, body);
    session.draw_text(&format!("Phone: {}", order.address.phone_or_na()), 60.0, y + 75.0, body);

    let right_x = 320.0;
    let side = TextStyle::new(11.0).color(MUTED);
    session.draw_text("Address:", right_x, y + 35.0, side);
    let address_height =
        session.draw_text(&order.address.one_line(), right_x, y + 55.0, side.max_width(220.0));

    session.set_cursor(y + 55.0 + address_height);
    session.move_down(BILL_TO_TRAILING_LINES, side.font_size);
}

fn draw_details_band(session: &mut DocumentSession) {
    let y = session.cursor();
    session.draw_box(BOX_X, y, BOX_WIDTH, DETAILS_HEIGHT, BOX_RADIUS, BRAND, ACCENT);

    let size = 16.0;
    let label_y = y + (DETAILS_HEIGHT - size * metrics::TEXT_HEIGHT) / 2.0;
    session.draw_text(
        "ORDER DETAILS",
        BOX_X,
        label_y,
        TextStyle::new(size)
            .color(Color::WHITE)
            .align(Align::Center)
            .max_width(BOX_WIDTH),
    );

    session.set_cursor(y + DETAILS_HEIGHT + SECTION_GAP);
}

fn draw_totals_box(session: &mut DocumentSession, table: &TableSummary, config: &RenderConfig) {
    ensure_room(session, TOTALS_HEIGHT, config.overflow);

    let y = session.cursor();
    let t = &table.totals;
    let cur = &config.currency_label;
    session.draw_box(
        TOTALS_X,
        y,
        TOTALS_WIDTH,
        TOTALS_HEIGHT,
        TOTALS_RADIUS,
        TOTALS_FILL,
        TOTALS_STROKE,
    );

    let x = TOTALS_X + 20.0;
    let line = TextStyle::new(12.0).color(MUTED);
    session.draw_text(&format!("Subtotal: {cur} {}", format_amount(t.subtotal)), x, y + 15.0, line);
    session.draw_text(&format!("CGST (2%): {cur} {}", format_amount(t.cgst)), x, y + 35.0, line);
    session.draw_text(&format!("SGST (2%): {cur} {}", format_amount(t.sgst)), x, y + 55.0, line);
    let grand = TextStyle::new(14.0).color(Color::BLACK);
    let grand_height = session.draw_text(
        &format!("Grand Total: {cur} {}", format_amount(t.grand_total)),
        x,
        y + 85.0,
        grand,
    );

    session.set_cursor(y + 85.0 + grand_height);
    session.move_down(TOTALS_TRAILING_LINES, grand.font_size);
}

fn draw_footer(session: &mut DocumentSession, config: &RenderConfig) {
    let style = TextStyle::new(10.0).color(FOOTER).align(Align::Center);
    let mut lines = vec![config.branding.thank_you_line()];
    lines.extend(config.branding.support_line());

    ensure_room(
        session,
        lines.len() as f32 * metrics::line_height(10.0),
        config.overflow,
    );
    for line in &lines {
        session.draw_text_flow(line, style);
    }
}
