//! Financial arithmetic: subtotal, CGST, SGST and grand total.
//!
//! Everything here is pure. The running subtotal stays in `f64` for the
//! whole document; rounding to two decimals happens only in
//! [`format_amount`], when a value becomes text. Rounding per row would let
//! error compound across long orders.

use crate::model::LineItem;
use serde::{Deserialize, Serialize};

/// Central GST rate applied to the subtotal.
pub const CGST_RATE: f64 = 0.02;

/// State GST rate applied to the subtotal.
pub const SGST_RATE: f64 = 0.02;

/// Derived totals for one invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTotals {
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub grand_total: f64,
}

impl FinancialTotals {
    /// Apply the fixed tax rates to a subtotal.
    pub fn from_subtotal(subtotal: f64) -> Self {
        let cgst = subtotal * CGST_RATE;
        let sgst = subtotal * SGST_RATE;
        Self {
            subtotal,
            cgst,
            sgst,
            grand_total: subtotal + cgst + sgst,
        }
    }
}

/// Compute totals over a full line-item sequence.
pub fn compute_totals(items: &[LineItem]) -> FinancialTotals {
    let mut acc = SubtotalAccumulator::default();
    for item in items {
        acc.add(item);
    }
    acc.finish()
}

/// Running subtotal fed one row at a time by the table renderer.
#[derive(Debug, Default, Clone)]
pub struct SubtotalAccumulator {
    subtotal: f64,
    rows: usize,
}

impl SubtotalAccumulator {
    /// Add one row and return its total.
    pub fn add(&mut self, item: &LineItem) -> f64 {
        let row_total = item.row_total();
        self.subtotal += row_total;
        self.rows += 1;
        row_total
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn finish(self) -> FinancialTotals {
        FinancialTotals::from_subtotal(self.subtotal)
    }
}

/// Two-decimal text form of an amount, e.g. `250.00`.
pub fn format_amount(value: f64) -> String {
    // Avoid printing "-0.00" for values that round to zero.
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", value)
}
