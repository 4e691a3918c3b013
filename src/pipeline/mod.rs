//! Pipeline stages for order-to-PDF rendering.
//!
//! Layout and encoding are separate on purpose: layout only records
//! [`session::DrawCommand`]s in top-down page coordinates, and the encoder
//! is the single place that knows about PDF operators and flipped y axes.
//!
//! ## Data Flow
//!
//! ```text
//!               ┌─ metrics (AFM widths, wrapping)
//! layout ──▶ session ──▶ Vec<Page> ──▶ encode ──▶ io::Write
//!   │          ▲
//!   └─ table ──┘
//!        └─ totals (running subtotal, tax)
//! ```
//!
//! 1. [`layout`]  — places every invoice section in order
//! 2. [`table`]   — header band and item rows; feeds [`totals`] as it draws
//! 3. [`session`] — per-render cursor, page list and draw-command recorder
//! 4. [`metrics`] — Helvetica widths so text can be centred and wrapped
//! 5. [`encode`]  — lopdf document build; runs in `spawn_blocking`

pub mod encode;
pub mod layout;
pub mod metrics;
pub mod session;
pub mod table;
pub mod totals;
