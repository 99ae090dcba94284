//! Invoicing module: totals over the bookings of one invoice recipient.
//!
//! Pure, synchronous domain logic (no IO, no HTTP, no storage).

pub mod error;
pub mod totals;

pub use error::InvoicingError;
pub use totals::{AmountField, BookingTotals, BookingsAmountsEvaluator, total_bookings};
