//! Read-only accessor surface of a booking record.

use rust_decimal::Decimal;
use tally_core::{CurrencyCode, RecipientId};

/// Everything the invoicing aggregator needs to know about a booking.
///
/// Amounts are expected to be already rounded per record by whatever pricing
/// model produced them. Implementors must not recompute `open_amount` from
/// the other two fields on the caller's behalf if their source records it
/// separately.
pub trait BookingAmounts {
    /// Party responsible for paying the booking.
    fn recipient_id(&self) -> RecipientId;

    fn currency(&self) -> &CurrencyCode;

    /// Amount owed, tax included.
    fn gross_amount(&self) -> Decimal;

    fn paid_amount(&self) -> Decimal;

    /// Portion of the gross amount not paid yet, as recorded on the booking.
    fn open_amount(&self) -> Decimal;

    /// A zero booking has neither a gross nor a paid amount and carries no
    /// information for invoicing.
    fn is_zero(&self) -> bool {
        self.gross_amount().is_zero() && self.paid_amount().is_zero()
    }
}
