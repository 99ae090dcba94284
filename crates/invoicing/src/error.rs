use thiserror::Error;

use tally_core::CurrencyCode;

use crate::totals::AmountField;

/// Failure of a totals calculation. No partial totals accompany it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoicingError {
    /// The relevant bookings are billed in more than one currency.
    #[error("inconsistent currencies: {first} and {second}")]
    InconsistentCurrencies {
        first: CurrencyCode,
        second: CurrencyCode,
    },

    /// A total cannot be held exactly by the decimal type (too large, or
    /// too many significant digits).
    #[error("{field} total overflow")]
    AmountOverflow { field: AmountField },
}

impl InvoicingError {
    /// The two conflicting currencies, if this is a currency conflict.
    pub fn conflicting_currencies(&self) -> Option<(&CurrencyCode, &CurrencyCode)> {
        match self {
            Self::InconsistentCurrencies { first, second } => Some((first, second)),
            Self::AmountOverflow { .. } => None,
        }
    }
}
