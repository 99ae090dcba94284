use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_core::money::exact_sub;
use tally_core::{BookingId, CurrencyCode, DomainError, DomainResult, Entity, RecipientId};

use crate::price::Price;
use crate::record::BookingAmounts;

/// A booking billed to one invoice recipient.
///
/// The open amount is fixed when the booking is built (gross minus paid, per
/// booking) so aggregations only ever add recorded figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    id: BookingId,
    recipient_id: RecipientId,
    price: Price,
    paid_amount: Option<Decimal>,
    open_amount: Decimal,
    booked_at: DateTime<Utc>,
}

impl Booking {
    /// Build a booking. `paid_amount: None` means nothing has been paid yet.
    pub fn new(
        id: BookingId,
        recipient_id: RecipientId,
        price: Price,
        paid_amount: Option<Decimal>,
        booked_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let paid = paid_amount.unwrap_or(Decimal::ZERO);
        let open_amount = exact_sub(price.amount_gross(), paid)
            .ok_or_else(|| DomainError::invariant("open amount overflow"))?;

        Ok(Self {
            id,
            recipient_id,
            price,
            paid_amount,
            open_amount,
            booked_at,
        })
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn booked_at(&self) -> DateTime<Utc> {
        self.booked_at
    }

    /// Paid amount as recorded (`None` if no payment was ever registered).
    pub fn recorded_payment(&self) -> Option<Decimal> {
        self.paid_amount
    }
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl BookingAmounts for Booking {
    fn recipient_id(&self) -> RecipientId {
        self.recipient_id
    }

    fn currency(&self) -> &CurrencyCode {
        self.price.currency()
    }

    fn gross_amount(&self) -> Decimal {
        self.price.amount_gross()
    }

    fn paid_amount(&self) -> Decimal {
        self.paid_amount.unwrap_or(Decimal::ZERO)
    }

    fn open_amount(&self) -> Decimal {
        self.open_amount
    }
}
