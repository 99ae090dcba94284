use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use tally_core::{CurrencyCode, DomainError, DomainResult, ValueObject};

/// Fractional digits every derived gross/net amount is rounded to.
pub const AMOUNT_SCALE: u32 = 2;

/// Price of a booking: an amount, its currency and the tax rate applied to it.
///
/// `gross` tells whether `amount` already includes tax. The counterpart
/// (net for a gross price, gross for a net price) is derived once, at
/// construction, and rounded to [`AMOUNT_SCALE`] digits with midpoints
/// rounded away from zero. Sums over many bookings must add these rounded
/// per-booking figures rather than re-deriving them from a summed base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PriceFields", into = "PriceFields")]
pub struct Price {
    amount: Decimal,
    currency: CurrencyCode,
    /// Percent, e.g. `19` for 19%.
    tax_rate: Decimal,
    gross: bool,
    amount_gross: Decimal,
    amount_net: Decimal,
}

/// Serialized shape of a [`Price`] (derived amounts are not persisted).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PriceFields {
    amount: Decimal,
    currency: CurrencyCode,
    tax_rate: Decimal,
    gross: bool,
}

impl Price {
    pub fn new(
        amount: Decimal,
        currency: CurrencyCode,
        tax_rate: Decimal,
        gross: bool,
    ) -> DomainResult<Self> {
        if tax_rate.is_sign_negative() && !tax_rate.is_zero() {
            return Err(DomainError::validation("tax rate must not be negative"));
        }

        let factor = tax_rate
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|rate| rate.checked_add(Decimal::ONE))
            .ok_or_else(|| DomainError::invariant("tax factor overflow"))?;

        let (amount_gross, amount_net) = if gross {
            let net = amount
                .checked_div(factor)
                .ok_or_else(|| DomainError::invariant("net amount overflow"))?;
            (amount, round_amount(net))
        } else {
            let gross = amount
                .checked_mul(factor)
                .ok_or_else(|| DomainError::invariant("gross amount overflow"))?;
            (round_amount(gross), amount)
        };

        Ok(Self {
            amount,
            currency,
            tax_rate,
            gross,
            amount_gross,
            amount_net,
        })
    }

    /// A tax-free price of zero in `currency`.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
            tax_rate: Decimal::ZERO,
            gross: true,
            amount_gross: Decimal::ZERO,
            amount_net: Decimal::ZERO,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn is_gross(&self) -> bool {
        self.gross
    }

    /// Amount including tax (rounded if it had to be derived).
    pub fn amount_gross(&self) -> Decimal {
        self.amount_gross
    }

    /// Amount excluding tax (rounded if it had to be derived).
    pub fn amount_net(&self) -> Decimal {
        self.amount_net
    }

    pub fn tax_amount(&self) -> Decimal {
        self.amount_gross - self.amount_net
    }
}

impl ValueObject for Price {}

impl TryFrom<PriceFields> for Price {
    type Error = DomainError;

    fn try_from(value: PriceFields) -> Result<Self, Self::Error> {
        Price::new(value.amount, value.currency, value.tax_rate, value.gross)
    }
}

impl From<Price> for PriceFields {
    fn from(value: Price) -> Self {
        Self {
            amount: value.amount,
            currency: value.currency,
            tax_rate: value.tax_rate,
            gross: value.gross,
        }
    }
}

fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
