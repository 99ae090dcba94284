//! Currency code and currency-tagged decimal amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Currency token: an ISO code (`EUR`) or a symbol (`€`, `ብር`).
///
/// Stored verbatim. Two codes are the same currency only if the tokens are
/// byte-for-byte equal; `"eur"` and `"EUR"` are different currencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("currency code must not be empty"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for CurrencyCode {}

/// A decimal value tagged with its currency.
///
/// Equality is numeric on the value (`1.0 == 1.00`) and exact on the currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyAmount {
    value: Decimal,
    currency: CurrencyCode,
}

impl CurrencyAmount {
    pub fn new(value: Decimal, currency: CurrencyCode) -> Self {
        Self { value, currency }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

impl core::fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

impl ValueObject for CurrencyAmount {}

/// `a + b`, or `None` if the exact sum does not fit in a `Decimal`.
///
/// `Decimal::checked_add` only fails on magnitude overflow. When the exact
/// result needs more than 28 significant digits it rounds instead, and the
/// result then carries fewer fractional digits than the operands need.
pub fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    keeps_digits(sum, a, b).then_some(sum)
}

/// `a - b`, or `None` if the exact difference does not fit in a `Decimal`.
pub fn exact_sub(a: Decimal, b: Decimal) -> Option<Decimal> {
    let difference = a.checked_sub(b)?;
    keeps_digits(difference, a, b).then_some(difference)
}

fn keeps_digits(result: Decimal, a: Decimal, b: Decimal) -> bool {
    result.scale() >= a.normalize().scale().max(b.normalize().scale())
}
