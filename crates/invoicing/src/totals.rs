//! Gross, paid and open totals over the bookings of one invoice recipient.
//!
//! A booking is relevant when it belongs to the recipient and is not a zero
//! booking. All relevant bookings must share one currency. Each total is the
//! plain decimal sum of the per-booking figures, which are already rounded;
//! nothing is re-derived from net amounts or tax rates here, so no rounding
//! error is introduced beyond what each booking carries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_bookings::BookingAmounts;
use tally_core::money::exact_add;
use tally_core::{CurrencyAmount, CurrencyCode, RecipientId};

use crate::error::InvoicingError;

/// Which per-booking figure a total is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountField {
    Gross,
    Paid,
    Open,
}

impl AmountField {
    pub const ALL: [AmountField; 3] = [AmountField::Gross, AmountField::Paid, AmountField::Open];

    /// Read this field from a booking.
    pub fn select<B: BookingAmounts + ?Sized>(self, booking: &B) -> Decimal {
        match self {
            AmountField::Gross => booking.gross_amount(),
            AmountField::Paid => booking.paid_amount(),
            AmountField::Open => booking.open_amount(),
        }
    }
}

impl core::fmt::Display for AmountField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            AmountField::Gross => "gross",
            AmountField::Paid => "paid",
            AmountField::Open => "open",
        })
    }
}

/// Totals of one successful calculation. All three share one currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingTotals {
    gross: CurrencyAmount,
    paid: CurrencyAmount,
    open: CurrencyAmount,
}

impl BookingTotals {
    pub fn gross(&self) -> &CurrencyAmount {
        &self.gross
    }

    pub fn paid(&self) -> &CurrencyAmount {
        &self.paid
    }

    pub fn open(&self) -> &CurrencyAmount {
        &self.open
    }

    pub fn currency(&self) -> &CurrencyCode {
        self.gross.currency()
    }

    pub fn get(&self, field: AmountField) -> &CurrencyAmount {
        match field {
            AmountField::Gross => &self.gross,
            AmountField::Paid => &self.paid,
            AmountField::Open => &self.open,
        }
    }
}

/// Compute the totals of `recipient_id`'s bookings.
///
/// Returns `Ok(None)` when no booking is relevant. Fails with
/// [`InvoicingError::InconsistentCurrencies`] when the relevant bookings span
/// more than one currency; zero bookings and bookings of other recipients
/// never take part in that check. Input order does not affect the totals.
pub fn total_bookings<'a, B, I>(
    bookings: I,
    recipient_id: RecipientId,
) -> Result<Option<BookingTotals>, InvoicingError>
where
    B: BookingAmounts + 'a,
    I: IntoIterator<Item = &'a B>,
{
    let relevant: Vec<&'a B> = bookings
        .into_iter()
        .filter(|booking| booking.recipient_id() == recipient_id && !booking.is_zero())
        .collect();

    let currency = match single_currency(&relevant) {
        Ok(Some(currency)) => currency,
        Ok(None) => {
            tracing::debug!(%recipient_id, "no relevant bookings");
            return Ok(None);
        }
        Err(err) => {
            tracing::warn!(%recipient_id, error = %err, "cannot total bookings");
            return Err(err);
        }
    };

    let total = |field: AmountField| -> Result<CurrencyAmount, InvoicingError> {
        Ok(CurrencyAmount::new(sum_field(field, &relevant)?, currency.clone()))
    };

    let totals = BookingTotals {
        gross: total(AmountField::Gross)?,
        paid: total(AmountField::Paid)?,
        open: total(AmountField::Open)?,
    };

    tracing::debug!(
        %recipient_id,
        relevant = relevant.len(),
        currency = %currency,
        gross = %totals.gross.value(),
        paid = %totals.paid.value(),
        open = %totals.open.value(),
        "booking totals calculated"
    );

    Ok(Some(totals))
}

/// The one currency shared by `bookings`, or `None` if there are none.
///
/// Stops at the second distinct currency instead of collecting all of them.
fn single_currency<'a, B: BookingAmounts>(
    bookings: &[&'a B],
) -> Result<Option<&'a CurrencyCode>, InvoicingError> {
    let mut currencies = bookings.iter().copied().map(|booking| booking.currency());
    let Some(first) = currencies.next() else {
        return Ok(None);
    };

    match currencies.find(|currency| *currency != first) {
        Some(second) => Err(InvoicingError::InconsistentCurrencies {
            first: first.clone(),
            second: second.clone(),
        }),
        None => Ok(Some(first)),
    }
}

fn sum_field<B: BookingAmounts>(
    field: AmountField,
    bookings: &[&B],
) -> Result<Decimal, InvoicingError> {
    bookings.iter().try_fold(Decimal::ZERO, |sum, booking| {
        exact_add(sum, field.select(*booking)).ok_or(InvoicingError::AmountOverflow { field })
    })
}

/// Holds the totals of the most recent [`calculate`](Self::calculate) call.
///
/// Every call starts by clearing the previous totals, so after a failed call
/// or a call without relevant bookings all accessors return `None`. One
/// evaluator serves one calculation at a time; use one instance per
/// concurrent caller.
#[derive(Debug, Clone, Default)]
pub struct BookingsAmountsEvaluator {
    totals: Option<BookingTotals>,
}

impl BookingsAmountsEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total the bookings of `recipient_id`, replacing any earlier result.
    pub fn calculate<'a, B, I>(
        &mut self,
        bookings: I,
        recipient_id: RecipientId,
    ) -> Result<(), InvoicingError>
    where
        B: BookingAmounts + 'a,
        I: IntoIterator<Item = &'a B>,
    {
        self.totals = None;
        self.totals = total_bookings(bookings, recipient_id)?;
        Ok(())
    }

    /// Total gross amount, tax included.
    pub fn total_amount(&self) -> Option<&CurrencyAmount> {
        self.totals.as_ref().map(BookingTotals::gross)
    }

    pub fn total_paid_amount(&self) -> Option<&CurrencyAmount> {
        self.totals.as_ref().map(BookingTotals::paid)
    }

    pub fn total_open_amount(&self) -> Option<&CurrencyAmount> {
        self.totals.as_ref().map(BookingTotals::open)
    }

    pub fn totals(&self) -> Option<&BookingTotals> {
        self.totals.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    const RECIPIENT: RecipientId = RecipientId::new(10001);
    const OTHER_RECIPIENT: RecipientId = RecipientId::new(10002);

    /// Record whose open amount is taken as given, like an imported booking.
    #[derive(Debug, Clone)]
    struct Record {
        recipient_id: RecipientId,
        currency: CurrencyCode,
        gross: Decimal,
        paid: Decimal,
        open: Decimal,
    }

    impl BookingAmounts for Record {
        fn recipient_id(&self) -> RecipientId {
            self.recipient_id
        }

        fn currency(&self) -> &CurrencyCode {
            &self.currency
        }

        fn gross_amount(&self) -> Decimal {
            self.gross
        }

        fn paid_amount(&self) -> Decimal {
            self.paid
        }

        fn open_amount(&self) -> Decimal {
            self.open
        }
    }

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::new(raw).unwrap()
    }

    fn record(recipient_id: RecipientId, currency: &str, gross: Decimal, paid: Decimal) -> Record {
        Record {
            recipient_id,
            currency: code(currency),
            gross,
            paid,
            open: gross - paid,
        }
    }

    fn amount(value: Decimal, currency: &str) -> CurrencyAmount {
        CurrencyAmount::new(value, code(currency))
    }

    fn assert_cleared(evaluator: &BookingsAmountsEvaluator) {
        assert_eq!(evaluator.total_amount(), None);
        assert_eq!(evaluator.total_paid_amount(), None);
        assert_eq!(evaluator.total_open_amount(), None);
        assert_eq!(evaluator.totals(), None);
    }

    #[test]
    fn no_bookings_yield_no_totals() {
        let records: Vec<Record> = Vec::new();
        let mut evaluator = BookingsAmountsEvaluator::new();
        evaluator.calculate(&records, RECIPIENT).unwrap();
        assert_cleared(&evaluator);
    }

    #[test]
    fn ten_dimes_sum_to_exactly_one() {
        let records: Vec<Record> = (0..10)
            .map(|_| record(RECIPIENT, "€", dec!(0.10), Decimal::ZERO))
            .collect();

        let mut evaluator = BookingsAmountsEvaluator::new();
        evaluator.calculate(&records, RECIPIENT).unwrap();

        let gross = evaluator.total_amount().unwrap();
        assert_eq!(gross, &amount(dec!(1.00), "€"));
        assert_eq!(gross.value().to_string(), "1.00");
        assert_eq!(evaluator.total_paid_amount(), Some(&amount(Decimal::ZERO, "€")));
        assert_eq!(evaluator.total_open_amount(), Some(&amount(dec!(1.00), "€")));
    }

    #[test]
    fn bookings_of_other_recipients_are_ignored() {
        let records = vec![
            record(RECIPIENT, "USD", dec!(5.00), dec!(1.00)),
            record(OTHER_RECIPIENT, "ETB", dec!(100.00), Decimal::ZERO),
            record(OTHER_RECIPIENT, "USD", dec!(7.00), Decimal::ZERO),
        ];

        let totals = total_bookings(&records, RECIPIENT).unwrap().unwrap();
        assert_eq!(totals.gross(), &amount(dec!(5.00), "USD"));
        assert_eq!(totals.paid(), &amount(dec!(1.00), "USD"));
        assert_eq!(totals.open(), &amount(dec!(4.00), "USD"));
    }

    #[test]
    fn only_foreign_bookings_yield_no_totals() {
        let records = vec![record(OTHER_RECIPIENT, "USD", dec!(5.00), Decimal::ZERO)];
        assert_eq!(total_bookings(&records, RECIPIENT).unwrap(), None);
    }

    #[test]
    fn zero_bookings_do_not_take_part_in_currency_check() {
        let records = vec![
            record(RECIPIENT, "ETB", dec!(100), Decimal::ZERO),
            record(RECIPIENT, "USD", Decimal::ZERO, Decimal::ZERO),
        ];

        let totals = total_bookings(&records, RECIPIENT).unwrap().unwrap();
        assert_eq!(totals.currency(), &code("ETB"));
        assert_eq!(totals.gross(), &amount(dec!(100), "ETB"));
    }

    #[test]
    fn only_zero_bookings_yield_no_totals() {
        let records = vec![
            record(RECIPIENT, "ETB", Decimal::ZERO, Decimal::ZERO),
            record(RECIPIENT, "USD", dec!(0.00), dec!(0.00)),
        ];
        assert_eq!(total_bookings(&records, RECIPIENT).unwrap(), None);
    }

    #[test]
    fn paid_only_booking_is_relevant() {
        let records = vec![record(RECIPIENT, "EUR", Decimal::ZERO, dec!(3.50))];

        let totals = total_bookings(&records, RECIPIENT).unwrap().unwrap();
        assert_eq!(totals.paid(), &amount(dec!(3.50), "EUR"));
        assert_eq!(totals.open(), &amount(dec!(-3.50), "EUR"));
    }

    #[test]
    fn conflicting_currencies_fail_and_clear_previous_totals() {
        let mut evaluator = BookingsAmountsEvaluator::new();
        let good = vec![record(RECIPIENT, "A", dec!(1), Decimal::ZERO)];
        evaluator.calculate(&good, RECIPIENT).unwrap();
        assert!(evaluator.totals().is_some());

        let bad = vec![
            record(RECIPIENT, "A", dec!(100), Decimal::ZERO),
            record(RECIPIENT, "B", dec!(100), Decimal::ZERO),
        ];
        let err = evaluator.calculate(&bad, RECIPIENT).unwrap_err();

        match &err {
            InvoicingError::InconsistentCurrencies { first, second } => {
                assert_eq!(first, &code("A"));
                assert_eq!(second, &code("B"));
            }
            other => panic!("Expected InconsistentCurrencies, got {other:?}"),
        }
        assert_eq!(err.to_string(), "inconsistent currencies: A and B");
        assert_cleared(&evaluator);
    }

    #[test]
    fn more_than_two_currencies_report_two_distinct_ones() {
        let records = vec![
            record(RECIPIENT, "A", dec!(1), Decimal::ZERO),
            record(RECIPIENT, "A", dec!(1), Decimal::ZERO),
            record(RECIPIENT, "B", dec!(1), Decimal::ZERO),
            record(RECIPIENT, "C", dec!(1), Decimal::ZERO),
        ];

        let err = total_bookings(&records, RECIPIENT).unwrap_err();
        let (first, second) = err.conflicting_currencies().unwrap();
        let present = [code("A"), code("B"), code("C")];
        assert_ne!(first, second);
        assert!(present.contains(first));
        assert!(present.contains(second));
    }

    #[test]
    fn open_total_is_summed_as_recorded() {
        let mut records = vec![
            record(RECIPIENT, "€", dec!(10.00), dec!(2.00)),
            record(RECIPIENT, "€", dec!(20.00), dec!(5.00)),
        ];
        // Recorded open amounts that deliberately differ from gross - paid.
        records[0].open = dec!(1.00);
        records[1].open = dec!(2.50);

        let totals = total_bookings(&records, RECIPIENT).unwrap().unwrap();
        assert_eq!(totals.gross(), &amount(dec!(30.00), "€"));
        assert_eq!(totals.paid(), &amount(dec!(7.00), "€"));
        assert_eq!(totals.open(), &amount(dec!(3.50), "€"));
    }

    #[test]
    fn empty_call_clears_previous_totals() {
        let mut evaluator = BookingsAmountsEvaluator::new();
        let records = vec![record(RECIPIENT, "€", dec!(9.99), Decimal::ZERO)];
        evaluator.calculate(&records, RECIPIENT).unwrap();
        assert_eq!(evaluator.total_amount(), Some(&amount(dec!(9.99), "€")));

        evaluator.calculate(&records, OTHER_RECIPIENT).unwrap();
        assert_cleared(&evaluator);
    }

    #[test]
    fn later_call_replaces_earlier_totals() {
        let mut evaluator = BookingsAmountsEvaluator::new();
        let first = vec![record(RECIPIENT, "EUR", dec!(9.99), Decimal::ZERO)];
        let second = vec![record(RECIPIENT, "USD", dec!(1.01), dec!(1.01))];

        evaluator.calculate(&first, RECIPIENT).unwrap();
        evaluator.calculate(&second, RECIPIENT).unwrap();

        assert_eq!(evaluator.total_amount(), Some(&amount(dec!(1.01), "USD")));
        assert_eq!(evaluator.total_paid_amount(), Some(&amount(dec!(1.01), "USD")));
        assert_eq!(evaluator.total_open_amount(), Some(&amount(Decimal::ZERO, "USD")));
    }

    #[test]
    fn calculate_is_idempotent() {
        let records = vec![
            record(RECIPIENT, "ብር", dec!(115.00), dec!(10)),
            record(RECIPIENT, "ብር", dec!(11.50), dec!(10)),
        ];
        let mut evaluator = BookingsAmountsEvaluator::new();

        evaluator.calculate(&records, RECIPIENT).unwrap();
        let first = evaluator.totals().cloned();
        evaluator.calculate(&records, RECIPIENT).unwrap();

        assert!(first.is_some());
        assert_eq!(evaluator.totals().cloned(), first);
    }

    #[test]
    fn totals_by_field_match_accessors() {
        let records = vec![record(RECIPIENT, "EUR", dec!(12.34), dec!(2.34))];
        let totals = total_bookings(&records, RECIPIENT).unwrap().unwrap();

        for field in AmountField::ALL {
            let expected = field.select(&records[0]);
            assert_eq!(totals.get(field), &amount(expected, "EUR"));
        }
    }

    #[test]
    fn overflowing_total_is_reported() {
        let records = vec![
            record(RECIPIENT, "EUR", Decimal::MAX, Decimal::ZERO),
            record(RECIPIENT, "EUR", Decimal::MAX, Decimal::ZERO),
        ];
        let mut evaluator = BookingsAmountsEvaluator::new();

        let err = evaluator.calculate(&records, RECIPIENT).unwrap_err();
        assert_eq!(
            err,
            InvoicingError::AmountOverflow {
                field: AmountField::Gross
            }
        );
        assert_eq!(err.conflicting_currencies(), None);
        assert_cleared(&evaluator);
    }

    #[test]
    fn total_needing_too_many_digits_is_reported() {
        let records = vec![
            record(RECIPIENT, "EUR", dec!(70000000000000000000000000000), Decimal::ZERO),
            record(RECIPIENT, "EUR", dec!(0.01), Decimal::ZERO),
        ];
        let mut evaluator = BookingsAmountsEvaluator::new();

        let err = evaluator.calculate(&records, RECIPIENT).unwrap_err();
        assert_eq!(
            err,
            InvoicingError::AmountOverflow {
                field: AmountField::Gross
            }
        );
        assert_cleared(&evaluator);
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        (0i64..3, 0i64..1_000_000, 0i64..1_000_000).prop_map(|(recipient, gross, paid)| {
            record(
                RecipientId::new(10000 + recipient),
                "€",
                Decimal::new(gross, 2),
                Decimal::new(paid, 2),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: each total equals the sum of the recipient's per-booking cents.
        #[test]
        fn totals_equal_per_booking_sums(records in prop::collection::vec(arb_record(), 0..50)) {
            let mine: Vec<&Record> = records
                .iter()
                .filter(|r| r.recipient_id == RECIPIENT && !r.is_zero())
                .collect();

            let totals = total_bookings(&records, RECIPIENT).unwrap();

            if mine.is_empty() {
                prop_assert!(totals.is_none());
            } else {
                let totals = totals.unwrap();
                for field in AmountField::ALL {
                    let expected: Decimal = mine.iter().map(|r| field.select(*r)).sum();
                    prop_assert_eq!(totals.get(field).value(), expected);
                    prop_assert_eq!(totals.get(field).currency(), &code("€"));
                }
            }
        }

        /// Property: input order does not change the totals.
        #[test]
        fn order_does_not_matter(records in prop::collection::vec(arb_record(), 0..50)) {
            let forward = total_bookings(&records, RECIPIENT).unwrap();
            let backward = total_bookings(records.iter().rev(), RECIPIENT).unwrap();
            prop_assert_eq!(forward, backward);
        }

        /// Property: bookings of other recipients never influence the totals,
        /// whatever their currency.
        #[test]
        fn foreign_bookings_never_count(
            records in prop::collection::vec(arb_record(), 0..30),
            foreign_cents in 1i64..1_000_000,
        ) {
            let baseline = total_bookings(&records, RECIPIENT).unwrap();

            let mut with_foreign = records.clone();
            with_foreign.push(record(OTHER_RECIPIENT, "USD", Decimal::new(foreign_cents, 2), Decimal::ZERO));

            prop_assert_eq!(total_bookings(&with_foreign, RECIPIENT).unwrap(), baseline);
        }
    }
}
