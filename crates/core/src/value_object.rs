//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. They are defined entirely by their
//! attribute values, so two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: `CurrencyAmount { 0.12, "€" }` equals any other
///   `CurrencyAmount { 0.120, "€" }`
/// - **Entity**: a `Booking` is the same booking as long as its id matches
///
/// ```ignore
/// let a = CurrencyAmount::new(dec!(1.0), CurrencyCode::new("EUR")?);
/// let b = CurrencyAmount::new(dec!(1.00), CurrencyCode::new("EUR")?);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
