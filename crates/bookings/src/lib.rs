//! Bookings module: the record surface consumed by invoicing, plus a
//! reference booking and price model.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod booking;
pub mod price;
pub mod record;

pub use booking::Booking;
pub use price::Price;
pub use record::BookingAmounts;
