//! `tally-core` — value types shared by the booking and invoicing crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BookingId, RecipientId};
pub use money::{CurrencyAmount, CurrencyCode};
pub use value_object::ValueObject;
