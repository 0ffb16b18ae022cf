//! Core types for invoicer.
//!
//! This module provides type-safe wrappers for the invoicing domain.

pub mod email;
pub mod id;
pub mod money;
pub mod quantity;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use quantity::{InvoiceNumber, Quantity, QuantityError};
