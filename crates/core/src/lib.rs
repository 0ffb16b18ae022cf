//! Invoicer Core - Shared types library.
//!
//! This crate provides the types used by the invoicer seeding tools:
//! - `cli` - Loads fixture data into the invoicing database
//! - `integration-tests` - Exercises the seeding procedure end to end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database access,
//! no network clients. Fixture data is compiled in as a YAML asset and turned
//! into fully-formed aggregates in memory before anything is persisted.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, money and quantities
//! - [`dates`] - Calendar-day arithmetic anchored to UTC
//! - [`fixtures`] - The fixture data table and the aggregates built from it

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dates;
pub mod fixtures;
pub mod types;

pub use types::*;
