//! Invoicer CLI library - seeding and database tooling.
//!
//! The binary in `main.rs` is a thin clap front end over this library so the
//! seeding procedure can be driven from integration tests with an in-memory
//! [`store::SeedStore`].
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`password`] - Argon2 hashing for the fixture login
//! - [`store`] - The persistence seam (`SeedStore`)
//! - [`db`] - `PostgreSQL` implementation of the seam
//! - [`seeding`] - The seeding procedure

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod logging;
pub mod password;
pub mod seeding;
pub mod store;

pub use seeding::{COMPLETION_MESSAGE, SeedError, SeedSummary, seed};
pub use store::{RepositoryError, SeedStore, Table};
