//! The seeding procedure.
//!
//! Brings the invoicing tables from whatever they hold to exactly the fixture
//! set, in a fixed order:
//!
//! 1. delete all users (passwords cascade)
//! 2. delete all customers (invoices, line items and deposits cascade)
//! 3. hash the fixture password
//! 4. create the user together with its password
//! 5. create each customer aggregate, in table order
//!
//! The first failure stops the run. Whether earlier steps survive is up to the
//! store: [`crate::db::PgSeedStore`] runs everything in one transaction, so a
//! failed run leaves the database as it was.

use thiserror::Error;
use tracing::{debug, instrument};

use invoicer_core::fixtures::{FixtureCounts, FixtureError, FixtureSet};

use crate::config::ConfigError;
use crate::password::{self, PasswordError};
use crate::store::{RepositoryError, SeedStore, Table};

/// Message logged when a run completes.
pub const COMPLETION_MESSAGE: &str = "Database has been seeded. 🌱";

/// Any failure that aborts a seed run.
///
/// Callers treat every variant the same way: log it and exit non-zero.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Fixture data could not be loaded or resolved.
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading a fixture file failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<sqlx::Error> for SeedError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Users removed in step 1.
    pub deleted_users: u64,
    /// Customers removed in step 2.
    pub deleted_customers: u64,
    /// Rows created in steps 4 and 5.
    pub created: FixtureCounts,
}

/// Run the seeding procedure against `store`.
///
/// # Errors
///
/// Returns the first [`SeedError`] encountered; no later step runs after it.
#[instrument(skip_all, fields(customers = fixtures.customers().len()))]
pub async fn seed<S: SeedStore>(
    store: &mut S,
    fixtures: &FixtureSet,
) -> Result<SeedSummary, SeedError> {
    let deleted_users = store.delete_all(Table::Users).await?;
    debug!(deleted = deleted_users, "Cleared users");

    let deleted_customers = store.delete_all(Table::Customers).await?;
    debug!(deleted = deleted_customers, "Cleared customers");

    let user = fixtures.user();
    let password_hash = password::hash_password(&user.password)?;

    let user_id = store.create_user(user, &password_hash).await?;
    debug!(%user_id, email = %user.email, "Created user");

    let mut created = FixtureCounts {
        users: 1,
        ..FixtureCounts::default()
    };

    for customer in fixtures.customers() {
        let customer_id = store.create_customer(customer).await?;
        created = created.plus(FixtureCounts::of_customer(customer));
        debug!(
            %customer_id,
            name = customer.name(),
            invoices = customer.invoices().len(),
            "Created customer"
        );
    }

    Ok(SeedSummary {
        deleted_users,
        deleted_customers,
        created,
    })
}
