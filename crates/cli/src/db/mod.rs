//! Database operations for the invoicing `PostgreSQL` database.
//!
//! The schema is owned by the invoicing application; this crate only deletes
//! and inserts rows.
//!
//! ## Tables
//!
//! - `users` - `id SERIAL`, `email TEXT UNIQUE`
//! - `passwords` - `id SERIAL`, `user_id INTEGER UNIQUE REFERENCES users ON DELETE CASCADE`,
//!   `hash TEXT`
//! - `customers` - `id SERIAL`, `name TEXT`, `email TEXT`
//! - `invoices` - `id SERIAL`, `customer_id INTEGER REFERENCES customers ON DELETE CASCADE`,
//!   `number INTEGER`, `invoice_date DATE`, `due_date DATE`
//! - `line_items` - `id SERIAL`, `invoice_id INTEGER REFERENCES invoices ON DELETE CASCADE`,
//!   `description TEXT`, `quantity INTEGER`, `unit_price NUMERIC(12, 2)`
//! - `deposits` - `id SERIAL`, `invoice_id INTEGER REFERENCES invoices ON DELETE CASCADE`,
//!   `amount NUMERIC(12, 2)`, `deposit_date DATE`, `note TEXT`

pub mod seed_store;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::warn;

use invoicer_core::fixtures::{FixtureCounts, FixtureSet};

use crate::config::DatabaseConfig;
use crate::seeding::{self, SeedError, SeedSummary};
use crate::store::{RepositoryError, Table};

pub use seed_store::PgSeedStore;

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.url.expose_secret())
        .await
}

/// Run [`seeding::seed`] inside one transaction: commit on success, roll back
/// on the first failure so the tables keep their previous contents.
///
/// # Errors
///
/// Returns the seeding error, or `SeedError::Repository` if the transaction
/// cannot be opened or committed.
pub async fn seed_in_transaction(
    pool: &PgPool,
    fixtures: &FixtureSet,
) -> Result<SeedSummary, SeedError> {
    let mut store = PgSeedStore::begin(pool).await?;

    match seeding::seed(&mut store, fixtures).await {
        Ok(summary) => {
            store.commit().await?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(rollback_err) = store.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}

/// Count the rows currently in each seeded table.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any count query fails.
pub async fn table_counts(pool: &PgPool) -> Result<FixtureCounts, RepositoryError> {
    Ok(FixtureCounts {
        users: count_rows(pool, Table::Users).await?,
        customers: count_rows(pool, Table::Customers).await?,
        invoices: count_rows(pool, Table::Invoices).await?,
        line_items: count_rows(pool, Table::LineItems).await?,
        deposits: count_rows(pool, Table::Deposits).await?,
    })
}

async fn count_rows(pool: &PgPool, table: Table) -> Result<u64, RepositoryError> {
    // Table names come from a closed enum, never from input.
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;

    u64::try_from(count)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative row count for {table}")))
}
