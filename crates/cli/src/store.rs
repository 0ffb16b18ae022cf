//! The persistence seam used by the seeding procedure.
//!
//! Seeding needs exactly two kinds of operation: "delete every row of a
//! table" and "create one aggregate together with its child rows". The
//! `PostgreSQL` implementation lives in [`crate::db`]; tests plug in an
//! in-memory one.

use invoicer_core::fixtures::{NewCustomer, NewUser};
use invoicer_core::{CustomerId, UserId};
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map unique violations to `Conflict`, keep everything else as `Database`.
    #[must_use]
    pub fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Tables touched by seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Passwords,
    Customers,
    Invoices,
    LineItems,
    Deposits,
}

impl Table {
    /// SQL table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Passwords => "passwords",
            Self::Customers => "customers",
            Self::Invoices => "invoices",
            Self::LineItems => "line_items",
            Self::Deposits => "deposits",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Write access to the invoicing tables.
///
/// Each create call persists a whole aggregate; implementations must not
/// leave a parent row visible without its children.
#[allow(async_fn_in_trait)]
pub trait SeedStore {
    /// Delete every row of `table`, returning how many were removed.
    /// Child rows go with their parents through the schema's cascades.
    async fn delete_all(&mut self, table: Table) -> Result<u64, RepositoryError>;

    /// Create a user and its password row together.
    async fn create_user(
        &mut self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError>;

    /// Create a customer with all of its invoices, line items and deposits.
    async fn create_customer(
        &mut self,
        customer: &NewCustomer,
    ) -> Result<CustomerId, RepositoryError>;
}
