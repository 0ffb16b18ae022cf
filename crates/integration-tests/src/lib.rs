//! Integration tests for the invoicer fixture seeder.
//!
//! The seeding procedure is exercised against [`MemoryStore`], an in-memory
//! [`SeedStore`] that models the invoicing schema's foreign keys and cascades.
//! Those tests need no database.
//!
//! The tests in `tests/postgres_seed.rs` run against a real `PostgreSQL`
//! database and are ignored by default. They create the invoicing tables if
//! missing and delete every row in them.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p invoicer-integration-tests
//!
//! # Including the PostgreSQL tests (use a throwaway database)
//! INVOICER_DATABASE_URL=postgres://localhost/invoicer_test \
//!     cargo test -p invoicer-integration-tests -- --include-ignored
//! ```

use chrono::NaiveDate;
use invoicer_cli::{RepositoryError, SeedStore, Table};
use invoicer_core::fixtures::{FixtureCounts, NewCustomer, NewDeposit, NewLineItem, NewUser};
use invoicer_core::{
    CustomerId, DepositId, Email, InvoiceId, InvoiceNumber, LineItemId, PasswordId, UserId,
};

/// A store call, recorded in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    DeleteAll(Table),
    CreateUser(Email),
    CreateCustomer(String),
}

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Deleting from this table fails.
    DeleteAll(Table),
    /// Creating the user fails.
    CreateUser,
    /// The n-th customer creation (zero-based) fails.
    CreateCustomer(usize),
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: UserId,
    pub email: Email,
}

#[derive(Debug, Clone)]
pub struct PasswordRow {
    pub id: PasswordId,
    pub user_id: UserId,
    pub hash: String,
}

#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
}

#[derive(Debug, Clone)]
pub struct InvoiceRow {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub number: InvoiceNumber,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct LineItemRow {
    pub id: LineItemId,
    pub invoice_id: InvoiceId,
    pub item: NewLineItem,
}

#[derive(Debug, Clone)]
pub struct DepositRow {
    pub id: DepositId,
    pub invoice_id: InvoiceId,
    pub deposit: NewDeposit,
}

/// In-memory stand-in for the invoicing tables.
///
/// Deleting a parent removes its children the way the schema's
/// `ON DELETE CASCADE` constraints do. Unlike [`invoicer_cli::db::PgSeedStore`]
/// there is no transaction: rows written before a failure stay written.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub users: Vec<UserRow>,
    pub passwords: Vec<PasswordRow>,
    pub customers: Vec<CustomerRow>,
    pub invoices: Vec<InvoiceRow>,
    pub line_items: Vec<LineItemRow>,
    pub deposits: Vec<DepositRow>,
    operations: Vec<Operation>,
    fail_at: Option<FailurePoint>,
    customers_attempted: usize,
    next_id: i32,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that fails at `point`.
    #[must_use]
    pub fn failing_at(point: FailurePoint) -> Self {
        Self {
            fail_at: Some(point),
            ..Self::default()
        }
    }

    /// Store calls made so far.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Row counts for the seeded tables.
    #[must_use]
    pub fn counts(&self) -> FixtureCounts {
        FixtureCounts {
            users: self.users.len() as u64,
            customers: self.customers.len() as u64,
            invoices: self.invoices.len() as u64,
            line_items: self.line_items.len() as u64,
            deposits: self.deposits.len() as u64,
        }
    }

    /// Stored password hash for `email`.
    #[must_use]
    pub fn password_hash(&self, email: &Email) -> Option<&str> {
        let user = self.users.iter().find(|u| &u.email == email)?;
        self.passwords
            .iter()
            .find(|p| p.user_id == user.id)
            .map(|p| p.hash.as_str())
    }

    /// Invoice row with `number`.
    #[must_use]
    pub fn invoice(&self, number: InvoiceNumber) -> Option<&InvoiceRow> {
        self.invoices.iter().find(|i| i.number == number)
    }

    /// Deposits belonging to `invoice_id`, in insertion order.
    pub fn deposits_of(&self, invoice_id: InvoiceId) -> impl Iterator<Item = &NewDeposit> {
        self.deposits
            .iter()
            .filter(move |d| d.invoice_id == invoice_id)
            .map(|d| &d.deposit)
    }

    /// Line items belonging to `invoice_id`, in insertion order.
    pub fn line_items_of(&self, invoice_id: InvoiceId) -> impl Iterator<Item = &NewLineItem> {
        self.line_items
            .iter()
            .filter(move |l| l.invoice_id == invoice_id)
            .map(|l| &l.item)
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    const fn injected() -> RepositoryError {
        RepositoryError::Database(sqlx::Error::PoolClosed)
    }

    fn cascade_invoices(&mut self, removed: &[InvoiceId]) {
        self.line_items.retain(|l| !removed.contains(&l.invoice_id));
        self.deposits.retain(|d| !removed.contains(&d.invoice_id));
    }
}

impl SeedStore for MemoryStore {
    async fn delete_all(&mut self, table: Table) -> Result<u64, RepositoryError> {
        self.operations.push(Operation::DeleteAll(table));
        if self.fail_at == Some(FailurePoint::DeleteAll(table)) {
            return Err(Self::injected());
        }

        let removed = match table {
            Table::Users => {
                let n = self.users.len();
                self.users.clear();
                self.passwords.clear();
                n
            }
            Table::Passwords => {
                let n = self.passwords.len();
                self.passwords.clear();
                n
            }
            Table::Customers => {
                let n = self.customers.len();
                self.customers.clear();
                self.invoices.clear();
                self.line_items.clear();
                self.deposits.clear();
                n
            }
            Table::Invoices => {
                let ids: Vec<InvoiceId> = self.invoices.iter().map(|i| i.id).collect();
                self.invoices.clear();
                self.cascade_invoices(&ids);
                ids.len()
            }
            Table::LineItems => {
                let n = self.line_items.len();
                self.line_items.clear();
                n
            }
            Table::Deposits => {
                let n = self.deposits.len();
                self.deposits.clear();
                n
            }
        };

        Ok(removed as u64)
    }

    async fn create_user(
        &mut self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        self.operations.push(Operation::CreateUser(user.email.clone()));
        if self.fail_at == Some(FailurePoint::CreateUser) {
            return Err(Self::injected());
        }
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("user email already exists".to_string()));
        }

        let id = UserId::new(self.next_id());
        let password_id = PasswordId::new(self.next_id());
        self.users.push(UserRow {
            id,
            email: user.email.clone(),
        });
        self.passwords.push(PasswordRow {
            id: password_id,
            user_id: id,
            hash: password_hash.to_string(),
        });

        Ok(id)
    }

    async fn create_customer(
        &mut self,
        customer: &NewCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        self.operations
            .push(Operation::CreateCustomer(customer.name().to_string()));
        let attempt = self.customers_attempted;
        self.customers_attempted += 1;
        if self.fail_at == Some(FailurePoint::CreateCustomer(attempt)) {
            return Err(Self::injected());
        }

        let customer_id = CustomerId::new(self.next_id());
        self.customers.push(CustomerRow {
            id: customer_id,
            name: customer.name().to_string(),
            email: customer.email().clone(),
        });

        for invoice in customer.invoices() {
            let invoice_id = InvoiceId::new(self.next_id());
            self.invoices.push(InvoiceRow {
                id: invoice_id,
                customer_id,
                number: invoice.number(),
                invoice_date: invoice.invoice_date(),
                due_date: invoice.due_date(),
            });
            for item in invoice.line_items() {
                let id = LineItemId::new(self.next_id());
                self.line_items.push(LineItemRow {
                    id,
                    invoice_id,
                    item: item.clone(),
                });
            }
            for deposit in invoice.deposits() {
                let id = DepositId::new(self.next_id());
                self.deposits.push(DepositRow {
                    id,
                    invoice_id,
                    deposit: deposit.clone(),
                });
            }
        }

        Ok(customer_id)
    }
}

/// Wraps another store and fails the n-th customer creation (zero-based)
/// without forwarding it.
#[derive(Debug)]
pub struct Interrupted<S> {
    inner: S,
    fail_on_customer: usize,
    customers_attempted: usize,
}

impl<S> Interrupted<S> {
    #[must_use]
    pub const fn new(inner: S, fail_on_customer: usize) -> Self {
        Self {
            inner,
            fail_on_customer,
            customers_attempted: 0,
        }
    }

    /// Take the wrapped store back, e.g. to roll it back.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SeedStore> SeedStore for Interrupted<S> {
    async fn delete_all(&mut self, table: Table) -> Result<u64, RepositoryError> {
        self.inner.delete_all(table).await
    }

    async fn create_user(
        &mut self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        self.inner.create_user(user, password_hash).await
    }

    async fn create_customer(
        &mut self,
        customer: &NewCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        let attempt = self.customers_attempted;
        self.customers_attempted += 1;
        if attempt == self.fail_on_customer {
            return Err(MemoryStore::injected());
        }
        self.inner.create_customer(customer).await
    }
}
