//! `PostgreSQL` implementation of [`SeedStore`].
//!
//! Every statement of a seed run goes through one transaction. Nothing is
//! visible to other connections until [`PgSeedStore::commit`]; dropping the
//! store or calling [`PgSeedStore::rollback`] discards the whole run.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use invoicer_core::fixtures::{NewCustomer, NewInvoice, NewUser};
use invoicer_core::{CustomerId, InvoiceId, UserId};

use crate::store::{RepositoryError, SeedStore, Table};

/// A seed run in progress against `PostgreSQL`.
pub struct PgSeedStore {
    tx: Transaction<'static, Postgres>,
}

impl PgSeedStore {
    /// Open the transaction the run will use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection can be acquired.
    pub async fn begin(pool: &PgPool) -> Result<Self, RepositoryError> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Make the run visible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the commit fails, in which case
    /// nothing from the run persists.
    pub async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard the run.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the rollback statement fails.
    pub async fn rollback(self) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }

    async fn insert_invoice(
        &mut self,
        customer_id: CustomerId,
        invoice: &NewInvoice,
    ) -> Result<InvoiceId, RepositoryError> {
        let invoice_id = sqlx::query_scalar::<_, InvoiceId>(
            r"
            INSERT INTO invoices (customer_id, number, invoice_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(customer_id)
        .bind(invoice.number())
        .bind(invoice.invoice_date())
        .bind(invoice.due_date())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "invoice"))?;

        for item in invoice.line_items() {
            sqlx::query(
                r"
                INSERT INTO line_items (invoice_id, description, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(invoice_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *self.tx)
            .await?;
        }

        for deposit in invoice.deposits() {
            sqlx::query(
                r"
                INSERT INTO deposits (invoice_id, amount, deposit_date, note)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(invoice_id)
            .bind(deposit.amount)
            .bind(deposit.deposit_date)
            .bind(&deposit.note)
            .execute(&mut *self.tx)
            .await?;
        }

        debug!(
            number = %invoice.number(),
            line_items = invoice.line_items().len(),
            deposits = invoice.deposits().len(),
            "Inserted invoice"
        );

        Ok(invoice_id)
    }
}

impl SeedStore for PgSeedStore {
    #[instrument(skip(self))]
    async fn delete_all(&mut self, table: Table) -> Result<u64, RepositoryError> {
        // Table names come from a closed enum, never from input.
        let sql = format!("DELETE FROM {}", table.name());
        let result = sqlx::query(&sql).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, user, password_hash), fields(email = %user.email))]
    async fn create_user(
        &mut self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        let user_id = sqlx::query_scalar::<_, UserId>(
            r"
            INSERT INTO users (email)
            VALUES ($1)
            RETURNING id
            ",
        )
        .bind(&user.email)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "user email"))?;

        sqlx::query(
            r"
            INSERT INTO passwords (user_id, hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "user password"))?;

        Ok(user_id)
    }

    #[instrument(skip(self, customer), fields(name = %customer.name()))]
    async fn create_customer(
        &mut self,
        customer: &NewCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        let customer_id = sqlx::query_scalar::<_, CustomerId>(
            r"
            INSERT INTO customers (name, email)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(customer.name())
        .bind(customer.email())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "customer"))?;

        for invoice in customer.invoices() {
            self.insert_invoice(customer_id, invoice).await?;
        }

        Ok(customer_id)
    }
}
