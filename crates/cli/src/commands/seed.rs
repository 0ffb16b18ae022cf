//! Seed the invoicing database with development fixtures.
//!
//! Loads the fixture table (built in, or a YAML file given with `--fixtures`),
//! resolves every date against today (UTC) or `--as-of`, then replaces all
//! users and customers inside a single transaction.
//!
//! # Environment Variables
//!
//! - `INVOICER_DATABASE_URL` - `PostgreSQL` connection string (not needed for `--dry-run`)

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use invoicer_cli::config::DatabaseConfig;
use invoicer_cli::db;
use invoicer_cli::seeding::{COMPLETION_MESSAGE, SeedError};
use invoicer_core::dates;
use invoicer_core::fixtures::{FixtureFile, FixtureSet, NewCustomer};

/// Options for the `seed` command.
#[derive(Debug, Default)]
pub struct SeedOptions {
    /// YAML file to load instead of the embedded fixtures.
    pub fixtures: Option<PathBuf>,
    /// Day the fixture offsets are relative to.
    pub as_of: Option<NaiveDate>,
    /// Stop after validation.
    pub dry_run: bool,
}

/// Run the `seed` command.
///
/// The connection pool is closed before returning, whether seeding succeeded
/// or not.
///
/// # Errors
///
/// Returns a [`SeedError`] if the fixtures are invalid, configuration is
/// missing, or any database step fails. On a database failure the
/// transaction is rolled back.
pub async fn run(options: SeedOptions) -> Result<(), SeedError> {
    let file = load_fixtures(options.fixtures.as_deref()).await?;
    let today = options.as_of.unwrap_or_else(dates::today);
    let fixtures = file.resolve(today)?;
    warn_on_inconsistencies(&fixtures);

    if options.dry_run {
        info!(%today, "Dry run: fixtures are valid ({})", fixtures.counts());
        return Ok(());
    }

    let config = DatabaseConfig::from_env()?;
    let pool = db::create_pool(&config).await?;
    debug!("Connected to database");

    let outcome = db::seed_in_transaction(&pool, &fixtures).await;
    pool.close().await;
    let summary = outcome?;

    debug!(
        %today,
        deleted_users = summary.deleted_users,
        deleted_customers = summary.deleted_customers,
        "Seeded {}",
        summary.created
    );
    info!("{COMPLETION_MESSAGE}");

    Ok(())
}

async fn load_fixtures(path: Option<&Path>) -> Result<FixtureFile, SeedError> {
    let Some(path) = path else {
        debug!("Using embedded fixtures");
        return Ok(FixtureFile::embedded()?);
    };

    debug!(path = %path.display(), "Loading fixtures from file");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::Io(format!("Failed to read {}: {e}", path.display())))?;

    Ok(FixtureFile::parse(&content)?)
}

/// Cross-record rules the fixtures are expected to follow but are seeded regardless.
fn warn_on_inconsistencies(fixtures: &FixtureSet) {
    for number in fixtures.duplicate_invoice_numbers() {
        warn!(%number, "Invoice number is used more than once");
    }
    for invoice in fixtures.customers().iter().flat_map(NewCustomer::invoices) {
        if invoice.is_due_before_issue() {
            warn!(
                number = %invoice.number(),
                invoice_date = %invoice.invoice_date(),
                due_date = %invoice.due_date(),
                "Invoice is due before its invoice date"
            );
        }
    }
}
