//! Row counts for the seeded tables.
//!
//! # Usage
//!
//! ```bash
//! invoicer-cli stats
//! ```

use tracing::info;

use invoicer_cli::config::DatabaseConfig;
use invoicer_cli::db;

/// Log how many rows each seeded table holds.
///
/// # Errors
///
/// Returns an error if configuration is missing or the database is unreachable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = db::create_pool(&config).await?;

    let counts = db::table_counts(&pool).await;
    pool.close().await;
    let counts = counts?;

    info!("Invoicing tables");
    info!("================");
    info!("  users:      {}", counts.users);
    info!("  customers:  {}", counts.customers);
    info!("  invoices:   {}", counts.invoices);
    info!("  line items: {}", counts.line_items);
    info!("  deposits:   {}", counts.deposits);

    Ok(())
}
