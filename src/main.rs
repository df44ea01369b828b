//! Maintenance pass for the vendor ledger.
//!
//! Connects to the configured database, ensures the tables exist, reconciles every
//! owner's vendors against their payments and logs the resulting budget totals.

use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wedding_ledger::{
    config::{
        self,
        database::{self, DEFAULT_DATABASE_URL},
    },
    core::{LedgerService, SeaOrmLedgerStore, summary::format_currency},
    errors::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Settings file is optional
    let settings = config::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Database
    let database_url = database::resolve_database_url(settings.database.url.as_deref());
    if database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Repair pass
    let store = SeaOrmLedgerStore::new(db);
    let owners = store.owners().await?;
    let service = LedgerService::with_settings(store, &settings.ledger);

    for owner in &owners {
        let repaired = service.reconcile_all(owner).await?;
        if !repaired.is_empty() {
            warn!("{} vendors repaired for {owner}", repaired.len());
        }

        let dashboard = service.dashboard(owner).await?;
        let totals = dashboard.vendors;
        info!(
            "{owner}: budget {}, paid {} ({}%), remaining {} across {} payments",
            format_currency(totals.total_budget),
            format_currency(totals.total_paid),
            totals.payment_percentage,
            format_currency(totals.remaining_balance),
            totals.payment_count
        );
    }

    info!("Maintenance pass complete for {} owners", owners.len());
    Ok(())
}
