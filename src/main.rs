//! EventDesk
//!
//! Main application entry point: prepares the database and prints a
//! registration report for every published event.

use anyhow::Context;
use tracing::{info, warn};

use eventdesk::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseService},
    models::EventFilter,
    services::ServiceFactory,
    utils::{helpers::format_capacity, logging},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", eventdesk::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;

    if settings.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let database = DatabaseService::new(pool);
    database.health_check().await?;

    let services = ServiceFactory::from_database(&database, settings.registration.clone());

    let reports = services.statistics.report(&EventFilter::default()).await?;
    info!(events = reports.len(), "Published events");

    for report in &reports {
        info!(
            event_id = report.event_id,
            title = %report.title,
            participants = %format_capacity(report.current_participants, report.max_participants),
            total = report.stats.total,
            pending = report.stats.pending,
            confirmed = report.stats.confirmed,
            cancelled = report.stats.cancelled,
            "Event registrations"
        );

        // The counter and the stats are read separately, so live traffic can
        // show a transient mismatch. Only repair when asked to.
        if !report.counter_in_sync() {
            warn!(
                event_id = report.event_id,
                cached = report.current_participants,
                live = report.stats.active(),
                "Participant counter differs from live registrations"
            );
            if settings.registration.resync_on_drift {
                let current = services.capacity.resync(report.event_id).await?;
                info!(event_id = report.event_id, current_participants = current, "Participant counter resynced");
            }
        }
    }

    database.pool().close().await;
    info!("EventDesk has been shut down.");

    Ok(())
}
