//! Test context setup
//!
//! In-memory services for most tests, and PostgreSQL-backed services when
//! `TEST_DATABASE_URL` points at a database.

use std::sync::Once;

use eventdesk::config::{DatabaseConfig, RegistrationConfig};
use eventdesk::database::{create_pool, run_migrations, DatabasePool, DatabaseService};
use eventdesk::models::Event;
use eventdesk::ServiceFactory;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn test_config() -> RegistrationConfig {
    RegistrationConfig {
        default_page_size: 10,
        max_page_size: 50,
        enforce_deadline: true,
        resync_on_drift: false,
    }
}

pub fn memory_services() -> ServiceFactory {
    init_tracing();
    ServiceFactory::in_memory(test_config())
}

pub async fn current_participants(services: &ServiceFactory, event_id: i64) -> i32 {
    let event: Event = services
        .catalog
        .get_by_id(event_id)
        .await
        .expect("event should exist");
    event.current_participants
}

pub struct PostgresContext {
    pub pool: DatabasePool,
    pub services: ServiceFactory,
}

impl PostgresContext {
    /// Connect and migrate, or `None` when no test database is configured
    pub async fn connect() -> Option<Self> {
        init_tracing();
        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        let config = DatabaseConfig {
            url,
            max_connections: 20,
            ..DatabaseConfig::default()
        };
        let pool = create_pool(&config).await.expect("Failed to connect to test database");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let database = DatabaseService::new(pool.clone());
        let services = ServiceFactory::from_database(&database, test_config());
        Some(Self { pool, services })
    }

    pub async fn cleanup(&self) {
        sqlx::query("DELETE FROM registrations")
            .execute(&self.pool)
            .await
            .expect("Failed to clean registrations");
        sqlx::query("DELETE FROM events")
            .execute(&self.pool)
            .await
            .expect("Failed to clean events");
    }
}
