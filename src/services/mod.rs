//! Services module
//!
//! This module contains business logic services

pub mod capacity;
pub mod catalog;
pub mod intake;
pub mod lifecycle;
pub mod statistics;

// Re-export commonly used services
pub use capacity::CapacityTracker;
pub use catalog::EventCatalog;
pub use intake::RegistrationIntake;
pub use lifecycle::RegistrationLifecycle;
pub use statistics::{EventReport, StatisticsAggregator};

use std::sync::Arc;

use crate::config::RegistrationConfig;
use crate::database::{DatabaseService, EventStore, MemoryStore, RegistrationStore};

/// Service factory wiring every service over one pair of stores
#[derive(Clone)]
pub struct ServiceFactory {
    pub catalog: EventCatalog,
    pub capacity: CapacityTracker,
    pub intake: RegistrationIntake,
    pub lifecycle: RegistrationLifecycle,
    pub statistics: StatisticsAggregator,
}

impl ServiceFactory {
    pub fn new(
        events: Arc<dyn EventStore>,
        registrations: Arc<dyn RegistrationStore>,
        config: RegistrationConfig,
    ) -> Self {
        let catalog = EventCatalog::new(events.clone());
        let capacity = CapacityTracker::new(events, registrations.clone());
        let intake = RegistrationIntake::new(catalog.clone(), capacity.clone(), config.enforce_deadline);
        let lifecycle = RegistrationLifecycle::new(
            catalog.clone(),
            registrations.clone(),
            capacity.clone(),
            config,
        );
        let statistics = StatisticsAggregator::new(catalog.clone(), registrations);

        Self {
            catalog,
            capacity,
            intake,
            lifecycle,
            statistics,
        }
    }

    /// Services backed by PostgreSQL
    pub fn from_database(database: &DatabaseService, config: RegistrationConfig) -> Self {
        Self::new(
            Arc::new(database.events.clone()),
            Arc::new(database.registrations.clone()),
            config,
        )
    }

    /// Services backed by a fresh in-process store
    pub fn in_memory(config: RegistrationConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, config)
    }
}
