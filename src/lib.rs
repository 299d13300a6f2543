//! EventDesk
//!
//! Event registration with admin-defined forms. Events carry their own
//! registration form schema and an optional capacity; public submissions are
//! validated against that form and counted against the capacity without
//! ever over-booking.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ErrorKind, EventDeskError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryStore};
pub use services::{
    CapacityTracker, EventCatalog, RegistrationIntake, RegistrationLifecycle, ServiceFactory,
    StatisticsAggregator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
