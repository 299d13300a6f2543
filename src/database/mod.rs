//! Database module
//!
//! This module handles database connections, the store traits and their
//! PostgreSQL and in-process implementations

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, run_migrations, DatabasePool};
pub use memory::MemoryStore;
pub use repositories::{EventRepository, RegistrationRepository};
pub use service::DatabaseService;
pub use store::{Admission, EventStore, EventUpdate, RegistrationStore, ReserveOutcome, SlotChange};
