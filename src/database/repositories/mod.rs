//! Database repositories module
//!
//! PostgreSQL implementations of the store traits

pub mod event;
pub mod registration;

// Re-export repositories
pub use event::EventRepository;
pub use registration::RegistrationRepository;
