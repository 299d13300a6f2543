//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod registration;

// Re-export commonly used models
pub use event::{
    default_fields, validate_schema, CreateEventRequest, Event, EventFilter, EventStatus,
    FieldDefinition, FieldKind, NewEvent, UpdateEventRequest,
};
pub use registration::{
    ContactInfo, FieldValue, FormData, NewRegistration, Page, Registration, RegistrationQuery,
    RegistrationStats, RegistrationStatus, StatusTransition,
};
