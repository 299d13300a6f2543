//! Storage traits shared by the PostgreSQL repositories and the memory store
//!
//! Every method that touches `current_participants` or a registration status
//! is a single atomic operation on the backing store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Event, EventFilter, FieldDefinition, NewEvent, NewRegistration, Registration,
    RegistrationQuery, RegistrationStats, RegistrationStatus, UpdateEventRequest,
};
use crate::utils::errors::Result;

/// Outcome of a conditional slot reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved { current: i32, max: Option<i32> },
    Full { max: i32 },
    EventMissing,
}

/// Outcome of reserving a slot and storing the registration as one unit
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Admitted {
        registration: Registration,
        current: i32,
        max: Option<i32>,
    },
    Full { max: i32 },
    EventMissing,
}

/// A registration as changed or removed, with the counter it left behind
/// when the change freed a slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange {
    pub registration: Registration,
    pub released: Option<i32>,
}

/// Outcome of a conditional event update
#[derive(Debug, Clone, PartialEq)]
pub enum EventUpdate {
    Updated(Event),
    /// New capacity would be below the participants already registered
    CapacityBelowCurrent { current: i32 },
    EventMissing,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: NewEvent) -> Result<Event>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>>;

    /// Replace the whole field list
    async fn replace_fields(&self, id: i64, fields: Vec<FieldDefinition>) -> Result<Option<Event>>;

    async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<EventUpdate>;

    async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Increment `current_participants` iff the event has room
    async fn try_reserve_slot(&self, id: i64) -> Result<ReserveOutcome>;

    /// Decrement `current_participants`, floored at zero. `None` if the event is gone.
    async fn release_slot(&self, id: i64) -> Result<Option<i32>>;

    /// Recompute `current_participants` from non-cancelled registrations.
    /// Serialized with admissions and releases on the same event.
    async fn resync_participants(&self, id: i64) -> Result<Option<i32>>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Reserve a slot on the event and store the registration as `pending`.
    /// Either both happen or neither does.
    async fn admit_registration(&self, registration: NewRegistration) -> Result<Admission>;

    async fn find_registration(&self, id: i64) -> Result<Option<Registration>>;

    /// Set the status only if it still equals `expected`, releasing the
    /// event slot in the same step when the registration stops holding one.
    /// `None` when the registration is missing or its status moved on.
    async fn compare_and_set_status(
        &self,
        id: i64,
        expected: RegistrationStatus,
        next: RegistrationStatus,
    ) -> Result<Option<SlotChange>>;

    /// Remove a registration, releasing its slot in the same step if it held one.
    /// The returned registration is as it was at deletion.
    async fn delete_registration(&self, id: i64) -> Result<Option<SlotChange>>;

    /// One page of registrations plus the total matching count
    async fn list_registrations(&self, query: &RegistrationQuery) -> Result<(Vec<Registration>, i64)>;

    async fn count_by_status(&self, event_id: i64) -> Result<RegistrationStats>;
}
