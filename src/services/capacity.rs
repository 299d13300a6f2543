//! Capacity tracking
//!
//! The only code path that changes an event's `current_participants`.
//! Admitting, cancelling and deleting a registration change the counter in
//! the same atomic step as the registration itself, so a recount never sees
//! one without the other.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::database::{Admission, EventStore, RegistrationStore, ReserveOutcome, SlotChange};
use crate::models::{NewRegistration, Registration, RegistrationStatus};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::log_capacity_change;

#[derive(Clone)]
pub struct CapacityTracker {
    events: Arc<dyn EventStore>,
    registrations: Arc<dyn RegistrationStore>,
}

impl CapacityTracker {
    pub fn new(events: Arc<dyn EventStore>, registrations: Arc<dyn RegistrationStore>) -> Self {
        Self {
            events,
            registrations,
        }
    }

    /// Take one slot, returning the new participant count.
    ///
    /// Fails with `CapacityExceeded` when the event is full; the counter is
    /// left untouched in that case.
    pub async fn try_reserve(&self, event_id: i64) -> Result<i32> {
        match self.events.try_reserve_slot(event_id).await? {
            ReserveOutcome::Reserved { current, max } => {
                log_capacity_change(event_id, "reserve", current, max);
                Ok(current)
            }
            ReserveOutcome::Full { max } => Err(full(event_id, max)),
            ReserveOutcome::EventMissing => Err(EventDeskError::EventNotFound { event_id }),
        }
    }

    /// Give back one slot. Callers release at most once per reserved slot.
    pub async fn release(&self, event_id: i64) -> Result<i32> {
        let current = self
            .events
            .release_slot(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        log_capacity_change(event_id, "release", current, None);
        Ok(current)
    }

    /// Reserve a slot and store the registration as one unit.
    ///
    /// Nothing is written when the event is full or the insert fails.
    pub async fn admit(&self, registration: NewRegistration) -> Result<Registration> {
        let event_id = registration.event_id;
        match self.registrations.admit_registration(registration).await? {
            Admission::Admitted {
                registration,
                current,
                max,
            } => {
                log_capacity_change(event_id, "reserve", current, max);
                Ok(registration)
            }
            Admission::Full { max } => Err(full(event_id, max)),
            Admission::EventMissing => Err(EventDeskError::EventNotFound { event_id }),
        }
    }

    /// Move a registration from `expected` to `next`. A registration that
    /// stops holding a slot gives it back in the same step.
    ///
    /// `None` when the registration is gone or no longer in `expected`.
    pub async fn change_status(
        &self,
        registration_id: i64,
        expected: RegistrationStatus,
        next: RegistrationStatus,
    ) -> Result<Option<Registration>> {
        let change = self
            .registrations
            .compare_and_set_status(registration_id, expected, next)
            .await?;
        Ok(change.map(settle))
    }

    /// Delete a registration, giving back its slot unless it was cancelled
    pub async fn remove(&self, registration_id: i64) -> Result<Option<Registration>> {
        let change = self.registrations.delete_registration(registration_id).await?;
        Ok(change.map(settle))
    }

    /// Rebuild the counter from the registrations that still hold a slot
    pub async fn resync(&self, event_id: i64) -> Result<i32> {
        let current = self
            .events
            .resync_participants(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        debug!(event_id = event_id, current_participants = current, "Participant count resynced");
        Ok(current)
    }
}

fn full(event_id: i64, max: i32) -> EventDeskError {
    warn!(event_id = event_id, max_participants = max, "Event is full");
    EventDeskError::CapacityExceeded {
        event_id,
        max_participants: max,
    }
}

fn settle(change: SlotChange) -> Registration {
    if let Some(current) = change.released {
        log_capacity_change(change.registration.event_id, "release", current, None);
    }
    change.registration
}
