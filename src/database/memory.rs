//! In-process store
//!
//! Keeps events and registrations behind one lock. Each trait method takes
//! the lock once, so the conditional updates are atomic with respect to
//! concurrent callers just like the SQL statements they mirror.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::store::{
    Admission, EventStore, EventUpdate, RegistrationStore, ReserveOutcome, SlotChange,
};
use crate::models::{
    Event, EventFilter, FieldDefinition, NewEvent, NewRegistration, Registration,
    RegistrationQuery, RegistrationStats, RegistrationStatus, UpdateEventRequest,
};
use crate::utils::errors::Result;

#[derive(Debug, Default)]
struct MemoryState {
    next_event_id: i64,
    next_registration_id: i64,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
}

impl MemoryState {
    fn reserve(&mut self, id: i64) -> ReserveOutcome {
        let Some(event) = self.events.get_mut(&id) else {
            return ReserveOutcome::EventMissing;
        };

        match event.max_participants {
            Some(max) if event.current_participants >= max => ReserveOutcome::Full { max },
            max => {
                event.current_participants += 1;
                event.updated_at = Utc::now();
                ReserveOutcome::Reserved {
                    current: event.current_participants,
                    max,
                }
            }
        }
    }

    fn release(&mut self, id: i64) -> Option<i32> {
        self.events.get_mut(&id).map(|event| {
            event.current_participants = (event.current_participants - 1).max(0);
            event.updated_at = Utc::now();
            event.current_participants
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        let mut state = self.state.write().await;
        state.next_event_id += 1;
        let now = Utc::now();
        let event = Event {
            id: state.next_event_id,
            title: event.title,
            description: event.description,
            fields: event.fields,
            max_participants: event.max_participants,
            current_participants: 0,
            registration_deadline: event.registration_deadline,
            status: event.status,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.state.read().await.events.get(&id).cloned())
    }

    async fn replace_fields(&self, id: i64, fields: Vec<FieldDefinition>) -> Result<Option<Event>> {
        let mut state = self.state.write().await;
        Ok(state.events.get_mut(&id).map(|event| {
            event.fields = fields;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<EventUpdate> {
        let mut state = self.state.write().await;
        let Some(event) = state.events.get_mut(&id) else {
            return Ok(EventUpdate::EventMissing);
        };

        if let Some(max) = request.max_participants {
            if max.map_or(false, |max| event.current_participants > max) {
                return Ok(EventUpdate::CapacityBelowCurrent {
                    current: event.current_participants,
                });
            }
            event.max_participants = max;
        }
        if let Some(title) = request.title {
            event.title = title;
        }
        if let Some(description) = request.description {
            event.description = description;
        }
        if let Some(deadline) = request.registration_deadline {
            event.registration_deadline = deadline;
        }
        if let Some(status) = request.status {
            event.status = status;
        }
        event.updated_at = Utc::now();

        Ok(EventUpdate::Updated(event.clone()))
    }

    async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let (limit, offset) = filter.window();

        Ok(state
            .events
            .values()
            .rev()
            .filter(|event| filter.matches(event, now))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn try_reserve_slot(&self, id: i64) -> Result<ReserveOutcome> {
        Ok(self.state.write().await.reserve(id))
    }

    async fn release_slot(&self, id: i64) -> Result<Option<i32>> {
        Ok(self.state.write().await.release(id))
    }

    async fn resync_participants(&self, id: i64) -> Result<Option<i32>> {
        let mut state = self.state.write().await;
        let live = state
            .registrations
            .values()
            .filter(|r| r.event_id == id && r.status.holds_slot())
            .count() as i32;

        Ok(state.events.get_mut(&id).map(|event| {
            event.current_participants = live;
            event.updated_at = Utc::now();
            live
        }))
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn admit_registration(&self, registration: NewRegistration) -> Result<Admission> {
        let mut state = self.state.write().await;
        let (current, max) = match state.reserve(registration.event_id) {
            ReserveOutcome::Reserved { current, max } => (current, max),
            ReserveOutcome::Full { max } => return Ok(Admission::Full { max }),
            ReserveOutcome::EventMissing => return Ok(Admission::EventMissing),
        };

        state.next_registration_id += 1;
        let registration = Registration {
            id: state.next_registration_id,
            event_id: registration.event_id,
            form_data: registration.form_data,
            contact_info: registration.contact_info,
            status: RegistrationStatus::Pending,
            submitted_at: registration.submitted_at,
            updated_at: registration.submitted_at,
        };
        state.registrations.insert(registration.id, registration.clone());
        Ok(Admission::Admitted {
            registration,
            current,
            max,
        })
    }

    async fn find_registration(&self, id: i64) -> Result<Option<Registration>> {
        Ok(self.state.read().await.registrations.get(&id).cloned())
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        expected: RegistrationStatus,
        next: RegistrationStatus,
    ) -> Result<Option<SlotChange>> {
        let mut state = self.state.write().await;
        let Some(registration) = state
            .registrations
            .get_mut(&id)
            .filter(|registration| registration.status == expected)
        else {
            return Ok(None);
        };

        registration.status = next;
        registration.updated_at = Utc::now();
        let registration = registration.clone();

        let released = if expected.holds_slot() && !next.holds_slot() {
            state.release(registration.event_id)
        } else {
            None
        };

        Ok(Some(SlotChange {
            registration,
            released,
        }))
    }

    async fn delete_registration(&self, id: i64) -> Result<Option<SlotChange>> {
        let mut state = self.state.write().await;
        let Some(registration) = state.registrations.remove(&id) else {
            return Ok(None);
        };

        let released = if registration.status.holds_slot() {
            state.release(registration.event_id)
        } else {
            None
        };

        Ok(Some(SlotChange {
            registration,
            released,
        }))
    }

    async fn list_registrations(&self, query: &RegistrationQuery) -> Result<(Vec<Registration>, i64)> {
        let state = self.state.read().await;
        let mut matching: Vec<&Registration> = state
            .registrations
            .values()
            .filter(|r| r.event_id == query.event_id)
            .filter(|r| query.status.map_or(true, |status| r.status == status))
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn count_by_status(&self, event_id: i64) -> Result<RegistrationStats> {
        let state = self.state.read().await;
        let mut stats = RegistrationStats::default();
        for registration in state.registrations.values().filter(|r| r.event_id == event_id) {
            stats.record(registration.status);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_fields, ContactInfo, EventStatus, FormData};

    fn new_registration(event_id: i64) -> NewRegistration {
        NewRegistration {
            event_id,
            form_data: FormData::new(),
            contact_info: ContactInfo::default(),
            submitted_at: Utc::now(),
        }
    }

    fn new_event(max: Option<i32>) -> NewEvent {
        NewEvent {
            title: "Lindy Hop social".to_string(),
            description: None,
            fields: default_fields(),
            max_participants: max,
            registration_deadline: None,
            status: EventStatus::Published,
        }
    }

    #[tokio::test]
    async fn test_reserve_respects_limit() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event(Some(1))).await.unwrap();

        assert_eq!(
            store.try_reserve_slot(event.id).await.unwrap(),
            ReserveOutcome::Reserved { current: 1, max: Some(1) }
        );
        assert_eq!(store.try_reserve_slot(event.id).await.unwrap(), ReserveOutcome::Full { max: 1 });
        assert_eq!(store.try_reserve_slot(999).await.unwrap(), ReserveOutcome::EventMissing);
    }

    #[tokio::test]
    async fn test_release_floors_at_zero() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event(None)).await.unwrap();

        assert_eq!(store.release_slot(event.id).await.unwrap(), Some(0));
        assert_eq!(store.release_slot(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_refuses_capacity_below_current() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event(Some(5))).await.unwrap();
        store.try_reserve_slot(event.id).await.unwrap();
        store.try_reserve_slot(event.id).await.unwrap();

        let request = UpdateEventRequest {
            max_participants: Some(Some(1)),
            ..Default::default()
        };
        assert_eq!(
            store.update_event(event.id, request).await.unwrap(),
            EventUpdate::CapacityBelowCurrent { current: 2 }
        );
    }

    #[tokio::test]
    async fn test_admission_reserves_and_stores_together() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event(Some(1))).await.unwrap();

        let admitted = store.admit_registration(new_registration(event.id)).await.unwrap();
        assert!(matches!(admitted, Admission::Admitted { current: 1, max: Some(1), .. }));
        assert_eq!(
            store.admit_registration(new_registration(event.id)).await.unwrap(),
            Admission::Full { max: 1 }
        );
        assert_eq!(
            store.admit_registration(new_registration(999)).await.unwrap(),
            Admission::EventMissing
        );

        assert_eq!(store.count_by_status(event.id).await.unwrap().total, 1);
        assert_eq!(store.resync_participants(event.id).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_cancel_then_delete_releases_once() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event(Some(3))).await.unwrap();
        let Admission::Admitted { registration, .. } =
            store.admit_registration(new_registration(event.id)).await.unwrap()
        else {
            panic!("expected admission");
        };

        let cancelled = store
            .compare_and_set_status(registration.id, RegistrationStatus::Pending, RegistrationStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.released, Some(0));

        let stale = store
            .compare_and_set_status(registration.id, RegistrationStatus::Pending, RegistrationStatus::Cancelled)
            .await
            .unwrap();
        assert!(stale.is_none());

        let deleted = store.delete_registration(registration.id).await.unwrap().unwrap();
        assert_eq!(deleted.released, None);
        assert_eq!(deleted.registration.status, RegistrationStatus::Cancelled);
        assert_eq!(store.find_event(event.id).await.unwrap().unwrap().current_participants, 0);
    }
}
