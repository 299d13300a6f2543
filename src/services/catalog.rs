//! Event catalog service
//!
//! Owns events and their registration form schema.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::database::{EventStore, EventUpdate};
use crate::models::event::{
    default_fields, validate_schema, CreateEventRequest, Event, EventFilter, EventStatus,
    FieldDefinition, NewEvent, UpdateEventRequest,
};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct EventCatalog {
    events: Arc<dyn EventStore>,
}

impl EventCatalog {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Create an event. Without a form the default name/email/phone fields are used.
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(EventDeskError::invalid_fields(
                "Event title is required",
                vec!["title".to_string()],
            ));
        }
        validate_capacity(request.max_participants)?;

        let fields = match request.fields {
            Some(fields) => {
                validate_schema(&fields)?;
                fields
            }
            None => default_fields(),
        };

        let event = self
            .events
            .insert_event(NewEvent {
                title,
                description: request.description,
                fields,
                max_participants: request.max_participants,
                registration_deadline: request.registration_deadline,
                status: request.status.unwrap_or(EventStatus::Published),
            })
            .await?;

        info!(
            event_id = event.id,
            fields = event.fields.len(),
            max_participants = event.max_participants,
            "Event created"
        );
        Ok(event)
    }

    pub async fn get_by_id(&self, event_id: i64) -> Result<Event> {
        debug!(event_id = event_id, "Loading event");
        self.events
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })
    }

    /// Replace the whole form; nothing is merged with the previous fields
    pub async fn replace_schema(&self, event_id: i64, fields: Vec<FieldDefinition>) -> Result<Event> {
        validate_schema(&fields)?;

        let event = self
            .events
            .replace_fields(event_id, fields)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        log_admin_action(
            event_id,
            "replace_schema",
            Some(&format!("{} fields", event.fields.len())),
        );
        Ok(event)
    }

    pub async fn update(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(EventDeskError::invalid_fields(
                    "Event title cannot be empty",
                    vec!["title".to_string()],
                ));
            }
        }
        validate_capacity(request.max_participants.flatten())?;

        match self.events.update_event(event_id, request).await? {
            EventUpdate::Updated(event) => {
                log_admin_action(event_id, "update", None);
                Ok(event)
            }
            EventUpdate::CapacityBelowCurrent { current } => Err(EventDeskError::invalid_fields(
                format!(
                    "Max participants cannot be lower than the {} participants already registered",
                    current
                ),
                vec!["maxParticipants".to_string()],
            )),
            EventUpdate::EventMissing => Err(EventDeskError::EventNotFound { event_id }),
        }
    }

    pub async fn set_status(&self, event_id: i64, status: EventStatus) -> Result<Event> {
        let request = UpdateEventRequest {
            status: Some(status),
            ..Default::default()
        };
        self.update(event_id, request).await
    }

    /// Point-in-time snapshot of events matching the filter
    pub async fn list_active(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let events = self.events.list_events(filter, Utc::now()).await?;
        debug!(count = events.len(), status = %filter.effective_status(), "Listed events");
        Ok(events)
    }
}

fn validate_capacity(max_participants: Option<i32>) -> Result<()> {
    match max_participants {
        Some(max) if max <= 0 => Err(EventDeskError::invalid_fields(
            "Max participants must be greater than 0",
            vec!["maxParticipants".to_string()],
        )),
        _ => Ok(()),
    }
}
