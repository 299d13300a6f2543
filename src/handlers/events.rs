//! Event endpoints used by the admin side to author forms

use super::{respond, HandlerResponse};
use crate::models::{CreateEventRequest, Event, EventFilter, FieldDefinition, UpdateEventRequest};
use crate::services::ServiceFactory;

#[derive(Clone)]
pub struct EventHandlers {
    services: ServiceFactory,
}

impl EventHandlers {
    pub fn new(services: ServiceFactory) -> Self {
        Self { services }
    }

    pub async fn create(&self, request: CreateEventRequest) -> HandlerResponse<Event> {
        respond(self.services.catalog.create(request).await, HandlerResponse::created)
    }

    pub async fn get(&self, event_id: i64) -> HandlerResponse<Event> {
        respond(self.services.catalog.get_by_id(event_id).await, HandlerResponse::ok)
    }

    pub async fn update(&self, event_id: i64, request: UpdateEventRequest) -> HandlerResponse<Event> {
        respond(self.services.catalog.update(event_id, request).await, HandlerResponse::ok)
    }

    /// PUT /events/{event_id}/fields
    pub async fn replace_fields(&self, event_id: i64, fields: Vec<FieldDefinition>) -> HandlerResponse<Event> {
        respond(
            self.services.catalog.replace_schema(event_id, fields).await,
            HandlerResponse::ok,
        )
    }

    pub async fn list(&self, filter: EventFilter) -> HandlerResponse<Vec<Event>> {
        respond(self.services.catalog.list_active(&filter).await, HandlerResponse::ok)
    }
}
