//! Registration endpoints
//!
//! Public submission plus the admin-gated list, status, delete and stats
//! endpoints. Caller identity and permissions are checked before these run.

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{respond, HandlerResponse};
use crate::models::{Page, Registration, RegistrationStats, RegistrationStatus};
use crate::services::ServiceFactory;

/// Body of a public submission. `formData` may be an object or a JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRegistrationBody {
    #[serde(default)]
    pub form_data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRegistrationsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

#[derive(Clone)]
pub struct RegistrationHandlers {
    services: ServiceFactory,
}

impl RegistrationHandlers {
    pub fn new(services: ServiceFactory) -> Self {
        Self { services }
    }

    /// POST /events/{event_id}/registrations
    pub async fn submit(&self, event_id: i64, body: SubmitRegistrationBody) -> HandlerResponse<Registration> {
        let result = self.services.intake.submit(event_id, &body.form_data).await;
        respond(result, HandlerResponse::created)
    }

    /// GET /events/{event_id}/registrations
    pub async fn list(
        &self,
        event_id: i64,
        params: ListRegistrationsParams,
    ) -> HandlerResponse<Page<Registration>> {
        let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<RegistrationStatus>() {
                Ok(status) => Some(status),
                Err(err) => return err.into(),
            },
            None => None,
        };

        let result = self
            .services
            .lifecycle
            .list(event_id, status, params.page, params.limit)
            .await;
        respond(result, HandlerResponse::ok)
    }

    /// PATCH /registrations/{registration_id}/status
    pub async fn update_status(
        &self,
        registration_id: i64,
        body: UpdateStatusBody,
    ) -> HandlerResponse<Registration> {
        let result = self
            .services
            .lifecycle
            .update_status_str(registration_id, &body.status)
            .await;
        respond(result, HandlerResponse::ok)
    }

    /// DELETE /registrations/{registration_id}
    pub async fn delete(&self, registration_id: i64) -> HandlerResponse<()> {
        match self.services.lifecycle.delete(registration_id).await {
            Ok(deleted) => {
                info!(registration_id = registration_id, event_id = deleted.event_id, "Registration deleted");
                HandlerResponse::message(StatusCode::OK, "Registration deleted")
            }
            Err(err) => err.into(),
        }
    }

    /// GET /events/{event_id}/registrations/stats
    pub async fn stats(&self, event_id: i64) -> HandlerResponse<RegistrationStats> {
        let result = self.services.statistics.stats_for(event_id).await;
        respond(result, HandlerResponse::ok)
    }
}
