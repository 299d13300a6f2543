//! Registration lifecycle
//!
//! Status changes and hard deletes. Every change goes through the
//! `CapacityTracker`, which frees the slot in the same step as the
//! conditional update, so only the caller that changed the row releases it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RegistrationConfig;
use crate::database::RegistrationStore;
use crate::models::registration::{
    Page, Registration, RegistrationQuery, RegistrationStatus, StatusTransition,
};
use crate::services::capacity::CapacityTracker;
use crate::services::catalog::EventCatalog;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::log_registration_action;

/// Compare-and-set attempts before giving up on a contended registration
const MAX_STATUS_ATTEMPTS: usize = 5;

/// Highest page number a listing accepts
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Clone)]
pub struct RegistrationLifecycle {
    catalog: EventCatalog,
    registrations: Arc<dyn RegistrationStore>,
    capacity: CapacityTracker,
    paging: RegistrationConfig,
}

impl RegistrationLifecycle {
    pub fn new(
        catalog: EventCatalog,
        registrations: Arc<dyn RegistrationStore>,
        capacity: CapacityTracker,
        paging: RegistrationConfig,
    ) -> Self {
        Self {
            catalog,
            registrations,
            capacity,
            paging,
        }
    }

    pub async fn get(&self, registration_id: i64) -> Result<Registration> {
        self.registrations
            .find_registration(registration_id)
            .await?
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })
    }

    /// Apply a status given as a raw string; unknown values change nothing
    pub async fn update_status_str(&self, registration_id: i64, status: &str) -> Result<Registration> {
        let target = status.parse::<RegistrationStatus>()?;
        self.update_status(registration_id, target).await
    }

    pub async fn update_status(
        &self,
        registration_id: i64,
        target: RegistrationStatus,
    ) -> Result<Registration> {
        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let current = self.get(registration_id).await?;

            let transition = current.status.transition_to(target)?;
            if transition == StatusTransition::Unchanged {
                debug!(registration_id = registration_id, status = %target, "Status unchanged");
                return Ok(current);
            }

            let Some(updated) = self
                .capacity
                .change_status(registration_id, current.status, target)
                .await?
            else {
                debug!(registration_id = registration_id, attempt = attempt, "Status changed concurrently, retrying");
                continue;
            };

            log_registration_action(updated.event_id, registration_id, "update_status", updated.status);
            return Ok(updated);
        }

        warn!(registration_id = registration_id, "Gave up on contended status update");
        Err(EventDeskError::Storage(format!(
            "registration {} kept changing during status update",
            registration_id
        )))
    }

    pub async fn cancel(&self, registration_id: i64) -> Result<Registration> {
        self.update_status(registration_id, RegistrationStatus::Cancelled).await
    }

    pub async fn confirm(&self, registration_id: i64) -> Result<Registration> {
        self.update_status(registration_id, RegistrationStatus::Confirmed).await
    }

    /// Remove a registration. Its slot is released unless it was already cancelled.
    pub async fn delete(&self, registration_id: i64) -> Result<Registration> {
        let deleted = self
            .capacity
            .remove(registration_id)
            .await?
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })?;

        log_registration_action(deleted.event_id, registration_id, "delete", deleted.status);
        Ok(deleted)
    }

    /// Newest-first page of an event's registrations
    pub async fn list(
        &self,
        event_id: i64,
        status: Option<RegistrationStatus>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<Registration>> {
        self.catalog.get_by_id(event_id).await?;

        let query = RegistrationQuery {
            event_id,
            status,
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit
                .unwrap_or(self.paging.default_page_size)
                .clamp(1, self.paging.max_page_size),
        };

        let (items, total) = self.registrations.list_registrations(&query).await?;
        debug!(event_id = event_id, total = total, page = query.page, "Listed registrations");
        Ok(Page::new(items, total, query.page, query.limit))
    }
}
