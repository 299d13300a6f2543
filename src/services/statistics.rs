//! Registration statistics
//!
//! Read-only rollups computed from the registration store on every call.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::database::RegistrationStore;
use crate::models::{Event, EventFilter, RegistrationStats};
use crate::services::catalog::EventCatalog;
use crate::utils::errors::Result;

/// Stats for one event alongside its cached participant counter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    pub event_id: i64,
    pub title: String,
    pub max_participants: Option<i32>,
    pub current_participants: i32,
    pub stats: RegistrationStats,
}

impl EventReport {
    fn new(event: Event, stats: RegistrationStats) -> Self {
        Self {
            event_id: event.id,
            title: event.title,
            max_participants: event.max_participants,
            current_participants: event.current_participants,
            stats,
        }
    }

    /// Whether the cached counter agrees with the live registrations
    pub fn counter_in_sync(&self) -> bool {
        i64::from(self.current_participants) == self.stats.active()
    }
}

#[derive(Clone)]
pub struct StatisticsAggregator {
    catalog: EventCatalog,
    registrations: Arc<dyn RegistrationStore>,
}

impl StatisticsAggregator {
    pub fn new(catalog: EventCatalog, registrations: Arc<dyn RegistrationStore>) -> Self {
        Self {
            catalog,
            registrations,
        }
    }

    pub async fn stats_for(&self, event_id: i64) -> Result<RegistrationStats> {
        self.catalog.get_by_id(event_id).await?;
        let stats = self.registrations.count_by_status(event_id).await?;
        debug!(event_id = event_id, total = stats.total, "Computed registration stats");
        Ok(stats)
    }

    /// Stats for every event matching the filter
    pub async fn report(&self, filter: &EventFilter) -> Result<Vec<EventReport>> {
        let events = self.catalog.list_active(filter).await?;
        let mut reports = Vec::with_capacity(events.len());

        for event in events {
            let stats = self.registrations.count_by_status(event.id).await?;
            reports.push(EventReport::new(event, stats));
        }

        Ok(reports)
    }
}
