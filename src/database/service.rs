//! Database service layer
//!
//! Bundles the PostgreSQL repositories that share one pool

use crate::database::{health_check, DatabasePool, EventRepository, RegistrationRepository};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        health_check(&self.pool).await
    }
}
