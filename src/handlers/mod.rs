//! Request handlers
//!
//! Framework-agnostic handlers for the public and admin endpoints. Each one
//! returns the status code plus the `{success, data, message}` envelope, so
//! any HTTP layer can serve them unchanged.

pub mod events;
pub mod registrations;

use http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

use crate::utils::errors::{ErrorKind, EventDeskError};

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HandlerResponse<T> {
    pub status: StatusCode,
    pub body: ApiResponse<T>,
}

impl<T> HandlerResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse {
                success: status.is_success(),
                data: None,
                message: Some(message.into()),
                kind: None,
                errors: Vec::new(),
            },
        }
    }

    fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            status,
            body: ApiResponse {
                success: true,
                data: Some(data),
                message: None,
                kind: None,
                errors: Vec::new(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.body.success
    }
}

/// Status code for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::CapacityExceeded => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<T> From<EventDeskError> for HandlerResponse<T> {
    fn from(err: EventDeskError) -> Self {
        let kind = err.kind();
        let status = status_for(kind);

        // Storage details stay in the logs
        let message = if kind == ErrorKind::Internal {
            error!(error = %err, severity = %err.severity(), "Request failed");
            "Internal server error".to_string()
        } else {
            warn!(error = %err, kind = ?kind, "Request rejected");
            err.to_string()
        };

        Self {
            status,
            body: ApiResponse {
                success: false,
                data: None,
                message: Some(message),
                kind: Some(kind),
                errors: err.fields().to_vec(),
            },
        }
    }
}

/// Collapse a service result into a response
pub fn respond<T>(result: crate::Result<T>, on_success: fn(T) -> HandlerResponse<T>) -> HandlerResponse<T> {
    match result {
        Ok(data) => on_success(data),
        Err(err) => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        let not_found: HandlerResponse<()> = EventDeskError::EventNotFound { event_id: 9 }.into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert!(!not_found.is_success());

        let full: HandlerResponse<()> =
            EventDeskError::CapacityExceeded { event_id: 9, max_participants: 2 }.into();
        assert_eq!(full.status, StatusCode::CONFLICT);
        assert_eq!(full.body.kind, Some(ErrorKind::CapacityExceeded));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response: HandlerResponse<()> =
            EventDeskError::Storage("connection reset by peer at 10.0.0.5".into()).into();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.message.as_deref(), Some("Internal server error"));
    }

    #[test]
    fn test_validation_envelope_lists_fields() {
        let response: HandlerResponse<()> = EventDeskError::invalid_fields(
            "Missing required fields: Name",
            vec!["Name".to_string()],
        )
        .into();

        let body = serde_json::to_value(&response.body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["errors"][0], "Name");
        assert!(body.get("data").is_none());
    }
}
