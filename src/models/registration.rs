//! Registration model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{EventDeskError, Result};

/// A single submitted form value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// Submitted values keyed by field id
pub type FormData = BTreeMap<String, FieldValue>;

impl FieldValue {
    /// Convert a raw JSON value. `Ok(None)` means the value is absent (null).
    pub fn from_json(value: serde_json::Value) -> std::result::Result<Option<Self>, String> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(FieldValue::Bool(b))),
            Value::Number(n) => n
                .as_f64()
                .map(|n| Some(FieldValue::Number(n)))
                .ok_or_else(|| format!("number {} is out of range", n)),
            Value::String(s) => Ok(Some(FieldValue::Text(s))),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    _ => Err("lists may only contain plain values".to_string()),
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(|list| Some(FieldValue::List(list))),
            Value::Object(_) => Err("nested objects are not supported".to_string()),
        }
    }

    /// Whether the value counts as "not filled in" for a required field.
    /// An unchecked checkbox (`false`) is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(checked) => !checked,
            FieldValue::Number(_) => false,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    /// Plain-text rendering for scalar values
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text.trim().to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(_) | FieldValue::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Effect of moving a registration to a new status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Unchanged,
    Confirm,
    /// Cancels the registration and frees its slot
    Cancel,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 3] = [
        RegistrationStatus::Pending,
        RegistrationStatus::Confirmed,
        RegistrationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a registration in this status occupies a capacity slot
    pub fn holds_slot(&self) -> bool {
        !matches!(self, RegistrationStatus::Cancelled)
    }

    pub fn transition_to(self, target: RegistrationStatus) -> Result<StatusTransition> {
        use RegistrationStatus::*;

        match (self, target) {
            (Cancelled, _) => Err(EventDeskError::validation("registration already cancelled")),
            (Pending, Pending) | (Confirmed, Confirmed) => Ok(StatusTransition::Unchanged),
            (Pending, Confirmed) => Ok(StatusTransition::Confirm),
            (Pending, Cancelled) | (Confirmed, Cancelled) => Ok(StatusTransition::Cancel),
            (Confirmed, Pending) => Err(EventDeskError::validation(
                "a confirmed registration cannot return to pending",
            )),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = EventDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "pending" => Ok(RegistrationStatus::Pending),
            "confirmed" => Ok(RegistrationStatus::Confirmed),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(EventDeskError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub form_data: FormData,
    pub contact_info: ContactInfo,
    pub status: RegistrationStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated submission ready to be stored
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub event_id: i64,
    pub form_data: FormData,
    pub contact_info: ContactInfo,
    pub submitted_at: DateTime<Utc>,
}

/// Registration counts by status for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}

impl RegistrationStats {
    pub fn record(&mut self, status: RegistrationStatus) {
        self.total += 1;
        match status {
            RegistrationStatus::Pending => self.pending += 1,
            RegistrationStatus::Confirmed => self.confirmed += 1,
            RegistrationStatus::Cancelled => self.cancelled += 1,
        }
    }

    /// Registrations currently holding a slot
    pub fn active(&self) -> i64 {
        self.pending + self.confirmed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationQuery {
    pub event_id: i64,
    pub status: Option<RegistrationStatus>,
    /// 1-based page number
    pub page: i64,
    pub limit: i64,
}

impl RegistrationQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.limit.max(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
