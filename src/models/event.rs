//! Event model and its registration form schema

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::errors::{EventDeskError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub max_participants: Option<i32>,
    pub current_participants: i32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.max_participants
            .map(|max| self.current_participants >= max)
            .unwrap_or(false)
    }

    /// Slots left, `None` for unlimited events
    pub fn remaining_slots(&self) -> Option<i32> {
        self.max_participants
            .map(|max| (max - self.current_participants).max(0))
    }

    /// Whether the event currently takes submissions, ignoring capacity
    pub fn accepts_registrations(&self, now: DateTime<Utc>, enforce_deadline: bool) -> bool {
        if self.status != EventStatus::Published {
            return false;
        }
        match self.registration_deadline {
            Some(deadline) if enforce_deadline => now <= deadline,
            _ => true,
        }
    }
}

/// Lifecycle of the event itself, independent of registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = EventDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(EventDeskError::InvalidStatus(other.to_string())),
        }
    }
}

/// One entry of an event's registration form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Closed set of form field types; only choice fields carry options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Textarea,
    Select {
        #[serde(default)]
        options: Vec<String>,
    },
    Radio {
        #[serde(default)]
        options: Vec<String>,
    },
    Checkbox,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Number => "number",
            FieldKind::Textarea => "textarea",
            FieldKind::Select { .. } => "select",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Checkbox => "checkbox",
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            FieldKind::Select { options } | FieldKind::Radio { options } => Some(options),
            _ => None,
        }
    }
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Form used when an event is created without one
pub fn default_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("name", "Full Name", FieldKind::Text)
            .required()
            .with_placeholder("Your full name"),
        FieldDefinition::new("email", "Email", FieldKind::Email)
            .required()
            .with_placeholder("you@example.com"),
        FieldDefinition::new("phone", "Phone", FieldKind::Tel)
            .required()
            .with_placeholder("+1 555 0100"),
    ]
}

/// Check field ids are unique and non-blank, and choice fields have options.
///
/// Every problem is reported in one error.
pub fn validate_schema(fields: &[FieldDefinition]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();
    let mut offending = Vec::new();

    for field in fields {
        if field.id.trim().is_empty() {
            problems.push(format!("field '{}' has an empty id", field.label));
            offending.push(field.label.clone());
            continue;
        }
        if !seen.insert(field.id.as_str()) {
            problems.push(format!("duplicate field id '{}'", field.id));
            offending.push(field.id.clone());
        }
        if let Some(options) = field.kind.options() {
            if options.iter().all(|option| option.trim().is_empty()) {
                problems.push(format!(
                    "{} field '{}' requires at least one option",
                    field.kind.name(),
                    field.id
                ));
                offending.push(field.id.clone());
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(EventDeskError::invalid_fields(
            format!("Invalid form schema: {}", problems.join("; ")),
            offending,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub fields: Option<Vec<FieldDefinition>>,
    pub max_participants: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: Option<EventStatus>,
}

impl CreateEventRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: None,
            max_participants: None,
            registration_deadline: None,
            status: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_max_participants(mut self, max: i32) -> Self {
        self.max_participants = Some(max);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.registration_deadline = Some(deadline);
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Validated event ready to be stored
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub max_participants: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: EventStatus,
}

/// Partial event update.
///
/// For the nullable columns `None` leaves the value alone and `Some(None)`
/// clears it, so `{"maxParticipants": null}` makes an event unlimited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<Option<DateTime<Utc>>>,
    pub status: Option<EventStatus>,
}

/// A key that is present deserializes to `Some`, even when its value is null
fn present_or_null<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Events returned by a listing when no limit is given
pub const DEFAULT_EVENT_LIMIT: i64 = 50;
/// Upper bound on events returned by one listing
pub const MAX_EVENT_LIMIT: i64 = 200;

/// Filter for listing events; `status` defaults to published
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    /// Only events whose deadline has not passed
    #[serde(default)]
    pub open_only: bool,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl EventFilter {
    pub fn effective_status(&self) -> EventStatus {
        self.status.unwrap_or(EventStatus::Published)
    }

    /// `(limit, offset)` with out-of-range values pulled back into bounds
    pub fn window(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_EVENT_LIMIT)
            .clamp(1, MAX_EVENT_LIMIT);
        (limit, self.offset.unwrap_or(0).max(0))
    }

    /// Whether an event passes the status, deadline and title filters
    pub fn matches(&self, event: &Event, now: DateTime<Utc>) -> bool {
        if event.status != self.effective_status() {
            return false;
        }
        if self.open_only && event.registration_deadline.map_or(false, |d| d < now) {
            return false;
        }
        match &self.search {
            Some(term) => event.title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }
}
