//! Test fixtures for events and submissions

use serde_json::{json, Value};

use eventdesk::models::{CreateEventRequest, FieldDefinition, FieldKind};

/// The two-field form used by the worked capacity scenario
pub fn name_and_email_form() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("name", "Name", FieldKind::Text).required(),
        FieldDefinition::new("email", "Email", FieldKind::Email).required(),
    ]
}

/// A richer form exercising every field type
pub fn workshop_form() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("fullName", "Full name", FieldKind::Text).required(),
        FieldDefinition::new("email", "Email", FieldKind::Email).required(),
        FieldDefinition::new("phoneNumber", "Phone", FieldKind::Tel),
        FieldDefinition::new("role", "Dance role", FieldKind::Radio {
            options: vec!["Lead".to_string(), "Follow".to_string(), "Both".to_string()],
        })
        .required(),
        FieldDefinition::new("level", "Level", FieldKind::Select {
            options: vec!["Beginner".to_string(), "Intermediate".to_string(), "Advanced".to_string()],
        }),
        FieldDefinition::new("years", "Years dancing", FieldKind::Number),
        FieldDefinition::new("notes", "Notes", FieldKind::Textarea),
        FieldDefinition::new("photoConsent", "Photo consent", FieldKind::Checkbox).required(),
    ]
}

pub fn capped_event(title: &str, max: i32) -> CreateEventRequest {
    CreateEventRequest::new(title)
        .with_fields(name_and_email_form())
        .with_max_participants(max)
}

pub fn submission(name: &str, email: &str) -> Value {
    json!({ "name": name, "email": email })
}

pub fn workshop_submission() -> Value {
    json!({
        "fullName": "Norma Miller",
        "email": "norma@savoy.org",
        "phoneNumber": "555-0142",
        "role": "Follow",
        "level": "Advanced",
        "years": 12,
        "notes": "Bringing my own shoes",
        "photoConsent": true
    })
}
