//! Registration intake
//!
//! Turns a raw form submission into a stored `pending` registration:
//! parse, validate against the event's form, then reserve a slot and persist
//! in one step.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use serde_json::Value;
use tracing::info;

use crate::models::event::{FieldDefinition, FieldKind};
use crate::models::registration::{ContactInfo, FieldValue, FormData, NewRegistration, Registration};
use crate::services::capacity::CapacityTracker;
use crate::services::catalog::EventCatalog;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::{log_registration_action, log_validation_failure};

const NAME_ALIASES: &[&str] = &["name", "fullName"];
const EMAIL_ALIASES: &[&str] = &["email"];
const PHONE_ALIASES: &[&str] = &["phone", "phoneNumber"];

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

#[derive(Clone)]
pub struct RegistrationIntake {
    catalog: EventCatalog,
    capacity: CapacityTracker,
    enforce_deadline: bool,
}

impl RegistrationIntake {
    pub fn new(catalog: EventCatalog, capacity: CapacityTracker, enforce_deadline: bool) -> Self {
        Self {
            catalog,
            capacity,
            enforce_deadline,
        }
    }

    /// Register against an event's form.
    ///
    /// `form_data` is either a JSON object or a string holding one.
    pub async fn submit(&self, event_id: i64, form_data: &Value) -> Result<Registration> {
        let event = self.catalog.get_by_id(event_id).await?;

        if !event.accepts_registrations(Utc::now(), self.enforce_deadline) {
            return Err(EventDeskError::validation("Registration is closed for this event"));
        }

        let form = parse_submission(form_data)
            .and_then(|form| validate_submission(&event.fields, &form).map(|_| form))
            .map_err(|e| {
                log_validation_failure(event_id, e.fields(), &e.to_string());
                e
            })?;
        let contact_info = extract_contact(&form);

        let registration = self
            .capacity
            .admit(NewRegistration {
                event_id,
                form_data: form,
                contact_info,
                submitted_at: Utc::now(),
            })
            .await?;

        log_registration_action(event_id, registration.id, "submit", registration.status);
        info!(
            event_id = event_id,
            registration_id = registration.id,
            email = %registration.contact_info.email,
            "Registration received"
        );
        Ok(registration)
    }
}

/// Parse a submission body into form data.
///
/// A string body is decoded as JSON first; null means an empty submission.
pub fn parse_submission(body: &Value) -> Result<FormData> {
    let object = match body {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(EventDeskError::validation("Form data must be a JSON object")),
            Err(e) => {
                return Err(EventDeskError::validation(format!("Malformed form data: {}", e)))
            }
        },
        _ => return Err(EventDeskError::validation("Form data must be a JSON object")),
    };

    let mut form = FormData::new();
    let mut rejected = Vec::new();
    for (key, raw) in object {
        match FieldValue::from_json(raw) {
            Ok(Some(value)) => {
                form.insert(key, value);
            }
            Ok(None) => {}
            Err(reason) => rejected.push(format!("{} ({})", key, reason)),
        }
    }

    if rejected.is_empty() {
        Ok(form)
    } else {
        Err(EventDeskError::invalid_fields(
            format!("Unsupported values: {}", rejected.join(", ")),
            rejected,
        ))
    }
}

/// Check a submission against the form, reporting every problem at once
pub fn validate_submission(fields: &[FieldDefinition], form: &FormData) -> Result<()> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for field in fields {
        match form.get(&field.id).filter(|value| !value.is_empty()) {
            None if field.required => missing.push(field.label.clone()),
            None => {}
            Some(value) => {
                if let Err(reason) = check_value(&field.kind, value) {
                    invalid.push((field.label.clone(), reason));
                }
            }
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("Missing required fields: {}", missing.join(", ")));
    }
    problems.extend(invalid.iter().map(|(label, reason)| format!("{} {}", label, reason)));

    let mut labels = missing;
    labels.extend(invalid.into_iter().map(|(label, _)| label));

    Err(EventDeskError::invalid_fields(problems.join("; "), labels))
}

fn check_value(kind: &FieldKind, value: &FieldValue) -> std::result::Result<(), String> {
    match (kind, value) {
        (FieldKind::Checkbox, FieldValue::Bool(_) | FieldValue::List(_)) => Ok(()),
        (FieldKind::Checkbox, _) => Err("must be checked or unchecked".to_string()),
        (FieldKind::Email, FieldValue::Text(text)) if email_regex().is_match(text.trim()) => Ok(()),
        (FieldKind::Email, _) => Err("must be a valid email address".to_string()),
        (FieldKind::Number, FieldValue::Number(_)) => Ok(()),
        (FieldKind::Number, FieldValue::Text(text)) if text.trim().parse::<f64>().is_ok() => Ok(()),
        (FieldKind::Number, _) => Err("must be a number".to_string()),
        (FieldKind::Select { options }, FieldValue::List(choices)) => {
            if choices.iter().all(|choice| options.contains(choice)) {
                Ok(())
            } else {
                Err(format!("must be one of: {}", options.join(", ")))
            }
        }
        (FieldKind::Select { options } | FieldKind::Radio { options }, FieldValue::Text(choice)) => {
            if options.iter().any(|option| option == choice.trim()) {
                Ok(())
            } else {
                Err(format!("must be one of: {}", options.join(", ")))
            }
        }
        (FieldKind::Select { options } | FieldKind::Radio { options }, _) => {
            Err(format!("must be one of: {}", options.join(", ")))
        }
        (FieldKind::Text | FieldKind::Textarea | FieldKind::Tel, FieldValue::Text(_) | FieldValue::Number(_)) => {
            Ok(())
        }
        (FieldKind::Text | FieldKind::Textarea | FieldKind::Tel, _) => {
            Err("must be plain text".to_string())
        }
    }
}

/// Best-effort contact details from the usual field aliases
pub fn extract_contact(form: &FormData) -> ContactInfo {
    ContactInfo {
        name: first_alias(form, NAME_ALIASES),
        email: first_alias(form, EMAIL_ALIASES),
        phone: first_alias(form, PHONE_ALIASES),
    }
}

fn first_alias(form: &FormData, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|alias| form.get(*alias))
        .filter_map(FieldValue::as_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn form_fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("name", "Name", FieldKind::Text).required(),
            FieldDefinition::new("email", "Email", FieldKind::Email).required(),
            FieldDefinition::new("role", "Role", FieldKind::Radio {
                options: vec!["Lead".into(), "Follow".into()],
            }),
            FieldDefinition::new("years", "Years dancing", FieldKind::Number),
            FieldDefinition::new("waiver", "Waiver", FieldKind::Checkbox).required(),
        ]
    }

    #[test]
    fn test_parse_accepts_object_and_encoded_string() {
        let native = json!({"name": "Alice", "email": "a@x.com"});
        let encoded = Value::String(native.to_string());

        assert_eq!(parse_submission(&native).unwrap(), parse_submission(&encoded).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_submission(&json!("{\"name\": \"Alice\"")).unwrap_err();
        assert_matches!(err, EventDeskError::Validation { .. });
        assert!(err.to_string().contains("Malformed form data"));

        assert!(parse_submission(&json!("[1, 2]")).is_err());
        assert!(parse_submission(&json!(42)).is_err());
    }

    #[test]
    fn test_parse_drops_nulls_and_keeps_unknown_keys() {
        let form = parse_submission(&json!({"name": "Bob", "phone": null, "shoeSize": 43})).unwrap();
        assert!(!form.contains_key("phone"));
        assert_eq!(form.get("shoeSize"), Some(&FieldValue::Number(43.0)));
    }

    #[test]
    fn test_validate_lists_every_missing_label() {
        let form = parse_submission(&json!({"name": "  "})).unwrap();
        let err = validate_submission(&form_fields(), &form).unwrap_err();

        assert_eq!(err.fields(), ["Name".to_string(), "Email".to_string(), "Waiver".to_string()]);
        assert!(err.to_string().contains("Missing required fields: Name, Email, Waiver"));
    }

    #[test]
    fn test_validate_checks_value_types() {
        let form = parse_submission(&json!({
            "name": "Carol",
            "email": "not-an-email",
            "role": "Spectator",
            "years": "a few",
            "waiver": true
        }))
        .unwrap();

        let err = validate_submission(&form_fields(), &form).unwrap_err();
        assert_eq!(
            err.fields(),
            ["Email".to_string(), "Role".to_string(), "Years dancing".to_string()]
        );
    }

    #[test]
    fn test_validate_accepts_complete_submission() {
        let form = parse_submission(&json!({
            "name": "Dave",
            "email": "d@x.com",
            "role": "Follow",
            "years": "3",
            "waiver": ["adult"]
        }))
        .unwrap();

        assert!(validate_submission(&form_fields(), &form).is_ok());
    }

    #[test]
    fn test_checkbox_rejects_text_and_numbers() {
        for waiver in [json!("yes"), json!(1)] {
            let form = parse_submission(&json!({"name": "Gus", "email": "g@x.com", "waiver": waiver})).unwrap();
            let err = validate_submission(&form_fields(), &form).unwrap_err();
            assert_eq!(err.fields(), ["Waiver".to_string()]);
            assert!(err.to_string().contains("Waiver must be checked or unchecked"));
        }
    }

    #[test]
    fn test_unchecked_required_checkbox_is_missing() {
        let form = parse_submission(&json!({"name": "Eve", "email": "e@x.com", "waiver": false})).unwrap();
        let err = validate_submission(&form_fields(), &form).unwrap_err();
        assert_eq!(err.fields(), ["Waiver".to_string()]);
    }

    #[test]
    fn test_extract_contact_aliases() {
        let form = parse_submission(&json!({
            "fullName": "Frankie Manning",
            "email": "frankie@savoy.org",
            "phoneNumber": "555-0199"
        }))
        .unwrap();

        let contact = extract_contact(&form);
        assert_eq!(contact.name, "Frankie Manning");
        assert_eq!(contact.email, "frankie@savoy.org");
        assert_eq!(contact.phone, "555-0199");

        let empty = extract_contact(&FormData::new());
        assert_eq!(empty, ContactInfo::default());
    }
}
