//! Integration tests for the endpoint handlers and their response envelopes

mod helpers;

use http::StatusCode;
use serde_json::json;

use eventdesk::handlers::events::EventHandlers;
use eventdesk::handlers::registrations::{
    ListRegistrationsParams, RegistrationHandlers, SubmitRegistrationBody, UpdateStatusBody,
};
use eventdesk::models::{CreateEventRequest, EventFilter, FieldDefinition, FieldKind};
use eventdesk::ErrorKind;
use helpers::*;

fn handlers() -> (EventHandlers, RegistrationHandlers) {
    let services = memory_services();
    (EventHandlers::new(services.clone()), RegistrationHandlers::new(services))
}

fn body(value: serde_json::Value) -> SubmitRegistrationBody {
    serde_json::from_value(value).expect("valid submit body")
}

#[tokio::test]
async fn test_submit_status_codes() {
    let (events, registrations) = handlers();
    let event = events.create(capped_event("Swing out", 1)).await;
    assert_eq!(event.status, StatusCode::CREATED);
    let event_id = event.body.data.unwrap().id;

    let created = registrations
        .submit(event_id, body(json!({ "formData": { "name": "Alice", "email": "a@x.com" } })))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert!(created.is_success());

    let full = registrations
        .submit(event_id, body(json!({ "formData": { "name": "Bob", "email": "b@x.com" } })))
        .await;
    assert_eq!(full.status, StatusCode::CONFLICT);
    assert_eq!(full.body.kind, Some(ErrorKind::CapacityExceeded));

    let missing = registrations.submit(event_id + 100, body(json!({ "formData": {} }))).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_validation_envelope() {
    let (events, registrations) = handlers();
    let event_id = events.create(capped_event("Swing out", 5)).await.body.data.unwrap().id;

    let invalid = registrations.submit(event_id, body(json!({ "formData": { "name": "" } }))).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body.errors, vec!["Name".to_string(), "Email".to_string()]);

    let malformed = registrations
        .submit(event_id, body(json!({ "formData": "{not json" })))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert!(malformed.body.message.unwrap().contains("Malformed"));

    let encoded = registrations
        .submit(
            event_id,
            body(json!({ "formData": "{\"name\":\"Alice\",\"email\":\"a@x.com\"}" })),
        )
        .await;
    assert_eq!(encoded.status, StatusCode::CREATED);

    let rendered = serde_json::to_value(&encoded.body).unwrap();
    assert_eq!(rendered["success"], true);
    assert_eq!(rendered["data"]["status"], "pending");
    assert_eq!(rendered["data"]["formData"]["name"], "Alice");
    assert_eq!(rendered["data"]["contactInfo"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_status_update_and_delete() {
    let (events, registrations) = handlers();
    let event_id = events.create(capped_event("Swing out", 5)).await.body.data.unwrap().id;
    let registration_id = registrations
        .submit(event_id, body(json!({ "formData": { "name": "Alice", "email": "a@x.com" } })))
        .await
        .body
        .data
        .unwrap()
        .id;

    let invalid = registrations
        .update_status(registration_id, UpdateStatusBody { status: "done".to_string() })
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let missing = registrations
        .update_status(registration_id + 1, UpdateStatusBody { status: "confirmed".to_string() })
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let confirmed = registrations
        .update_status(registration_id, UpdateStatusBody { status: "confirmed".to_string() })
        .await;
    assert_eq!(confirmed.status, StatusCode::OK);

    let stats = registrations.stats(event_id).await.body.data.unwrap();
    assert_eq!((stats.total, stats.confirmed), (1, 1));

    assert_eq!(registrations.delete(registration_id).await.status, StatusCode::OK);
    assert_eq!(registrations.delete(registration_id).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        events.get(event_id).await.body.data.unwrap().current_participants,
        0
    );
}

#[tokio::test]
async fn test_list_endpoint() {
    let (events, registrations) = handlers();
    let event_id = events.create(capped_event("Swing out", 5)).await.body.data.unwrap().id;
    for name in ["Alice", "Bob"] {
        registrations
            .submit(
                event_id,
                body(json!({ "formData": { "name": name, "email": "x@x.com", "shoeSize": 42 } })),
            )
            .await;
    }

    let page = registrations
        .list(event_id, ListRegistrationsParams { status: Some("pending".into()), ..Default::default() })
        .await;
    assert_eq!(page.status, StatusCode::OK);
    let page = page.body.data.unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|r| r.form_data.contains_key("shoeSize")));

    let bad_filter = registrations
        .list(event_id, ListRegistrationsParams { status: Some("gone".into()), ..Default::default() })
        .await;
    assert_eq!(bad_filter.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_endpoints() {
    let (events, _) = handlers();

    let invalid = events
        .create(CreateEventRequest::new("Broken").with_fields(vec![
            FieldDefinition::new("a", "A", FieldKind::Text),
            FieldDefinition::new("a", "A again", FieldKind::Text),
        ]))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let event_id = events.create(CreateEventRequest::new("Open air")).await.body.data.unwrap().id;
    let replaced = events
        .replace_fields(event_id, vec![FieldDefinition::new("email", "Email", FieldKind::Email).required()])
        .await;
    assert_eq!(replaced.body.data.unwrap().fields.len(), 1);

    let listed = events.list(EventFilter::default()).await.body.data.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(events.get(event_id + 1).await.status, StatusCode::NOT_FOUND);
}
