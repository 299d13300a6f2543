//! Capacity invariants under concurrency and arbitrary reserve/release sequences

mod helpers;

use std::sync::Arc;

use futures::future::join_all;
use proptest::prelude::*;

use eventdesk::database::{EventStore, MemoryStore};
use eventdesk::models::{default_fields, EventStatus, NewEvent};
use eventdesk::{CapacityTracker, EventDeskError};
use helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_never_overbook() {
    let services = memory_services();
    let capacity = 5;
    let extra = 11;
    let event = services.catalog.create(capped_event("Sold-out gala", capacity)).await.unwrap();
    let event_id = event.id;

    let attempts = (0..capacity + extra).map(|i| {
        let services = services.clone();
        tokio::spawn(async move {
            services
                .intake
                .submit(event_id, &submission(&format!("Dancer {}", i), &format!("d{}@x.com", i)))
                .await
        })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(EventDeskError::CapacityExceeded { .. })))
        .count();

    assert_eq!(successes, capacity as usize);
    assert_eq!(rejected, extra as usize);
    assert_eq!(current_participants(&services, event.id).await, capacity);

    let stats = services.statistics.stats_for(event.id).await.unwrap();
    assert_eq!(stats.total, i64::from(capacity));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resync_during_submissions_never_overbooks() {
    let services = memory_services();
    let capacity = 3;
    let event = services.catalog.create(capped_event("Midnight stroll", capacity)).await.unwrap();
    let event_id = event.id;

    let submits: Vec<_> = (0..24)
        .map(|i| {
            let services = services.clone();
            tokio::spawn(async move {
                services
                    .intake
                    .submit(event_id, &submission(&format!("Dancer {}", i), &format!("d{}@x.com", i)))
                    .await
            })
        })
        .collect();
    let resyncs: Vec<_> = (0..24)
        .map(|_| {
            let services = services.clone();
            tokio::spawn(async move { services.capacity.resync(event_id).await })
        })
        .collect();

    let successes = join_all(submits)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();
    for resynced in join_all(resyncs).await {
        let current = resynced.expect("resync task panicked").unwrap();
        assert!(current <= capacity);
    }

    assert_eq!(successes, capacity as usize);
    let stats = services.statistics.stats_for(event_id).await.unwrap();
    assert_eq!(stats.active(), i64::from(capacity));
    assert_eq!(current_participants(&services, event_id).await, capacity);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancel_and_delete_release_once() {
    let services = memory_services();
    let event = services.catalog.create(capped_event("Late night jam", 3)).await.unwrap();
    let registration_id = services
        .intake
        .submit(event.id, &submission("Alice", "a@x.com"))
        .await
        .unwrap()
        .id;
    services.intake.submit(event.id, &submission("Bob", "b@x.com")).await.unwrap();

    let cancel = {
        let services = services.clone();
        tokio::spawn(async move { services.lifecycle.cancel(registration_id).await })
    };
    let delete = {
        let services = services.clone();
        tokio::spawn(async move { services.lifecycle.delete(registration_id).await })
    };
    let _ = cancel.await.expect("cancel task panicked");
    delete
        .await
        .expect("delete task panicked")
        .expect("delete should find the registration");

    // Only Bob still holds a slot, whichever call won.
    assert_eq!(current_participants(&services, event.id).await, 1);
}

fn store_event(max: i32) -> NewEvent {
    NewEvent {
        title: "Property event".to_string(),
        description: None,
        fields: default_fields(),
        max_participants: Some(max),
        registration_deadline: None,
        status: EventStatus::Published,
    }
}

proptest! {
    #[test]
    fn prop_counter_stays_within_bounds(
        ops in prop::collection::vec(any::<bool>(), 0..80),
        max in 1i32..8,
    ) {
        tokio_test::block_on(async {
            let store = Arc::new(MemoryStore::new());
            let event = store.insert_event(store_event(max)).await.unwrap();
            let tracker = CapacityTracker::new(store.clone(), store.clone());
            let mut expected = 0i32;

            for reserve in ops {
                if reserve {
                    match tracker.try_reserve(event.id).await {
                        Ok(current) => {
                            expected += 1;
                            assert_eq!(current, expected);
                        }
                        Err(EventDeskError::CapacityExceeded { .. }) => assert_eq!(expected, max),
                        Err(other) => panic!("unexpected error: {}", other),
                    }
                } else {
                    let current = tracker.release(event.id).await.unwrap();
                    expected = (expected - 1).max(0);
                    assert_eq!(current, expected);
                }

                let stored = store.find_event(event.id).await.unwrap().unwrap();
                assert!(stored.current_participants >= 0);
                assert!(stored.current_participants <= max);
            }
        });
    }
}
