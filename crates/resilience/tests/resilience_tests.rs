//! Integration tests for resilience patterns

use resonance_resilience::{CoalescingWriter, CoalescingWriterBuilder, ResilienceError, RetryPolicy};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Name,
    Avatar,
}

type Store = Arc<Mutex<HashMap<Field, String>>>;

fn settings_writer(store: Store, flaky: Arc<AtomicBool>) -> CoalescingWriter<Field, String> {
    CoalescingWriterBuilder::new(Duration::from_millis(1000))
        .idle_for(Field::Avatar, Duration::from_millis(500))
        .retry(RetryPolicy::new(2).with_initial_delay(Duration::from_millis(50)))
        .build(move |field, value| {
            let store = Arc::clone(&store);
            let fail_once = flaky.swap(false, Ordering::SeqCst);
            async move {
                if fail_once {
                    return Err("connection reset".to_string());
                }
                store.lock().unwrap().insert(field, value);
                Ok(())
            }
        })
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_saves_final_text_once() {
    let store: Store = Arc::default();
    let writer = settings_writer(Arc::clone(&store), Arc::new(AtomicBool::new(false)));

    for prefix in ["S", "Sa", "Sam"] {
        writer.write(Field::Name, prefix.to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert!(store.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(store.lock().unwrap().get(&Field::Name).map(String::as_str), Some("Sam"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_recovers_through_retry() {
    let store: Store = Arc::default();
    let writer = settings_writer(Arc::clone(&store), Arc::new(AtomicBool::new(true)));

    writer.write(Field::Avatar, "avatar.png".to_string());
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(
        store.lock().unwrap().get(&Field::Avatar).map(String::as_str),
        Some("avatar.png")
    );
    assert!(writer.take_failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flush_reports_failure() {
    let writer: CoalescingWriter<Field, String> =
        CoalescingWriterBuilder::new(Duration::from_secs(10))
            .build(|_field, _value| async { Err::<(), _>("read-only database") });

    writer.write(Field::Name, "Sam".to_string());
    let result = writer.flush_all().await;

    assert!(matches!(result, Err(ResilienceError::FlushFailed { .. })));
    assert_eq!(writer.pending_count(), 0);
}
