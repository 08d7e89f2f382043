//! Coalescing writes: keep only the latest value per key and flush it once
//! input has been idle for a while.

use crate::error::{ResilienceError, ResilienceResult};
use crate::retry::{with_retry, RetryPolicy};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

type FlushFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
type FlushFn<K, V> = Box<dyn Fn(K, V) -> FlushFuture + Send + Sync>;

struct Pending<V> {
    value: V,
    generation: u64,
    task: JoinHandle<()>,
}

struct State<K, V> {
    pending: HashMap<K, Pending<V>>,
    generation: u64,
}

struct Shared<K, V> {
    state: Mutex<State<K, V>>,
    failures: Mutex<Vec<ResilienceError>>,
    // Flushes run one at a time; holding this also waits out an in-flight flush
    gate: tokio::sync::Mutex<()>,
    flush: FlushFn<K, V>,
    idle: Duration,
    idle_overrides: HashMap<K, Duration>,
    retry: RetryPolicy,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn lock_state(&self) -> MutexGuard<'_, State<K, V>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn idle_for(&self, key: &K) -> Duration {
        self.idle_overrides.get(key).copied().unwrap_or(self.idle)
    }

    async fn flush_one(&self, key: K, value: V) -> ResilienceResult<()> {
        let _gate = self.gate.lock().await;
        log::debug!("Flushing coalesced write for {:?}", key);

        let flush = &self.flush;
        with_retry(&self.retry, || flush(key.clone(), value.clone()))
            .await
            .map_err(|e| ResilienceError::FlushFailed {
                key: format!("{:?}", key),
                message: e.to_string(),
            })
    }

    fn record_failure(&self, error: ResilienceError) {
        log::error!("{}", error);
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error);
    }
}

/// Builder for [`CoalescingWriter`]
pub struct CoalescingWriterBuilder<K> {
    idle: Duration,
    idle_overrides: HashMap<K, Duration>,
    retry: RetryPolicy,
}

impl<K> CoalescingWriterBuilder<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Starts building a writer that flushes after `idle` without new input
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            idle_overrides: HashMap::new(),
            retry: RetryPolicy::no_retry(),
        }
    }

    /// Uses a different idle interval for one key
    pub fn idle_for(mut self, key: K, idle: Duration) -> Self {
        self.idle_overrides.insert(key, idle);
        self
    }

    /// Sets how failed flushes are retried
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Finishes the writer with the function that persists one value
    pub fn build<V, F, Fut, E>(self, flush: F) -> CoalescingWriter<K, V>
    where
        V: Clone + Send + Sync + 'static,
        F: Fn(K, V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display,
    {
        let flush: FlushFn<K, V> = Box::new(move |key, value| {
            let fut = flush(key, value);
            Box::pin(async move { fut.await.map_err(|e| e.to_string()) })
        });

        CoalescingWriter {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    pending: HashMap::new(),
                    generation: 0,
                }),
                failures: Mutex::new(Vec::new()),
                gate: tokio::sync::Mutex::new(()),
                flush,
                idle: self.idle,
                idle_overrides: self.idle_overrides,
                retry: self.retry,
            }),
        }
    }
}

/// Buffers the latest value per key and writes it after an idle interval.
///
/// Each new value for a key replaces the buffered one and restarts that key's
/// timer. Keys flush independently. Must be used inside a tokio runtime.
pub struct CoalescingWriter<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for CoalescingWriter<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> CoalescingWriter<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Buffers `value` for `key`, cancelling the pending flush of an older value
    pub fn write(&self, key: K, value: V) {
        let delay = self.shared.idle_for(&key);
        let mut state = self.shared.lock_state();
        state.generation += 1;
        let generation = state.generation;

        let shared = Arc::clone(&self.shared);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let value = {
                let mut state = shared.lock_state();
                match state.pending.get(&task_key) {
                    Some(p) if p.generation == generation => {
                        state.pending.remove(&task_key).map(|p| p.value)
                    }
                    _ => None,
                }
            };

            if let Some(value) = value {
                if let Err(e) = shared.flush_one(task_key, value).await {
                    shared.record_failure(e);
                }
            }
        });

        if let Some(previous) = state.pending.insert(
            key,
            Pending {
                value,
                generation,
                task,
            },
        ) {
            previous.task.abort();
        }
    }

    /// Drops the buffered value for `key` without writing it
    pub fn cancel(&self, key: &K) -> bool {
        match self.shared.lock_state().pending.remove(key) {
            Some(pending) => {
                pending.task.abort();
                true
            }
            None => false,
        }
    }

    /// Number of keys with a buffered value
    pub fn pending_count(&self) -> usize {
        self.shared.lock_state().pending.len()
    }

    /// Writes every buffered value now and waits for in-flight flushes.
    ///
    /// Returns the first failure; every key is still attempted.
    pub async fn flush_all(&self) -> ResilienceResult<()> {
        let drained: Vec<(K, V)> = {
            let mut state = self.shared.lock_state();
            state
                .pending
                .drain()
                .map(|(key, pending)| {
                    pending.task.abort();
                    (key, pending.value)
                })
                .collect()
        };

        let mut first_error = None;
        for (key, value) in drained {
            if let Err(e) = self.shared.flush_one(key, value).await {
                log::error!("{}", e);
                first_error.get_or_insert(e);
            }
        }

        drop(self.shared.gate.lock().await);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Takes the failures of background flushes recorded so far
    pub fn take_failures(&self) -> Vec<ResilienceError> {
        std::mem::take(&mut *self.shared.failures.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<(&'static str, u32)>>>;

    fn recording_writer(builder: CoalescingWriterBuilder<&'static str>) -> (CoalescingWriter<&'static str, u32>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let writer = builder.build(move |key, value| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((key, value));
                Ok::<_, String>(())
            }
        });
        (writer, log)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_writes_collapse_into_latest() {
        let (writer, log) = recording_writer(CoalescingWriterBuilder::new(Duration::from_millis(1000)));

        writer.write("name", 1);
        sleep_ms(500).await;
        writer.write("name", 2);
        writer.write("name", 3);
        assert_eq!(writer.pending_count(), 1);

        sleep_ms(900).await;
        assert!(log.lock().unwrap().is_empty());

        sleep_ms(200).await;
        assert_eq!(*log.lock().unwrap(), vec![("name", 3)]);
        assert_eq!(writer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_flush_independently_with_own_intervals() {
        let (writer, log) = recording_writer(
            CoalescingWriterBuilder::new(Duration::from_millis(1000))
                .idle_for("avatar", Duration::from_millis(500)),
        );

        writer.write("name", 1);
        writer.write("avatar", 7);

        sleep_ms(600).await;
        assert_eq!(*log.lock().unwrap(), vec![("avatar", 7)]);

        sleep_ms(500).await;
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_all_writes_immediately_and_once() {
        let (writer, log) = recording_writer(CoalescingWriterBuilder::new(Duration::from_millis(1000)));

        writer.write("name", 1);
        writer.write("theme", 2);
        writer.flush_all().await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(writer.pending_count(), 0);

        sleep_ms(2000).await;
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending_value() {
        let (writer, log) = recording_writer(CoalescingWriterBuilder::new(Duration::from_millis(100)));

        writer.write("name", 1);
        assert!(writer.cancel(&"name"));
        assert!(!writer.cancel(&"name"));

        sleep_ms(500).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let writer: CoalescingWriter<&'static str, u32> = CoalescingWriterBuilder::new(Duration::from_millis(100))
            .retry(RetryPolicy::new(3).with_initial_delay(Duration::from_millis(10)))
            .build(move |_key, _value| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("database is locked".to_string())
                    } else {
                        Ok(())
                    }
                }
            });

        writer.write("name", 1);
        sleep_ms(1000).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(writer.take_failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_flush_is_recorded() {
        let writer: CoalescingWriter<&'static str, u32> = CoalescingWriterBuilder::new(Duration::from_millis(100))
            .build(|_key, _value| async { Err::<(), _>("disk full") });

        writer.write("name", 1);
        sleep_ms(500).await;

        let failures = writer.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], ResilienceError::FlushFailed { .. }));
        assert!(writer.take_failures().is_empty());
    }
}
