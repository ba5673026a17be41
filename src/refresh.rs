//! Background refresh loop: fetch, accumulate, publish, repeat.
//!
//! A [`Refresher`] owns the accumulated table and runs every cycle to completion before
//! waiting for the next timer tick or manual trigger, so cycles never overlap. The UI side
//! only holds a [`RefreshHandle`] and reads the latest published [`RefreshState`].

use crate::error::HumidityError;
use crate::fetch::ReadingSource;
use crate::frame::humidity_frame::HumidityFrame;
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// What the refresh loop has published so far.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    /// The accumulated table, `None` until the first successful cycle.
    pub frame: Option<HumidityFrame>,
    pub last_success: Option<DateTime<Local>>,
    /// Description of the most recent failure, cleared by the next successful cycle.
    pub last_error: Option<String>,
    pub completed_cycles: u64,
    pub failed_cycles: u64,
}

/// UI-side handle of a running [`Refresher`].
///
/// Dropping every handle stops the loop after its current cycle.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    state: watch::Receiver<RefreshState>,
    trigger: Arc<Notify>,
}

impl RefreshHandle {
    /// Asks the loop to run a cycle now instead of waiting for the timer.
    pub fn refresh_now(&self) {
        self.trigger.notify_one();
    }

    /// Returns the latest state if it changed since the last call.
    pub fn take_update(&mut self) -> Option<RefreshState> {
        match self.state.has_changed() {
            Ok(true) => Some(self.state.borrow_and_update().clone()),
            _ => None,
        }
    }

    pub fn current(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    /// Waits until the loop publishes a new state. Returns `false` once the loop is gone.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }
}

pub struct Refresher<S: ReadingSource> {
    source: S,
    interval: Duration,
    accumulated: Option<HumidityFrame>,
    state: watch::Sender<RefreshState>,
    trigger: Arc<Notify>,
}

impl<S: ReadingSource> Refresher<S> {
    pub fn new(source: S, interval: Duration) -> (Self, RefreshHandle) {
        let (state, receiver) = watch::channel(RefreshState::default());
        let trigger = Arc::new(Notify::new());
        let refresher = Self {
            source,
            interval: interval.max(MIN_REFRESH_INTERVAL),
            accumulated: None,
            state,
            trigger: trigger.clone(),
        };
        let handle = RefreshHandle {
            state: receiver,
            trigger,
        };
        (refresher, handle)
    }

    /// Runs one fetch → accumulate → publish cycle.
    ///
    /// A failed cycle is logged and recorded in [`RefreshState::last_error`]; the
    /// accumulated table is left as it was.
    pub async fn refresh_once(&mut self) {
        match self.cycle().await {
            Ok(frame) => {
                info!(
                    "Refreshed {} stations, {} timestamps accumulated",
                    frame.height(),
                    frame.reading_count()
                );
                self.accumulated = Some(frame.clone());
                self.state.send_modify(|state| {
                    state.frame = Some(frame);
                    state.last_success = Some(Local::now());
                    state.last_error = None;
                    state.completed_cycles += 1;
                });
            }
            Err(e) => {
                let message = describe(&e);
                warn!("Refresh cycle failed, keeping previous readings: {}", message);
                self.state.send_modify(|state| {
                    state.last_error = Some(message);
                    state.failed_cycles += 1;
                });
            }
        }
    }

    async fn cycle(&self) -> Result<HumidityFrame, HumidityError> {
        let batch = self.source.fetch().await?;
        let incoming = HumidityFrame::from_batch(&batch)?;
        let frame = match &self.accumulated {
            Some(accumulated) => accumulated.accumulate(&incoming)?,
            None => incoming,
        };
        Ok(frame)
    }

    /// Refreshes immediately, then on every interval tick or manual trigger, calling
    /// `on_update` after each cycle. Returns when all [`RefreshHandle`]s are dropped.
    pub async fn run(mut self, on_update: impl Fn() + Send + 'static) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Refreshing every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.trigger.notified() => {
                    debug!("Manual refresh requested");
                    ticker.reset();
                }
                _ = self.state.closed() => {
                    info!("No display left, stopping refresh loop");
                    break;
                }
            }
            self.refresh_once().await;
            on_update();
        }
    }
}

/// Formats an error with its chain of sources, `outer: inner: root`.
fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::error::FetchError;
    use crate::types::reading::ReadingBatch;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    const SAMPLE_0845: &str = include_str!("../data/relative_humidity_0845.json");
    const SAMPLE_0850: &str = include_str!("../data/relative_humidity_0850.json");

    /// Hands out prepared fetch results in order, then fails.
    struct ScriptedSource {
        results: Mutex<VecDeque<Result<ReadingBatch, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<ReadingBatch, FetchError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
            }
        }
    }

    impl ReadingSource for ScriptedSource {
        async fn fetch(&self) -> Result<ReadingBatch, FetchError> {
            let next = self
                .results
                .lock()
                .expect("source lock poisoned")
                .pop_front();
            next.unwrap_or(Err(FetchError::MissingReadings))
        }
    }

    /// Always returns the same batch, taking `delay` to answer the first request.
    struct SlowFirstSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ReadingSource for SlowFirstSource {
        async fn fetch(&self) -> Result<ReadingBatch, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(self.delay).await;
            }
            Ok(batch(SAMPLE_0845))
        }
    }

    fn batch(sample: &str) -> ReadingBatch {
        ReadingBatch::from_payload_bytes(sample.as_bytes()).expect("fixture should parse")
    }

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(10),
            "expected ~{:?}, got {:?}",
            expected,
            elapsed
        );
    }

    fn spawn_loop<S: ReadingSource>(
        refresher: Refresher<S>,
    ) -> (tokio::task::JoinHandle<()>, mpsc::UnboundedReceiver<()>) {
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let task = tokio::spawn(refresher.run(move || {
            let _ = updates_tx.send(());
        }));
        (task, updates)
    }

    #[tokio::test]
    async fn test_cycles_accumulate() {
        let source = ScriptedSource::new(vec![Ok(batch(SAMPLE_0845)), Ok(batch(SAMPLE_0850))]);
        let (mut refresher, mut handle) = Refresher::new(source, Duration::from_secs(300));

        refresher.refresh_once().await;
        let state = handle.take_update().expect("first cycle published");
        assert_eq!(state.frame.as_ref().map(|f| f.reading_count()), Some(1));
        assert_eq!(state.completed_cycles, 1);
        assert!(state.last_success.is_some());

        refresher.refresh_once().await;
        let state = handle.take_update().expect("second cycle published");
        let frame = state.frame.expect("frame present");
        assert_eq!(frame.reading_count(), 2);
        assert_eq!(frame.height(), 6);
        assert!(handle.take_update().is_none());
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_table() {
        let source = ScriptedSource::new(vec![
            Ok(batch(SAMPLE_0845)),
            Err(FetchError::EmptyPayload),
            Ok(batch(SAMPLE_0850)),
        ]);
        let (mut refresher, handle) = Refresher::new(source, Duration::from_secs(300));

        refresher.refresh_once().await;
        refresher.refresh_once().await;
        let state = handle.current();
        assert_eq!(state.frame.as_ref().map(|f| f.reading_count()), Some(1));
        assert_eq!(state.failed_cycles, 1);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Response body contained no JSON document")
        );

        refresher.refresh_once().await;
        let state = handle.current();
        assert_eq!(state.frame.as_ref().map(|f| f.reading_count()), Some(2));
        assert_eq!(state.last_error, None);
        assert_eq!(state.completed_cycles, 2);
    }

    #[tokio::test]
    async fn test_first_cycle_failure_leaves_no_frame() {
        let source = ScriptedSource::new(vec![]);
        let (mut refresher, handle) = Refresher::new(source, Duration::from_secs(300));

        refresher.refresh_once().await;
        let state = handle.current();
        assert!(state.frame.is_none());
        assert_eq!(state.failed_cycles, 1);
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn test_run_refreshes_immediately_and_on_demand() {
        let source = ScriptedSource::new(vec![Ok(batch(SAMPLE_0845)), Ok(batch(SAMPLE_0850))]);
        let (refresher, mut handle) = Refresher::new(source, Duration::from_secs(3600));
        let (task, mut updates) = spawn_loop(refresher);

        updates.recv().await.expect("initial cycle");
        assert_eq!(handle.current().completed_cycles, 1);

        handle.refresh_now();
        updates.recv().await.expect("manual cycle");
        let state = handle.take_update().expect("state published");
        assert_eq!(state.frame.map(|f| f.reading_count()), Some(2));

        drop(handle);
        task.await.expect("refresh loop ends once the handle is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_tick_starts_next_cycle() {
        let source = ScriptedSource::new(vec![Ok(batch(SAMPLE_0845)), Ok(batch(SAMPLE_0850))]);
        let interval = Duration::from_secs(300);
        let (refresher, handle) = Refresher::new(source, interval);
        let start = Instant::now();
        let (task, mut updates) = spawn_loop(refresher);

        updates.recv().await.expect("initial cycle");
        assert_elapsed(start, Duration::ZERO);
        assert_eq!(handle.current().completed_cycles, 1);

        updates.recv().await.expect("timer cycle");
        assert_elapsed(start, interval);
        let state = handle.current();
        assert_eq!(state.completed_cycles, 2);
        assert_eq!(state.frame.map(|f| f.reading_count()), Some(2));

        drop(handle);
        task.await.expect("refresh loop ends once the handle is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_has_one_second_floor() {
        let source = ScriptedSource::new(vec![Ok(batch(SAMPLE_0845)), Ok(batch(SAMPLE_0850))]);
        let (refresher, handle) = Refresher::new(source, Duration::ZERO);
        assert_eq!(refresher.interval, MIN_REFRESH_INTERVAL);
        let start = Instant::now();
        let (task, mut updates) = spawn_loop(refresher);

        updates.recv().await.expect("initial cycle");
        updates.recv().await.expect("timer cycle");
        assert_elapsed(start, MIN_REFRESH_INTERVAL);
        assert_eq!(handle.current().completed_cycles, 2);

        drop(handle);
        task.await.expect("refresh loop ends once the handle is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_are_delayed_not_bursted() {
        let interval = Duration::from_secs(10);
        let source = SlowFirstSource {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(25),
        };
        let (refresher, handle) = Refresher::new(source, interval);
        let start = Instant::now();
        let (task, mut updates) = spawn_loop(refresher);

        // The slow first cycle overruns two ticks; only one catch-up cycle follows it.
        updates.recv().await.expect("slow cycle");
        assert_elapsed(start, Duration::from_secs(25));
        updates.recv().await.expect("catch-up cycle");
        assert_elapsed(start, Duration::from_secs(25));

        // The schedule then restarts from the catch-up tick.
        updates.recv().await.expect("next cycle");
        assert_elapsed(start, Duration::from_secs(35));
        assert_eq!(handle.current().completed_cycles, 3);

        drop(handle);
        task.await.expect("refresh loop ends once the handle is gone");
    }

    #[test]
    fn test_describe_includes_sources() {
        let error = HumidityError::from(FetchError::InvalidTimestamp {
            timestamp: "later".to_string(),
            source: match chrono::DateTime::parse_from_rfc3339("later") {
                Err(e) => e,
                Ok(_) => unreachable!("'later' is not a timestamp"),
            },
        });
        let message = describe(&error);
        assert!(message.starts_with("Reading timestamp 'later' is not valid RFC 3339: "));
    }
}
