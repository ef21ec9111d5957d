use cuecut_core::TimeUs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{PreviewError, Result};

/// Wall-clock driven playhead for full-timeline playback.
///
/// One ticker task at most. It publishes the elapsed time on a watch channel
/// every tick and stops by itself at the end of the timeline.
pub struct PlaybackClock {
    tick: Duration,
    tx: Arc<watch::Sender<TimeUs>>,
    running: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackClock {
    pub fn new(tick: Duration) -> Self {
        let (tx, _rx) = watch::channel(TimeUs::ZERO);
        Self {
            tick: tick.max(Duration::from_millis(1)),
            tx: Arc::new(tx),
            running: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Start playback from zero. Returns `Ok(false)` without spawning anything
    /// when already running.
    pub fn start(&self, total_duration: TimeUs) -> Result<bool> {
        if total_duration <= TimeUs::ZERO {
            return Err(PreviewError::NothingToPlay);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PreviewError::NoRuntime)?;

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        self.tx.send_replace(TimeUs::ZERO);
        let tx = Arc::clone(&self.tx);
        let running = Arc::clone(&self.running);
        let tick = self.tick;
        let started = Instant::now();

        *task = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let elapsed = TimeUs(started.elapsed().as_micros() as i64);
                if elapsed >= total_duration {
                    tx.send_replace(total_duration);
                    running.store(false, Ordering::SeqCst);
                    tracing::info!("playback reached the end");
                    break;
                }
                tx.send_replace(elapsed);
            }
        }));
        tracing::info!(total = %total_duration, "playback started");
        Ok(true)
    }

    /// Cancel the ticker. The last published time stays readable.
    pub fn stop(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::info!(at = %self.current_time(), "playback stopped");
        }
    }

    /// Start when stopped, stop when running. Returns whether the clock is
    /// running afterwards.
    pub fn toggle(&self, total_duration: TimeUs) -> Result<bool> {
        if self.is_running() {
            self.stop();
            Ok(false)
        } else {
            self.start(total_duration)?;
            Ok(true)
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn current_time(&self) -> TimeUs {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimeUs> {
        self.tx.subscribe()
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}
