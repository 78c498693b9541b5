// Progress Reporter
// Time-driven completion estimate; it knows nothing about real adapter progress
// and must never gate a correctness decision.

use crate::application::constants::{
    PROGRESS_CAP, PROGRESS_DONE, PROGRESS_INTERVAL, PROGRESS_STEP,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Ticker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    pub step: u8,
    pub interval: Duration,
    pub cap: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            step: PROGRESS_STEP,
            interval: PROGRESS_INTERVAL,
            cap: PROGRESS_CAP,
        }
    }
}

/// Starts progress tickers
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressReporter {
    config: ProgressConfig,
}

impl ProgressReporter {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    /// Start a ticker at 0 on the current tokio runtime
    pub fn start(&self) -> ProgressHandle {
        let (tx, _rx) = watch::channel(0u8);
        let tx = Arc::new(tx);
        let config = self.config;

        let ticker_tx = Arc::clone(&tx);
        let ticker = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + config.interval, config.interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                // Never lowers the value, and never touches it once it is at or past the cap
                let capped = !ticker_tx.send_if_modified(|value| {
                    if *value >= config.cap {
                        return false;
                    }
                    *value = value.saturating_add(config.step).min(config.cap);
                    true
                });
                if capped {
                    break;
                }
            }
        });

        ProgressHandle {
            tx,
            ticker: Some(ticker),
        }
    }
}

/// Live progress of one job
pub struct ProgressHandle {
    tx: Arc<watch::Sender<u8>>,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressHandle {
    /// Current percentage (poll delivery)
    pub fn current(&self) -> u8 {
        *self.tx.borrow()
    }

    /// Change notifications (push delivery)
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }

    /// Halt the ticker and force 100
    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            self.tx.send_replace(PROGRESS_DONE);
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.finish();
    }
}
