//! Optional periodic heartbeat driven by the control loop.

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Optional periodic task owned by the control loop.
///
/// Every arming builds a fresh interval whose first tick lands one full
/// period later, so a pause never leaves a half-elapsed period behind.
#[derive(Debug)]
pub(crate) struct Ticker {
    period: Option<Duration>,
    interval: Option<Interval>,
    ticks: u64,
}

impl Ticker {
    pub(crate) fn new(period: Option<Duration>) -> Self {
        Self {
            period: period.filter(|period| !period.is_zero()),
            interval: None,
            ticks: 0,
        }
    }

    pub(crate) fn arm(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub(crate) fn disarm(&mut self) {
        self.interval = None;
    }

    pub(crate) const fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Resolves at the next tick; never resolves while disarmed.
    pub(crate) async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }

    /// Counts a completed periodic action and returns the running total.
    pub(crate) const fn record(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }
}
