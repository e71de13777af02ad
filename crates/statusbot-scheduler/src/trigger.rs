//! Daily trigger — polls the clock and fires at most once per calendar date.
//!
//! Delivery is at-most-once: the date is marked as handled after the job
//! returns, whether it succeeded or not. A missed target minute (severe
//! scheduling delay) is not caught up.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use statusbot_core::error::{Result, StatusBotError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::{Clock, LocalTime};

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Last fired civil date. Blank at startup, lives for the process lifetime.
///
/// Cloning shares the same cell; only [`DailyTrigger`] can write it.
#[derive(Debug, Clone, Default)]
pub struct TriggerState {
    last_fired: Arc<RwLock<Option<NaiveDate>>>,
}

impl TriggerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fired(&self) -> Option<NaiveDate> {
        *self.last_fired.read().unwrap_or_else(|e| e.into_inner())
    }

    fn mark(&self, date: NaiveDate) {
        *self.last_fired.write().unwrap_or_else(|e| e.into_inner()) = Some(date);
    }
}

/// Action run when the trigger fires.
///
/// The job logs its own failures; the trigger only records the outcome.
#[async_trait]
pub trait DailyJob: Send + Sync {
    async fn run(&self) -> Result<()>;
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not the target minute.
    Waiting,
    /// Target minute, but this date was already handled.
    AlreadyFired(NaiveDate),
    /// The job ran for this date.
    Fired { date: NaiveDate, succeeded: bool },
}

/// Fires a [`DailyJob`] once per day at a local hour:minute.
pub struct DailyTrigger<C: Clock> {
    hour: u32,
    minute: u32,
    clock: C,
    state: TriggerState,
    job: Arc<dyn DailyJob>,
    poll_interval: Duration,
}

impl<C: Clock + 'static> DailyTrigger<C> {
    pub fn new(
        hour: u32,
        minute: u32,
        clock: C,
        state: TriggerState,
        job: Arc<dyn DailyJob>,
    ) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(StatusBotError::Config(format!(
                "Invalid trigger time {hour:02}:{minute:02}"
            )));
        }
        Ok(Self {
            hour,
            minute,
            clock,
            state,
            job,
            poll_interval: Duration::from_secs(60),
        })
    }

    /// Override the clock check period. Clamped to at least one second.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                "⚠️ Poll interval {interval:?} is too short, using {MIN_POLL_INTERVAL:?}"
            );
        }
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    fn is_target(&self, now: &LocalTime) -> bool {
        now.hour == self.hour && now.minute == self.minute
    }

    /// Check the clock once and fire if due.
    pub async fn tick(&self) -> TickOutcome {
        let now = self.clock.now();
        if !self.is_target(&now) {
            return TickOutcome::Waiting;
        }
        if self.state.last_fired() == Some(now.date) {
            return TickOutcome::AlreadyFired(now.date);
        }

        tracing::info!("🔔 Daily trigger fired at {now}");
        let succeeded = self.job.run().await.is_ok();
        self.state.mark(now.date);
        tracing::info!(
            "📅 Daily report handled for {} ({:02}:{:02}, delivered: {succeeded})",
            now.date,
            self.hour,
            self.minute
        );

        TickOutcome::Fired {
            date: now.date,
            succeeded,
        }
    }

    /// Spawn the polling loop. The first check runs immediately.
    pub fn start(self) -> JoinHandle<()> {
        tracing::info!(
            "⏰ Daily trigger started: {:02}:{:02} (check every {}s)",
            self.hour,
            self.minute,
            self.poll_interval.as_secs()
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
