//! One-shot, in-process reminder timers.
//!
//! Each accepted reminder gets its own timer task that sleeps until the
//! firing instant, emits exactly one [`ReminderEvent::Fired`] on the event
//! channel, and exits. Tasks are not persisted: a restart drops every
//! pending reminder. There is no per-reminder cancellation; the shared
//! [`CancellationToken`] only stops all timers at shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, LocalResult, TimeZone};
use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::clock::Clock;
use crate::models::reminder::{ReminderEvent, ReminderTask, ReminderTime, ScheduledReminder};
use crate::{AppError, Result};

/// Marker carried by the `Validation` error for a local time skipped by a
/// clock change.
pub const NONEXISTENT_TIME: &str = "does not exist today";

/// Schedules same-day reminders and delivers them on an event channel.
pub struct ReminderScheduler {
    tz: Tz,
    clock: Arc<dyn Clock>,
    event_tx: mpsc::Sender<ReminderEvent>,
    cancel: CancellationToken,
    pending: Arc<AtomicUsize>,
}

impl ReminderScheduler {
    /// Construct a scheduler whose timers stop when `cancel` fires.
    #[must_use]
    pub fn new(
        tz: Tz,
        clock: Arc<dyn Clock>,
        event_tx: mpsc::Sender<ReminderEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tz,
            clock,
            event_tx,
            cancel,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of reminders registered but not yet fired.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Schedule a reminder for `time` today in the configured zone.
    ///
    /// Returns immediately; delivery happens on the timer task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PastTime` if `time` is not strictly later than now,
    /// or `AppError::Validation` if `time` does not exist today (DST gap).
    pub fn schedule(
        &self,
        time: ReminderTime,
        payload: &str,
        destination: &str,
    ) -> Result<ScheduledReminder> {
        let fire_at = self.resolve_today(time)?;
        self.schedule_at(fire_at, payload, destination)
    }

    /// Schedule a reminder at an absolute instant.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PastTime` if `fire_at` is not strictly later than now.
    pub fn schedule_at(
        &self,
        fire_at: DateTime<Tz>,
        payload: &str,
        destination: &str,
    ) -> Result<ScheduledReminder> {
        let now = self.clock.now();
        let delay = (fire_at.clone().with_timezone(&chrono::Utc) - now)
            .to_std()
            .ok()
            .filter(|delay| !delay.is_zero())
            .ok_or_else(|| {
                AppError::PastTime(format!("{} is not later than now", fire_at.format("%H:%M")))
            })?;

        let task = ReminderTask {
            fire_at: fire_at.clone(),
            payload: payload.to_owned(),
            destination: destination.to_owned(),
        };
        let confirmation = ScheduledReminder {
            time_label: fire_at.format("%H:%M").to_string(),
            payload: task.payload.clone(),
            fire_at,
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        info!(
            destination,
            fire_at = %task.fire_at,
            delay_secs = delay.as_secs(),
            "reminder scheduled"
        );

        tokio::spawn(
            Self::run(
                task,
                delay,
                self.event_tx.clone(),
                self.cancel.clone(),
                Arc::clone(&self.pending),
            )
            .instrument(info_span!("reminder_timer")),
        );

        Ok(confirmation)
    }

    fn resolve_today(&self, time: ReminderTime) -> Result<DateTime<Tz>> {
        let today = self.clock.now().with_timezone(&self.tz).date_naive();
        let naive = today
            .and_hms_opt(time.hour(), time.minute(), 0)
            .ok_or_else(|| AppError::Validation(format!("invalid time {time}")))?;
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(at) => Ok(at),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => Err(AppError::Validation(format!(
                "{time} {NONEXISTENT_TIME} in {}",
                self.tz
            ))),
        }
    }

    async fn run(
        task: ReminderTask,
        delay: std::time::Duration,
        event_tx: mpsc::Sender<ReminderEvent>,
        cancel: CancellationToken,
        pending: Arc<AtomicUsize>,
    ) {
        let fired = tokio::select! {
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        };
        pending.fetch_sub(1, Ordering::SeqCst);

        if !fired {
            debug!(destination = task.destination, "reminder dropped at shutdown");
            return;
        }

        info!(destination = task.destination, "reminder fired");
        let event = ReminderEvent::Fired {
            destination: task.destination,
            payload: task.payload,
        };
        if let Err(err) = event_tx.send(event).await {
            warn!(%err, "reminder event channel closed; reminder lost");
        }
    }
}
