//! Same-day reminder types.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::{AppError, Result};

/// Wall-clock time of day in `HH:MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReminderTime {
    hour: u32,
    minute: u32,
}

impl ReminderTime {
    /// Build a time of day, rejecting out-of-range components.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when `hour > 23` or `minute > 59`.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(AppError::Validation(format!(
                "time {hour}:{minute:02} is out of range"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Hour component in `[0, 23]`.
    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    /// Minute component in `[0, 59]`.
    #[must_use]
    pub fn minute(self) -> u32 {
        self.minute
    }
}

impl FromStr for ReminderTime {
    type Err = AppError;

    /// Accepts `H:MM` or `HH:MM`.
    fn from_str(raw: &str) -> Result<Self> {
        let malformed = || AppError::Validation(format!("expected HH:MM, got {raw:?}"));
        let (hour, minute) = raw.trim().split_once(':').ok_or_else(malformed)?;
        let digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
            return Err(malformed());
        }
        let hour = hour.parse().map_err(|_| malformed())?;
        let minute = minute.parse().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl Display for ReminderTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A registered one-shot reminder; lives only in process memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTask {
    /// Absolute firing instant in the configured zone.
    pub fire_at: DateTime<Tz>,
    /// Message text to deliver.
    pub payload: String,
    /// Target channel identifier.
    pub destination: String,
}

/// Confirmation returned by a successful schedule call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    /// Normalized `HH:MM` label of the firing time.
    pub time_label: String,
    /// Message text that will be delivered.
    pub payload: String,
    /// Absolute firing instant.
    pub fire_at: DateTime<Tz>,
}

/// Events emitted by the reminder scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderEvent {
    /// A reminder reached its firing time.
    Fired {
        /// Channel the reminder was created in.
        destination: String,
        /// Reminder text.
        payload: String,
    },
}
