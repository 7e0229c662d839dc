//! `/remind HH:MM <text>`: same-day reminder.

use std::sync::LazyLock;

use regex::Regex;

use crate::app::AppState;
use crate::models::reminder::ReminderTime;
use crate::{AppError, Result};

use super::{CommandContext, Reply};

static REMIND_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}:\d{2})\s+(.+)$"));

/// Split `/remind` arguments into a time of day and the reminder text.
///
/// # Errors
///
/// Returns `AppError::Validation` if the arguments do not match
/// `HH:MM text` or the time is out of range.
pub fn parse_args(args: &str) -> Result<(ReminderTime, String)> {
    let pattern = REMIND_PATTERN
        .as_ref()
        .map_err(|err| AppError::Config(format!("reminder pattern: {err}")))?;
    let raw = args.trim();
    let captures = pattern
        .captures(raw)
        .ok_or_else(|| AppError::Validation(format!("expected HH:MM text, got {raw:?}")))?;

    let time: ReminderTime = captures[1].parse()?;
    let text = captures[2].trim().to_owned();
    Ok((time, text))
}

/// Schedule a reminder for later today in the caller's channel.
///
/// # Errors
///
/// Returns `AppError::Validation` for malformed input and
/// `AppError::PastTime` when the time has already passed today.
pub fn set_reminder(state: &AppState, ctx: &CommandContext, args: &str) -> Result<Reply> {
    let (time, text) = parse_args(args)?;
    let scheduled = state.scheduler.schedule(time, &text, &ctx.channel_id)?;
    Ok(Reply::in_channel(format!(
        "✅ OK, I'll remind you at {}: {}",
        scheduled.time_label, scheduled.payload
    )))
}
