//! `/duty`: rotate the duty roster.

use tracing::info;

use crate::app::AppState;
use crate::Result;

use super::{CommandContext, Reply};

/// Announce the next person on duty.
///
/// # Errors
///
/// Returns `AppError::Config` for an empty roster, plus store failures.
pub async fn next_duty(state: &AppState, ctx: &CommandContext) -> Result<Reply> {
    let assignment = state
        .stores
        .for_channel(&ctx.channel_id)
        .next_duty_person(&state.config.duty_roster)
        .await?;
    info!(channel_id = ctx.channel_id, person = assignment.person, "duty assigned");
    Ok(Reply::in_channel(format!(
        "🫡 On duty this week: {}\n(they ping everyone and gather the plan 😄)",
        assignment.person
    )))
}
