//! `/vote <n>`: open a poll on an idea, and record poll votes.

use tracing::info;

use crate::app::AppState;
use crate::models::poll::{Poll, PollView};
use crate::{AppError, Result};

use super::{Attachment, CommandContext, Reply};

/// Error detail used when `/vote` is given no argument.
pub const MISSING_IDEA_NUMBER: &str = "missing idea number";

/// Parse the idea number from `/vote` arguments (first token only).
///
/// # Errors
///
/// Returns `AppError::Validation` when the number is missing or not an
/// integer, and `AppError::NotFound` when it is below 1 or too large to be
/// any idea's position.
pub fn parse_position(args: &str) -> Result<usize> {
    let token = args
        .split_whitespace()
        .next()
        .ok_or_else(|| AppError::Validation(MISSING_IDEA_NUMBER.into()))?;
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!("{token:?} is not a number")));
    }
    let not_found = || AppError::NotFound(format!("idea {token}"));
    if token.starts_with('-') {
        return Err(not_found());
    }
    digits
        .parse::<usize>()
        .ok()
        .filter(|position| *position >= 1)
        .ok_or_else(not_found)
}

/// Open a poll on the idea at the given position.
///
/// # Errors
///
/// Returns `AppError::Validation` for a malformed number,
/// `AppError::NotFound` for an unknown idea, plus store failures.
pub async fn start_poll(state: &AppState, ctx: &CommandContext, args: &str) -> Result<Reply> {
    let position = parse_position(args)?;
    let idea = state
        .stores
        .for_channel(&ctx.channel_id)
        .idea_at(position)
        .await?;

    let poll = Poll::for_idea(ctx.channel_id.clone(), &idea.text);
    let view = poll.view();
    info!(poll_id = poll.id, channel_id = ctx.channel_id, position, "poll opened");
    let evicted = state.polls.lock().await.insert(poll);
    if !evicted.is_empty() {
        info!(?evicted, "oldest polls closed");
    }

    Ok(Reply::in_channel(view.question.clone()).with_attachment(Attachment::Poll(view)))
}

/// Record `user_id`'s vote and return the updated poll.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown poll (e.g. opened before a
/// restart) and `AppError::Validation` for an invalid option.
pub async fn cast_vote(
    state: &AppState,
    poll_id: &str,
    option: usize,
    user_id: &str,
) -> Result<PollView> {
    let mut polls = state.polls.lock().await;
    let poll = polls
        .get_mut(poll_id)
        .ok_or_else(|| AppError::NotFound(format!("poll {poll_id}")))?;
    poll.cast(user_id, option)?;
    info!(poll_id, option, user_id, voters = poll.voter_count(), "vote recorded");
    Ok(poll.view())
}
