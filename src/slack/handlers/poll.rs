//! Poll vote button handler.
//!
//! Records the clicking user's ballot and re-renders the poll message
//! with the updated per-option voters.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackBasicChannelInfo, SlackHistoryMessage, SlackInteractionActionInfo,
};
use tracing::{info, warn};

use crate::app::AppState;
use crate::commands::vote;
use crate::slack::blocks;

/// Option index encoded in a poll vote `action_id`.
#[must_use]
pub fn parse_poll_action(action_id: &str) -> Option<usize> {
    action_id
        .strip_prefix(blocks::POLL_ACTION_PREFIX)?
        .parse()
        .ok()
}

/// Process a single poll vote button press.
///
/// # Arguments
///
/// * `action`: carries `poll_vote_<option>` and the poll id as `value`.
/// * `user_id`: Slack user ID of the voter.
/// * `channel`: channel where the poll message lives.
/// * `message`: the poll message (for `chat.update`).
/// * `state`: shared application state.
///
/// # Errors
///
/// Returns an error string if the action is malformed or the poll is unknown.
pub async fn handle_poll_vote(
    action: &SlackInteractionActionInfo,
    user_id: &str,
    channel: Option<&SlackBasicChannelInfo>,
    message: Option<&SlackHistoryMessage>,
    state: &Arc<AppState>,
) -> Result<(), String> {
    let action_id = action.action_id.to_string();
    let option = parse_poll_action(&action_id)
        .ok_or_else(|| format!("malformed poll action_id: {action_id}"))?;
    let poll_id = action
        .value
        .as_deref()
        .ok_or_else(|| "poll action missing poll_id value".to_owned())?;

    let view = vote::cast_vote(state, poll_id, option, user_id)
        .await
        .map_err(|err| err.to_string())?;
    info!(poll_id, option, user_id, "poll vote applied");

    if let Some(ref slack) = state.slack {
        let msg_ts = message.map(|m| m.origin.ts.clone());
        let chan_id = channel.map(|c| c.id.clone());

        if let (Some(ts), Some(ch)) = (msg_ts, chan_id) {
            if let Err(err) = slack
                .update_message(ch, ts, view.question.clone(), blocks::poll_blocks(&view))
                .await
            {
                warn!(%err, poll_id, "failed to re-render poll");
            }
        }
    }

    Ok(())
}
