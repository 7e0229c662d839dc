//! Slack interaction dispatch handler.
//!
//! Receives interactive payloads (button presses) via Socket Mode and
//! routes them by `action_id` prefix. Only poll vote buttons are
//! interactive; link buttons open in the browser and need no handling.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector,
    SlackInteractionEvent,
};
use tracing::{info, warn};

use crate::app::AppState;
use crate::slack::{blocks, handlers};

/// Handle interactive payloads delivered via Socket Mode.
///
/// # Errors
///
/// Returns an error if the interaction cannot be processed.
pub async fn handle_interaction(
    event: SlackInteractionEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let app_state: Option<Arc<AppState>> = {
        let guard = state.read().await;
        guard.get_user_state::<Arc<AppState>>().cloned()
    };

    match &event {
        SlackInteractionEvent::BlockActions(block_event) => {
            let user_id = block_event
                .user
                .as_ref()
                .map(|u| u.id.to_string())
                .unwrap_or_default();

            if user_id.is_empty() {
                warn!("block action with empty user ID; ignoring");
                return Ok(());
            }

            let Some(ref app) = app_state else {
                warn!("app state not available; cannot process interaction");
                return Ok(());
            };

            let Some(actions) = &block_event.actions else {
                return Ok(());
            };

            for action in actions {
                let action_id = action.action_id.to_string();
                info!(action_id, user_id, "dispatching block action");

                if action_id.starts_with(blocks::POLL_ACTION_PREFIX) {
                    if let Err(err) = handlers::poll::handle_poll_vote(
                        action,
                        &user_id,
                        block_event.channel.as_ref(),
                        block_event.message.as_ref(),
                        app,
                    )
                    .await
                    {
                        warn!(%err, action_id, "poll vote failed");
                    }
                } else if action_id == "open_link" {
                    info!(user_id, "link button opened");
                } else {
                    warn!(action_id, "unknown action_id prefix");
                }
            }
        }
        _ => {
            info!(?event, "unhandled interaction event type");
        }
    }
    Ok(())
}
