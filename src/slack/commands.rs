//! Slack slash command router.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector, SlackCommandEvent,
    SlackCommandEventResponse, SlackMessageContent, SlackMessageResponseType,
};
use tracing::{info, warn};

use crate::app::AppState;
use crate::commands::{self, ChatKind, Command, CommandContext, Reply, Visibility};
use crate::slack::blocks;

/// Classify a Slack conversation id; `D…` ids are direct messages.
#[must_use]
pub fn chat_kind_for(channel_id: &str) -> ChatKind {
    if channel_id.starts_with('D') {
        ChatKind::Private
    } else {
        ChatKind::Group
    }
}

/// Convert a command reply into a slash command response.
#[must_use]
pub fn to_response(reply: &Reply) -> SlackCommandEventResponse {
    let response_type = match reply.visibility {
        Visibility::InChannel => SlackMessageResponseType::InChannel,
        Visibility::Ephemeral => SlackMessageResponseType::Ephemeral,
    };
    SlackCommandEventResponse {
        content: SlackMessageContent {
            text: Some(reply.text.clone()),
            blocks: blocks::reply_blocks(reply),
            attachments: None,
            upload: None,
            files: None,
            reactions: None,
            metadata: None,
        },
        response_type: Some(response_type),
    }
}

/// Handle incoming slash commands routed via Socket Mode.
///
/// # Errors
///
/// Never fails in practice; every outcome is reported as a reply.
pub async fn handle_command(
    event: SlackCommandEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::AnyStdResult<SlackCommandEventResponse> {
    info!(command = ?event.command, user = ?event.user_id, "received slash command");

    let app_state: Option<Arc<AppState>> = {
        let guard = state.read().await;
        guard.get_user_state::<Arc<AppState>>().cloned()
    };
    let Some(app) = app_state else {
        warn!("app state not available; cannot process command");
        return Ok(to_response(&Reply::ephemeral(
            "I'm still starting up. Try again in a moment.",
        )));
    };

    let Some(command) = Command::parse(&event.command.0, &app.config.info_link.command) else {
        warn!(command = ?event.command, "unknown slash command");
        return Ok(to_response(&Reply::ephemeral("Unknown command. See /help")));
    };

    let channel_id = event.channel_id.to_string();
    let user_id = event.user_id.to_string();
    let chat_kind = chat_kind_for(&channel_id);

    let user_name = match (&app.slack, command, chat_kind) {
        (Some(slack), Command::Idea, ChatKind::Group) => slack.display_name(&user_id).await,
        _ => None,
    };

    let ctx = CommandContext {
        channel_id,
        chat_kind,
        user_id,
        user_name,
    };
    let args = event.text.as_deref().unwrap_or_default();
    let reply = commands::dispatch(&app, &ctx, command, args).await;

    Ok(to_response(&reply))
}
