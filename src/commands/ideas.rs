//! `/idea` and `/ideas`.

use crate::app::AppState;
use crate::Result;

use super::{CommandContext, Reply};

/// Author shown when the caller's name cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "Someone";

/// Append an idea to the channel's list.
///
/// # Errors
///
/// Returns `AppError::Validation` for empty text, plus store failures.
pub async fn add_idea(state: &AppState, ctx: &CommandContext, args: &str) -> Result<Reply> {
    let text = args.trim();
    let author = ctx
        .user_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);

    let store = state.stores.for_channel(&ctx.channel_id);
    let position = store.append_idea(text, author).await?;
    Ok(Reply::in_channel(format!("✅ Idea #{position} added: {text}")))
}

/// Numbered list of the channel's ideas.
///
/// # Errors
///
/// Returns store failures.
pub async fn list_ideas(state: &AppState, ctx: &CommandContext) -> Result<Reply> {
    let ideas = state
        .stores
        .for_channel(&ctx.channel_id)
        .list_ideas()
        .await?;
    if ideas.is_empty() {
        return Ok(Reply::in_channel("No ideas yet. Add one: /idea <text>"));
    }

    let lines: Vec<String> = ideas
        .iter()
        .enumerate()
        .map(|(index, idea)| format!("{}) {} — {}", index + 1, idea.text, idea.author))
        .collect();
    Ok(Reply::in_channel(format!("📌 Your ideas:\n{}", lines.join("\n"))))
}
