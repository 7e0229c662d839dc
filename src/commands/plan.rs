//! `/random`: pick a plan for the week.

use rand::seq::SliceRandom;

use crate::app::AppState;
use crate::{AppError, Result};

use super::{CommandContext, Reply};

/// Random base plan, plus a random idea from the list when there is one.
///
/// # Errors
///
/// Returns `AppError::Config` if no base plans are configured, plus store failures.
pub async fn random_plan(state: &AppState, ctx: &CommandContext) -> Result<Reply> {
    let plan = state
        .config
        .random_plans
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| AppError::Config("random_plans is empty".into()))?;

    let idea = state
        .stores
        .for_channel(&ctx.channel_id)
        .random_idea()
        .await?;

    let mut text = format!("🎲 Random plan for the week: {plan}");
    if let Some(idea) = idea {
        text.push_str("\n💡 From your ideas: ");
        text.push_str(&idea.text);
    }
    Ok(Reply::in_channel(text))
}
