//! Slack Block Kit message builders.
//!
//! Renders transport-neutral [`Reply`] values, poll views, and reminder
//! notifications into Slack text and blocks.

use slack_morphism::prelude::{
    SlackActionBlockElement, SlackActionsBlock, SlackBlock, SlackBlockButtonElement,
    SlackBlockId, SlackBlockPlainTextOnly, SlackBlockText, SlackSectionBlock,
};
use url::Url;

use crate::commands::{Attachment, Reply};
use crate::models::poll::PollView;

/// Prefix of every poll vote button `action_id`; the option index follows.
pub const POLL_ACTION_PREFIX: &str = "poll_vote_";

/// Build a plain text section block.
#[must_use]
pub fn text_section(text: &str) -> SlackBlock {
    SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(text.into())))
}

/// Build an actions block with the given `(action_id, text, value)` buttons.
#[must_use]
pub fn action_buttons(block_id: &str, buttons: &[(&str, &str, &str)]) -> SlackBlock {
    let elements: Vec<SlackActionBlockElement> = buttons
        .iter()
        .map(|(action_id, text, value)| {
            SlackActionBlockElement::Button(
                SlackBlockButtonElement::new(
                    (*action_id).into(),
                    SlackBlockPlainTextOnly::from(*text),
                )
                .with_value((*value).into()),
            )
        })
        .collect();
    SlackBlock::Actions(
        SlackActionsBlock::new(elements).with_block_id(SlackBlockId(block_id.into())),
    )
}

/// Build an actions block with a single external link button.
///
/// Returns `None` when `url` does not parse.
#[must_use]
pub fn link_button(label: &str, url: &str) -> Option<SlackBlock> {
    let url = Url::parse(url).ok()?;
    let button = SlackBlockButtonElement::new(
        "open_link".into(),
        SlackBlockPlainTextOnly::from(label),
    )
    .with_url(url);
    Some(SlackBlock::Actions(SlackActionsBlock::new(vec![
        SlackActionBlockElement::Button(button),
    ])))
}

/// Markdown summary of a poll: question, then one line per option with voters.
#[must_use]
pub fn poll_summary(view: &PollView) -> String {
    let mut text = format!("🗳️ *{}*", view.question);
    for option in &view.options {
        let count = option.voters.len();
        let noun = if count == 1 { "vote" } else { "votes" };
        text.push_str(&format!("\n{} — {count} {noun}", option.label));
        if !option.voters.is_empty() {
            let mentions: Vec<String> = option.voters.iter().map(|u| format!("<@{u}>")).collect();
            text.push_str(": ");
            text.push_str(&mentions.join(", "));
        }
    }
    text
}

/// Poll message blocks: summary plus one vote button per option.
#[must_use]
pub fn poll_blocks(view: &PollView) -> Vec<SlackBlock> {
    let action_ids: Vec<String> = (0..view.options.len())
        .map(|index| format!("{POLL_ACTION_PREFIX}{index}"))
        .collect();
    let buttons: Vec<(&str, &str, &str)> = view
        .options
        .iter()
        .zip(&action_ids)
        .map(|(option, action_id)| (action_id.as_str(), option.label.as_str(), view.id.as_str()))
        .collect();

    vec![
        text_section(&poll_summary(view)),
        action_buttons(&format!("poll_{}", view.id), &buttons),
    ]
}

/// Blocks for a command reply, or `None` for plain text replies.
#[must_use]
pub fn reply_blocks(reply: &Reply) -> Option<Vec<SlackBlock>> {
    match reply.attachment.as_ref()? {
        Attachment::Poll(view) => Some(poll_blocks(view)),
        Attachment::Link { label, url } => {
            let mut blocks = vec![text_section(&reply.text)];
            blocks.extend(link_button(label, url));
            Some(blocks)
        }
    }
}

/// Text posted when a reminder fires.
#[must_use]
pub fn reminder_text(payload: &str) -> String {
    format!("⏰ Reminder: {payload}")
}
