//! Command routing and reply construction, independent of the transport.
//!
//! [`dispatch`] is the error boundary: every [`AppError`] raised by a
//! handler is turned into a short corrective reply, so no command failure
//! ever reaches the transport as an error.

pub mod duty;
pub mod help;
pub mod ideas;
pub mod plan;
pub mod remind;
pub mod vote;

use tracing::{info, warn};

use crate::app::AppState;
use crate::models::poll::PollView;
use crate::scheduler::reminder_scheduler::NONEXISTENT_TIME;
use crate::{AppError, Result};

/// Bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`: overview.
    Start,
    /// `/help`: overview.
    Help,
    /// `/idea <text>`: add an idea.
    Idea,
    /// `/ideas`: list ideas.
    Ideas,
    /// `/vote <n>`: open a poll on idea `n`.
    Vote,
    /// `/random`: random plan.
    Random,
    /// `/remind HH:MM <text>`: same-day reminder.
    Remind,
    /// `/duty`: rotate the duty roster.
    Duty,
    /// Configured informational link command.
    Info,
}

impl Command {
    /// Resolve a command name (leading `/` optional, case-insensitive).
    ///
    /// Built-in names take precedence over `info_command`.
    #[must_use]
    pub fn parse(name: &str, info_command: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/').to_lowercase();
        let command = match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "idea" => Self::Idea,
            "ideas" => Self::Ideas,
            "vote" => Self::Vote,
            "random" => Self::Random,
            "remind" => Self::Remind,
            "duty" => Self::Duty,
            other if !other.is_empty() && other == info_command => Self::Info,
            _ => return None,
        };
        Some(command)
    }
}

/// Kind of conversation a command arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    /// Multi-member channel or group.
    Group,
    /// One-to-one direct message.
    Private,
}

/// Identity of the conversation and caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Channel the command was issued in.
    pub channel_id: String,
    /// Conversation kind.
    pub chat_kind: ChatKind,
    /// Caller's user id.
    pub user_id: String,
    /// Caller's display name, when it could be resolved.
    pub user_name: Option<String>,
}

/// Who can see a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Posted for the whole channel.
    InChannel,
    /// Shown only to the caller.
    Ephemeral,
}

/// Interactive content attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Vote buttons for a poll.
    Poll(PollView),
    /// A single external link button.
    Link {
        /// Button label.
        label: String,
        /// Button target.
        url: String,
    },
}

/// Transport-neutral command reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Message text.
    pub text: String,
    /// Optional interactive content.
    pub attachment: Option<Attachment>,
    /// Audience.
    pub visibility: Visibility,
}

impl Reply {
    /// Reply visible to the whole channel.
    #[must_use]
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
            visibility: Visibility::InChannel,
        }
    }

    /// Reply visible only to the caller.
    #[must_use]
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
            visibility: Visibility::Ephemeral,
        }
    }

    /// Attach interactive content.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Run `command` and always produce a reply.
pub async fn dispatch(
    state: &AppState,
    ctx: &CommandContext,
    command: Command,
    args: &str,
) -> Reply {
    if ctx.chat_kind == ChatKind::Private {
        info!(?command, user_id = ctx.user_id, "command outside a group; redirecting");
        return help::private_redirect();
    }

    info!(?command, channel_id = ctx.channel_id, user_id = ctx.user_id, "handling command");

    let result: Result<Reply> = match command {
        Command::Start | Command::Help => Ok(help::overview(&state.config)),
        Command::Idea => ideas::add_idea(state, ctx, args).await,
        Command::Ideas => ideas::list_ideas(state, ctx).await,
        Command::Vote => vote::start_poll(state, ctx, args).await,
        Command::Random => plan::random_plan(state, ctx).await,
        Command::Remind => remind::set_reminder(state, ctx, args),
        Command::Duty => duty::next_duty(state, ctx).await,
        Command::Info => Ok(help::info_link(&state.config)),
    };

    result.unwrap_or_else(|err| {
        warn!(?command, channel_id = ctx.channel_id, %err, "command rejected");
        corrective_reply(command, &err)
    })
}

/// Map a handler failure to a short corrective message with an example.
#[must_use]
pub fn corrective_reply(command: Command, err: &AppError) -> Reply {
    let text = match err {
        AppError::Validation(msg)
            if command == Command::Remind && msg.contains(NONEXISTENT_TIME) =>
        {
            "That time is skipped today because of the clock change. Pick another time 🙂"
        }
        AppError::Validation(msg) if command == Command::Vote && msg == vote::MISSING_IDEA_NUMBER => {
            "Example: /vote 2"
        }
        AppError::Validation(_) => match command {
            Command::Idea => "Example: /idea tea at 19:00 or /idea a ride along the embankment",
            Command::Vote => "The idea number must be a number. Example: /vote 2",
            Command::Remind => "Format: /remind HH:MM text\nExample: /remind 19:00 tea at Tanya's",
            _ => "I didn't understand that. See /help",
        },
        AppError::NotFound(_) => "No such idea. List: /ideas",
        AppError::PastTime(_) => "That time has already passed. I only set reminders for today 🙂",
        AppError::Config(_) if command == Command::Duty => {
            "The duty roster is empty. Ask an admin to fill in duty_roster."
        }
        AppError::Config(_) => "I'm not configured for that yet. See /help",
        AppError::DataCorruption(_) => {
            "The saved group data is damaged and can't be read. Ask an admin to check the state file."
        }
        AppError::Io(_) | AppError::Slack(_) => {
            "Something went wrong on my side. Please try again in a moment."
        }
    };
    Reply::ephemeral(text)
}
