//! Static replies: overview, informational link, and the DM redirect.

use crate::config::GlobalConfig;

use super::{Attachment, Reply};

/// Command overview for `/start` and `/help`.
#[must_use]
pub fn overview(config: &GlobalConfig) -> Reply {
    let info = &config.info_link;
    Reply::in_channel(format!(
        "I'm your group organizer 🤝\n\n\
         Commands:\n\
         /idea <text> — add an idea\n\
         /ideas — list of ideas\n\
         /vote <number> — vote on an idea\n\
         /random — random plan\n\
         /remind HH:MM <text> — reminder for today\n\
         /duty — who is on duty this week\n\
         /{} — {}\n\
         /help — this overview",
        info.command, info.title
    ))
}

/// Reply for the configured informational command.
#[must_use]
pub fn info_link(config: &GlobalConfig) -> Reply {
    let info = &config.info_link;
    Reply::in_channel(format!("{}\n\n{}", info.title, info.text)).with_attachment(
        Attachment::Link {
            label: info.button_label.clone(),
            url: info.url.clone(),
        },
    )
}

/// Reply for any command issued outside a group.
#[must_use]
pub fn private_redirect() -> Reply {
    Reply::ephemeral("Add me to your group — that's where I work 🙂")
}
