//! Reminder event consumer: delivers fired reminders to Slack.

use std::sync::Arc;

use slack_morphism::prelude::SlackChannelId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::reminder::ReminderEvent;
use crate::slack::blocks;
use crate::slack::client::{SlackMessage, SlackService};

/// Spawn a background task that posts fired reminders to their channel.
///
/// The task runs until the `CancellationToken` fires or the `mpsc` channel
/// closes.
#[must_use]
pub fn spawn_reminder_consumer(
    mut rx: mpsc::Receiver<ReminderEvent>,
    slack: Arc<SlackService>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                () = cancel.cancelled() => {
                    info!("reminder consumer shutting down");
                    break;
                }
                maybe_event = rx.recv() => {
                    if let Some(e) = maybe_event { e } else {
                        info!("reminder event channel closed");
                        break;
                    }
                }
            };

            match event {
                ReminderEvent::Fired {
                    destination,
                    payload,
                } => {
                    info!(destination, "delivering reminder");
                    let msg = SlackMessage::plain(
                        SlackChannelId(destination),
                        blocks::reminder_text(&payload),
                    );
                    if let Err(err) = slack.enqueue(msg).await {
                        warn!(%err, "failed to deliver reminder");
                    }
                }
            }
        }
    })
}
