//! Slack Socket Mode client with a small buffered send queue.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use slack_morphism::errors::SlackClientError;
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiChatUpdateRequest, SlackApiToken, SlackApiTokenType,
    SlackApiTokenValue, SlackApiUsersInfoRequest, SlackBlock, SlackChannelId, SlackClient,
    SlackClientEventsListenerEnvironment, SlackClientHyperHttpsConnector, SlackClientSession,
    SlackClientSocketModeConfig, SlackClientSocketModeListener, SlackMessageContent,
    SlackSocketModeListenerCallbacks, SlackTs, SlackUserId,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::slack::{commands, events};
use crate::{config::SlackConfig, AppError, Result};

const QUEUE_CAPACITY: usize = 256;
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const MAX_SEND_ATTEMPTS: u32 = 5;

/// Why a single `chat.postMessage` attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// Rate limiting or a network/server fault; the same request may succeed later.
    Transient {
        /// Delay requested by Slack, if any.
        retry_after: Option<Duration>,
    },
    /// Slack rejected the request (`not_in_channel`, `invalid_auth`, ...).
    Permanent(String),
}

/// Retry schedule for the outgoing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound of the doubling backoff.
    pub max_delay: Duration,
    /// Total attempts per message, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_RETRY_DELAY,
            max_delay: MAX_RETRY_DELAY,
            max_attempts: MAX_SEND_ATTEMPTS,
        }
    }
}

/// Sort a Slack client error into retryable and non-retryable failures.
#[must_use]
pub fn classify_error(err: &SlackClientError) -> SendFailure {
    match err {
        SlackClientError::RateLimitError(rate) => SendFailure::Transient {
            retry_after: rate.retry_after,
        },
        SlackClientError::ApiError(api) => SendFailure::Permanent(api.code.clone()),
        SlackClientError::ProtocolError(_) => SendFailure::Permanent(err.to_string()),
        SlackClientError::HttpError(http) if !http.status_code.is_server_error() => {
            SendFailure::Permanent(err.to_string())
        }
        _ => SendFailure::Transient { retry_after: None },
    }
}

/// Deliver queued messages one at a time until the channel closes.
///
/// Transient failures are retried with doubling backoff up to
/// `policy.max_attempts`; permanent failures and exhausted retries drop the
/// message so later messages still go out.
pub async fn drain_queue<F, Fut>(
    mut queue_rx: mpsc::Receiver<SlackMessage>,
    policy: RetryPolicy,
    mut send: F,
) where
    F: FnMut(SlackApiChatPostMessageRequest) -> Fut,
    Fut: Future<Output = std::result::Result<(), SendFailure>>,
{
    while let Some(message) = queue_rx.recv().await {
        let request = message.into_request();
        let channel = request.channel.to_string();
        let mut backoff = policy.initial_delay;
        let mut attempt = 1;
        loop {
            match send(request.clone()).await {
                Ok(()) => {
                    info!(%channel, attempt, "sent slack message");
                    break;
                }
                Err(SendFailure::Permanent(reason)) => {
                    warn!(%channel, %reason, "slack rejected message; dropping it");
                    break;
                }
                Err(SendFailure::Transient { .. }) if attempt >= policy.max_attempts => {
                    warn!(%channel, attempt, "slack post still failing; dropping message");
                    break;
                }
                Err(SendFailure::Transient { retry_after }) => {
                    let delay = retry_after.unwrap_or(backoff);
                    warn!(%channel, attempt, ?delay, "slack post failed; retrying");
                    sleep(delay).await;
                    backoff = (backoff * 2).min(policy.max_delay);
                    attempt += 1;
                }
            }
        }
    }
    info!("slack sender task exiting");
}

/// Message to be delivered to Slack via chat.postMessage.
#[derive(Debug, Clone)]
pub struct SlackMessage {
    /// Target channel.
    pub channel: SlackChannelId,
    /// Fallback / notification text.
    pub text: Option<String>,
    /// Optional Block Kit layout.
    pub blocks: Option<Vec<SlackBlock>>,
}

impl SlackMessage {
    /// Create a plain-text message for a channel.
    #[must_use]
    pub fn plain(channel: SlackChannelId, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: Some(text.into()),
            blocks: None,
        }
    }

    fn into_request(self) -> SlackApiChatPostMessageRequest {
        let content = SlackMessageContent {
            text: self.text,
            blocks: self.blocks,
            attachments: None,
            upload: None,
            files: None,
            reactions: None,
            metadata: None,
        };

        SlackApiChatPostMessageRequest {
            channel: self.channel,
            content,
            as_user: None,
            icon_emoji: None,
            icon_url: None,
            link_names: Some(true),
            parse: None,
            thread_ts: None,
            username: None,
            reply_broadcast: None,
            unfurl_links: None,
            unfurl_media: None,
        }
    }
}

/// Slack Socket Mode wrapper that owns a rate-limited outgoing queue.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
    app_token: SlackApiToken,
    queue_tx: mpsc::Sender<SlackMessage>,
}

impl SlackService {
    /// Create the Slack client and start the background sender task.
    ///
    /// Socket Mode is started separately with [`spawn_socket_mode`](Self::spawn_socket_mode)
    /// once the shared [`AppState`] exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn start(config: &SlackConfig) -> Result<(Self, JoinHandle<()>)> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };
        let app_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.app_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::App),
        };

        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
        let queue_task = Self::spawn_worker(Arc::clone(&client), bot_token.clone(), queue_rx);

        info!("slack sender queue started");

        Ok((
            Self {
                client,
                bot_token,
                app_token,
                queue_tx,
            },
            queue_task,
        ))
    }

    /// Enqueue a message for async delivery.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the sender task has stopped.
    pub async fn enqueue(&self, message: SlackMessage) -> Result<()> {
        self.queue_tx
            .send(message)
            .await
            .map_err(|err| AppError::Slack(format!("failed to enqueue slack message: {err}")))
    }

    fn spawn_worker(
        client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
        token: SlackApiToken,
        queue_rx: mpsc::Receiver<SlackMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(drain_queue(
            queue_rx,
            RetryPolicy::default(),
            move |request: SlackApiChatPostMessageRequest| {
                let client = Arc::clone(&client);
                let token = token.clone();
                async move {
                    client
                        .open_session(&token)
                        .chat_post_message(&request)
                        .await
                        .map(|_| ())
                        .map_err(|err| classify_error(&err))
                }
            },
        ))
    }

    /// Start the Socket Mode listener with `state` injected as listener user state.
    #[must_use]
    pub fn spawn_socket_mode(&self, state: Arc<AppState>) -> JoinHandle<()> {
        let listener_env = Arc::new(
            SlackClientEventsListenerEnvironment::new(Arc::clone(&self.client))
                .with_error_handler(|err, _client, _state| {
                    error!(?err, "socket mode error");
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR
                })
                .with_user_state(state),
        );
        let callbacks = SlackSocketModeListenerCallbacks::new()
            .with_hello_events(|event, _client, _state| async move {
                info!(?event, "socket hello");
            })
            .with_command_events(commands::handle_command)
            .with_interaction_events(events::handle_interaction)
            .with_push_events(|event, _client, _state| async move {
                info!(?event, "push event ignored");
                Ok(())
            });
        let config = SlackClientSocketModeConfig {
            max_connections_count: SlackClientSocketModeConfig::DEFAULT_CONNECTIONS_COUNT,
            debug_connections: SlackClientSocketModeConfig::DEFAULT_DEBUG_CONNECTIONS,
            initial_backoff_in_seconds:
                SlackClientSocketModeConfig::DEFAULT_INITIAL_BACKOFF_IN_SECONDS,
            reconnect_timeout_in_seconds:
                SlackClientSocketModeConfig::DEFAULT_RECONNECT_TIMEOUT_IN_SECONDS,
            ping_interval_in_seconds: SlackClientSocketModeConfig::DEFAULT_PING_INTERVAL_IN_SECONDS,
            ping_failure_threshold_times:
                SlackClientSocketModeConfig::DEFAULT_PING_FAILURE_THRESHOLD_TIMES,
        };

        let listener = SlackClientSocketModeListener::new(&config, listener_env, callbacks);
        let app_token = self.app_token.clone();
        tokio::spawn(async move {
            if let Err(error) = listener.listen_for(&app_token).await {
                error!(?error, "socket mode listen failed");
                return;
            }

            listener.serve().await;
            info!("socket mode listener exited");
        })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    /// Best-effort display name for a user: profile display name, profile
    /// real name, then account name.
    pub async fn display_name(&self, user_id: &str) -> Option<String> {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_owned()));
        let user = match self.http_session().users_info(&request).await {
            Ok(response) => response.user,
            Err(err) => {
                warn!(user_id, ?err, "users.info failed; author name unavailable");
                return None;
            }
        };

        let non_empty = |name: &Option<String>| {
            name.as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned)
        };
        let profile = user.profile.as_ref();
        profile
            .and_then(|p| non_empty(&p.display_name))
            .or_else(|| profile.and_then(|p| non_empty(&p.real_name)))
            .or_else(|| non_empty(&user.name))
    }

    /// Update an existing Slack message (e.g., re-render a poll).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn update_message(
        &self,
        channel: SlackChannelId,
        ts: SlackTs,
        text: String,
        blocks: Vec<SlackBlock>,
    ) -> Result<()> {
        let request = SlackApiChatUpdateRequest::new(
            channel,
            SlackMessageContent {
                text: Some(text),
                blocks: Some(blocks),
                attachments: None,
                upload: None,
                files: None,
                reactions: None,
                metadata: None,
            },
            ts,
        );
        self.http_session()
            .chat_update(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to update message: {err}")))?;
        Ok(())
    }
}
