//! Shared application state handed to every command and interaction handler.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::GlobalConfig;
use crate::models::poll::PollBook;
use crate::persistence::StateStores;
use crate::scheduler::ReminderScheduler;
use crate::slack::client::SlackService;

/// Shared application state.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Durable group state, one store per record.
    pub stores: StateStores,
    /// Same-day reminder timers.
    pub scheduler: ReminderScheduler,
    /// Open polls (in memory only, bounded by `max_open_polls`).
    pub polls: Mutex<PollBook>,
    /// Slack client service (absent in tests).
    pub slack: Option<Arc<SlackService>>,
}
