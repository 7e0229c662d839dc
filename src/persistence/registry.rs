//! Registry handing out one shared [`StateStore`] per durable record.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::config::GlobalConfig;

use super::state_store::StateStore;

/// Maps channels to their state store.
///
/// Channels that resolve to the same record path share one store instance,
/// and therefore one lock.
pub struct StateStores {
    config: Arc<GlobalConfig>,
    clock: Arc<dyn Clock>,
    stores: Mutex<HashMap<PathBuf, Arc<StateStore>>>,
}

impl StateStores {
    /// Create an empty registry.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Store responsible for `channel_id`.
    #[must_use]
    pub fn for_channel(&self, channel_id: &str) -> Arc<StateStore> {
        let path = self.config.state_path(channel_id);
        let mut stores = self
            .stores
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(stores.entry(path.clone()).or_insert_with(|| {
            Arc::new(StateStore::new(
                path,
                self.config.tz(),
                Arc::clone(&self.clock),
            ))
        }))
    }
}
