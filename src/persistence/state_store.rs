//! File-backed group state store.
//!
//! Every operation runs a full load → mutate → save cycle against one JSON
//! record. A per-store async mutex is held across the whole cycle, so two
//! commands racing on the same record serialise instead of clobbering each
//! other. Saves go through a temporary file in the same directory followed
//! by an atomic rename, so a reader never observes a partial record.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono_tz::Tz;
use rand::seq::SliceRandom;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::models::group_state::{DutyAssignment, GroupState};
use crate::models::idea::IdeaRecord;
use crate::{AppError, Result};

/// Sole owner of one durable group state record.
pub struct StateStore {
    path: PathBuf,
    tz: Tz,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl StateStore {
    /// Create a store for the record at `path`. The file is not touched until
    /// the first operation.
    #[must_use]
    pub fn new(path: PathBuf, tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            path,
            tz,
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Location of the durable record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the durable record, or the default state if none exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::DataCorruption` if the record cannot be parsed and
    /// `AppError::Io` if it cannot be read.
    pub async fn load(&self) -> Result<GroupState> {
        let _guard = self.lock.lock().await;
        self.read_record().await
    }

    /// Overwrite the durable record with `state`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the record cannot be written.
    pub async fn save(&self, state: &GroupState) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_record(state).await
    }

    /// Append an idea and return its 1-based position.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for empty or whitespace-only text, plus
    /// any load/save failure.
    pub async fn append_idea(&self, text: &str, author: &str) -> Result<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("idea text must not be empty".into()));
        }

        let _guard = self.lock.lock().await;
        let mut state = self.read_record().await?;
        let created_at = self.clock.now().with_timezone(&self.tz);
        state
            .ideas
            .push(IdeaRecord::new(text.to_owned(), author.to_owned(), &created_at));
        self.write_record(&state).await?;

        let position = state.ideas.len();
        info!(path = %self.path.display(), position, "idea appended");
        Ok(position)
    }

    /// All ideas in insertion order.
    ///
    /// # Errors
    ///
    /// Returns any load failure.
    pub async fn list_ideas(&self) -> Result<Vec<IdeaRecord>> {
        Ok(self.load().await?.ideas)
    }

    /// Idea at 1-based `position`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if `position` is outside `[1, count]`,
    /// plus any load failure.
    pub async fn idea_at(&self, position: usize) -> Result<IdeaRecord> {
        let ideas = self.list_ideas().await?;
        let count = ideas.len();
        position
            .checked_sub(1)
            .and_then(|index| ideas.into_iter().nth(index))
            .ok_or_else(|| AppError::NotFound(format!("idea {position} of {count}")))
    }

    /// Select the next duty person and advance the rotation.
    ///
    /// The stored index is wrapped modulo the roster length at read time and
    /// `i + 1` is written back.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an empty roster, plus any load/save failure.
    pub async fn next_duty_person(&self, roster: &[String]) -> Result<DutyAssignment> {
        if roster.is_empty() {
            return Err(AppError::Config("duty roster is empty".into()));
        }

        let _guard = self.lock.lock().await;
        let mut state = self.read_record().await?;
        let len = roster.len() as u64;
        let index = state.duty_index % len;
        let person = usize::try_from(index)
            .ok()
            .and_then(|i| roster.get(i))
            .cloned()
            .ok_or_else(|| AppError::Config(format!("duty index {index} out of range")))?;
        state.duty_index = index + 1;
        self.write_record(&state).await?;

        info!(path = %self.path.display(), person, next_index = state.duty_index, "duty rotated");
        Ok(DutyAssignment {
            person,
            next_index: state.duty_index,
        })
    }

    /// A uniformly random idea, or `None` when there are none.
    ///
    /// # Errors
    ///
    /// Returns any load failure.
    pub async fn random_idea(&self) -> Result<Option<IdeaRecord>> {
        let ideas = self.list_ideas().await?;
        Ok(ideas.choose(&mut rand::thread_rng()).cloned())
    }

    async fn read_record(&self) -> Result<GroupState> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state record yet; using default");
                return Ok(GroupState::default());
            }
            Err(err) => {
                return Err(AppError::Io(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_slice(&raw).map_err(|err| {
            AppError::DataCorruption(format!("{} is malformed: {err}", self.path.display()))
        })
    }

    async fn write_record(&self, state: &GroupState) -> Result<()> {
        let body = serde_json::to_vec_pretty(state)
            .map_err(|err| AppError::Io(format!("failed to serialize state: {err}")))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &body))
            .await
            .map_err(|err| AppError::Io(format!("state write task panicked: {err}")))?
    }
}

/// Write `body` to a temp file next to `path`, then rename it into place.
fn write_atomically(path: &Path, body: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|err| {
        AppError::Io(format!(
            "failed to create state directory {}: {err}",
            parent.display()
        ))
    })?;

    let mut tmp = NamedTempFile::new_in(parent)
        .map_err(|err| AppError::Io(format!("failed to create temporary file: {err}")))?;
    tmp.write_all(body)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| AppError::Io(format!("failed to write temporary file: {err}")))?;
    tmp.persist(path)
        .map_err(|err| AppError::Io(format!("failed to persist {}: {err}", path.display())))?;
    Ok(())
}
