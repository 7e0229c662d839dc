//! In-memory vote poll for a single idea.

use std::collections::{BTreeMap, HashMap, VecDeque};

use uuid::Uuid;

use crate::{AppError, Result};

/// Maximum poll question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 300;

/// Fixed answer options offered by every idea poll.
pub const POLL_OPTIONS: [&str; 3] = ["For 🔥", "Against 🙅‍♀️", "Don't care 😎"];

/// A single user's current answer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ballot {
    option: usize,
}

/// Non-anonymous, single-answer poll.
///
/// Each user holds at most one ballot; voting again replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    /// Unique poll identifier carried by the vote buttons.
    pub id: String,
    /// Channel the poll was posted in.
    pub channel_id: String,
    /// Question text, at most [`MAX_QUESTION_CHARS`] characters.
    pub question: String,
    /// Answer labels in display order.
    pub options: Vec<String>,
    ballots: BTreeMap<String, Ballot>,
}

/// Rendering snapshot of a poll with per-option voters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollView {
    /// Poll identifier.
    pub id: String,
    /// Question text.
    pub question: String,
    /// One entry per option, in display order.
    pub options: Vec<OptionTally>,
}

/// Voters for one poll option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTally {
    /// Option label.
    pub label: String,
    /// User ids that chose this option, sorted.
    pub voters: Vec<String>,
}

impl Poll {
    /// Create a poll about an idea, truncating the question to the length limit.
    #[must_use]
    pub fn for_idea(channel_id: String, idea_text: &str) -> Self {
        let question: String = format!("Vote: {idea_text}")
            .chars()
            .take(MAX_QUESTION_CHARS)
            .collect();
        Self {
            id: Uuid::new_v4().to_string(),
            channel_id,
            question,
            options: POLL_OPTIONS.iter().map(|o| (*o).to_owned()).collect(),
            ballots: BTreeMap::new(),
        }
    }

    /// Cast or replace `user_id`'s ballot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `option` is not a valid option index.
    pub fn cast(&mut self, user_id: &str, option: usize) -> Result<()> {
        if option >= self.options.len() {
            return Err(AppError::Validation(format!(
                "poll {} has no option {option}",
                self.id
            )));
        }
        self.ballots.insert(user_id.to_owned(), Ballot { option });
        Ok(())
    }

    /// Number of users who have voted.
    #[must_use]
    pub fn voter_count(&self) -> usize {
        self.ballots.len()
    }

    /// Snapshot the poll for rendering.
    #[must_use]
    pub fn view(&self) -> PollView {
        let options = self
            .options
            .iter()
            .enumerate()
            .map(|(index, label)| OptionTally {
                label: label.clone(),
                voters: self
                    .ballots
                    .iter()
                    .filter(|(_, ballot)| ballot.option == index)
                    .map(|(user, _)| user.clone())
                    .collect(),
            })
            .collect();
        PollView {
            id: self.id.clone(),
            question: self.question.clone(),
            options,
        }
    }
}

/// Open polls keyed by id, holding at most `capacity` entries.
///
/// Opening a poll beyond the capacity evicts the oldest one; votes on an
/// evicted poll are treated like votes on an unknown poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollBook {
    capacity: usize,
    polls: HashMap<String, Poll>,
    order: VecDeque<String>,
}

impl PollBook {
    /// Empty book; a `capacity` of 0 is treated as 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            polls: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Register a newly opened poll and return the ids of evicted polls.
    pub fn insert(&mut self, poll: Poll) -> Vec<String> {
        self.order.retain(|id| *id != poll.id);
        self.order.push_back(poll.id.clone());
        self.polls.insert(poll.id.clone(), poll);

        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.polls.remove(&oldest);
                evicted.push(oldest);
            }
        }
        evicted
    }

    /// Poll by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Poll> {
        self.polls.get(id)
    }

    /// Mutable poll by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Poll> {
        self.polls.get_mut(id)
    }

    /// Number of open polls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polls.len()
    }

    /// Whether no poll is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }
}
