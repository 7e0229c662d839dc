//! Persisted group state: the idea list and the duty rotation pointer.

use serde::{Deserialize, Serialize};

use super::idea::IdeaRecord;

/// Full contents of one durable record.
///
/// The default value (no ideas, `duty_index = 0`) is what a store returns
/// when no record exists yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupState {
    /// Ideas in submission order; duplicates are allowed.
    pub ideas: Vec<IdeaRecord>,
    /// Rotation counter, wrapped modulo the roster length at read time.
    #[serde(default)]
    pub duty_index: u64,
}

/// Outcome of one duty rotation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyAssignment {
    /// Roster member selected for this turn.
    pub person: String,
    /// Index persisted for the next turn.
    pub next_index: u64,
}
