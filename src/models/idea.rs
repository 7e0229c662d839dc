//! Idea record submitted by a group member.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// A free-text activity suggestion.
///
/// The 1-based position of a record in [`GroupState::ideas`](super::group_state::GroupState)
/// is its user-facing idea number. Records are never deleted, so numbers stay stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdeaRecord {
    /// Author-supplied text, never empty.
    pub text: String,
    /// Best-effort display name of the author.
    #[serde(default)]
    pub author: String,
    /// Creation time in the configured zone, ISO-8601.
    #[serde(rename = "ts")]
    pub timestamp: String,
}

impl IdeaRecord {
    /// Construct a record stamped with `created_at`.
    #[must_use]
    pub fn new<Tz>(text: String, author: String, created_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            text,
            author,
            timestamp: created_at.to_rfc3339(),
        }
    }
}
