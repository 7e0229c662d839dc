//! Slack interaction handler sub-modules.

pub mod poll;
